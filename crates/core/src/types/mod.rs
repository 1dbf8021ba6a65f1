//! Core types for Aora.
//!
//! This module provides type-safe wrappers for the remote service's records
//! and the application records stored alongside them.

pub mod account;
pub mod document;
pub mod email;
pub mod id;
pub mod profile;
pub mod username;
pub mod video;

pub use account::{Account, Session};
pub use document::{Document, DocumentError};
pub use email::{Email, EmailError};
pub use id::*;
pub use profile::{CurrentUser, NewProfile, ProfileRecord};
pub use username::{Username, UsernameError};
pub use video::VideoPost;
