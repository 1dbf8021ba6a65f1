//! Aora Backend - Remote service access for the Aora app.
//!
//! Wraps an Appwrite project: accounts and sessions for identity, and a
//! database holding profile records and video posts.
//!
//! # Architecture
//!
//! - [`Backend`] is created once at startup and passed to whoever needs it;
//!   there is no global client
//! - [`appwrite::RemoteService`] is the seam to the remote service, with
//!   [`appwrite::AppwriteClient`] as the HTTP implementation
//! - [`services`] hold the workflows: account provisioning and the trending feed

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod appwrite;
pub mod config;
pub mod services;
pub mod state;

pub use config::{BackendConfig, ConfigError};
pub use state::Backend;
