//! Aora Core - Shared domain types.
//!
//! This crate provides the types shared by every Aora component:
//! - `backend` - Remote service client and account provisioning workflow
//! - `cli` - Command-line front end
//! - `integration-tests` - Fakes and end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! configuration. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, validated inputs, remote records, and the
//!   application-owned profile and video records decoded from them

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
