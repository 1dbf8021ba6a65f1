//! Services built on the remote service contract.
//!
//! # Services
//!
//! - `account` - Sign-up, sign-in, current user, and provisioning recovery
//! - `trending` - Newest video posts for the trending list

pub mod account;
pub mod trending;

pub use account::{AccountError, AccountService, Operation};
pub use trending::{TrendingError, TrendingService};
