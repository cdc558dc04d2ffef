//! Collaborator traits the resource layer is written against.
//!
//! [`Transport`] carries every HTTP call a resource makes and owns the
//! session's async job registry. [`AccountManager`] is consulted only by the
//! autofix path when the server reports a missing user.

mod accounts;
mod transport;

pub use accounts::{AccountManager, PLACEHOLDER_EMAIL, DEFAULT_GROUP_ID};
pub use transport::{QueryParams, RawResponse, Transport};
