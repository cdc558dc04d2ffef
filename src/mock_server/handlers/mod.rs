//! HTTP handlers for the mock server.

mod documents;
mod users;

pub use documents::{delete_document, get_document, put_document};
pub use users::create_user;
