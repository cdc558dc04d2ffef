//! Account management used by autofix.

use async_trait::async_trait;

use crate::error::Result;

/// Email given to accounts created on the fly by autofix.
pub const PLACEHOLDER_EMAIL: &str = "noreply@example.com";

/// Directory/group id given to accounts created on the fly by autofix.
pub const DEFAULT_GROUP_ID: u64 = 10100;

/// Create user accounts out-of-band.
///
/// # Example
///
/// ```ignore
/// use jira_resources::{AccountManager, JiraClient};
///
/// let client = JiraClient::from_env()?;
/// client.create_account("jdoe", "noreply@example.com", 10100, false).await?;
/// ```
#[async_trait]
pub trait AccountManager: Send + Sync {
    /// Create an account.
    ///
    /// # Arguments
    ///
    /// * `name` - Login name of the new account
    /// * `email` - Email address to register
    /// * `default_group_id` - Directory or group the account is placed in
    /// * `active` - Whether the account can log in
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    async fn create_account(
        &self,
        name: &str,
        email: &str,
        default_group_id: u64,
        active: bool,
    ) -> Result<()>;
}
