//! Basic example demonstrating the Jira resource model.
//!
//! Run with:
//! ```
//! JIRA_SERVER=https://jira.example.com JIRA_USER=bot JIRA_API_TOKEN=secret \
//!     cargo run --example basic -- PROJ-1
//! ```

use std::sync::Arc;

use jira_resources::{JiraClient, Resource, ResourceKind, Transport, UpdateRequest, Value};

#[tokio::main]
async fn main() -> jira_resources::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    let key = std::env::args().nth(1).unwrap_or_else(|| "PROJ-1".to_string());

    // Create client from environment variables
    println!("Creating Jira client...");
    let client = JiraClient::from_env()?;
    println!("Connected to: {}", client.options().server);

    let options = Arc::clone(client.options());
    let session: Arc<dyn Transport> = Arc::new(client);

    // Load the issue; nested objects come back as resources or holders
    println!("\n--- Getting Issue ---");
    let mut issue = Resource::new(ResourceKind::Issue, options, session);
    issue.find(key.as_str(), &[]).await?;
    println!("Issue: {}", issue.label());
    println!("  URL: {}", issue.permalink()?);
    println!(
        "  Summary: {}",
        issue.path(&["fields", "summary"])?.as_str().unwrap_or("")
    );

    if let Ok(Value::Resource(status)) = issue.path(&["fields", "status"]) {
        println!("  Status: {} ({})", status.label(), status.kind());
    }
    println!("  Labels: {:?}", issue.labels()?);
    println!("  Resolved: {}", issue.is_resolved()?);

    // Update the summary; the issue is reloaded afterwards
    println!("\n--- Updating Issue ---");
    let summary = issue
        .path(&["fields", "summary"])?
        .as_str()
        .unwrap_or_default()
        .to_string();
    issue
        .update(UpdateRequest::new().field("summary", format!("{summary} (checked)")))
        .await?;
    println!(
        "New summary: {}",
        issue.path(&["fields", "summary"])?.as_str().unwrap_or("")
    );

    println!("\nDone!");
    Ok(())
}
