//! Jira resource CLI binary.
//!
//! A command-line interface for fetching, updating and deleting any Jira
//! REST resource.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use jira_resources::cli::{Cli, Command};
use jira_resources::output::PrettyPrint;
use jira_resources::{
    AccountManager, DeleteRequest, JiraClient, Resource, ResourceKind, Transport, UpdateRequest,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = match JiraClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set JIRA_SERVER (and JIRA_USER / JIRA_API_TOKEN) environment variables");
            return ExitCode::FAILURE;
        }
    };

    match run(client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: JiraClient, cli: Cli) -> jira_resources::Result<()> {
    let client = Arc::new(client);
    let session: Arc<dyn Transport> = client.clone();
    let options = Arc::clone(client.options());

    match cli.command {
        Command::Get { kind, ids, params } => {
            let mut resource = Resource::new(kind.into(), options, session);
            resource.find(ids, &params).await?;
            output_single(&resource, cli.json)
        }
        Command::Update {
            kind,
            ids,
            fields,
            async_dispatch,
        } => {
            let kind: ResourceKind = kind.into();
            let mut resource = Resource::new(kind, options, Arc::clone(&session));
            resource.find(ids, &[]).await?;

            let accounts: Arc<dyn AccountManager> = client.clone();
            let mut request = UpdateRequest::new()
                .async_dispatch(async_dispatch)
                .accounts(accounts);
            for (name, value) in fields {
                request = request.field(name, parse_value(&value));
            }
            resource.update(request).await?;

            if async_dispatch {
                report_jobs(session.as_ref()).await?;
                resource.refresh().await?;
            }
            output_single(&resource, cli.json)
        }
        Command::Delete {
            kind,
            ids,
            params,
            async_dispatch,
        } => {
            let mut resource = Resource::new(kind.into(), options, Arc::clone(&session));
            resource.find(ids, &[]).await?;

            let mut request = DeleteRequest::new().async_dispatch(async_dispatch);
            for (name, value) in params {
                request = request.param(name, value);
            }
            resource.delete(request).await?;

            if async_dispatch {
                report_jobs(session.as_ref()).await?;
            }
            eprintln!("Deleted {}", resource.label());
            Ok(())
        }
    }
}

/// Wait for background jobs and surface the first failure.
async fn report_jobs(session: &dyn Transport) -> jira_resources::Result<()> {
    for outcome in session.jobs().join_all().await {
        match outcome.result {
            Ok(status) => eprintln!("{} {} -> {}", outcome.method, outcome.url, status),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

fn output_single(resource: &Resource, json: bool) -> jira_resources::Result<()> {
    if json {
        let raw = resource.raw().cloned().unwrap_or_default();
        println!("{}", serde_json::to_string_pretty(&raw)?);
    } else {
        println!("{}", resource.pretty_print());
    }
    Ok(())
}
