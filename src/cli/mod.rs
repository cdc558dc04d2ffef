//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! jira-resources binary.

use clap::{Parser, Subcommand, ValueEnum};

use crate::resource::ResourceKind;

/// Jira resource command-line interface.
#[derive(Parser, Debug)]
#[command(name = "jira-resources", about = "Jira REST resource CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a single resource.
    Get {
        /// The kind of resource.
        kind: Kind,

        /// Id parts, in template order (e.g. issue key then comment id).
        #[arg(required = true)]
        ids: Vec<String>,

        /// Extra query parameter as NAME=VALUE.
        #[arg(long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },

    /// Update a resource and print it after reload.
    Update {
        /// The kind of resource.
        kind: Kind,

        /// Id parts, in template order.
        #[arg(required = true)]
        ids: Vec<String>,

        /// Field to set as NAME=VALUE; VALUE is parsed as JSON when possible.
        #[arg(long = "field", value_parser = parse_pair)]
        fields: Vec<(String, String)>,

        /// Dispatch in the background and wait for the job at exit.
        #[arg(long = "async")]
        async_dispatch: bool,
    },

    /// Delete a resource.
    Delete {
        /// The kind of resource.
        kind: Kind,

        /// Id parts, in template order.
        #[arg(required = true)]
        ids: Vec<String>,

        /// Query parameter as NAME=VALUE (e.g. deleteSubtasks=true).
        #[arg(long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,

        /// Dispatch in the background and wait for the job at exit.
        #[arg(long = "async")]
        async_dispatch: bool,
    },
}

/// Resource kinds addressable from the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Attachment,
    Component,
    CustomFieldOption,
    Dashboard,
    Filter,
    #[value(alias = "issues")]
    Issue,
    Comment,
    Votes,
    Watchers,
    Worklog,
    RemoteLink,
    IssueLink,
    IssueLinkType,
    IssueType,
    Priority,
    #[value(alias = "projects")]
    Project,
    Role,
    Resolution,
    SecurityLevel,
    Status,
    User,
    Version,
    Sprint,
    Board,
}

impl From<Kind> for ResourceKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Attachment => Self::Attachment,
            Kind::Component => Self::Component,
            Kind::CustomFieldOption => Self::CustomFieldOption,
            Kind::Dashboard => Self::Dashboard,
            Kind::Filter => Self::Filter,
            Kind::Issue => Self::Issue,
            Kind::Comment => Self::Comment,
            Kind::Votes => Self::Votes,
            Kind::Watchers => Self::Watchers,
            Kind::Worklog => Self::Worklog,
            Kind::RemoteLink => Self::RemoteLink,
            Kind::IssueLink => Self::IssueLink,
            Kind::IssueLinkType => Self::IssueLinkType,
            Kind::IssueType => Self::IssueType,
            Kind::Priority => Self::Priority,
            Kind::Project => Self::Project,
            Kind::Role => Self::Role,
            Kind::Resolution => Self::Resolution,
            Kind::SecurityLevel => Self::SecurityLevel,
            Kind::Status => Self::Status,
            Kind::User => Self::User,
            Kind::Version => Self::Version,
            Kind::Sprint => Self::Sprint,
            Kind::Board => Self::Board,
        }
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))
}
