//! CLI argument parsing tests.

use clap::Parser;
use jira_resources::cli::{Cli, Command, Kind};
use jira_resources::ResourceKind;

#[test]
fn test_cli_parses_get_subcommand() {
    let cli = Cli::parse_from(["jira-resources", "get", "issue", "PROJ-1"]);

    assert!(!cli.json);
    match cli.command {
        Command::Get { kind, ids, params } => {
            assert_eq!(kind, Kind::Issue);
            assert_eq!(ids, vec!["PROJ-1".to_string()]);
            assert!(params.is_empty());
        }
        _ => panic!("Expected Get command"),
    }
}

#[test]
fn test_cli_parses_multi_part_ids() {
    let cli = Cli::parse_from(["jira-resources", "get", "comment", "PROJ-1", "20001"]);

    match cli.command {
        Command::Get { kind, ids, .. } => {
            assert_eq!(kind, Kind::Comment);
            assert_eq!(ids, vec!["PROJ-1".to_string(), "20001".to_string()]);
        }
        _ => panic!("Expected Get command"),
    }
}

#[test]
fn test_cli_parses_params() {
    let cli = Cli::parse_from([
        "jira-resources",
        "get",
        "issue",
        "PROJ-1",
        "--param",
        "expand=changelog",
        "--param",
        "fields=summary,status",
    ]);

    match cli.command {
        Command::Get { params, .. } => {
            assert_eq!(
                params,
                vec![
                    ("expand".to_string(), "changelog".to_string()),
                    ("fields".to_string(), "summary,status".to_string()),
                ]
            );
        }
        _ => panic!("Expected Get command"),
    }
}

#[test]
fn test_cli_rejects_param_without_equals() {
    let result = Cli::try_parse_from(["jira-resources", "get", "issue", "PROJ-1", "--param", "expand"]);

    assert!(result.is_err());
}

#[test]
fn test_cli_requires_an_id() {
    let result = Cli::try_parse_from(["jira-resources", "get", "issue"]);

    assert!(result.is_err());
}

#[test]
fn test_cli_parses_update_subcommand() {
    let cli = Cli::parse_from([
        "jira-resources",
        "update",
        "issue",
        "PROJ-1",
        "--field",
        "summary=New title",
        "--async",
    ]);

    match cli.command {
        Command::Update {
            kind,
            ids,
            fields,
            async_dispatch,
        } => {
            assert_eq!(kind, Kind::Issue);
            assert_eq!(ids, vec!["PROJ-1".to_string()]);
            assert_eq!(fields, vec![("summary".to_string(), "New title".to_string())]);
            assert!(async_dispatch);
        }
        _ => panic!("Expected Update command"),
    }
}

#[test]
fn test_cli_parses_delete_subcommand() {
    let cli = Cli::parse_from([
        "jira-resources",
        "--json",
        "delete",
        "component",
        "10000",
        "--param",
        "moveIssuesTo=10001",
    ]);

    assert!(cli.json);
    match cli.command {
        Command::Delete {
            kind,
            params,
            async_dispatch,
            ..
        } => {
            assert_eq!(kind, Kind::Component);
            assert_eq!(params, vec![("moveIssuesTo".to_string(), "10001".to_string())]);
            assert!(!async_dispatch);
        }
        _ => panic!("Expected Delete command"),
    }
}

#[test]
fn test_cli_json_flag_is_global() {
    let cli = Cli::parse_from(["jira-resources", "get", "project", "PROJ", "--json"]);

    assert!(cli.json);
}

#[test]
fn test_cli_kind_aliases() {
    let cli = Cli::parse_from(["jira-resources", "get", "issues", "PROJ-1"]);
    match cli.command {
        Command::Get { kind, .. } => assert_eq!(kind, Kind::Issue),
        _ => panic!("Expected Get command"),
    }

    let cli = Cli::parse_from(["jira-resources", "get", "custom-field-option", "10100"]);
    match cli.command {
        Command::Get { kind, .. } => assert_eq!(kind, Kind::CustomFieldOption),
        _ => panic!("Expected Get command"),
    }
}

#[test]
fn test_cli_kinds_map_to_resource_kinds() {
    assert_eq!(ResourceKind::from(Kind::Sprint), ResourceKind::Sprint);
    assert_eq!(ResourceKind::from(Kind::RemoteLink), ResourceKind::RemoteLink);
    assert_eq!(ResourceKind::from(Kind::IssueLinkType), ResourceKind::IssueLinkType);
}
