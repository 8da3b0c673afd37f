//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_probe_defaults() {
    match parse(&["sqlretry", "probe"]) {
        CliCommand::Probe { url, timeout } => {
            assert!(url.is_none());
            assert!(timeout.is_none());
        }
        _ => panic!("expected Probe"),
    }
}

#[test]
fn cli_parse_probe_with_options() {
    match parse(&[
        "sqlretry",
        "probe",
        "--url",
        "sqlite:///tmp/jobs.db",
        "--timeout",
        "2.5",
    ]) {
        CliCommand::Probe { url, timeout } => {
            assert_eq!(url.as_deref(), Some("sqlite:///tmp/jobs.db"));
            assert_eq!(timeout, Some(2.5));
        }
        _ => panic!("expected Probe"),
    }
}

#[test]
fn cli_parse_config() {
    match parse(&["sqlretry", "config"]) {
        CliCommand::Config => {}
        _ => panic!("expected Config"),
    }
}

#[test]
fn cli_rejects_unknown_command() {
    assert!(Cli::try_parse_from(["sqlretry", "migrate"]).is_err());
}
