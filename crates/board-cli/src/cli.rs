//! Argument parsing
//!
//! The clap command tree and its translation into a [`BoardCommand`] plus
//! the configuration the invocation runs with.

use anyhow::Context;
use board_core::{BoardConfig, RequestStatus, ViewMode};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// Binary name
pub const BIN_NAME: &str = "request-board";

/// One parsed subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    /// Show the board
    List {
        /// Board columns or open/completed sections
        view: ViewMode,
        /// Print JSON instead of text
        json: bool,
    },
    /// Create a request
    Add {
        /// Who asked
        requester: String,
        /// What is needed
        description: String,
        /// Rewrite the description before adding
        optimize: bool,
    },
    /// Change status
    Move {
        /// Id or unique id prefix
        id: String,
        /// Target status
        status: RequestStatus,
    },
    /// Delete one or more requests
    Remove {
        /// Ids or unique id prefixes
        ids: Vec<String>,
    },
    /// Rewrite a description
    Optimize {
        /// Text to rewrite
        text: String,
    },
}

/// Global options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    /// TOML configuration file
    pub config: Option<PathBuf>,
    /// Remote endpoint override
    pub endpoint: Option<String>,
    /// Fallback slot override
    pub data: Option<PathBuf>,
    /// JSON log lines
    pub log_json: bool,
}

impl GlobalOptions {
    /// Resolve configuration: file, then environment, then flags
    pub fn resolve_config(&self) -> anyhow::Result<BoardConfig> {
        let mut config = match &self.config {
            Some(path) => BoardConfig::from_file(path)?,
            None => BoardConfig::default(),
        };
        config = config.apply_env();

        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        if let Some(data) = &self.data {
            config = config.with_fallback_path(data.clone());
        }
        Ok(config)
    }
}

/// Build the command tree
#[must_use]
pub fn build() -> Command {
    Command::new(BIN_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Track colleague requests on a three-column board")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .global(true)
                .help("Remote spreadsheet endpoint URL (overrides REQUEST_BOARD_ENDPOINT)"),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Local fallback file (overrides REQUEST_BOARD_DATA)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            Command::new("list")
                .about("Show all requests")
                .arg(
                    Arg::new("view")
                        .long("view")
                        .default_value("board")
                        .value_parser(value_parser!(ViewMode))
                        .help("board (one column per status) or list (open / completed)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("add")
                .about("Create a pending request")
                .arg(
                    Arg::new("requester")
                        .long("requester")
                        .required(true)
                        .help("Who is asking"),
                )
                .arg(
                    Arg::new("description")
                        .long("description")
                        .required(true)
                        .help("What is being asked"),
                )
                .arg(
                    Arg::new("optimize")
                        .long("optimize")
                        .action(ArgAction::SetTrue)
                        .help("Rewrite the description through the remote endpoint first"),
                ),
        )
        .subcommand(
            Command::new("move")
                .about("Change the status of a request")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .help("Request id or unique prefix"),
                )
                .arg(
                    Arg::new("status")
                        .required(true)
                        .value_parser(value_parser!(RequestStatus))
                        .help("pending, in-progress or completed"),
                ),
        )
        .subcommand(
            Command::new("remove")
                .about("Delete one or more requests")
                .arg(
                    Arg::new("ids")
                        .required(true)
                        .num_args(1..)
                        .help("Request ids or unique prefixes"),
                ),
        )
        .subcommand(
            Command::new("optimize")
                .about("Rewrite a description without creating a request")
                .arg(Arg::new("text").required(true).help("Description to rewrite")),
        )
}

fn required<'a, T>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    args.get_one::<T>(name)
        .with_context(|| format!("missing argument '{name}'"))
}

/// Translate parsed arguments
pub fn parse(matches: &ArgMatches) -> anyhow::Result<(GlobalOptions, BoardCommand)> {
    let globals = GlobalOptions {
        config: matches.get_one::<PathBuf>("config").cloned(),
        endpoint: matches.get_one::<String>("endpoint").cloned(),
        data: matches.get_one::<PathBuf>("data").cloned(),
        log_json: matches.get_flag("log-json"),
    };

    let command = match matches.subcommand() {
        Some(("list", args)) => BoardCommand::List {
            view: *required::<ViewMode>(args, "view")?,
            json: args.get_flag("json"),
        },
        Some(("add", args)) => BoardCommand::Add {
            requester: required::<String>(args, "requester")?.clone(),
            description: required::<String>(args, "description")?.clone(),
            optimize: args.get_flag("optimize"),
        },
        Some(("move", args)) => BoardCommand::Move {
            id: required::<String>(args, "id")?.clone(),
            status: *required::<RequestStatus>(args, "status")?,
        },
        Some(("remove", args)) => BoardCommand::Remove {
            ids: args
                .get_many::<String>("ids")
                .context("missing argument 'ids'")?
                .cloned()
                .collect(),
        },
        Some(("optimize", args)) => BoardCommand::Optimize {
            text: required::<String>(args, "text")?.clone(),
        },
        Some((other, _)) => anyhow::bail!("unknown command '{other}'"),
        None => anyhow::bail!("no command given"),
    };

    Ok((globals, command))
}
