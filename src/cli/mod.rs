//! # bird-proxy CLI
//!
//! Every command talks to the BIRD daemon of one IP version, picked by the
//! first argument (`ipv4` or `ipv6`). Socket paths and the config folder come
//! from the TOML file given with `--config`.
//!
//! ```sh
//! $ bird-proxy show protocols ipv4 'peer_*'
//!  Session  Neighbor   AS     State        Imported  Exported  Preferred  Description
//! -----------------------------------------------------------------------------------
//!  peer_A   192.0.2.1  65001  Established  3         1         1          transit
//!  peer_B   192.0.2.2  65002  Active       0         0         0
//!
//! $ bird-proxy show routes ipv4 --prefix 10.0.0.0/8 --detail
//! $ bird-proxy show routes ipv6 --export-mode export --export-protocol peer_A
//! $ bird-proxy deploy ipv4 ./bird-rs1.conf
//! ```
//!
//! Use `--json` to print the raw `{"outcome": ..., "message": ...}` reply.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use ipnetwork::IpNetwork;
use serde::Serialize;
use tokio::fs;

use crate::config::ProxyConfig;
use crate::deploy::ConfigUpload;
use crate::manager::{BirdManager, RouteQuery};
use crate::models::{ExportMode, IpVersion, Reply};

mod display;
mod table;

use display::{PeerStatusRow, RouteRow};
use table::OutputTable;

#[derive(Parser, Debug)]
#[clap(name = "bird-proxy", rename_all = "kebab-case")]
/// Query and reconfigure BIRD over its control socket
pub struct Args {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Path to the bird-proxy config (TOML)
    #[clap(
        short,
        long,
        default_value = "/etc/bird-proxy/bird-proxy.toml",
        global = true
    )]
    pub config: String,
    /// Print replies as JSON instead of tables
    #[clap(long, global = true)]
    pub json: bool,
    /// Show debug logs (additive for trace logs)
    #[clap(short, parse(from_occurrences), global = true)]
    pub verbose: u8,
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// View peer sessions and routes
    #[clap(alias = "s", subcommand)]
    Show(Show),
    /// Validate a config file and make it the running configuration
    Deploy(DeployOptions),
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub enum Show {
    /// `show protocols all` for BGP sessions named peer_*
    #[clap(alias = "p", visible_alias = "peers")]
    Protocols(ProtocolOptions),
    /// `show route`
    #[clap(alias = "r")]
    Routes(RouteOptions),
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub struct ProtocolOptions {
    /// ipv4 or ipv6
    #[clap()]
    ip_version: IpVersion,
    /// Protocol name pattern, e.g. "peer_*"
    #[clap()]
    wildcard: Option<String>,
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub struct RouteOptions {
    /// ipv4 or ipv6
    #[clap()]
    ip_version: IpVersion,
    /// Only routes for this prefix
    #[clap(long)]
    prefix: Option<IpNetwork>,
    /// Look the prefix up like the forwarding table would (longest match)
    #[clap(long)]
    forwarding_table: bool,
    /// Routing table to read from
    #[clap(long)]
    table: Option<String>,
    /// Named filter to apply
    #[clap(long)]
    filter: Option<String>,
    /// Filter expression, e.g. "net.len > 24"
    #[clap(long = "where")]
    where_expr: Option<String>,
    /// Show all route attributes
    #[clap(long)]
    detail: bool,
    /// [export, preexport, noexport], requires --export-protocol
    #[clap(long)]
    export_mode: Option<ExportMode>,
    #[clap(long)]
    export_protocol: Option<String>,
    /// Only routes learned from this protocol
    #[clap(long)]
    protocol: Option<String>,
}

impl From<&RouteOptions> for RouteQuery {
    fn from(options: &RouteOptions) -> Self {
        RouteQuery {
            prefix: options.prefix.map(|prefix| prefix.to_string()),
            forwarding_table: options.forwarding_table,
            table: options.table.clone(),
            filter: options.filter.clone(),
            where_expr: options.where_expr.clone(),
            detail: options.detail,
            export_mode: options.export_mode,
            export_protocol: options.export_protocol.clone(),
            protocol: options.protocol.clone(),
        }
    }
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub struct DeployOptions {
    /// ipv4 or ipv6
    #[clap()]
    ip_version: IpVersion,
    /// BIRD config file to deploy
    #[clap(parse(from_os_str))]
    file: PathBuf,
}

/// Print `reply` as JSON, or hand a successful one to `show`
///
/// Returns whether the daemon reported success.
fn print_reply<T, F>(reply: Reply<T>, json: bool, show: F) -> Result<bool, Box<dyn Error>>
where
    T: Serialize,
    F: FnOnce(T),
{
    let success = reply.is_success();
    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(success);
    }
    match reply {
        Reply::Success(data) => show(data),
        Reply::Failure(message) => eprintln!("{}", message.red()),
    }
    Ok(success)
}

async fn run_cmd(args: &Args) -> Result<bool, Box<dyn Error>> {
    let config = ProxyConfig::from_file(&args.config)
        .map_err(|err| format!("Unable to read {}: {}", args.config, err))?;
    match &args.cmd {
        Command::Show(show) => match show {
            Show::Protocols(options) => {
                let manager = BirdManager::new(options.ip_version, &config);
                let reply = manager
                    .protocol_information(options.wildcard.as_deref())
                    .await?;
                print_reply(reply, args.json, |peers| {
                    peers
                        .into_iter()
                        .map(PeerStatusRow)
                        .collect::<OutputTable<_>>()
                        .print()
                })
            }
            Show::Routes(options) => {
                let manager = BirdManager::new(options.ip_version, &config);
                let reply = manager.routes_information(&RouteQuery::from(options)).await?;
                print_reply(reply, args.json, |routes| {
                    routes
                        .into_iter()
                        .map(RouteRow)
                        .collect::<OutputTable<_>>()
                        .print()
                })
            }
        },
        Command::Deploy(options) => {
            let filename = options
                .file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| format!("Not a file: {}", options.file.display()))?;
            let contents = fs::read(&options.file).await?;
            let manager = BirdManager::new(options.ip_version, &config);
            let reply = manager
                .deploy_config(&ConfigUpload::new(filename, contents))
                .await?;
            print_reply(reply, args.json, |message| {
                println!(
                    "{}",
                    format!(
                        "Deployed {} to BIRD ({})",
                        options.file.display(),
                        options.ip_version
                    )
                    .green()
                );
                if !message.is_empty() {
                    println!("{}", message);
                }
            })
        }
    }
}

/// Run one CLI command, reporting errors on stderr
///
/// Returns `false` when the command failed or BIRD rejected it.
pub async fn run(args: &Args) -> bool {
    match run_cmd(args).await {
        Ok(success) => success,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            false
        }
    }
}
