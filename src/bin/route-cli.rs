//! Offline inspection of a routes file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;

use url_router::config::{build_links, build_table, load_config};
use url_router::observability::logging;
use url_router::routing::{request_path, LinkParams, RouteTable};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Inspect, match and build URLs against a routes file", long_about = None)]
struct Cli {
    /// Routes file (TOML)
    #[arg(short, long, default_value = "config/routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List routes in match order
    List,
    /// Show the route a request path selects
    Match {
        path: String,
        /// Base path to strip before matching
        #[arg(long, default_value = "")]
        base_path: String,
    },
    /// Build the URL for a named route
    Url {
        name: String,
        /// Variable value, `key=value`
        #[arg(short, long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
        /// Query pair, `key=value`
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
        #[arg(short, long)]
        fragment: Option<String>,
        /// Emit `/path` instead of an absolute URL
        #[arg(long)]
        path_only: bool,
        /// Keep query keys whose value is empty
        #[arg(long)]
        keep_empty: bool,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}

fn main() -> ExitCode {
    logging::init_logging("warn");
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&cli.config)?;
    let table = build_table(&config)?;
    let links = build_links(&config)?;

    match cli.command {
        Commands::List => list(&table),
        Commands::Match { path, base_path } => {
            let base = if base_path.is_empty() {
                config.server.base_path.as_str()
            } else {
                base_path.as_str()
            };
            let path = request_path(&path, base);
            let route = table.select(&path)?;
            let out = json!({
                "path": path,
                "route": route.name(),
                "controller": route.controller(),
                "action": route.action(),
                "not_found": route.is_not_found(),
                "bound": route.bound(),
                "params": route.params(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Url {
            name,
            params,
            query,
            fragment,
            path_only,
            keep_empty,
        } => {
            let link = link_params(params, query, fragment, path_only, keep_empty);
            println!("{}", links.url_for(&table, &name, &link)?);
        }
    }
    Ok(())
}

fn list(table: &RouteTable) {
    println!("{:<20} {:<30} {:<15} {}", "NAME", "PATH", "CONTROLLER", "ACTION");
    for (name, route) in table.iter() {
        println!(
            "{:<20} {:<30} {:<15} {}",
            name,
            route.path(),
            route.controller(),
            route.action()
        );
    }
}

fn link_params(
    params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    fragment: Option<String>,
    path_only: bool,
    keep_empty: bool,
) -> LinkParams {
    let mut link = params
        .into_iter()
        .fold(LinkParams::new(), |link, (k, v)| link.param(k, v));
    link = query.into_iter().fold(link, |link, (k, v)| link.query(k, v));
    if let Some(fragment) = fragment {
        link = link.fragment(fragment);
    }
    if path_only {
        link = link.path_only();
    }
    if keep_empty {
        link = link.keep_empty();
    }
    link
}
