/* packages/cli/core/src/main.rs */

mod config;
mod prerender;
mod shell;
mod ui;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use config::{find_veneer_config, load_veneer_config, VeneerConfig};

#[derive(Parser)]
#[command(name = "veneer", about = "Veneer static prerender CLI")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Build both app targets and render every resolved route to static HTML
  Prerender {
    /// Path to veneer.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Render only these routes, bypassing the configured sources
    #[arg(short, long = "route")]
    routes: Vec<String>,
    /// Number of parallel render workers
    #[arg(short, long)]
    workers: Option<usize>,
  },
  /// Print the resolved route set without building anything
  Routes {
    /// Path to veneer.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
}

/// Resolve config path (explicit or auto-detected) and parse it
fn resolve_config(explicit: Option<PathBuf>) -> Result<(PathBuf, VeneerConfig)> {
  let path = match explicit {
    Some(p) => p,
    None => {
      let cwd = std::env::current_dir().context("failed to get cwd")?;
      find_veneer_config(&cwd)?
    }
  };
  let config = load_veneer_config(&path)?;
  Ok((path, config))
}

fn base_dir(config_path: &std::path::Path) -> Result<PathBuf> {
  Ok(config_path.parent().context("config path has no parent directory")?.to_path_buf())
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Command::Prerender { config, routes, workers } => {
      let (path, config) = resolve_config(config)?;
      let base_dir = base_dir(&path)?;
      prerender::run_prerender(&config, &base_dir, &routes, workers).await
    }
    Command::Routes { config } => {
      let (path, config) = resolve_config(config)?;
      let base_dir = base_dir(&path)?;
      let routes = prerender::resolve_configured_routes(&config, &base_dir)?;
      if routes.is_empty() {
        bail!("no routes to render");
      }
      for route in routes {
        println!("{route}");
      }
      Ok(())
    }
  }
}
