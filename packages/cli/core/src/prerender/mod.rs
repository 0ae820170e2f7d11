/* packages/cli/core/src/prerender/mod.rs */

// Static prerender pipeline: route resolution, concurrent sub-builds, and
// per-locale rendering of every resolved route.

mod builder;
mod bundle;
mod render;
mod routes;
mod shard;


use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Result};

use crate::config::VeneerConfig;
use crate::ui;

use builder::ProcessTargetBuilder;
use bundle::NodeBundleLoader;
use render::render_routes;
use routes::{resolve_routes, NodeRouteExtractor, RouteRequestOptions};
use shard::default_shard_count;

/// Resolve the route set from the configured sources.
pub fn resolve_configured_routes(config: &VeneerConfig, base_dir: &Path) -> Result<Vec<String>> {
  let options = RouteRequestOptions {
    routes: config.prerender.routes.clone(),
    routes_file: config.prerender.routes_file.as_ref().map(|file| base_dir.join(file)),
    guess_routes: config.prerender.guess_routes,
  };
  let tsconfig = config.prerender.tsconfig.as_ref().map(|t| base_dir.join(t));
  resolve_routes(&options, tsconfig.as_deref(), &NodeRouteExtractor::new())
}

// -- Entry point for `veneer prerender` --

pub async fn run_prerender(
  config: &VeneerConfig,
  base_dir: &Path,
  route_overrides: &[String],
  workers_override: Option<usize>,
) -> Result<()> {
  ui::banner("prerender", Some(&config.project.name));

  ui::step(1, 2, "Resolving routes");
  let routes = if route_overrides.is_empty() {
    resolve_configured_routes(config, base_dir)?
  } else {
    ui::warn("--route given; configured route sources are ignored");
    let mut seen = HashSet::new();
    route_overrides.iter().filter(|route| seen.insert((*route).clone())).cloned().collect()
  };
  for route in &routes {
    ui::detail(route);
  }
  ui::blank();

  ui::step(2, 2, "Building targets and rendering");
  let builder = ProcessTargetBuilder::new(base_dir, config.targets.clone(), config.i18n.as_ref());
  let loader = NodeBundleLoader::new();
  let workers =
    workers_override.or(config.prerender.workers).unwrap_or_else(default_shard_count);
  let artifact = render_routes(&builder, &loader, "browser", "server", &routes, workers).await?;
  if !artifact.success {
    ui::fail("build failed; nothing was rendered");
    bail!("prerender aborted by a failing sub-build");
  }
  ui::blank();
  ui::ok(&format!(
    "prerendered {} route(s) into {} output dir(s)",
    routes.len(),
    artifact.output_paths.len()
  ));
  Ok(())
}
