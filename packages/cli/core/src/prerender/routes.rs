/* packages/cli/core/src/prerender/routes.rs */

// Route-set resolution: literal routes, a newline-delimited routes file, and
// best-effort static discovery, merged with set semantics.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::shell::script_runtime;
use crate::ui;

#[derive(Debug, Clone, Default)]
pub struct RouteRequestOptions {
  pub routes: Vec<String>,
  pub routes_file: Option<PathBuf>,
  pub guess_routes: bool,
}

/// One route descriptor from static analysis; only `path` is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveredRoute {
  pub path: String,
}

pub trait RouteExtractor {
  fn extract(&self, tsconfig: &Path) -> Result<Vec<DiscoveredRoute>>;
}

/// Merge the three route sources into a deduplicated list, first-seen order
/// kept for debuggability. A broken routes file aborts resolution; a broken
/// discovery run degrades to zero additional routes.
pub fn resolve_routes(
  options: &RouteRequestOptions,
  tsconfig: Option<&Path>,
  extractor: &impl RouteExtractor,
) -> Result<Vec<String>> {
  let mut routes = options.routes.clone();
  if let Some(ref file) = options.routes_file {
    routes.extend(read_routes_file(file)?);
  }
  if options.guess_routes {
    routes.extend(discover_routes(tsconfig, extractor));
  }
  let mut seen = HashSet::new();
  routes.retain(|r| seen.insert(r.clone()));
  Ok(routes)
}

/// Routes file: UTF-8, one route per line (`\r?\n`), blank lines ignored.
/// A missing or unreadable file is fatal -- it is caller configuration.
fn read_routes_file(path: &Path) -> Result<Vec<String>> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read routes file {}", path.display()))?;
  Ok(content.lines().filter(|line| !line.is_empty()).map(str::to_string).collect())
}

/// Static discovery is heuristic, so every failure here is logged and
/// swallowed. Parameterized and wildcard paths cannot be prerendered and are
/// dropped; explicitly-listed routes are never filtered.
fn discover_routes(tsconfig: Option<&Path>, extractor: &impl RouteExtractor) -> Vec<String> {
  let Some(tsconfig) = tsconfig else {
    ui::error("route discovery requested but no compiler config is configured");
    return Vec::new();
  };
  match extractor.extract(tsconfig) {
    Ok(discovered) => discovered
      .into_iter()
      .map(|route| route.path)
      .filter(|path| !path.contains('*') && !path.contains(':'))
      .collect(),
    Err(e) => {
      ui::error(&format!("route discovery failed: {e:#}"));
      Vec::new()
    }
  }
}

// -- Production extractor: guess-parser via the script runtime --

const EXTRACT_SCRIPT: &str = r#"
const { parseAngularRoutes } = require('guess-parser');
const routes = parseAngularRoutes(process.argv[1]).map((route) => ({ path: route.path }));
process.stdout.write(JSON.stringify(routes));
"#;

/// Runs the static route analyzer out of process and parses its JSON output.
pub struct NodeRouteExtractor {
  runtime: &'static str,
}

impl NodeRouteExtractor {
  pub fn new() -> Self {
    Self { runtime: script_runtime() }
  }
}

impl Default for NodeRouteExtractor {
  fn default() -> Self {
    Self::new()
  }
}

impl RouteExtractor for NodeRouteExtractor {
  fn extract(&self, tsconfig: &Path) -> Result<Vec<DiscoveredRoute>> {
    let output = Command::new(self.runtime)
      .args(["-e", EXTRACT_SCRIPT])
      .arg(tsconfig)
      .output()
      .with_context(|| format!("failed to spawn {} for route discovery", self.runtime))?;
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      bail!("route extraction exited with {}:\n{stderr}", output.status);
    }
    serde_json::from_slice(&output.stdout).context("failed to parse discovered routes JSON")
  }
}
