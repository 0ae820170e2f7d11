/* packages/cli/core/src/prerender/render.rs */

// Static render orchestration: build the browser and server targets
// concurrently, then render every resolved route against each locale's
// server bundle and persist the output.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::builder::{BuildArtifact, BuildHandle, BuildOverrides, TargetBuilder};
use super::bundle::{probe_render_convention, BundleLoader, RenderConvention, ServerBundle};
use super::shard::shard_array;
use crate::ui::{self, DIM, RESET};

/// Trailing marker appended to the template before rendering, so every
/// generated page records its static provenance.
pub(crate) const GENERATED_MARKER: &str = "<!-- Generated by veneer -->";

/// Run the whole pipeline: schedule both sub-builds, await them, render all
/// routes per locale. Sub-build failures are propagated as the failing
/// artifact; the handles are stopped exactly once on every path.
pub async fn render_routes<B, L>(
  builder: &B,
  loader: &L,
  browser_target: &str,
  server_target: &str,
  routes: &[String],
  workers: usize,
) -> Result<BuildArtifact>
where
  B: TargetBuilder,
  L: BundleLoader,
{
  if routes.is_empty() {
    bail!("no routes to render (set prerender.routes, a routes file, or guess_routes)");
  }

  let mut browser =
    builder.schedule(browser_target, BuildOverrides { watch: false, service_worker: Some(false) })?;
  let mut server = match builder.schedule(server_target, BuildOverrides {
    watch: false,
    service_worker: None,
  }) {
    Ok(handle) => handle,
    Err(e) => {
      stop_handle(browser, browser_target).await;
      return Err(e);
    }
  };

  let outcome = drive(&mut browser, &mut server, loader, routes, workers).await;

  stop_handle(browser, browser_target).await;
  stop_handle(server, server_target).await;
  outcome
}

async fn stop_handle(handle: impl BuildHandle, target: &str) {
  if let Err(e) = handle.stop().await {
    ui::error(&format!("failed to stop {target} build: {e:#}"));
  }
}

async fn drive<H1, H2, L>(
  browser: &mut H1,
  server: &mut H2,
  loader: &L,
  routes: &[String],
  workers: usize,
) -> Result<BuildArtifact>
where
  H1: BuildHandle,
  H2: BuildHandle,
  L: BundleLoader,
{
  // The two sub-builds have no data dependency on each other.
  let (browser_result, server_result) = tokio::join!(browser.result(), server.result());
  let browser_artifact = browser_result?;
  let server_artifact = server_result?;

  if !browser_artifact.success {
    return Ok(browser_artifact);
  }
  let Some(browser_base) = browser_artifact.base_output_path.clone() else {
    return Ok(browser_artifact);
  };
  if !server_artifact.success {
    return Ok(server_artifact);
  }
  let server_base = server_artifact
    .base_output_path
    .clone()
    .context("server build reported success but produced no output path")?;

  for output_dir in &browser_artifact.output_paths {
    render_locale(loader, output_dir, &browser_base, &server_base, routes, workers).await?;
  }

  Ok(browser_artifact)
}

/// Render every route into one locale output directory, reusing that
/// locale's compiled index.html as the base document and that locale's
/// server bundle as the render entry point.
async fn render_locale<L: BundleLoader>(
  loader: &L,
  output_dir: &Path,
  browser_base: &Path,
  server_base: &Path,
  routes: &[String],
  workers: usize,
) -> Result<()> {
  let locale_rel = output_dir.strip_prefix(browser_base).with_context(|| {
    format!("output dir {} is not under {}", output_dir.display(), browser_base.display())
  })?;

  let index_path = output_dir.join("index.html");
  let template = std::fs::read_to_string(&index_path)
    .with_context(|| format!("failed to read {}", index_path.display()))?;
  let document = format!("{template}{GENERATED_MARKER}");

  let bundle_path = server_base.join(locale_rel).join("main.js");
  if !bundle_path.is_file() {
    bail!("could not find the main bundle: {}", bundle_path.display());
  }
  let bundle = loader.load(&bundle_path).await?;
  let convention = probe_render_convention(&bundle, &bundle_path)?;

  // Routes are independent of each other: stripe them across shards that
  // render concurrently, sequentially within each shard.
  let shards = shard_array(routes, workers.max(1) as i64);
  let bundle = &bundle;
  let document = document.as_str();
  let template = template.as_str();
  let index_path = index_path.as_path();
  let tasks = shards.iter().map(|shard| async move {
    for route in shard {
      render_one(bundle, convention, document, template, output_dir, index_path, route).await;
    }
  });
  futures_util::future::join_all(tasks).await;
  Ok(())
}

/// Render and persist a single route. Failures here are logged per route and
/// never abort the siblings.
async fn render_one(
  bundle: &impl ServerBundle,
  convention: RenderConvention,
  document: &str,
  template: &str,
  output_dir: &Path,
  index_path: &Path,
  route: &str,
) {
  let html = match bundle.render(convention, document, route).await {
    Ok(html) => html,
    Err(e) => {
      ui::error(&format!("failed to render route {route}: {e:#}"));
      return;
    }
  };
  match write_rendered_route(output_dir, index_path, template, route, &html) {
    Ok(out_index) => {
      ui::detail_ok(&format!(
        "{route}  \u{2192} {}  {DIM}({}){RESET}",
        out_index.display(),
        ui::format_size(html.len() as u64)
      ));
    }
    Err(e) => ui::error(&format!("failed to write route {route}: {e:#}")),
  }
}

fn route_output_path(output_dir: &Path, route: &str) -> PathBuf {
  output_dir.join(route.trim_start_matches('/')).join("index.html")
}

/// Write one rendered route to `<dir>/<route>/index.html`. When the route is
/// the root, the untouched shell is first copied to index.original.html so a
/// runtime fallback can still serve the pre-render document; the backup runs
/// before the overwrite within this single route's step, so processing order
/// of the other routes never matters.
fn write_rendered_route(
  output_dir: &Path,
  index_path: &Path,
  template: &str,
  route: &str,
  html: &str,
) -> Result<PathBuf> {
  let out_index = route_output_path(output_dir, route);
  if out_index.as_path() == index_path {
    let backup = output_dir.join("index.original.html");
    std::fs::write(&backup, template)
      .with_context(|| format!("failed to write {}", backup.display()))?;
  }
  if let Some(route_dir) = out_index.parent() {
    std::fs::create_dir_all(route_dir)
      .with_context(|| format!("failed to create {}", route_dir.display()))?;
  }
  std::fs::write(&out_index, html)
    .with_context(|| format!("failed to write {}", out_index.display()))?;
  Ok(out_index)
}
