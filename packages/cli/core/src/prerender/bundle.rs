/* packages/cli/core/src/prerender/bundle.rs */

// The server-bundle boundary: a loaded bundle exposes its export names and a
// render capability. Which render convention applies is decided here by
// probing the symbol table, newest convention first.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::shell::{eval_module_args, script_runtime};

/// The two supported export pairings of a render-capable server bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderConvention {
  /// `renderModule` + `AppServerModule` (current)
  Module,
  /// `renderModuleFactory` + `AppServerModuleNgFactory` (legacy)
  ModuleFactory,
}

pub trait ServerBundle {
  fn has_export(&self, name: &str) -> bool;
  async fn render(&self, convention: RenderConvention, document: &str, url: &str)
  -> Result<String>;
}

pub trait BundleLoader {
  type Bundle: ServerBundle;
  async fn load(&self, path: &Path) -> Result<Self::Bundle>;
}

/// Probe a loaded bundle for a supported render convention. A bundle with
/// neither pairing was not built in a render-compatible shape, which is
/// fatal rather than per-route.
pub(crate) fn probe_render_convention(
  bundle: &impl ServerBundle,
  path: &Path,
) -> Result<RenderConvention> {
  if bundle.has_export("renderModule") && bundle.has_export("AppServerModule") {
    Ok(RenderConvention::Module)
  } else if bundle.has_export("renderModuleFactory")
    && bundle.has_export("AppServerModuleNgFactory")
  {
    Ok(RenderConvention::ModuleFactory)
  } else {
    bail!(
      "server bundle {} exports neither renderModule/AppServerModule nor \
       renderModuleFactory/AppServerModuleNgFactory",
      path.display()
    )
  }
}

// -- Production loader: dynamic import via the script runtime --

const LIST_EXPORTS_SCRIPT: &str = r#"
import { pathToFileURL } from 'node:url';
const bundle = await import(pathToFileURL(process.argv[1]).href);
process.stdout.write(JSON.stringify(Object.keys(bundle)));
"#;

const RENDER_SCRIPT: &str = r#"
import { pathToFileURL } from 'node:url';
const chunks = [];
for await (const chunk of process.stdin) chunks.push(chunk);
const request = JSON.parse(Buffer.concat(chunks).toString('utf8'));
const bundle = await import(pathToFileURL(request.bundle).href);
const options = { document: request.document, url: request.url };
const html = request.convention === 'module-factory'
  ? await bundle.renderModuleFactory(bundle.AppServerModuleNgFactory, options)
  : await bundle.renderModule(bundle.AppServerModule, options);
process.stdout.write(html);
"#;

pub struct NodeBundleLoader {
  runtime: &'static str,
}

impl NodeBundleLoader {
  pub fn new() -> Self {
    Self { runtime: script_runtime() }
  }
}

impl Default for NodeBundleLoader {
  fn default() -> Self {
    Self::new()
  }
}

impl BundleLoader for NodeBundleLoader {
  type Bundle = NodeServerBundle;

  async fn load(&self, path: &Path) -> Result<NodeServerBundle> {
    let output = Command::new(self.runtime)
      .args(eval_module_args(self.runtime, LIST_EXPORTS_SCRIPT))
      .arg(path)
      .output()
      .await
      .with_context(|| format!("failed to spawn {} to load {}", self.runtime, path.display()))?;
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      bail!("failed to load server bundle {}:\n{stderr}", path.display());
    }
    let exports: Vec<String> = serde_json::from_slice(&output.stdout)
      .with_context(|| format!("invalid export listing from {}", path.display()))?;
    Ok(NodeServerBundle { runtime: self.runtime, path: path.to_path_buf(), exports })
  }
}

/// A server bundle reachable through the script runtime. Each render is one
/// short-lived process fed a JSON request on stdin, HTML on stdout.
pub struct NodeServerBundle {
  runtime: &'static str,
  path: PathBuf,
  exports: Vec<String>,
}

impl ServerBundle for NodeServerBundle {
  fn has_export(&self, name: &str) -> bool {
    self.exports.iter().any(|export| export == name)
  }

  async fn render(
    &self,
    convention: RenderConvention,
    document: &str,
    url: &str,
  ) -> Result<String> {
    let request = serde_json::json!({
      "bundle": self.path.to_string_lossy(),
      "convention": match convention {
        RenderConvention::Module => "module",
        RenderConvention::ModuleFactory => "module-factory",
      },
      "document": document,
      "url": url,
    });
    let mut cmd = Command::new(self.runtime);
    cmd.args(eval_module_args(self.runtime, RENDER_SCRIPT));
    cmd.stdin(std::process::Stdio::piped());
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    let mut child =
      cmd.spawn().with_context(|| format!("failed to spawn {} to render {url}", self.runtime))?;
    let payload = serde_json::to_vec(&request).context("failed to encode render request")?;
    if let Some(mut stdin) = child.stdin.take() {
      stdin.write_all(&payload).await.context("failed to send render request")?;
    }
    let output =
      child.wait_with_output().await.with_context(|| format!("render of {url} failed"))?;
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      bail!("rendering {url} with {} failed:\n{stderr}", self.path.display());
    }
    String::from_utf8(output.stdout).with_context(|| format!("render of {url} was not UTF-8"))
  }
}
