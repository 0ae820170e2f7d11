/* packages/cli/core/src/prerender/builder.rs */

// Build orchestration boundary: scheduling a named target yields a handle
// whose result carries locale-aware output paths. The production impl runs
// the target's configured shell command.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::process::{Child, Command};

use crate::config::{I18nSection, TargetConfig, TargetsSection};
use crate::ui::{self, DIM, RESET};

/// Option overrides forced onto a scheduled sub-build. Prerendering needs a
/// deterministic one-shot artifact, so watch mode is always off and the
/// browser build additionally disables service-worker augmentation.
#[derive(Debug, Clone, Copy)]
pub struct BuildOverrides {
  pub watch: bool,
  pub service_worker: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct BuildArtifact {
  pub success: bool,
  /// Root output directory; absent signals a configuration failure distinct
  /// from a build failure.
  pub base_output_path: Option<PathBuf>,
  /// One directory per output locale, or exactly the base directory.
  pub output_paths: Vec<PathBuf>,
}

pub trait TargetBuilder {
  type Handle: BuildHandle;
  fn schedule(&self, target: &str, overrides: BuildOverrides) -> Result<Self::Handle>;
}

pub trait BuildHandle {
  async fn result(&mut self) -> Result<BuildArtifact>;
  /// Releases whatever the build holds. Called exactly once per handle,
  /// on success and failure paths alike.
  async fn stop(self) -> Result<()>;
}

// -- Production builder: one shell command per target --

pub struct ProcessTargetBuilder {
  base_dir: PathBuf,
  targets: TargetsSection,
  locales: Vec<String>,
}

impl ProcessTargetBuilder {
  pub fn new(base_dir: &Path, targets: TargetsSection, i18n: Option<&I18nSection>) -> Self {
    Self {
      base_dir: base_dir.to_path_buf(),
      targets,
      locales: i18n.map(|cfg| cfg.locales.clone()).unwrap_or_default(),
    }
  }

  fn target(&self, name: &str) -> Result<&TargetConfig> {
    match name {
      "browser" => Ok(&self.targets.browser),
      "server" => Ok(&self.targets.server),
      other => bail!("unknown build target \"{other}\""),
    }
  }
}

impl TargetBuilder for ProcessTargetBuilder {
  type Handle = ProcessBuildHandle;

  fn schedule(&self, target: &str, overrides: BuildOverrides) -> Result<ProcessBuildHandle> {
    let config = self.target(target)?;
    ui::detail(&format!("{DIM}{}{RESET}", config.build_command));
    let mut cmd = Command::new("sh");
    cmd.args(["-c", &config.build_command]);
    cmd.current_dir(&self.base_dir);
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    cmd.kill_on_drop(true);
    cmd.env("VENEER_WATCH", if overrides.watch { "1" } else { "0" });
    if let Some(sw) = overrides.service_worker {
      cmd.env("VENEER_SERVICE_WORKER", if sw { "1" } else { "0" });
    }
    let child = cmd.spawn().with_context(|| format!("failed to start {target} build"))?;
    Ok(ProcessBuildHandle {
      label: target.to_string(),
      child: Some(child),
      out_dir: self.base_dir.join(&config.out_dir),
      locales: self.locales.clone(),
    })
  }
}

pub struct ProcessBuildHandle {
  label: String,
  child: Option<Child>,
  out_dir: PathBuf,
  locales: Vec<String>,
}

impl BuildHandle for ProcessBuildHandle {
  async fn result(&mut self) -> Result<BuildArtifact> {
    let Some(child) = self.child.take() else {
      bail!("{} build result already consumed", self.label);
    };
    let output = child
      .wait_with_output()
      .await
      .with_context(|| format!("failed to wait for {} build", self.label))?;
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      ui::error(&format!("{} build exited with {}:\n{stderr}", self.label, output.status));
      return Ok(BuildArtifact { success: false, base_output_path: None, output_paths: Vec::new() });
    }
    let output_paths = if self.locales.is_empty() {
      vec![self.out_dir.clone()]
    } else {
      self.locales.iter().map(|locale| self.out_dir.join(locale)).collect()
    };
    Ok(BuildArtifact {
      success: true,
      base_output_path: Some(self.out_dir.clone()),
      output_paths,
    })
  }

  async fn stop(mut self) -> Result<()> {
    if let Some(mut child) = self.child.take() {
      child.start_kill().ok();
      child.wait().await.with_context(|| format!("failed to reap {} build", self.label))?;
    }
    Ok(())
  }
}
