/* packages/cli/core/src/config/mod.rs */

mod loader;


use anyhow::{bail, Result};
use serde::Deserialize;

pub use loader::{find_veneer_config, load_veneer_config};

#[derive(Debug, Clone, Deserialize)]
pub struct VeneerConfig {
  pub project: ProjectConfig,
  pub targets: TargetsSection,
  #[serde(default)]
  pub i18n: Option<I18nSection>,
  #[serde(default)]
  pub prerender: PrerenderSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
  pub name: String,
}

/// The two sub-builds the prerender pipeline schedules.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetsSection {
  pub browser: TargetConfig,
  pub server: TargetConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
  pub build_command: String,
  pub out_dir: String,
}

/// When set, each target writes one output directory per locale
/// under its out_dir, and rendering runs once per locale.
#[derive(Debug, Clone, Deserialize)]
pub struct I18nSection {
  pub locales: Vec<String>,
}

impl I18nSection {
  pub fn validate(&self) -> Result<()> {
    if self.locales.is_empty() {
      bail!("i18n.locales must not be empty");
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrerenderSection {
  #[serde(default)]
  pub routes: Vec<String>,
  #[serde(default)]
  pub routes_file: Option<String>,
  #[serde(default)]
  pub guess_routes: bool,
  /// Compiler config inspected by static route discovery.
  #[serde(default)]
  pub tsconfig: Option<String>,
  /// Render fan-out; defaults to available parallelism minus one.
  #[serde(default)]
  pub workers: Option<usize>,
}
