/* packages/cli/core/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::VeneerConfig;

/// Walk upward from `start` to find `veneer.toml`, like Cargo.toml discovery
pub fn find_veneer_config(start: &Path) -> Result<PathBuf> {
  let mut dir =
    start.canonicalize().with_context(|| format!("failed to canonicalize {}", start.display()))?;
  loop {
    let candidate = dir.join("veneer.toml");
    if candidate.is_file() {
      return Ok(candidate);
    }
    if !dir.pop() {
      bail!("veneer.toml not found (searched upward from {})", start.display());
    }
  }
}

pub fn load_veneer_config(path: &Path) -> Result<VeneerConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let config: VeneerConfig =
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
  if let Some(ref i18n) = config.i18n {
    i18n.validate()?;
  }
  Ok(config)
}
