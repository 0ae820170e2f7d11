/* packages/cli/core/src/shell.rs */

// Script-runtime helpers shared by the prerender subprocess collaborators.

use std::process::Command;

/// Check if a command exists on PATH.
pub(crate) fn which_exists(cmd: &str) -> bool {
  Command::new("which")
    .arg(cmd)
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .status()
    .map(|s| s.success())
    .unwrap_or(false)
}

/// Pick the script runtime used to talk to application bundles.
pub(crate) fn script_runtime() -> &'static str {
  if which_exists("bun") { "bun" } else { "node" }
}

/// Arguments for evaluating an inline ESM snippet under the chosen runtime.
/// Node needs --input-type=module for `import` inside -e; bun does not.
pub(crate) fn eval_module_args<'a>(runtime: &str, script: &'a str) -> Vec<&'a str> {
  if runtime == "node" { vec!["--input-type=module", "-e", script] } else { vec!["-e", script] }
}
