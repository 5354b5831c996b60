use std::{
    ffi::OsStr,
    path::Path,
    process::{Command, Stdio},
};

use crate::error::{DeckError, DeckResult};

/// Return `true` when `program --version` can be run successfully.
pub fn is_tool_on_path(program: impl AsRef<OsStr>) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run `cmd` to completion and turn a spawn failure or non-zero exit into
/// [`DeckError::ExternalTool`], carrying the tool's stderr.
pub fn run_tool(cmd: &mut Command, tool: &str) -> DeckResult<()> {
    tracing::debug!(command = ?cmd, "running {tool}");
    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            DeckError::external_tool(format!(
                "failed to spawn {tool} (is it installed and on PATH?): {e}"
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DeckError::external_tool(format!(
            "{tool} exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> DeckResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
