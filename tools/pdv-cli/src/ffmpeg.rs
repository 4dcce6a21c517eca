//! External ffmpeg/ffprobe invocation

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, bail};

/// Locate an executable on `PATH`.
pub fn require(tool: &str) -> Result<PathBuf> {
    which::which(tool).with_context(|| {
        format!(
            "'{}' not found on PATH. Install FFmpeg (https://ffmpeg.org) to encode or probe video.",
            tool
        )
    })
}

/// Run a tool to completion and return its stdout.
pub fn exec(tool: &str, args: &[&str]) -> Result<Vec<u8>> {
    let program = require(tool)?;
    tracing::debug!("Running {} {}", tool, args.join(" "));

    let output = Command::new(&program)
        .args(args)
        .output()
        .with_context(|| format!("Failed to execute {}", tool))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "{} exited with {}: {}",
            tool,
            output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            stderr.trim()
        );
    }

    Ok(output.stdout)
}
