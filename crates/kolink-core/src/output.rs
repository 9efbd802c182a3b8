//! Render backends turning DOT documents into files, and JSON job reports.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{KolinkError, Result};
use crate::pipeline::JobReport;

/// Something that can turn a DOT document into a file at `target`.
pub trait RenderBackend {
    /// Extension of the files this backend writes, without the dot.
    fn extension(&self) -> &str;

    fn render(&self, dot: &str, target: &Path) -> Result<()>;
}

/// Renders PNG images through the Graphviz `dot` executable.
#[derive(Debug, Clone)]
pub struct GraphvizBackend {
    binary: PathBuf,
}

impl Default for GraphvizBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphvizBackend {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("dot"),
        }
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl RenderBackend for GraphvizBackend {
    fn extension(&self) -> &str {
        "png"
    }

    fn render(&self, dot: &str, target: &Path) -> Result<()> {
        let mut child = Command::new(&self.binary)
            .arg("-Tpng")
            .arg("-o")
            .arg(target)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                KolinkError::render(
                    target,
                    format!("cannot run {}: {e}", self.binary.display()),
                )
            })?;

        // The child is always reaped, even when feeding it failed, so its
        // stderr explains an early exit.
        let fed = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(dot.as_bytes()),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| KolinkError::render(target, format!("graphviz did not finish: {e}")))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(KolinkError::render(
                target,
                format!("graphviz exited with {}: {}", output.status, stderr.trim()),
            ));
        }
        if let Err(e) = fed {
            return Err(KolinkError::render(
                target,
                format!("cannot feed graphviz: {e}: {}", stderr.trim()),
            ));
        }
        Ok(())
    }
}

/// Writes the DOT text itself; useful without a Graphviz install.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotFileBackend;

impl RenderBackend for DotFileBackend {
    fn extension(&self) -> &str {
        "dot"
    }

    fn render(&self, dot: &str, target: &Path) -> Result<()> {
        std::fs::write(target, dot).map_err(|e| KolinkError::io(target, e))
    }
}

/// Write job reports as a pretty-printed JSON array, creating parent
/// directories as needed.
pub fn write_reports(reports: &[JobReport], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| KolinkError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(reports)
        .map_err(|e| KolinkError::io(path, std::io::Error::other(e)))?;
    std::fs::write(path, json).map_err(|e| KolinkError::io(path, e))
}
