//! External document converter (pandoc by default).

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::TextExtractor;
use crate::{CatalogError, Result};

/// Runs `<program> <tmpfile> <args...>` and reads plain text from stdout.
///
/// The content is written to a `tempfile::NamedTempFile` that is removed
/// when extraction returns, whether conversion succeeded or not.
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    program: String,
    args: Vec<String>,
    suffix: String,
    temp_dir: Option<PathBuf>,
}

impl ExternalConverter {
    /// Create a converter invoking `program` with `args` after the input path.
    pub fn new(program: impl Into<String>, args: &[&str], suffix: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            suffix: suffix.into(),
            temp_dir: None,
        }
    }

    /// `<program> <file>.docx -t plain`
    pub fn pandoc(program: &str) -> Self {
        Self::new(program, &["-t", "plain"], ".docx")
    }

    /// Create temporary files in `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    fn failed(&self, reason: impl std::fmt::Display) -> CatalogError {
        CatalogError::MetadataReadFailed(format!("error running {}: {}", self.program, reason))
    }
}

fn temp_file_failed(e: std::io::Error) -> CatalogError {
    CatalogError::MetadataReadFailed(format!("error writing temp file: {e}"))
}

#[async_trait]
impl TextExtractor for ExternalConverter {
    async fn extract(&self, file_name: &str, content: &[u8]) -> Result<String> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("metadata_").suffix(&self.suffix);
        let temp = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(temp_file_failed)?;

        tokio::fs::write(temp.path(), content)
            .await
            .map_err(temp_file_failed)?;

        tracing::debug!(
            file_name,
            program = %self.program,
            temp_file = %temp.path().display(),
            "Converting metadata document"
        );

        let output = Command::new(&self.program)
            .arg(temp.path())
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.failed(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failed(format!("{} {}", output.status, stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
