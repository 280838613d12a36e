//! Runs the external tag generator (`ctags` by default).

use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::TagsSettings;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("{0} is not available")]
    CommandNotFound(String),
    #[error("failed to launch {command}: {reason}")]
    LaunchFailed {
        command: String,
        reason: String,
    },
    #[error("{command} failed: {reason}")]
    Failed {
        command: String,
        reason: String,
    },
}

/// Command line template for one generator run:
/// `<command> <args..> <extra..> -f <output> .`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGenerator {
    command: String,
    args: Vec<String>,
}

impl TagGenerator {
    pub fn new(
        command: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_settings(settings: &TagsSettings) -> Self {
        Self::new(settings.command.clone(), settings.args.clone())
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Arguments passed after the command name.
    pub fn arguments(
        &self,
        extra: &[String],
        output: &Path,
    ) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend(extra.iter().cloned());
        args.push("-f".to_string());
        args.push(output.display().to_string());
        args.push(".".to_string());
        args
    }

    /// Run the generator in `cwd`, writing the table to `output`.
    pub async fn run(
        &self,
        cwd: &Path,
        extra: &[String],
        output: &Path,
    ) -> Result<PathBuf, GeneratorError> {
        let args = self.arguments(extra, output);
        info!("[regen] {} {} (in {})", self.command, args.join(" "), cwd.display());

        let result = Command::new(&self.command)
            .args(&args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        let output_data = match result {
            Ok(output) => output,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(GeneratorError::CommandNotFound(self.command.clone()));
            },
            Err(error) => {
                return Err(GeneratorError::LaunchFailed {
                    command: self.command.clone(),
                    reason: error.to_string(),
                });
            },
        };

        let stderr = String::from_utf8_lossy(&output_data.stderr).trim().to_string();
        if !output_data.status.success() {
            return Err(GeneratorError::Failed {
                command: self.command.clone(),
                reason: if stderr.is_empty() {
                    format!("process exited with status {}", output_data.status)
                } else {
                    stderr
                },
            });
        }
        if !stderr.is_empty() {
            debug!("[regen] {} stderr: {stderr}", self.command);
        }

        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
#[path = "../../tests/src/generator_tests.rs"]
mod tests;
