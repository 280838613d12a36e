use std::{
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
};

use super::SettingsPatch;

pub const PROJECT_FILENAME: &str = "ctags-index.toml";

/// Walks parent directories from `start` looking for `ctags-index.toml`.
pub fn find_project_file(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?
    } else {
        start
    };
    loop {
        let candidate = dir.join(PROJECT_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Parse a project file. Keys mirror the JSON settings (camelCase).
pub(crate) fn read_patch(path: &Path) -> Result<SettingsPatch, ProjectFileError> {
    let content = std::fs::read_to_string(path).map_err(ProjectFileError::Read)?;
    toml::from_str(&content).map_err(ProjectFileError::Parse)
}

#[derive(Debug)]
pub(crate) enum ProjectFileError {
    Read(std::io::Error),
    Parse(toml::de::Error),
}

impl Display for ProjectFileError {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::Read(error) => write!(f, "cannot read: {error}"),
            Self::Parse(error) => write!(f, "invalid TOML: {error}"),
        }
    }
}
