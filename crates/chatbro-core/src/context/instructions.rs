use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Where agent instructions come from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstructionsSource: Send + Sync {
    /// Read the whole text at `path`
    async fn read_text(&self, path: &Path) -> Result<String>;
}

/// Instructions on the local filesystem
///
/// Relative paths resolve against `root`; absolute paths are used as-is.
#[derive(Debug, Clone, Default)]
pub struct FileInstructions {
    root: Option<PathBuf>,
}

impl FileInstructions {
    /// Resolve paths against the working directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl InstructionsSource for FileInstructions {
    async fn read_text(&self, path: &Path) -> Result<String> {
        let resolved = self.resolve(path);
        tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|e| Error::Instructions {
                message: match e.kind() {
                    std::io::ErrorKind::NotFound => "file not found".to_string(),
                    _ => e.to_string(),
                },
                path: resolved,
            })
    }
}
