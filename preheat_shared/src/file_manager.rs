// Local print-file storage path resolution
use crate::FileOrigin;
use crate::host_traits::{FilePathResolver, PathError};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalFileManager {
    current_directory: PathBuf,
}

impl Default for LocalFileManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalFileManager {
    /// Create a new LocalFileManager rooted at the current directory.
    pub fn new() -> Self {
        Self {
            current_directory: PathBuf::from("."),
        }
    }

    /// Create a LocalFileManager rooted at `dir`.
    pub fn with_directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            current_directory: dir.into(),
        }
    }
}

impl FilePathResolver for LocalFileManager {
    /// Join a storage-relative path onto the storage root. Paths escaping the
    /// root and non-local origins are rejected.
    fn path_on_disk(&self, origin: FileOrigin, path: &str) -> Result<PathBuf, PathError> {
        if origin != FileOrigin::Local {
            return Err(PathError::UnsupportedOrigin(origin));
        }
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if path.trim().is_empty() || escapes {
            tracing::warn!("Rejecting print path '{}'", path);
            return Err(PathError::InvalidPath(path.to_string()));
        }
        Ok(self.current_directory.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_relative_local_paths() {
        let fm = LocalFileManager::with_directory("/srv/uploads");
        assert_eq!(
            fm.path_on_disk(FileOrigin::Local, "folder/part.gcode").unwrap(),
            PathBuf::from("/srv/uploads/folder/part.gcode")
        );
        assert_eq!(
            fm.path_on_disk(FileOrigin::Local, "/part.gcode").unwrap(),
            PathBuf::from("/srv/uploads/part.gcode")
        );
    }

    #[test]
    fn test_rejects_sdcard_and_traversal() {
        let fm = LocalFileManager::new();
        assert_eq!(
            fm.path_on_disk(FileOrigin::SdCard, "part.gco"),
            Err(PathError::UnsupportedOrigin(FileOrigin::SdCard))
        );
        assert!(matches!(
            fm.path_on_disk(FileOrigin::Local, "../secret.gcode"),
            Err(PathError::InvalidPath(_))
        ));
        assert!(matches!(fm.path_on_disk(FileOrigin::Local, ""), Err(PathError::InvalidPath(_))));
    }
}
