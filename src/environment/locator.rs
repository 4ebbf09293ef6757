//! Project root resolution.
//!
//! The project root is where the environment, the manifest and the analysis
//! program live. It is derived from the location of the basecamp executable
//! (symlinks resolved), never from the caller's working directory, unless
//! an explicit root is given.

use std::path::{Path, PathBuf};

use crate::config::CONFIG_DIR;
use crate::error::{BasecampError, Result};

/// A resolved project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLocation {
    root: PathBuf,
}

impl ProjectLocation {
    /// Resolve the project root for this process.
    ///
    /// Order: `explicit` if given, then the nearest ancestor of the
    /// executable's directory containing `.basecamp/`, then the
    /// executable's directory itself.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        Self::resolve_with_exe(explicit, std::env::current_exe())
    }

    /// Resolve with a supplied executable path (for testing).
    pub fn resolve_with_exe(
        explicit: Option<&Path>,
        exe: std::io::Result<PathBuf>,
    ) -> Result<Self> {
        if let Some(dir) = explicit {
            let root = dir
                .canonicalize()
                .map_err(|e| BasecampError::ProjectRootUnresolved {
                    message: format!("{}: {}", dir.display(), e),
                })?;
            if !root.is_dir() {
                return Err(BasecampError::ProjectRootUnresolved {
                    message: format!("{} is not a directory", root.display()),
                });
            }
            return Ok(Self { root });
        }

        let exe = exe
            .and_then(|p| p.canonicalize())
            .map_err(|e| BasecampError::ProjectRootUnresolved {
                message: format!("cannot locate the basecamp executable: {}", e),
            })?;

        let exe_dir = exe
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| BasecampError::ProjectRootUnresolved {
                message: format!("{} has no parent directory", exe.display()),
            })?;

        let root = find_marked_ancestor(&exe_dir).unwrap_or(exe_dir);
        tracing::debug!("Resolved project root {}", root.display());
        Ok(Self { root })
    }

    /// The absolute project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a project-relative path (absolute paths pass through).
    pub fn join(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Make the project root the process working directory.
    pub fn enter(&self) -> Result<()> {
        std::env::set_current_dir(&self.root).map_err(|e| {
            BasecampError::ProjectRootUnresolved {
                message: format!("cannot enter {}: {}", self.root.display(), e),
            }
        })
    }
}

/// Walk up from `start` looking for a directory that contains `.basecamp/`.
pub fn find_marked_ancestor(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn not_found() -> std::io::Result<PathBuf> {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no exe"))
    }

    #[test]
    fn explicit_root_is_canonicalized() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("proj");
        fs::create_dir_all(&nested).unwrap();
        let dotted = nested.join("..").join("proj");

        let location = ProjectLocation::resolve_with_exe(Some(&dotted), not_found()).unwrap();

        assert_eq!(location.root(), nested.canonicalize().unwrap());
    }

    #[test]
    fn explicit_missing_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let err = ProjectLocation::resolve_with_exe(Some(&missing), not_found()).unwrap_err();

        assert!(matches!(err, BasecampError::ProjectRootUnresolved { .. }));
    }

    #[test]
    fn explicit_file_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let err = ProjectLocation::resolve_with_exe(Some(&file), not_found()).unwrap_err();

        assert!(matches!(err, BasecampError::ProjectRootUnresolved { .. }));
    }

    #[test]
    fn unresolvable_executable_is_fatal() {
        let err = ProjectLocation::resolve_with_exe(None, not_found()).unwrap_err();
        assert!(matches!(err, BasecampError::ProjectRootUnresolved { .. }));
    }

    #[test]
    fn executable_directory_is_root_without_marker() {
        let temp = TempDir::new().unwrap();
        let exe = temp.path().join("basecamp");
        fs::write(&exe, "").unwrap();

        let location = ProjectLocation::resolve_with_exe(None, Ok(exe)).unwrap();

        assert_eq!(location.root(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn marked_ancestor_wins_over_executable_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(CONFIG_DIR)).unwrap();
        let bin_dir = temp.path().join("target").join("release");
        fs::create_dir_all(&bin_dir).unwrap();
        let exe = bin_dir.join("basecamp");
        fs::write(&exe, "").unwrap();

        let location = ProjectLocation::resolve_with_exe(None, Ok(exe)).unwrap();

        assert_eq!(location.root(), temp.path().canonicalize().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_executable_resolves_to_target_directory() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        let elsewhere = temp.path().join("elsewhere");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(&elsewhere).unwrap();
        let exe = project.join("basecamp");
        fs::write(&exe, "").unwrap();
        let link = elsewhere.join("basecamp");
        std::os::unix::fs::symlink(&exe, &link).unwrap();

        let location = ProjectLocation::resolve_with_exe(None, Ok(link)).unwrap();

        assert_eq!(location.root(), project.canonicalize().unwrap());
    }

    #[test]
    fn join_resolves_relative_paths() {
        let temp = TempDir::new().unwrap();
        let location =
            ProjectLocation::resolve_with_exe(Some(temp.path()), not_found()).unwrap();

        assert_eq!(
            location.join(Path::new("venv")),
            temp.path().canonicalize().unwrap().join("venv")
        );
    }
}
