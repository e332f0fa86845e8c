//! Working-directory containment.
//!
//! A working directory is permitted iff its canonical form is equal to, or a
//! descendant of, a canonical entry in the allowed roots. The comparison runs
//! on canonicalized paths (symlinks resolved, `..` segments removed), so a
//! path whose literal string appears to be inside a root but resolves outside
//! it is rejected.

use super::error::ExecError;
use crate::config::ExecutionConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Resolve and validate a requested working directory against the policy.
///
/// Absence of a request defaults to the configured workspace base. Relative
/// requests are joined onto the workspace base before resolution.
///
/// # Errors
///
/// - `ExecError::NotFound` if the directory does not exist
/// - `ExecError::Unauthorized` if it resolves outside every allowed root
pub fn resolve_working_dir(
    requested: Option<&str>,
    config: &ExecutionConfig,
) -> Result<PathBuf, ExecError> {
    let base = Path::new(&config.workspace_dir);
    let joined = match requested {
        None => base.to_path_buf(),
        Some(dir) => {
            let dir = Path::new(dir);
            if dir.is_absolute() {
                dir.to_path_buf()
            } else {
                base.join(dir)
            }
        }
    };

    let canonical = fs::canonicalize(&joined).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ExecError::NotFound(format!(
            "working directory '{}' does not exist",
            joined.display()
        )),
        _ => ExecError::ExecutionFailure(format!(
            "failed to resolve working directory '{}': {}",
            joined.display(),
            e
        )),
    })?;

    if is_contained(&canonical, &config.allowed_paths) {
        Ok(canonical)
    } else {
        Err(ExecError::Unauthorized(format!(
            "working directory '{}' is outside the allowed roots",
            canonical.display()
        )))
    }
}

/// Containment check over canonicalized roots. Roots that fail to
/// canonicalize (e.g. not yet created) are skipped rather than trusted.
fn is_contained(candidate: &Path, roots: &[String]) -> bool {
    roots
        .iter()
        .filter_map(|root| fs::canonicalize(root).ok())
        .any(|root| candidate.starts_with(&root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_rooted_at(workspace: &Path) -> ExecutionConfig {
        ExecutionConfig {
            workspace_dir: workspace.display().to_string(),
            allowed_paths: vec![workspace.display().to_string()],
            ..ExecutionConfig::default()
        }
    }

    #[test]
    fn test_defaults_to_workspace() {
        let dir = TempDir::new().unwrap();
        let config = config_rooted_at(dir.path());

        let resolved = resolve_working_dir(None, &config).unwrap();
        assert_eq!(resolved, fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn test_relative_subdir_permitted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let config = config_rooted_at(dir.path());

        let resolved = resolve_working_dir(Some("sub"), &config).unwrap();
        assert!(resolved.ends_with("sub"));
    }

    #[test]
    fn test_absolute_inside_root_permitted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let config = config_rooted_at(dir.path());

        let absolute = dir.path().join("sub").display().to_string();
        assert!(resolve_working_dir(Some(&absolute), &config).is_ok());
    }

    #[test]
    fn test_missing_directory_not_found() {
        let dir = TempDir::new().unwrap();
        let config = config_rooted_at(dir.path());

        let err = resolve_working_dir(Some("does-not-exist"), &config).unwrap_err();
        assert!(matches!(err, ExecError::NotFound(_)));
    }

    #[test]
    fn test_traversal_escape_rejected() {
        let outer = TempDir::new().unwrap();
        fs::create_dir(outer.path().join("inner")).unwrap();
        let config = config_rooted_at(&outer.path().join("inner"));

        // Literal string starts under the workspace but resolves above it
        let err = resolve_working_dir(Some(".."), &config).unwrap_err();
        assert!(matches!(err, ExecError::Unauthorized(_)));
    }

    #[test]
    fn test_unrelated_absolute_rejected() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let config = config_rooted_at(dir.path());

        let err =
            resolve_working_dir(Some(&other.path().display().to_string()), &config).unwrap_err();
        assert!(matches!(err, ExecError::Unauthorized(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let root = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let link = root.path().join("escape");
        std::os::unix::fs::symlink(outside.path(), &link).unwrap();
        let config = config_rooted_at(root.path());

        // The literal path sits inside the root; the target does not
        let err = resolve_working_dir(Some("escape"), &config).unwrap_err();
        assert!(matches!(err, ExecError::Unauthorized(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_within_root_permitted() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("real")).unwrap();
        let link = root.path().join("alias");
        std::os::unix::fs::symlink(root.path().join("real"), &link).unwrap();
        let config = config_rooted_at(root.path());

        assert!(resolve_working_dir(Some("alias"), &config).is_ok());
    }

    #[test]
    fn test_multiple_roots() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let config = ExecutionConfig {
            workspace_dir: first.path().display().to_string(),
            allowed_paths: vec![
                first.path().display().to_string(),
                second.path().display().to_string(),
            ],
            ..ExecutionConfig::default()
        };

        let in_second = second.path().display().to_string();
        assert!(resolve_working_dir(Some(&in_second), &config).is_ok());
    }

    #[test]
    fn test_uncanonicalizable_root_skipped() {
        let dir = TempDir::new().unwrap();
        let config = ExecutionConfig {
            workspace_dir: dir.path().display().to_string(),
            allowed_paths: vec![
                "/definitely/not/a/real/root".to_string(),
                dir.path().display().to_string(),
            ],
            ..ExecutionConfig::default()
        };

        assert!(resolve_working_dir(None, &config).is_ok());
    }

    #[test]
    fn test_prefix_sibling_not_contained() {
        // /tmp/ws-evil must not match an allowed root of /tmp/ws
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("ws");
        let sibling = parent.path().join("ws-evil");
        fs::create_dir(&root).unwrap();
        fs::create_dir(&sibling).unwrap();
        let config = config_rooted_at(&root);

        let err =
            resolve_working_dir(Some(&sibling.display().to_string()), &config).unwrap_err();
        assert!(matches!(err, ExecError::Unauthorized(_)));
    }
}
