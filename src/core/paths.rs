//! Path resolution for configured files.

use std::env;
use std::path::{Component, Path, PathBuf};

/// Resolve `path` to an absolute path without touching the filesystem.
///
/// Relative paths are joined onto `base` when given, otherwise onto the
/// current working directory. `.` and `..` components are resolved
/// syntactically so a database that does not exist yet still gets a stable,
/// printable location.
pub fn resolve_relative_to(path: &Path, base: Option<&Path>) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match base {
            Some(dir) if dir.is_absolute() => dir.join(path),
            Some(dir) => current_dir_or_self(&dir.join(path)),
            None => current_dir_or_self(path),
        }
    };
    normalize_syntactic(&absolute)
}

fn current_dir_or_self(path: &Path) -> PathBuf {
    env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}

fn normalize_syntactic(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir | Component::Normal(_) => {
                components.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                }
            }
        }
    }
    components.into_iter().collect()
}
