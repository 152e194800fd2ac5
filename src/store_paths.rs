//! Purpose: Resolve where the file-backed store keeps user and machine values.
//! Exports: `default_user_dir`, `default_machine_dir`, `scope_dir`, `value_file_name`.
//! Role: Keep CLI and library file-store locations aligned from one source.
//! Invariants: Default user directory remains `~/.envpath`.
//! Invariants: Variable file names never contain path separators.

use std::path::{Path, PathBuf};

use crate::core::scope::Scope;

pub(crate) fn default_user_dir() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .unwrap_or_default();
    PathBuf::from(home).join(".envpath")
}

#[cfg(windows)]
pub(crate) fn default_machine_dir() -> PathBuf {
    let program_data =
        std::env::var_os("ProgramData").unwrap_or_else(|| "C:\\ProgramData".into());
    PathBuf::from(program_data).join("envpath")
}

#[cfg(not(windows))]
pub(crate) fn default_machine_dir() -> PathBuf {
    PathBuf::from("/etc/envpath")
}

/// Per-scope directory under an explicit store root (`--store-dir`).
pub(crate) fn scope_dir(root: &Path, scope: Scope) -> PathBuf {
    root.join(scope.as_str())
}

pub(crate) fn value_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{scope_dir, value_file_name};
    use crate::core::scope::Scope;
    use std::path::Path;

    #[test]
    fn value_file_names_are_folded_and_flat() {
        assert_eq!(value_file_name("Path"), "PATH");
        assert_eq!(value_file_name("a/b\\c:d"), "A_B_C_D");
    }

    #[test]
    fn scope_dirs_live_under_root() {
        let root = Path::new("/tmp/store");
        assert_eq!(scope_dir(root, Scope::User), root.join("user"));
        assert_eq!(scope_dir(root, Scope::Machine), root.join("machine"));
    }
}
