// File-backed persistent store: one file per (scope, variable).
// Holds only persistent scopes; process scope lives in the environment.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::error::{Error, ErrorKind};
use crate::core::scope::Scope;
use crate::core::store::{VarStore, store_error_kind};
use crate::store_paths::{default_machine_dir, default_user_dir, scope_dir, value_file_name};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileStore {
    user_dir: PathBuf,
    machine_dir: PathBuf,
}

impl FileStore {
    pub fn new(user_dir: impl Into<PathBuf>, machine_dir: impl Into<PathBuf>) -> Self {
        Self {
            user_dir: user_dir.into(),
            machine_dir: machine_dir.into(),
        }
    }

    /// Store rooted at `root`, with `user/` and `machine/` subdirectories.
    pub fn under(root: &Path) -> Self {
        Self::new(scope_dir(root, Scope::User), scope_dir(root, Scope::Machine))
    }

    /// `~/.envpath` for user scope and a system-wide directory for machine scope.
    pub fn with_defaults() -> Self {
        Self::new(default_user_dir(), default_machine_dir())
    }

    pub fn value_path(&self, name: &str, scope: Scope) -> Result<PathBuf, Error> {
        let dir = match scope {
            Scope::User => &self.user_dir,
            Scope::Machine => &self.machine_dir,
            Scope::Process => {
                return Err(Error::new(ErrorKind::Internal)
                    .with_message("file store does not hold process-scope values")
                    .with_scope(scope));
            }
        };
        Ok(dir.join(value_file_name(name)))
    }
}

impl VarStore for FileStore {
    fn read(&self, name: &str, scope: Scope) -> Result<Option<String>, Error> {
        let path = self.value_path(name, scope)?;
        match fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), %scope, "read stored value");
                Ok(Some(strip_line_ending(contents)))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(err, "failed to read stored value", &path, scope)),
        }
    }

    fn write(&mut self, name: &str, scope: Scope, value: &str) -> Result<(), Error> {
        let path = self.value_path(name, scope)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                io_error(err, "failed to create store directory", parent, scope)
            })?;
        }
        fs::write(&path, value)
            .map_err(|err| io_error(err, "failed to write stored value", &path, scope))?;
        tracing::debug!(path = %path.display(), %scope, bytes = value.len(), "wrote stored value");
        Ok(())
    }
}

// Hand-edited files usually end with a newline that is not part of the value.
fn strip_line_ending(mut contents: String) -> String {
    if contents.ends_with('\n') {
        contents.pop();
        if contents.ends_with('\r') {
            contents.pop();
        }
    }
    contents
}

fn io_error(err: io::Error, message: &str, path: &Path, scope: Scope) -> Error {
    let kind = store_error_kind(&err);
    let mut error = Error::new(kind)
        .with_message(format!("{message}: {}", path.display()))
        .with_scope(scope)
        .with_source(err);
    if kind == ErrorKind::Permission && scope == Scope::Machine {
        error = error.with_hint("Machine scope needs elevated privileges; rerun as an administrator.");
    }
    error
}

#[cfg(test)]
mod tests {
    use super::FileStore;
    use crate::core::error::ErrorKind;
    use crate::core::scope::Scope;
    use crate::core::store::VarStore;

    #[test]
    fn missing_file_reads_as_unset() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = FileStore::under(temp.path());
        assert_eq!(store.read("PATH", Scope::User).unwrap(), None);
    }

    #[test]
    fn write_creates_directories_and_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::under(temp.path());
        store
            .write("PATH", Scope::Machine, "/opt/a:/opt/b:")
            .expect("write");

        let file = temp.path().join("machine").join("PATH");
        assert_eq!(std::fs::read_to_string(file).unwrap(), "/opt/a:/opt/b:");
        assert_eq!(
            store.read("path", Scope::Machine).unwrap().as_deref(),
            Some("/opt/a:/opt/b:")
        );
        assert_eq!(store.read("PATH", Scope::User).unwrap(), None);
    }

    #[test]
    fn trailing_newline_is_not_part_of_the_value() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("user");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("PATH"), "/opt/a:\n").unwrap();

        let store = FileStore::under(temp.path());
        assert_eq!(
            store.read("PATH", Scope::User).unwrap().as_deref(),
            Some("/opt/a:")
        );
    }

    #[test]
    fn process_scope_is_not_file_backed() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = FileStore::under(temp.path());
        let err = store.read("PATH", Scope::Process).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
