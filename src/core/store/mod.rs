//! Purpose: Abstract the OS-owned environment variable store behind `VarStore`.
//! Exports: `VarStore`, `MemoryStore`, `FileStore`, `SystemStore`.
//! Role: The only place PATH values are read from or written to.
//! Invariants: Reads return the raw stored value, or `None` when unset.
//! Invariants: Store refusals surface as `Permission`/`Store` errors, never retried.

mod file;
mod system;
#[cfg(windows)]
mod registry;

use std::collections::HashMap;
use std::io;

use crate::core::error::{Error, ErrorKind};
use crate::core::scope::Scope;

pub use file::FileStore;
pub use system::SystemStore;

/// Read/write access to named environment variables at a given scope.
pub trait VarStore {
    fn read(&self, name: &str, scope: Scope) -> Result<Option<String>, Error>;

    fn write(&mut self, name: &str, scope: Scope, value: &str) -> Result<(), Error>;
}

/// In-memory store; names are matched case-insensitively like on Windows.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<(Scope, String), String>,
    denied: Vec<Scope>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, scope: Scope, name: &str, value: impl Into<String>) -> Self {
        self.values.insert((scope, fold_name(name)), value.into());
        self
    }

    /// Makes every write to `scope` fail with `Permission`, as an unelevated
    /// caller sees for machine scope.
    pub fn deny_writes(mut self, scope: Scope) -> Self {
        self.denied.push(scope);
        self
    }

    pub fn value(&self, scope: Scope, name: &str) -> Option<&str> {
        self.values
            .get(&(scope, fold_name(name)))
            .map(String::as_str)
    }
}

impl VarStore for MemoryStore {
    fn read(&self, name: &str, scope: Scope) -> Result<Option<String>, Error> {
        Ok(self.value(scope, name).map(str::to_string))
    }

    fn write(&mut self, name: &str, scope: Scope, value: &str) -> Result<(), Error> {
        if self.denied.contains(&scope) {
            return Err(Error::new(ErrorKind::Permission)
                .with_message(format!("writing {name} requires elevated privileges"))
                .with_scope(scope));
        }
        self.values
            .insert((scope, fold_name(name)), value.to_string());
        Ok(())
    }
}

fn fold_name(name: &str) -> String {
    name.to_ascii_uppercase()
}

pub(crate) fn store_error_kind(err: &io::Error) -> ErrorKind {
    #[cfg(unix)]
    {
        let errno = err.raw_os_error().unwrap_or_default();
        if errno == libc::EACCES || errno == libc::EPERM {
            return ErrorKind::Permission;
        }
    }
    match err.kind() {
        io::ErrorKind::PermissionDenied => ErrorKind::Permission,
        _ => ErrorKind::Store,
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryStore, VarStore, store_error_kind};
    use crate::core::error::ErrorKind;
    use crate::core::scope::Scope;

    #[test]
    fn memory_store_names_are_case_insensitive() {
        let store = MemoryStore::new().with_value(Scope::User, "Path", "C:\\a;");
        assert_eq!(
            store.read("PATH", Scope::User).unwrap().as_deref(),
            Some("C:\\a;")
        );
        assert_eq!(store.read("Path", Scope::Machine).unwrap(), None);
    }

    #[test]
    fn memory_store_denied_scope_rejects_writes() {
        let mut store = MemoryStore::new().deny_writes(Scope::Machine);
        let err = store.write("Path", Scope::Machine, "C:\\a;").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        assert_eq!(err.scope(), Some(Scope::Machine));
        store.write("Path", Scope::User, "C:\\a;").expect("user write");
        assert_eq!(store.value(Scope::User, "path"), Some("C:\\a;"));
    }

    #[cfg(unix)]
    #[test]
    fn io_errors_map_to_expected_kinds() {
        let err = std::io::Error::from_raw_os_error(libc::EACCES);
        assert_eq!(store_error_kind(&err), ErrorKind::Permission);

        let err = std::io::Error::from_raw_os_error(libc::EPERM);
        assert_eq!(store_error_kind(&err), ErrorKind::Permission);

        let err = std::io::Error::from_raw_os_error(libc::ENOSPC);
        assert_eq!(store_error_kind(&err), ErrorKind::Store);
    }

    #[test]
    fn permission_denied_kind_maps_to_permission() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(store_error_kind(&err), ErrorKind::Permission);
    }
}
