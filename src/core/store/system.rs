// The real environment: process scope is this process's environment block,
// user/machine scope is the platform's persistent backend.
use std::path::Path;

use crate::core::error::{Error, ErrorKind};
use crate::core::scope::Scope;
use crate::core::store::{FileStore, VarStore};

/// Store backed by the operating system.
///
/// Process-scope writes call `std::env::set_var`, which is only sound while no
/// other thread reads or writes the environment. The constructors are `unsafe`
/// for that reason.
#[derive(Debug)]
pub struct SystemStore {
    persistent: Persistent,
}

#[derive(Debug)]
enum Persistent {
    Files(FileStore),
    #[cfg(windows)]
    Registry(super::registry::RegistryStore),
}

impl SystemStore {
    /// Registry on Windows, `FileStore::with_defaults` elsewhere.
    ///
    /// # Safety
    ///
    /// For as long as the store is used, no other thread may read or write the
    /// process environment (`std::env::var`, `set_var`, libc `getenv`, ...).
    pub unsafe fn new() -> Self {
        #[cfg(windows)]
        let persistent = Persistent::Registry(super::registry::RegistryStore);
        #[cfg(not(windows))]
        let persistent = Persistent::Files(FileStore::with_defaults());
        Self { persistent }
    }

    /// Keep user and machine values as files under `root` on every platform.
    ///
    /// # Safety
    ///
    /// Same contract as [`SystemStore::new`].
    pub unsafe fn with_store_dir(root: &Path) -> Self {
        Self {
            persistent: Persistent::Files(FileStore::under(root)),
        }
    }

    fn persistent(&self) -> &dyn VarStore {
        match &self.persistent {
            Persistent::Files(store) => store,
            #[cfg(windows)]
            Persistent::Registry(store) => store,
        }
    }

    fn persistent_mut(&mut self) -> &mut dyn VarStore {
        match &mut self.persistent {
            Persistent::Files(store) => store,
            #[cfg(windows)]
            Persistent::Registry(store) => store,
        }
    }
}

impl VarStore for SystemStore {
    fn read(&self, name: &str, scope: Scope) -> Result<Option<String>, Error> {
        if scope.is_persistent() {
            return self.persistent().read(name, scope);
        }
        match std::env::var_os(name) {
            None => Ok(None),
            Some(value) => value.into_string().map(Some).map_err(|_| {
                Error::new(ErrorKind::Store)
                    .with_message(format!("{name} is not valid unicode"))
                    .with_scope(scope)
            }),
        }
    }

    fn write(&mut self, name: &str, scope: Scope, value: &str) -> Result<(), Error> {
        if scope.is_persistent() {
            return self.persistent_mut().write(name, scope, value);
        }
        if name.is_empty() || name.contains('=') || value.contains('\0') {
            return Err(Error::new(ErrorKind::Store)
                .with_message(format!("cannot set {name:?} in the process environment"))
                .with_scope(scope));
        }
        tracing::debug!(name, bytes = value.len(), "setting process environment");
        // SAFETY: the constructor's contract excludes concurrent environment access.
        unsafe { std::env::set_var(name, value) };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SystemStore;
    use crate::core::scope::Scope;
    use crate::core::store::VarStore;

    #[test]
    fn store_dir_routes_persistent_scopes_to_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        // SAFETY: only persistent scopes are written.
        let mut store = unsafe { SystemStore::with_store_dir(temp.path()) };
        store.write("PATH", Scope::User, "/opt/a:").expect("write");
        assert!(temp.path().join("user").join("PATH").exists());
        assert_eq!(
            store.read("PATH", Scope::User).unwrap().as_deref(),
            Some("/opt/a:")
        );
    }

    #[test]
    fn process_scope_reads_the_environment() {
        let temp = tempfile::tempdir().expect("tempdir");
        // SAFETY: read-only use.
        let store = unsafe { SystemStore::with_store_dir(temp.path()) };
        let expected = std::env::var("CARGO_PKG_NAME").ok();
        assert_eq!(store.read("CARGO_PKG_NAME", Scope::Process).unwrap(), expected);
        assert_eq!(
            store
                .read("ENVPATH_TEST_SURELY_UNSET_VARIABLE", Scope::Process)
                .unwrap(),
            None
        );
    }
}
