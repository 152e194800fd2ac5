//! Purpose: In-memory model of one scope's PATH entries.
//! Exports: `PathList`, `exists_in_user_and_machine`.
//! Role: Validates, deduplicates, and persists entries through a `VarStore`.
//! Invariants: Entries added here are valid and unique under case-insensitive comparison.
//! Invariants: Entries already in the store are kept verbatim, even invalid or empty ones.
//! Invariants: Nothing reaches the store until `save` is called.

use std::fmt;

use crate::core::error::{Error, ErrorKind};
use crate::core::flavor::{Flavor, same_entry};
use crate::core::scope::Scope;
use crate::core::store::VarStore;

/// Ordered, case-insensitively deduplicated PATH entries for one scope.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathList {
    entries: Vec<String>,
    scope: Scope,
    flavor: Flavor,
}

impl PathList {
    /// Reads the current value for `scope` from `store` using host conventions.
    pub fn load<S: VarStore + ?Sized>(store: &S, scope: Scope) -> Result<Self, Error> {
        Self::load_with(store, scope, Flavor::host())
    }

    pub fn load_with<S: VarStore + ?Sized>(
        store: &S,
        scope: Scope,
        flavor: Flavor,
    ) -> Result<Self, Error> {
        let raw = read_raw(store, scope, flavor)?;
        Ok(Self::from_value(scope, flavor, &raw))
    }

    /// Builds a list from an already-read raw value; no validation is applied.
    pub fn from_value(scope: Scope, flavor: Flavor, raw: &str) -> Self {
        Self {
            entries: flavor.split(raw),
            scope,
            flavor,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Host-convention validation; see [`Flavor::validate`].
    pub fn validate(path: &str) -> bool {
        Flavor::host().validate(path)
    }

    /// Appends `path` unless an equal entry (ignoring case) is present.
    ///
    /// Returns `Ok(Some(path))` when added and `Ok(None)` when already present.
    pub fn add_path(&mut self, path: &str) -> Result<Option<String>, Error> {
        self.check(path)?;
        if self.position(path).is_some() {
            return Ok(None);
        }
        self.entries.push(path.to_string());
        Ok(Some(path.to_string()))
    }

    /// Adds each path in order and returns how many were new.
    ///
    /// The first invalid path aborts the batch; paths before it stay added.
    pub fn add_paths<I, P>(&mut self, paths: I) -> Result<usize, Error>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut count = 0;
        for path in paths {
            if self.add_path(path.as_ref())?.is_some() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Removes the first entry equal to `path` ignoring case.
    ///
    /// Returns the entry as it was stored (original casing), or `Ok(None)`.
    pub fn remove_path(&mut self, path: &str) -> Result<Option<String>, Error> {
        self.check(path)?;
        Ok(self.position(path).map(|index| self.entries.remove(index)))
    }

    /// Removes each path in order and returns how many were removed.
    pub fn remove_paths<I, P>(&mut self, paths: I) -> Result<usize, Error>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut count = 0;
        for path in paths {
            if self.remove_path(path.as_ref())?.is_some() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Membership probe.
    ///
    /// On a match this returns the *query* lower-cased, not the stored
    /// casing; use [`PathList::paths`] to recover the stored form.
    pub fn get_path(&self, path: &str) -> Result<Option<String>, Error> {
        self.check(path)?;
        Ok(self.position(path).map(|_| path.to_lowercase()))
    }

    /// Read-only view of the entries in order.
    pub fn paths(&self) -> &[String] {
        &self.entries
    }

    /// Direct handle on the entries.
    ///
    /// Changes made through it skip validation and deduplication.
    pub fn paths_mut(&mut self) -> &mut Vec<String> {
        &mut self.entries
    }

    pub fn into_paths(self) -> Vec<String> {
        self.entries
    }

    /// Writes the entries back to `store` and returns the value it replaced.
    ///
    /// The previous value is read fresh right before the write and split the
    /// same way [`PathList::load`] splits. `self` is left untouched.
    pub fn save<S: VarStore + ?Sized>(&self, store: &mut S) -> Result<Vec<String>, Error> {
        let previous = read_raw(&*store, self.scope, self.flavor)?;
        store
            .write(self.flavor.var_name(), self.scope, &self.to_string())
            .map_err(|err| match err.scope() {
                Some(_) => err,
                None => err.with_scope(self.scope),
            })?;
        Ok(self.flavor.split(&previous))
    }

    fn check(&self, path: &str) -> Result<(), Error> {
        if self.flavor.validate(path) {
            return Ok(());
        }
        let hint = match self.flavor {
            Flavor::Windows => "Use a drive-rooted path such as C:\\tools\\bin.",
            Flavor::Unix => "Use an absolute path such as /opt/tools/bin.",
        };
        Err(Error::new(ErrorKind::InvalidPath)
            .with_message("path is not valid; it may be empty, relative, or not rooted")
            .with_hint(hint)
            .with_entry(path)
            .with_scope(self.scope))
    }

    fn position(&self, path: &str) -> Option<usize> {
        self.entries.iter().position(|entry| same_entry(entry, path))
    }
}

impl fmt::Display for PathList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flavor.join(self.entries.as_slice()))
    }
}

/// Whether a fresh user- or machine-scope read already contains `path`.
pub fn exists_in_user_and_machine<S: VarStore + ?Sized>(
    store: &S,
    path: &str,
) -> Result<bool, Error> {
    exists_in_user_and_machine_with(store, path, Flavor::host())
}

pub fn exists_in_user_and_machine_with<S: VarStore + ?Sized>(
    store: &S,
    path: &str,
    flavor: Flavor,
) -> Result<bool, Error> {
    for scope in [Scope::User, Scope::Machine] {
        if PathList::load_with(store, scope, flavor)?
            .get_path(path)?
            .is_some()
        {
            return Ok(true);
        }
    }
    Ok(false)
}

fn read_raw<S: VarStore + ?Sized>(store: &S, scope: Scope, flavor: Flavor) -> Result<String, Error> {
    Ok(store.read(flavor.var_name(), scope)?.unwrap_or_default())
}
