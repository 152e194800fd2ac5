use std::error::Error as StdError;
use std::fmt;

use crate::core::scope::Scope;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    NullArgument,
    InvalidPath,
    Permission,
    Store,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    entry: Option<String>,
    scope: Option<Scope>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            entry: None,
            scope: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// The PATH entry the failing operation was given, if any.
    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    pub fn scope(&self) -> Option<Scope> {
        self.scope
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(entry) = &self.entry {
            write!(f, " (entry: {entry})")?;
        }
        if let Some(scope) = self.scope {
            write!(f, " (scope: {scope})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::NullArgument => 3,
        ErrorKind::InvalidPath => 4,
        ErrorKind::Permission => 5,
        ErrorKind::Store => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, to_exit_code};
    use crate::core::scope::Scope;
    use std::error::Error as StdError;

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Internal, 1),
            (ErrorKind::Usage, 2),
            (ErrorKind::NullArgument, 3),
            (ErrorKind::InvalidPath, 4),
            (ErrorKind::Permission, 5),
            (ErrorKind::Store, 6),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn display_includes_entry_and_scope() {
        let err = Error::new(ErrorKind::InvalidPath)
            .with_message("path must be rooted")
            .with_entry("relative\\dir")
            .with_scope(Scope::User);
        assert_eq!(
            err.to_string(),
            "InvalidPath: path must be rooted (entry: relative\\dir) (scope: user)"
        );
    }

    #[test]
    fn source_is_exposed() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::new(ErrorKind::Permission).with_source(io);
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "denied");
    }
}
