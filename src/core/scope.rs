// Which environment store a PATH list is read from and written to.
use std::fmt;
use std::str::FromStr;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Scope {
    /// The running process's environment; lost when the process exits.
    #[default]
    Process,
    /// Per-user persistent configuration.
    User,
    /// Machine-wide persistent configuration; writes usually need elevation.
    Machine,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Process, Scope::User, Scope::Machine];

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Process => "process",
            Scope::User => "user",
            Scope::Machine => "machine",
        }
    }

    pub fn is_persistent(self) -> bool {
        !matches!(self, Scope::Process)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str().eq_ignore_ascii_case(input))
            .ok_or_else(|| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!("unknown scope `{input}`"))
                    .with_hint("Use one of: process, user, machine.")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::Scope;
    use crate::core::error::ErrorKind;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("User".parse::<Scope>().unwrap(), Scope::User);
        assert_eq!("MACHINE".parse::<Scope>().unwrap(), Scope::Machine);
        assert_eq!("process".parse::<Scope>().unwrap(), Scope::Process);
    }

    #[test]
    fn rejects_unknown_scope() {
        let err = "system".parse::<Scope>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn only_process_is_transient() {
        assert!(!Scope::Process.is_persistent());
        assert!(Scope::User.is_persistent());
        assert!(Scope::Machine.is_persistent());
    }
}
