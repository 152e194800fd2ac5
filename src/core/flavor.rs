// Host conventions for PATH-like variables: separator, variable name, and
// what counts as an acceptable (rooted) entry.

/// Platform convention used to split, join, and validate PATH entries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flavor {
    /// `;`-separated `Path`, entries rooted at a drive letter (`C:\tools`).
    Windows,
    /// `:`-separated `PATH`, entries absolute from `/`.
    Unix,
}

impl Flavor {
    pub const fn host() -> Self {
        if cfg!(windows) {
            Flavor::Windows
        } else {
            Flavor::Unix
        }
    }

    pub const fn separator(self) -> char {
        match self {
            Flavor::Windows => ';',
            Flavor::Unix => ':',
        }
    }

    pub const fn var_name(self) -> &'static str {
        match self {
            Flavor::Windows => "Path",
            Flavor::Unix => "PATH",
        }
    }

    /// Whether `path` may be added to, removed from, or probed in a list.
    ///
    /// Only the shape is checked: the directory need not exist, and neither
    /// case nor trailing separators are normalized.
    pub fn validate(self, path: &str) -> bool {
        let mut chars = path.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        match self {
            Flavor::Windows => {
                if first == '/' || first == '\\' {
                    return false;
                }
                first.is_ascii_alphabetic() && chars.next() == Some(':')
            }
            Flavor::Unix => first == '/',
        }
    }

    /// Splits a raw stored value into entries.
    ///
    /// Exactly one trailing separator is dropped first. An empty value is an
    /// empty list; any other empty segment is kept as an empty entry.
    pub fn split(self, raw: &str) -> Vec<String> {
        let trimmed = raw.strip_suffix(self.separator()).unwrap_or(raw);
        if trimmed.is_empty() {
            return Vec::new();
        }
        trimmed
            .split(self.separator())
            .map(str::to_string)
            .collect()
    }

    /// Joins entries with a separator after every entry, including the last.
    pub fn join<S: AsRef<str>>(self, entries: &[S]) -> String {
        let mut out = String::new();
        for entry in entries {
            out.push_str(entry.as_ref());
            out.push(self.separator());
        }
        out
    }
}

impl Default for Flavor {
    fn default() -> Self {
        Flavor::host()
    }
}

/// Case-insensitive comparison used for PATH entry identity.
///
/// Characters are compared one to one, so entries of different lengths never
/// match (`ß` is not `SS`).
pub fn same_entry(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count()
        && a
            .chars()
            .zip(b.chars())
            .all(|(x, y)| x == y || x.to_uppercase().eq(y.to_uppercase()))
}
