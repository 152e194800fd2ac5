//! Purpose: Define the public Rust API boundary for envpath.
//! Exports: `PathList`, scopes, flavors, stores, and error types.
//! Role: Additive-only surface used by the CLI; hides internal module layout.
//! Invariants: Callers never need to reach into `core` paths directly.

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use crate::core::flavor::{Flavor, same_entry};
pub use crate::core::path_list::{
    PathList, exists_in_user_and_machine, exists_in_user_and_machine_with,
};
pub use crate::core::scope::Scope;
pub use crate::core::store::{FileStore, MemoryStore, SystemStore, VarStore};
