//! Purpose: Library crate backing the `envpath` CLI and its tests.
//! Exports: `api` (stable surface), `core` (PATH model, stores, errors), `notice`.
//! Role: Holds all PATH logic; the binary only parses arguments and renders output.
//! Invariants: PATH mutations reach the OS only through a `VarStore`.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
pub mod notice;
pub(crate) mod store_paths;
