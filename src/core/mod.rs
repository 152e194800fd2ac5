// Core modules implementing the PATH model, host conventions, stores, and errors.
pub mod error;
pub mod flavor;
pub mod path_list;
pub mod scope;
pub mod store;
