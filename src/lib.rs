//! To-do list application library
//!
//! This library keeps an ordered list of todo items in memory and mirrors it,
//! in full, into a local key-value storage slot after every change.

mod cli;
mod config;
mod edit;
mod errors;
mod helper;
mod mirror;
mod storage;
mod store;
mod todo;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use edit::*;
pub use errors::*;
pub use helper::*;
pub use mirror::*;
pub use storage::*;
pub use store::*;
pub use todo::*;
pub use types::*;
