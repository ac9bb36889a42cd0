// Clippy allows for reasonable defaults
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::field_reassign_with_default)] // Builder pattern is clearer
#![allow(clippy::single_char_add_str)] // push_str("\n") reads better than push('\n')
#![allow(clippy::needless_borrow)] // Explicit borrows can clarify ownership
#![allow(clippy::collapsible_if)] // Separate ifs can be more readable

// Module declarations
pub mod enhance;
pub mod export;
pub mod file_storage;
pub mod import;
pub mod models;
pub mod session;

// Server module (HTTP API)
pub mod server;

pub use models::*;
pub use session::{EditorSession, SaveStatus, DEFAULT_DEBOUNCE};
