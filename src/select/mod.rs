// Repository picker binding
// Keeps a select-style option list in step with router results as the user types

pub mod binding;
pub mod debounce;
pub mod options;

pub use binding::SelectBinding;
pub use debounce::Debouncer;
pub use options::{RepoSelect, SelectOption};
