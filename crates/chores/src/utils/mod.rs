//! Internal utilities.

pub mod paths;
pub mod permissions;
pub mod validation;

pub use permissions::PermissionChecker;
pub use validation::Validator;
