//! User profile module.

mod model;

pub use model::User;
