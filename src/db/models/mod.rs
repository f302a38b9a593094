//! Database models split into domain-specific modules.

pub mod list;
pub mod movie;
pub mod user;

pub use list::*;
pub use movie::*;
pub use user::*;
