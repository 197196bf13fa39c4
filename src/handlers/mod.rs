//! HTTP handlers. One generic set serves every configured resource.

pub mod resource;
pub mod session;
pub use resource::{create, delete_all, delete_one, list, read, replace};
pub use session::login;
