//! Resource repositories, request validation and the validated entity type.

mod crud;
mod entity;
mod validation;
pub use crud::ResourceRepository;
pub use entity::Entity;
pub use validation::RequestValidator;
