pub mod config;
pub mod domain;
pub mod errors;

pub use domain::product::{Category, Price, Product, ProductId};
pub use errors::{ApplicationError, InterfaceError, ValidationError};
