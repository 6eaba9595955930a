pub mod evaluator;
pub mod models;
pub mod repository;

pub use evaluator::*;
pub use models::*;
pub use repository::*;
