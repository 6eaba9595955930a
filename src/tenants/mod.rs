pub mod error;
pub mod guard;
pub mod models;
pub mod repository;
pub mod scope;

pub use error::*;
pub use guard::*;
pub use models::*;
pub use repository::*;
pub use scope::*;
