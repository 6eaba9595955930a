pub mod error;
pub mod middleware;
pub mod token;

pub use error::*;
pub use middleware::*;
pub use token::*;
