mod api;
mod health;
mod token;

pub use api::*;
pub use health::*;
pub use token::*;
