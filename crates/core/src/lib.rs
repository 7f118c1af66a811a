pub mod chunk;
pub mod config;
pub mod element;
pub mod error;
pub mod metadata;

pub use chunk::*;
pub use config::Config;
pub use element::*;
pub use error::*;
pub use metadata::*;
