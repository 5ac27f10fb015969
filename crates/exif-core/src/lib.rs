pub mod error;
pub mod types;

pub use error::ExifError;
pub use types::*;
