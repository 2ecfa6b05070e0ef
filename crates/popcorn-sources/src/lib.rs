pub mod error;
pub mod omdb;
pub mod traits;

pub use error::LookupError;
pub use omdb::{OmdbClient, OmdbSettings};
pub use traits::MovieLookup;
