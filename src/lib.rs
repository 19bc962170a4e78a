pub mod models;
pub mod error;
pub mod config;
pub mod wordlist;
pub mod parameters;  // Request extraction: classifier, body decoders, scanner
pub mod capture;
pub mod decoy;
pub mod engine;

// Re-export commonly used items
pub use models::*;
pub use error::*;
pub use config::*;
pub use wordlist::*;
pub use parameters::*;  // Re-exports all extraction functionality
pub use capture::*;
pub use decoy::*;
pub use engine::*;
