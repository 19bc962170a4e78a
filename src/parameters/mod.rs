// Request Parameter Extraction Module
//
// Turns inbound requests into categorized wordlist entries:
//
// - classifier: credential-key vocabularies (username vs password fields)
// - walker: recursive JSON object walk
// - body: Content-Type dispatch and body decoders
// - scanner: request-level extraction, the entry point
//
// Architecture:
//   classifier.rs (leaf)
//       ↑
//   walker.rs, body.rs
//       ↑
//   scanner.rs (request-level, writes through WordlistStore)
//       ↑
//   engine.rs (per-request pipeline)

pub mod body;
pub mod classifier;
pub mod scanner;
pub mod walker;

// Re-export commonly used items for convenience
pub use body::*;
pub use classifier::*;
pub use scanner::*;
pub use walker::*;
