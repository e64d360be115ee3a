//! Domain layer containing token entities and lifecycle events.

pub mod entities;
pub mod events;

// Re-export commonly used domain types
pub use entities::*;
pub use events::*;
