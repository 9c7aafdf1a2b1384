//! Load catalog components for the panel simulation.

pub mod registry;

// Re-export the main types for convenience
pub use registry::Load;
pub use registry::LoadRegistry;
pub use registry::{PRIMARY_FEEDER, SECONDARY_FEEDER};
