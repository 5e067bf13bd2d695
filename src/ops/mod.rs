/// Engine operations invoked by the surrounding CRUD layer
///
/// Each operation is a plain function generic over the HabitStore trait:
/// read from the log, compute, and report back. Nothing here caches state
/// or retries; every call recomputes from the source of truth.

pub mod log;
pub mod streaks;
pub mod goal;

// Re-export operation functions for easy access
pub use log::*;
pub use streaks::*;
pub use goal::*;
