//! Application initialization.
//!
//! Only logging needs process-wide setup; everything else is constructed per
//! run.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
