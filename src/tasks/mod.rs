//! Background Tasks Module
//!
//! Tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: reclaims expired cache entries at a configured interval

mod sweep;

pub use sweep::spawn_sweep_task;
