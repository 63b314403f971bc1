//! Services layer (ports + adapters).
//!
//! - `ports`: configuration types shared by the kernel and adapters.
//! - `adapters`: archive codec and settings IO.

pub mod adapters;
pub mod ports;
