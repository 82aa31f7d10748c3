//! NVML property-access layer
//!
//! The generic accessor bridge plus the pieces around it: runtime library
//! loading and a typed device wrapper.

pub mod bridge;
pub mod device;
pub mod loader;
pub mod text;

pub use bridge::{get_int_property, get_text_property, IntPropertyFn, TextPropertyFn};
pub use device::{ClockKind, Device, MemoryInfo, Utilization};
pub use loader::NvmlLib;
