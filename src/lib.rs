//! nvbridge - generic property-accessor bridge over NVML
//!
//! Many NVML device getters share one of two signatures: text properties
//! take a device handle, a character buffer, and a length; integer
//! properties take a device handle and an output slot. Instead of one
//! hand-written wrapper per property, this crate wraps each shape once as
//! a generic call and lets the property vary by symbol name. The NVML
//! status code is collapsed to success or failure; callers wanting to
//! know why a call failed must ask NVML themselves.
//!
//! # Modules
//!
//! - [`error`]: Error types
//! - [`nvml`]: Accessor bridge, library loader, and typed device accessors

pub mod error;
pub mod nvml;

pub use error::{NvmlError, Result};
pub use nvml::{Device, NvmlLib};
