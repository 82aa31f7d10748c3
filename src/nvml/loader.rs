//! Runtime handle to the NVML shared library
//!
//! NVML ships with the NVIDIA driver, so the library is resolved at
//! runtime rather than linked at build time. Accessor symbols are looked
//! up by name and handed to the bridge as typed function values.

use crate::error::{NvmlError, Result};
use crate::nvml::bridge::{IntPropertyFn, TextPropertyFn};

use libloading::{Library, Symbol};
use nvml_wrapper_sys::bindings::{nvmlReturn_enum, nvmlReturn_enum_NVML_SUCCESS};

type SessionFn = unsafe extern "C" fn() -> nvmlReturn_enum;

/// Loaded NVML library
pub struct NvmlLib {
    lib: Library,
}

impl NvmlLib {
    /// Load the NVML shared library from the system.
    pub fn open() -> Result<Self> {
        // SAFETY: loading the NVML library
        let lib = unsafe { Library::new("libnvidia-ml.so.1") }
            .or_else(|_| unsafe { Library::new("libnvidia-ml.so") })
            .map_err(|_| NvmlError::LibraryNotFound)?;

        log::debug!("Loaded NVML library");
        Ok(Self { lib })
    }

    /// Initialize the NVML session. Property accessors fail until this
    /// has succeeded once for the process.
    pub fn init(&self) -> Result<()> {
        let ret = self.session_call("nvmlInit_v2")?;
        if ret == nvmlReturn_enum_NVML_SUCCESS {
            log::debug!("NVML initialized");
            Ok(())
        } else {
            Err(NvmlError::InitializationFailed(format!(
                "nvmlInit_v2 returned status {}",
                ret
            )))
        }
    }

    /// Shut the NVML session down. Outstanding device handles become
    /// invalid.
    pub fn shutdown(&self) -> Result<()> {
        let ret = self.session_call("nvmlShutdown")?;
        if ret == nvmlReturn_enum_NVML_SUCCESS {
            Ok(())
        } else {
            Err(NvmlError::InitializationFailed(format!(
                "nvmlShutdown returned status {}",
                ret
            )))
        }
    }

    /// Resolve a text-property getter by its NVML symbol name.
    pub fn text_accessor(&self, name: &str) -> Result<Symbol<'_, TextPropertyFn>> {
        self.symbol(name)
    }

    /// Resolve an integer-property getter by its NVML symbol name.
    pub fn int_accessor(&self, name: &str) -> Result<Symbol<'_, IntPropertyFn>> {
        self.symbol(name)
    }

    pub(crate) fn symbol<T>(&self, name: &str) -> Result<Symbol<'_, T>> {
        // SAFETY: the caller supplies the type the symbol is declared
        // with in nvml.h; a mismatch is undefined behavior at the FFI
        // boundary, not a checked error.
        unsafe { self.lib.get(name.as_bytes()) }
            .map_err(|_| NvmlError::SymbolNotFound(name.to_string()))
    }

    fn session_call(&self, name: &str) -> Result<nvmlReturn_enum> {
        let func = self.symbol::<SessionFn>(name)?;
        Ok(unsafe { func() })
    }
}
