//! Generic property-accessor shims
//!
//! NVML exposes dozens of per-property getters, and a large share of them
//! use one of two signatures: `(device, char buffer, length)` for text
//! values and `(device, unsigned int out)` for integer values. Getters
//! returning bespoke structs still need individual treatment, but these
//! two families can be driven through a single generic call each, with
//! only the symbol name varying per property.
//!
//! The shims forward their arguments untouched and collapse the NVML
//! status code to a binary outcome. They never retry, never classify the
//! failure, and never touch the output buffer or slot themselves.

use crate::error::{NvmlError, Result};

use nvml_wrapper_sys::bindings::{nvmlDevice_t, nvmlReturn_enum, nvmlReturn_enum_NVML_SUCCESS};
use std::os::raw::{c_char, c_uint};

/// Raw signature of an NVML text-property getter, e.g. `nvmlDeviceGetName`.
pub type TextPropertyFn =
    unsafe extern "C" fn(nvmlDevice_t, *mut c_char, c_uint) -> nvmlReturn_enum;

/// Raw signature of an NVML integer-property getter, e.g. `nvmlDeviceGetFanSpeed`.
pub type IntPropertyFn = unsafe extern "C" fn(nvmlDevice_t, *mut c_uint) -> nvmlReturn_enum;

/// Invoke a text-property accessor against `device`, writing into `buf`.
///
/// `f` receives the device handle, the buffer pointer, and the buffer
/// length, in that order and unmodified. Returns `Ok(())` only when the
/// accessor reports `NVML_SUCCESS`; every other status maps uniformly to
/// [`NvmlError::UnderlyingCallFailed`]. On failure `buf` holds whatever
/// the accessor left behind.
pub fn get_text_property<F>(f: F, device: nvmlDevice_t, buf: &mut [c_char]) -> Result<()>
where
    F: FnOnce(nvmlDevice_t, *mut c_char, c_uint) -> nvmlReturn_enum,
{
    let ret = f(device, buf.as_mut_ptr(), buf.len() as c_uint);

    if ret == nvmlReturn_enum_NVML_SUCCESS {
        Ok(())
    } else {
        Err(NvmlError::UnderlyingCallFailed)
    }
}

/// Same as [`get_text_property`], for integer-valued getters.
pub fn get_int_property<F>(f: F, device: nvmlDevice_t, property: &mut c_uint) -> Result<()>
where
    F: FnOnce(nvmlDevice_t, *mut c_uint) -> nvmlReturn_enum,
{
    let ret = f(device, property as *mut c_uint);

    if ret == nvmlReturn_enum_NVML_SUCCESS {
        Ok(())
    } else {
        Err(NvmlError::UnderlyingCallFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn text_success_writes_through_to_buffer() {
        let mut buf = [0 as c_char; 16];

        let result = get_text_property(
            |_, out, _| {
                unsafe {
                    *out = b'O' as c_char;
                    *out.add(1) = b'K' as c_char;
                }
                nvmlReturn_enum_NVML_SUCCESS
            },
            ptr::null_mut(),
            &mut buf,
        );

        assert!(result.is_ok());
        assert_eq!(buf[0], b'O' as c_char);
        assert_eq!(buf[1], b'K' as c_char);
        assert_eq!(buf[2], 0);
    }

    #[test]
    fn text_failure_leaves_buffer_untouched() {
        let mut buf = [7 as c_char; 8];

        // NVML_ERROR_NOT_SUPPORTED
        let result = get_text_property(|_, _, _| 3, ptr::null_mut(), &mut buf);

        assert!(matches!(result, Err(NvmlError::UnderlyingCallFailed)));
        assert_eq!(buf, [7 as c_char; 8]);
    }

    #[test]
    fn text_arguments_reach_accessor_unchanged() {
        let device = 0x4242usize as nvmlDevice_t;
        let mut buf = [0 as c_char; 12];
        let expected_ptr = buf.as_mut_ptr();
        let mut seen = None;

        get_text_property(
            |dev, out, len| {
                seen = Some((dev, out, len));
                nvmlReturn_enum_NVML_SUCCESS
            },
            device,
            &mut buf,
        )
        .unwrap();

        let (dev, out, len) = seen.unwrap();
        assert_eq!(dev, device);
        assert_eq!(out, expected_ptr);
        assert_eq!(len, 12);
    }

    #[test]
    fn int_success_writes_through_to_slot() {
        let mut value: c_uint = 0;

        let result = get_int_property(
            |_, out| {
                unsafe { *out = 42 };
                nvmlReturn_enum_NVML_SUCCESS
            },
            ptr::null_mut(),
            &mut value,
        );

        assert!(result.is_ok());
        assert_eq!(value, 42);
    }

    #[test]
    fn int_arguments_reach_accessor_unchanged() {
        let device = 0x1d0usize as nvmlDevice_t;
        let mut value: c_uint = 0;
        let expected_ptr = &mut value as *mut c_uint;
        let mut seen = None;

        get_int_property(
            |dev, out| {
                seen = Some((dev, out));
                nvmlReturn_enum_NVML_SUCCESS
            },
            device,
            &mut value,
        )
        .unwrap();

        let (dev, out) = seen.unwrap();
        assert_eq!(dev, device);
        assert_eq!(out, expected_ptr);
    }

    #[test]
    fn every_non_success_status_collapses_to_failure() {
        // UNINITIALIZED, INVALID_ARGUMENT, NOT_SUPPORTED, NO_PERMISSION,
        // INSUFFICIENT_SIZE, UNKNOWN
        for status in [1u32, 2, 3, 4, 7, 999] {
            let mut value: c_uint = 5;

            let result = get_int_property(|_, _| status, ptr::null_mut(), &mut value);

            assert!(matches!(result, Err(NvmlError::UnderlyingCallFailed)));
            assert_eq!(value, 5, "failing call must not alter the slot");
        }
    }
}
