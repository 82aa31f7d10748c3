//! Helpers for NVML's C text buffers
//!
//! NVML text getters write NUL-terminated strings into caller-supplied
//! buffers sized by the `NVML_DEVICE_*_BUFFER_SIZE` constants. Bytes past
//! the terminator are garbage and must not end up in the returned string.

use std::os::raw::c_char;

/// Allocate a zeroed text buffer of `len` bytes for a property accessor.
pub fn text_buffer(len: usize) -> Vec<c_char> {
    vec![0; len]
}

/// Convert a C text buffer to a `String`, stopping at the first NUL.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn string_from_buf(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();

    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(buf: &mut [c_char], s: &str) {
        for (slot, byte) in buf.iter_mut().zip(s.bytes()) {
            *slot = byte as c_char;
        }
    }

    #[test]
    fn converts_up_to_the_terminator() {
        let mut buf = text_buffer(5);
        fill(&mut buf, "test");
        assert_eq!(string_from_buf(&buf), "test");
    }

    #[test]
    fn truncates_at_buffer_capacity() {
        let mut buf = text_buffer(4);
        fill(&mut buf, "testalongerstring");
        assert_eq!(string_from_buf(&buf), "test");
    }

    #[test]
    fn oversized_buffer_keeps_the_whole_string() {
        let mut buf = text_buffer(100);
        fill(&mut buf, "testalongerstring");
        assert_eq!(string_from_buf(&buf), "testalongerstring");
    }

    #[test]
    fn all_nul_buffer_is_empty_string() {
        let buf = text_buffer(8);
        assert_eq!(string_from_buf(&buf), "");
    }
}
