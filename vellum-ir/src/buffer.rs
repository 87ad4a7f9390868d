//! Memory buffers: byte storage handed across the boundary by value.

use std::io;
use std::path::Path;

pub struct MemoryBuffer {
    data: Vec<u8>,
}

/// Reads a whole file into a fresh buffer.
pub unsafe fn buffer_from_file(path: &Path) -> io::Result<*mut MemoryBuffer> {
    let data = std::fs::read(path)?;
    Ok(Box::into_raw(Box::new(MemoryBuffer { data })))
}

pub unsafe fn buffer_from_bytes(bytes: &[u8]) -> *mut MemoryBuffer {
    Box::into_raw(Box::new(MemoryBuffer {
        data: bytes.to_vec(),
    }))
}

pub unsafe fn buffer_dispose(buf: *mut MemoryBuffer) {
    unsafe { drop(Box::from_raw(buf)) }
}

pub unsafe fn buffer_size(buf: *mut MemoryBuffer) -> usize {
    unsafe { (*buf).data.len() }
}

/// Borrows the buffer contents; valid while the buffer is.
pub unsafe fn buffer_data<'a>(buf: *mut MemoryBuffer) -> &'a [u8] {
    unsafe { &(*buf).data }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_round_trip() {
        unsafe {
            let buf = buffer_from_bytes(b"vellum");
            assert_eq!(buffer_size(buf), 6);
            assert_eq!(buffer_data(buf), b"vellum");
            buffer_dispose(buf);
        }
    }

    #[test]
    fn missing_file_reports_io_error() {
        unsafe {
            let err = buffer_from_file(Path::new("/nonexistent/vellum-buffer"));
            assert!(err.is_err());
        }
    }
}
