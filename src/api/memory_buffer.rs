use std::path::Path;

use tracing::debug;
use vellum_rt::ObjRef;

use crate::BridgeError;
use crate::ir;
use crate::refs;

/// Reads a file into a buffer handle.
pub fn buffer_from_file(path: &ObjRef) -> Result<ObjRef, BridgeError> {
    let path = path.as_str();
    let ptr = unsafe { ir::buffer_from_file(Path::new(path)) }.map_err(|source| {
        BridgeError::BufferIo {
            path: path.to_string(),
            source,
        }
    })?;
    debug!(path, size = unsafe { ir::buffer_size(ptr) }, "read buffer");
    Ok(unsafe { refs::buffer_ref(ptr) })
}

/// Copies a byte span into a buffer handle.
pub fn buffer_from_bytes(bytes: &[u8]) -> ObjRef {
    unsafe { refs::buffer_ref(ir::buffer_from_bytes(bytes)) }
}

pub fn buffer_size(buf: &ObjRef) -> usize {
    unsafe { ir::buffer_size(refs::to_buffer(buf)) }
}
