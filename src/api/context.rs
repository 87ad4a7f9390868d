use vellum_rt::ObjRef;

use crate::ir;
use crate::refs;

/// A handle owning a fresh foreign context.
pub fn context_new() -> ObjRef {
    unsafe { refs::context_ref(ir::context_create()) }
}
