//! Per-entity constructors: the one wrap and one unwrap path per foreign
//! element kind.
//!
//! The ownership mode of each kind is fixed by the foreign graph, not by the
//! call site: contexts, buffers, generic values, and engines are exclusive
//! (the host created them and nothing in the foreign graph claims them);
//! modules are linked-exclusive anchored to their context handle; types and
//! values of every subtype are linked-borrowed anchored to the context
//! handle, because the context (or a module reachable through its anchor)
//! owns their memory.

use vellum_rt::ObjRef;

use crate::handles::{make_exclusive, make_linked_borrowed, make_linked_exclusive,
    unwrap_exclusive, unwrap_linked};
use crate::ir;

pub unsafe fn context_ref(ptr: *mut ir::Context) -> ObjRef {
    unsafe { make_exclusive(ptr) }
}

pub unsafe fn to_context(h: &ObjRef) -> *mut ir::Context {
    unsafe { unwrap_exclusive(h) }
}

/// Wraps a module, consuming one reference to its context handle.
pub unsafe fn module_ref(ctx: ObjRef, ptr: *mut ir::Module) -> ObjRef {
    unsafe { make_linked_exclusive(ctx, ptr) }
}

pub unsafe fn to_module(h: &ObjRef) -> *mut ir::Module {
    unsafe { unwrap_linked(h) }
}

/// Wraps a type, consuming one reference to its context handle.
pub unsafe fn type_ref(ctx: ObjRef, ptr: *mut ir::Type) -> ObjRef {
    unsafe { make_linked_borrowed(ctx, ptr) }
}

pub unsafe fn to_type(h: &ObjRef) -> *mut ir::Type {
    unsafe { unwrap_linked(h) }
}

/// Wraps a value of any subtype, consuming one reference to its context
/// handle.
pub unsafe fn value_ref(ctx: ObjRef, ptr: *mut ir::Value) -> ObjRef {
    unsafe { make_linked_borrowed(ctx, ptr) }
}

pub unsafe fn to_value(h: &ObjRef) -> *mut ir::Value {
    unsafe { unwrap_linked(h) }
}

// Subtype extraction is the shared value path plus a kind assertion, the
// moral equivalent of a checked downcast.

pub unsafe fn to_function(h: &ObjRef) -> *mut ir::Value {
    unsafe {
        let v = to_value(h);
        assert!(ir::value_is_function(v), "not a function handle");
        v
    }
}

pub unsafe fn to_block(h: &ObjRef) -> *mut ir::Value {
    unsafe {
        let v = to_value(h);
        assert!(ir::value_is_block(v), "not a basic block handle");
        v
    }
}

pub unsafe fn to_instruction(h: &ObjRef) -> *mut ir::Value {
    unsafe {
        let v = to_value(h);
        assert!(ir::value_is_instruction(v), "not an instruction handle");
        v
    }
}

pub unsafe fn to_global_variable(h: &ObjRef) -> *mut ir::Value {
    unsafe {
        let v = to_value(h);
        assert!(ir::value_is_global_variable(v), "not a global variable handle");
        v
    }
}

pub unsafe fn to_constant_int(h: &ObjRef) -> *mut ir::Value {
    unsafe {
        let v = to_value(h);
        assert!(ir::value_is_constant_int(v), "not an integer constant handle");
        v
    }
}

pub unsafe fn buffer_ref(ptr: *mut ir::MemoryBuffer) -> ObjRef {
    unsafe { make_exclusive(ptr) }
}

pub unsafe fn to_buffer(h: &ObjRef) -> *mut ir::MemoryBuffer {
    unsafe { unwrap_exclusive(h) }
}

pub unsafe fn generic_value_ref(ptr: *mut ir::GenericValue) -> ObjRef {
    unsafe { make_exclusive(ptr) }
}

pub unsafe fn to_generic_value(h: &ObjRef) -> *mut ir::GenericValue {
    unsafe { unwrap_exclusive(h) }
}

pub unsafe fn engine_ref(ptr: *mut ir::Engine) -> ObjRef {
    unsafe { make_exclusive(ptr) }
}

pub unsafe fn to_engine(h: &ObjRef) -> *mut ir::Engine {
    unsafe { unwrap_exclusive(h) }
}
