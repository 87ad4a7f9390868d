use vellum_rt::ObjRef;

use crate::handles::copy_anchor;
use crate::ir;
use crate::refs;

/// A handle owning a fresh module, anchored to its context handle.
pub fn module_new(name: &ObjRef, ctx: &ObjRef) -> ObjRef {
    unsafe {
        let ptr = ir::module_create(name.as_str(), refs::to_context(ctx));
        refs::module_ref(ctx.clone(), ptr)
    }
}

pub fn module_get_identifier(m: &ObjRef) -> ObjRef {
    ObjRef::string(unsafe { ir::module_identifier(refs::to_module(m)) })
}

pub fn module_set_identifier(m: &ObjRef, name: &ObjRef) {
    unsafe { ir::module_set_identifier(refs::to_module(m), name.as_str()) }
}

/// Renders the module as text.
pub fn module_print(m: &ObjRef) -> ObjRef {
    ObjRef::string(unsafe { ir::module_print(refs::to_module(m)) })
}

/// Moves foreign ownership of the function into the module. The function
/// handle stays valid: it never owned the pointer.
pub fn module_append_function(m: &ObjRef, f: &ObjRef) {
    unsafe { ir::module_append_function(refs::to_module(m), refs::to_function(f)) }
}

/// Moves foreign ownership of the global variable into the module.
pub fn module_append_global(m: &ObjRef, g: &ObjRef) {
    unsafe { ir::module_append_global(refs::to_module(m), refs::to_global_variable(g)) }
}

/// Looks up a function by name, wrapping it anchored like any other value.
pub fn module_get_function(m: &ObjRef, name: &ObjRef) -> Option<ObjRef> {
    unsafe {
        ir::module_get_function(refs::to_module(m), name.as_str())
            .map(|f| refs::value_ref(copy_anchor(m), f))
    }
}
