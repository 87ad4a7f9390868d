use vellum_rt::ObjRef;

use crate::handles::copy_anchor;
use crate::ir;
use crate::ir::{Linkage, ThreadLocalMode};
use crate::refs;

/// A detached global variable without an initializer, anchored like the
/// type it came from.
#[allow(clippy::too_many_arguments)]
pub fn global_variable_new(
    ty: &ObjRef,
    is_constant: bool,
    linkage: Linkage,
    name: &ObjRef,
    tls_mode: ThreadLocalMode,
    addr_space: u32,
    externally_initialized: bool,
) -> ObjRef {
    unsafe {
        let g = ir::global_variable_create(
            refs::to_type(ty),
            is_constant,
            linkage,
            name.as_str(),
            tls_mode,
            addr_space,
            externally_initialized,
            None,
        );
        refs::value_ref(copy_anchor(ty), g)
    }
}

/// A detached global variable with an initializer.
#[allow(clippy::too_many_arguments)]
pub fn global_variable_new_with_init(
    ty: &ObjRef,
    is_constant: bool,
    linkage: Linkage,
    initializer: &ObjRef,
    name: &ObjRef,
    tls_mode: ThreadLocalMode,
    addr_space: u32,
    externally_initialized: bool,
) -> ObjRef {
    unsafe {
        let g = ir::global_variable_create(
            refs::to_type(ty),
            is_constant,
            linkage,
            name.as_str(),
            tls_mode,
            addr_space,
            externally_initialized,
            Some(refs::to_constant_int(initializer)),
        );
        refs::value_ref(copy_anchor(ty), g)
    }
}

pub fn global_variable_is_constant(g: &ObjRef) -> bool {
    unsafe { ir::global_variable_is_constant(refs::to_global_variable(g)) }
}

pub fn global_variable_set_constant(is_constant: bool, g: &ObjRef) {
    unsafe { ir::global_variable_set_constant(refs::to_global_variable(g), is_constant) }
}

pub fn global_variable_has_initializer(g: &ObjRef) -> bool {
    unsafe { ir::global_variable_has_initializer(refs::to_global_variable(g)) }
}

/// The initializer. Only call when `global_variable_has_initializer`.
pub fn global_variable_get_initializer(g: &ObjRef) -> ObjRef {
    unsafe {
        let init = ir::global_variable_initializer(refs::to_global_variable(g));
        refs::value_ref(copy_anchor(g), init)
    }
}

pub fn global_variable_set_initializer(initializer: &ObjRef, g: &ObjRef) {
    unsafe {
        ir::global_variable_set_initializer(
            refs::to_global_variable(g),
            refs::to_constant_int(initializer),
        )
    }
}

pub fn global_variable_remove_initializer(g: &ObjRef) {
    unsafe { ir::global_variable_remove_initializer(refs::to_global_variable(g)) }
}

pub fn global_variable_is_externally_initialized(g: &ObjRef) -> bool {
    unsafe { ir::global_variable_is_externally_initialized(refs::to_global_variable(g)) }
}

pub fn global_variable_set_externally_initialized(flag: bool, g: &ObjRef) {
    unsafe { ir::global_variable_set_externally_initialized(refs::to_global_variable(g), flag) }
}
