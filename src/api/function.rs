use vellum_rt::ObjRef;

use crate::handles::copy_anchor;
use crate::ir;
use crate::refs;

pub use crate::ir::Linkage;

/// A detached function built from a function type handle, anchored like the
/// type it came from.
pub fn function_new(fn_ty: &ObjRef, name: &ObjRef, linkage: Linkage, addr_space: u32) -> ObjRef {
    unsafe {
        let f = ir::function_create(refs::to_type(fn_ty), name.as_str(), linkage, addr_space);
        refs::value_ref(copy_anchor(fn_ty), f)
    }
}

pub fn function_arg_count(f: &ObjRef) -> u32 {
    unsafe { ir::function_arg_count(refs::to_function(f)) }
}

/// The `index`th argument, as a value handle sharing the function's anchor.
pub fn function_get_arg(f: &ObjRef, index: u32) -> ObjRef {
    unsafe {
        let arg = ir::function_arg(refs::to_function(f), index);
        refs::value_ref(copy_anchor(f), arg)
    }
}

/// Appends the block, transferring its foreign ownership to the function.
pub fn function_append_basic_block(bb: &ObjRef, f: &ObjRef) {
    unsafe { ir::function_append_block(refs::to_function(f), refs::to_block(bb)) }
}

/// The function's blocks, as a host array of value handles.
pub fn function_get_basic_blocks(f: &ObjRef) -> ObjRef {
    unsafe {
        let blocks = ir::function_blocks(refs::to_function(f));
        ObjRef::array(
            blocks
                .into_iter()
                .map(|b| refs::value_ref(copy_anchor(f), b))
                .collect(),
        )
    }
}
