use vellum_rt::ObjRef;

use crate::handles::copy_anchor;
use crate::ir;
use crate::refs;

pub use crate::ir::TypeId;

/// The context handle that owns this type.
pub fn type_get_context(t: &ObjRef) -> ObjRef {
    copy_anchor(t)
}

pub fn type_get_id(t: &ObjRef) -> TypeId {
    unsafe { ir::type_id(refs::to_type(t)) }
}

/// Bit width of an integer type handle.
pub fn type_get_int_width(t: &ObjRef) -> u32 {
    unsafe { ir::type_int_width(refs::to_type(t)) }
}

pub fn type_get_void(ctx: &ObjRef) -> ObjRef {
    unsafe { refs::type_ref(ctx.clone(), ir::type_void(refs::to_context(ctx))) }
}

pub fn type_get_half(ctx: &ObjRef) -> ObjRef {
    unsafe { refs::type_ref(ctx.clone(), ir::type_half(refs::to_context(ctx))) }
}

pub fn type_get_float(ctx: &ObjRef) -> ObjRef {
    unsafe { refs::type_ref(ctx.clone(), ir::type_float(refs::to_context(ctx))) }
}

pub fn type_get_double(ctx: &ObjRef) -> ObjRef {
    unsafe { refs::type_ref(ctx.clone(), ir::type_double(refs::to_context(ctx))) }
}

pub fn type_get_int(ctx: &ObjRef, width: u32) -> ObjRef {
    unsafe { refs::type_ref(ctx.clone(), ir::type_int(refs::to_context(ctx), width)) }
}

pub fn type_get_pointer(ctx: &ObjRef, addr_space: u32) -> ObjRef {
    unsafe { refs::type_ref(ctx.clone(), ir::type_pointer(refs::to_context(ctx), addr_space)) }
}

/// A function type from a return type handle and a host array of parameter
/// type handles.
pub fn type_get_function(ret: &ObjRef, params: &ObjRef, vararg: bool) -> ObjRef {
    unsafe {
        let raw: Vec<*mut ir::Type> = params
            .array_items()
            .iter()
            .map(|h| refs::to_type(h))
            .collect();
        let ptr = ir::type_function(refs::to_type(ret), &raw, vararg);
        refs::type_ref(copy_anchor(ret), ptr)
    }
}

/// Parameter types of a function type, as a host array of type handles.
pub fn type_function_params(t: &ObjRef) -> ObjRef {
    unsafe {
        let params = ir::type_function_params(refs::to_type(t));
        ObjRef::array(
            params
                .into_iter()
                .map(|p| refs::type_ref(copy_anchor(t), p))
                .collect(),
        )
    }
}

pub fn type_function_return(t: &ObjRef) -> ObjRef {
    unsafe { refs::type_ref(copy_anchor(t), ir::type_function_return(refs::to_type(t))) }
}

pub fn type_function_is_vararg(t: &ObjRef) -> bool {
    unsafe { ir::type_function_is_vararg(refs::to_type(t)) }
}
