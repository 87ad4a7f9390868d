use vellum_rt::ObjRef;

use crate::handles::copy_anchor;
use crate::ir;
use crate::refs;

/// The type of a value, wrapped with the same anchor as the value.
pub fn value_get_type(v: &ObjRef) -> ObjRef {
    unsafe { refs::type_ref(copy_anchor(v), ir::value_type(refs::to_value(v))) }
}

/// The context handle that (transitively) owns this value.
pub fn value_get_context(v: &ObjRef) -> ObjRef {
    copy_anchor(v)
}

pub fn value_has_name(v: &ObjRef) -> bool {
    unsafe { ir::value_has_name(refs::to_value(v)) }
}

/// The value's name, or the empty string when it has none.
pub fn value_get_name(v: &ObjRef) -> ObjRef {
    ObjRef::string(unsafe { ir::value_name(refs::to_value(v)) })
}

/// Sets the value's name; an empty string removes it.
pub fn value_set_name(name: &ObjRef, v: &ObjRef) {
    unsafe { ir::value_set_name(refs::to_value(v), name.as_str()) }
}

/// Renders the value for debugging.
pub fn value_print(v: &ObjRef) -> ObjRef {
    ObjRef::string(unsafe { ir::value_print(refs::to_value(v)) })
}
