use vellum_rt::ObjRef;

use crate::handles::copy_anchor;
use crate::ir;
use crate::refs;

/// A detached `ret`, anchored to the context handle. The foreign
/// instruction is owned by nobody until appended to a block.
pub fn ret_new(val: Option<&ObjRef>, ctx: &ObjRef) -> ObjRef {
    unsafe {
        let operand = val.map(|v| refs::to_value(v));
        let inst = ir::ret_create(refs::to_context(ctx), operand);
        refs::value_ref(ctx.clone(), inst)
    }
}

/// The returned value of a `ret`, if any.
pub fn ret_get_value(inst: &ObjRef) -> Option<ObjRef> {
    unsafe {
        ir::ret_value(refs::to_instruction(inst))
            .map(|v| refs::value_ref(copy_anchor(inst), v))
    }
}

/// A detached integer `add` over two value handles of one integer type.
pub fn add_new(lhs: &ObjRef, rhs: &ObjRef, name: &ObjRef) -> ObjRef {
    unsafe {
        let inst = ir::add_create(refs::to_value(lhs), refs::to_value(rhs), name.as_str());
        refs::value_ref(copy_anchor(lhs), inst)
    }
}
