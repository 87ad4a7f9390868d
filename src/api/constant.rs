use vellum_rt::ObjRef;

use crate::handles::copy_anchor;
use crate::ir;
use crate::marshal::{ap_of_int, ap_of_nat, int_from_ap, nat_from_ap};
use crate::refs;

/// The null (all-zeros) constant of the given type.
pub fn const_null(ty: &ObjRef) -> ObjRef {
    unsafe { refs::value_ref(copy_anchor(ty), ir::const_null(refs::to_type(ty))) }
}

/// The all-ones constant of the given type.
pub fn const_all_ones(ty: &ObjRef) -> ObjRef {
    unsafe { refs::value_ref(copy_anchor(ty), ir::const_all_ones(refs::to_type(ty))) }
}

/// An integer constant from a host integer, truncated or sign-extended to
/// the type's width.
pub fn const_int(int: &ObjRef, ty: &ObjRef) -> ObjRef {
    unsafe {
        let raw = refs::to_type(ty);
        let ap = ap_of_int(ir::type_int_width(raw), int);
        refs::value_ref(copy_anchor(ty), ir::const_int(raw, ap))
    }
}

/// An integer constant from a host natural, truncated or zero-extended to
/// the type's width.
pub fn const_nat(nat: &ObjRef, ty: &ObjRef) -> ObjRef {
    unsafe {
        let raw = refs::to_type(ty);
        let ap = ap_of_nat(ir::type_int_width(raw), nat);
        refs::value_ref(copy_anchor(ty), ir::const_int(raw, ap))
    }
}

/// The signed value of an integer constant, as a host integer.
pub fn const_int_get_value(c: &ObjRef) -> ObjRef {
    int_from_ap(&unsafe { ir::const_int_value(refs::to_constant_int(c)) })
}

/// The unsigned value of an integer constant, as a host natural.
pub fn const_int_get_nat_value(c: &ObjRef) -> ObjRef {
    nat_from_ap(&unsafe { ir::const_int_value(refs::to_constant_int(c)) })
}
