use vellum_rt::ObjRef;

use crate::ir::GenericValue;
use crate::marshal::{ap_of_int, ap_of_nat, int_from_ap, nat_from_ap};
use crate::refs;

fn wrap(gv: GenericValue) -> ObjRef {
    unsafe { refs::generic_value_ref(Box::into_raw(Box::new(gv))) }
}

/// A generic value holding a host integer at the given bit width.
pub fn generic_value_of_int(int: &ObjRef, bit_width: u32) -> ObjRef {
    wrap(GenericValue {
        int_val: Some(ap_of_int(bit_width, int)),
        ..GenericValue::default()
    })
}

/// The integer payload, read back signed.
pub fn generic_value_to_int(gv: &ObjRef) -> ObjRef {
    unsafe {
        let ap = (*refs::to_generic_value(gv))
            .int_val
            .clone()
            .expect("generic value holds no integer");
        int_from_ap(&ap)
    }
}

/// A generic value holding a host natural at the given bit width.
pub fn generic_value_of_nat(nat: &ObjRef, bit_width: u32) -> ObjRef {
    wrap(GenericValue {
        int_val: Some(ap_of_nat(bit_width, nat)),
        ..GenericValue::default()
    })
}

/// The integer payload, read back unsigned.
pub fn generic_value_to_nat(gv: &ObjRef) -> ObjRef {
    unsafe {
        let ap = (*refs::to_generic_value(gv))
            .int_val
            .clone()
            .expect("generic value holds no integer");
        nat_from_ap(&ap)
    }
}

/// A generic value holding a double.
pub fn generic_value_of_float(val: f64) -> ObjRef {
    wrap(GenericValue {
        double_val: val,
        ..GenericValue::default()
    })
}

pub fn generic_value_to_float(gv: &ObjRef) -> f64 {
    unsafe { (*refs::to_generic_value(gv)).double_val }
}

/// An aggregate generic value copied from a host array of generic value
/// handles.
pub fn generic_value_of_array(vals: &ObjRef) -> ObjRef {
    let aggregate = vals
        .array_items()
        .iter()
        .map(|h| unsafe { (*refs::to_generic_value(h)).clone() })
        .collect();
    wrap(GenericValue {
        aggregate,
        ..GenericValue::default()
    })
}

/// The aggregate elements, each re-wrapped as a fresh handle.
pub fn generic_value_to_array(gv: &ObjRef) -> ObjRef {
    unsafe {
        let items = (*refs::to_generic_value(gv))
            .aggregate
            .iter()
            .map(|v| wrap(v.clone()))
            .collect();
        ObjRef::array(items)
    }
}
