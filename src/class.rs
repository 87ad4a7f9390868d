//! Handle classes: one registered callback pair per foreign element type and
//! ownership shape.
//!
//! The runtime mints a fresh class object on every registration, so
//! uniqueness per `(type, shape)` lives here, in a registry keyed by
//! `TypeId`. Registration is idempotent and thread-safe; a handle's class is
//! how `unwrap` proves the caller and the constructor agreed on what the
//! handle holds.

use core::ffi::c_void;
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use once_cell::sync::Lazy;
use vellum_rt::{ExternalClass, ObjRef, Tracer, nop_finalize, nop_trace, register_class};

/// The ownership shape of a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// The handle owns the foreign object and frees it on finalize.
    Exclusive,
    /// The handle frees nothing; something else guarantees liveness.
    Borrowed,
    /// An anchor paired with an owned payload.
    LinkedExclusive,
    /// An anchor paired with a borrowed payload.
    LinkedBorrowed,
}

/// External payload of a linked handle. The anchor must stay the first
/// field: anchor access is untyped, through the record's address.
#[repr(C)]
pub(crate) struct Link<T> {
    pub(crate) anchor: ObjRef,
    pub(crate) ptr: *mut T,
}

static REGISTRY: Lazy<RwLock<HashMap<(TypeId, Shape), &'static ExternalClass>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

// Class addresses of every linked shape, for untyped anchor access.
static LINKED_CLASSES: Lazy<RwLock<HashSet<usize>>> = Lazy::new(|| RwLock::new(HashSet::new()));

/// The class for `T` handles of the given shape, registering on first use.
pub(crate) fn class_for<T: 'static>(shape: Shape) -> &'static ExternalClass {
    let key = (TypeId::of::<T>(), shape);
    if let Some(&class) = REGISTRY.read().unwrap().get(&key) {
        return class;
    }
    let mut registry = REGISTRY.write().unwrap();
    if let Some(&class) = registry.get(&key) {
        return class;
    }
    let class = match shape {
        Shape::Exclusive => register_class(exclusive_finalize::<T>, nop_trace),
        Shape::Borrowed => register_class(nop_finalize, nop_trace),
        Shape::LinkedExclusive => {
            register_class(linked_exclusive_finalize::<T>, linked_trace::<T>)
        }
        Shape::LinkedBorrowed => {
            register_class(linked_borrowed_finalize::<T>, linked_trace::<T>)
        }
    };
    if matches!(shape, Shape::LinkedExclusive | Shape::LinkedBorrowed) {
        LINKED_CLASSES
            .write()
            .unwrap()
            .insert(class as *const ExternalClass as usize);
    }
    registry.insert(key, class);
    class
}

pub(crate) fn is_linked_class(class: &'static ExternalClass) -> bool {
    LINKED_CLASSES
        .read()
        .unwrap()
        .contains(&(class as *const ExternalClass as usize))
}

unsafe fn exclusive_finalize<T>(data: *mut c_void) {
    unsafe { drop(Box::from_raw(data as *mut T)) }
}

// Payload first, then the anchor: the link record's drop releases the anchor
// after the owned pointer is gone.
unsafe fn linked_exclusive_finalize<T>(data: *mut c_void) {
    unsafe {
        let link = Box::from_raw(data as *mut Link<T>);
        drop(Box::from_raw(link.ptr));
    }
}

unsafe fn linked_borrowed_finalize<T>(data: *mut c_void) {
    unsafe { drop(Box::from_raw(data as *mut Link<T>)) }
}

unsafe fn linked_trace<T>(data: *mut c_void, tracer: &mut Tracer) {
    unsafe { tracer.visit(&(*(data as *mut Link<T>)).anchor) }
}
