//! Ownership wrappers: constructing and destructuring handles.
//!
//! A handle is a collector-tracked host object wrapping exactly one foreign
//! pointer (plus, for the linked shapes, one anchor reference to another
//! handle known to outlive the payload). Identity is per call: wrapping the
//! same pointer twice yields two distinct handles.
//!
//! Safety: the constructors take over whatever liveness story the caller
//! had. `make_exclusive` must receive a pointer nothing else will free;
//! `make_borrowed` and the linked-borrowed shape must only wrap pointers
//! whose owner the anchor (transitively) keeps alive.

use core::ffi::c_void;

use vellum_rt::{ObjRef, alloc_external};

use crate::class::{Link, Shape, class_for, is_linked_class};

/// Wraps `ptr`, transferring ownership of it to the handle.
pub unsafe fn make_exclusive<T: 'static>(ptr: *mut T) -> ObjRef {
    assert!(!ptr.is_null(), "wrapping a null foreign pointer");
    alloc_external(class_for::<T>(Shape::Exclusive), ptr as *mut c_void)
}

/// Wraps `ptr` without ownership. Only safe while something else keeps the
/// pointee alive; in practice the payload half of a linked pair.
pub unsafe fn make_borrowed<T: 'static>(ptr: *mut T) -> ObjRef {
    assert!(!ptr.is_null(), "wrapping a null foreign pointer");
    alloc_external(class_for::<T>(Shape::Borrowed), ptr as *mut c_void)
}

/// Wraps an owned `ptr` pinned to `anchor`. Consumes one reference to the
/// anchor; it is released when the handle finalizes, after the payload is
/// freed.
pub unsafe fn make_linked_exclusive<T: 'static>(anchor: ObjRef, ptr: *mut T) -> ObjRef {
    assert!(!ptr.is_null(), "wrapping a null foreign pointer");
    let link = Box::into_raw(Box::new(Link { anchor, ptr }));
    alloc_external(class_for::<T>(Shape::LinkedExclusive), link as *mut c_void)
}

/// Wraps a borrowed `ptr` pinned to `anchor`: the anchor is what keeps the
/// pointee's true owner alive.
pub unsafe fn make_linked_borrowed<T: 'static>(anchor: ObjRef, ptr: *mut T) -> ObjRef {
    assert!(!ptr.is_null(), "wrapping a null foreign pointer");
    let link = Box::into_raw(Box::new(Link { anchor, ptr }));
    alloc_external(class_for::<T>(Shape::LinkedBorrowed), link as *mut c_void)
}

/// The anchor of a linked handle, without touching its count. Valid only as
/// long as `h` is.
pub fn borrow_anchor(h: &ObjRef) -> &ObjRef {
    assert!(
        is_linked_class(h.external_class()),
        "handle has no anchor slot"
    );
    // Link<T> is repr(C) with the anchor first, for every T.
    unsafe { &*(h.external_data() as *const ObjRef) }
}

/// The anchor of a linked handle, with its count incremented. For anchors
/// that must outlive the current call, e.g. stored in a new handle.
pub fn copy_anchor(h: &ObjRef) -> ObjRef {
    borrow_anchor(h).clone()
}

/// The pointer inside an exclusive handle.
pub unsafe fn unwrap_exclusive<T: 'static>(h: &ObjRef) -> *mut T {
    assert!(
        std::ptr::eq(h.external_class(), class_for::<T>(Shape::Exclusive)),
        "handle class mismatch"
    );
    h.external_data() as *mut T
}

/// The pointer inside a borrowed handle.
pub unsafe fn unwrap_borrowed<T: 'static>(h: &ObjRef) -> *mut T {
    assert!(
        std::ptr::eq(h.external_class(), class_for::<T>(Shape::Borrowed)),
        "handle class mismatch"
    );
    h.external_data() as *mut T
}

/// The payload pointer inside a linked handle of either payload policy.
pub unsafe fn unwrap_linked<T: 'static>(h: &ObjRef) -> *mut T {
    let class = h.external_class();
    assert!(
        std::ptr::eq(class, class_for::<T>(Shape::LinkedExclusive))
            || std::ptr::eq(class, class_for::<T>(Shape::LinkedBorrowed)),
        "handle class mismatch"
    );
    unsafe { (*(h.external_data() as *mut Link<T>)).ptr }
}
