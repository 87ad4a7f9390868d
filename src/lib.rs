//! Vellum: collector-safe handles into a manually managed IR library.
//!
//! The host side ([`vellum_rt`]) is a reference-counted heap with finalize
//! and trace hooks; the foreign side ([`vellum_ir`]) is a raw-pointer object
//! graph whose ownership lives in the graph itself. This crate is the bridge
//! between them. It guarantees that no foreign object is freed while the
//! host still holds a handle to it, that every foreign object the bridge
//! allocates is freed exactly once, and that the host collector can reason
//! about foreign liveness without understanding foreign pointers.
//!
//! The mechanism is small: handles come in three ownership shapes
//! (exclusive, borrowed, linked), and every cross-boundary liveness
//! dependency becomes an anchor, an ordinary host reference from the
//! dependent handle to the handle that keeps its memory alive. The host
//! collector then sees nothing unusual, and cycle reclamation keeps working.
//! Beside the handles sits the bignum marshaling layer, which moves host
//! integers in and out of the foreign fixed-width bit vectors without
//! precision loss.
//!
//! Two handles wrapping the same foreign pointer are distinct host objects;
//! the bridge never deduplicates and offers no foreign-object equality.

pub use vellum_ir as ir;
pub use vellum_rt as rt;

pub mod api;
mod class;
mod error;
mod handles;
mod marshal;
pub mod refs;

pub use class::Shape;
pub use error::BridgeError;
pub use handles::{
    borrow_anchor, copy_anchor, make_borrowed, make_exclusive, make_linked_borrowed,
    make_linked_exclusive, unwrap_borrowed, unwrap_exclusive, unwrap_linked,
};
pub use marshal::{ap_of_int, ap_of_nat, int_from_ap, nat_from_ap};

#[cfg(test)]
mod tests;
