//! Host object kernel for the vellum bridge.
//!
//! This crate models the managed side of the boundary: a reference-counted
//! heap of opaque objects (`ObjRef`), external objects carrying a
//! `(finalize, trace)` callback pair, a deferred collector that can reclaim
//! reference cycles, and the numeric object layouts (tagged small integers
//! plus sign-and-magnitude big integers) the bridge marshals through.
//!
//! Reference counting is immediate; reclamation is not. Dropping the last
//! `ObjRef` to an object parks it on a pending queue, and [`collect`] is the
//! only place finalizers run. That keeps finalize and trace callbacks off the
//! mutator stack, which is what the bridge's callback contract requires.

mod bignum;
mod heap;
mod obj;

pub use bignum::{bit_len, trim_words};
pub use heap::{
    ExternalClass, Tracer, alloc_external, collect, live_count, nop_finalize, nop_trace,
    register_class,
};
pub use obj::{Body, ObjRef, SMALL_BITS};
