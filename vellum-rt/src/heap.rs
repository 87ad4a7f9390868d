//! The heap: allocation, reference counting, and the collector.
//!
//! Reclamation is deferred. `dec` parks a dead object on a pending queue and
//! [`collect`] is the only code that runs finalizers, so callbacks never see
//! mutator frames below them. `collect` also runs a trial-deletion cycle
//! pass: internal reference counts are computed by tracing every live object
//! (structurally for arrays, through the registered callback for externals);
//! an object whose whole count is internal and which is unreachable from any
//! externally-held object is garbage even though its count never hit zero.

use core::ffi::c_void;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::Ordering;

use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::obj::{Body, Obj, ObjRef, STATE_CONDEMNED, STATE_LIVE, STATE_PENDING};

/// Callback pair the collector invokes on an external object.
///
/// `finalize` runs exactly once, when the object is reclaimed. `trace`
/// reports every host reference the external payload keeps alive, so cycle
/// analysis can see through it without understanding the payload.
pub struct ExternalClass {
    pub(crate) finalize: unsafe fn(*mut c_void),
    pub(crate) trace: unsafe fn(*mut c_void, &mut Tracer),
}

/// Interns a callback pair. Every call mints a distinct class object; callers
/// that need one class per payload type keep their own registry.
pub fn register_class(
    finalize: unsafe fn(*mut c_void),
    trace: unsafe fn(*mut c_void, &mut Tracer),
) -> &'static ExternalClass {
    Box::leak(Box::new(ExternalClass { finalize, trace }))
}

/// Finalize callback for externals that own nothing.
pub unsafe fn nop_finalize(_data: *mut c_void) {}

/// Trace callback for externals that keep nothing alive.
pub unsafe fn nop_trace(_data: *mut c_void, _tracer: &mut Tracer) {}

/// Visitor handed to trace callbacks during cycle analysis.
pub struct Tracer<'a> {
    sink: &'a mut dyn FnMut(&ObjRef),
}

impl Tracer<'_> {
    /// Reports a host object the traced external keeps alive.
    pub fn visit(&mut self, r: &ObjRef) {
        (self.sink)(r)
    }
}

// Registry of every live heap object, for the cycle pass.
static LIVE: Lazy<Mutex<HashSet<usize>>> = Lazy::new(|| Mutex::new(HashSet::new()));
// Objects whose count reached zero, awaiting the next collect.
static PENDING: Lazy<Mutex<Vec<usize>>> = Lazy::new(|| Mutex::new(Vec::new()));
// Serializes whole collections.
static COLLECT: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub(crate) fn alloc(body: Body) -> ObjRef {
    let obj = Box::new(Obj {
        rc: 1.into(),
        state: STATE_LIVE.into(),
        body,
    });
    let p = Box::into_raw(obj);
    LIVE.lock().unwrap().insert(p as usize);
    ObjRef::from_heap(p)
}

/// Allocates an external object for `data` under `class`.
pub fn alloc_external(class: &'static ExternalClass, data: *mut c_void) -> ObjRef {
    alloc(Body::External { class, data })
}

pub(crate) unsafe fn inc(p: *mut Obj) {
    unsafe {
        (*p).rc.fetch_add(1, Ordering::Relaxed);
    }
}

pub(crate) unsafe fn dec(p: *mut Obj) {
    unsafe {
        if (*p).rc.fetch_sub(1, Ordering::Release) != 1 {
            return;
        }
        std::sync::atomic::fence(Ordering::Acquire);
        // The condemned state belongs to the cycle pass; it frees the object
        // itself, so a late decrement must not queue it a second time.
        let queued = (*p)
            .state
            .compare_exchange(STATE_LIVE, STATE_PENDING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if queued {
            PENDING.lock().unwrap().push(p as usize);
        }
    }
}

/// Runs the collector: drains the pending queue, then reclaims cycles.
///
/// On return, every object that was pending when the call began has been
/// finalized and freed.
pub fn collect() {
    let _guard = COLLECT.lock().unwrap();
    let drained = drain_pending();
    let cyclic = cycle_pass();
    // Cycle finalizers may release edges out of the garbage set.
    let drained = drained + drain_pending();
    if drained + cyclic > 0 {
        debug!(drained, cyclic, "collection reclaimed objects");
    }
}

/// Number of live heap objects, for diagnostics and tests.
pub fn live_count() -> usize {
    LIVE.lock().unwrap().len()
}

fn drain_pending() -> usize {
    let mut freed = 0;
    loop {
        let Some(p) = PENDING.lock().unwrap().pop() else {
            return freed;
        };
        unsafe { free_obj(p as *mut Obj) };
        freed += 1;
    }
}

// Finalizes and frees one object. Dropping the body releases child
// references, which may park more objects on the pending queue.
unsafe fn free_obj(p: *mut Obj) {
    LIVE.lock().unwrap().remove(&(p as usize));
    unsafe {
        let obj = Box::from_raw(p);
        if let Body::External { class, data } = obj.body {
            (class.finalize)(data);
        }
    }
}

// Trial deletion. A reference cycle keeps every member's count positive, but
// the counts are fully explained by edges inside the live set; any object
// with count to spare is externally held and roots a reachable region.
fn cycle_pass() -> usize {
    let live: Vec<usize> = LIVE.lock().unwrap().iter().copied().collect();
    if live.is_empty() {
        return 0;
    }
    let live_set: HashSet<usize> = live.iter().copied().collect();

    let mut internal: HashMap<usize, usize> = HashMap::new();
    for &p in &live {
        unsafe {
            trace_edges(p as *mut Obj, &mut |child| {
                if live_set.contains(&child) {
                    *internal.entry(child).or_insert(0) += 1;
                }
            });
        }
    }

    // Counts are snapshotted once; concurrent decrements can only make the
    // snapshot an overestimate, which errs toward keeping objects alive.
    let mut stack: Vec<usize> = live
        .iter()
        .copied()
        .filter(|&p| unsafe {
            let obj = &*(p as *mut Obj);
            obj.state.load(Ordering::Acquire) == STATE_LIVE
                && obj.rc.load(Ordering::Acquire) > internal.get(&p).copied().unwrap_or(0)
        })
        .collect();

    let mut reachable: HashSet<usize> = stack.iter().copied().collect();
    while let Some(p) = stack.pop() {
        unsafe {
            trace_edges(p as *mut Obj, &mut |child| {
                if live_set.contains(&child) && reachable.insert(child) {
                    stack.push(child);
                }
            });
        }
    }

    // Objects whose count already hit zero belong to an in-flight decrement
    // and will drain through the pending queue; a garbage cycle's members
    // always keep a positive count, so skipping them loses nothing.
    let garbage: Vec<usize> = live
        .iter()
        .copied()
        .filter(|&p| unsafe {
            let obj = &*(p as *mut Obj);
            !reachable.contains(&p)
                && obj.state.load(Ordering::Acquire) == STATE_LIVE
                && obj.rc.load(Ordering::Acquire) > 0
        })
        .collect();
    if garbage.is_empty() {
        return 0;
    }

    trace!(count = garbage.len(), "condemning cyclic garbage");
    {
        let mut live_lock = LIVE.lock().unwrap();
        for &p in &garbage {
            unsafe {
                (*(p as *mut Obj)).state.store(STATE_CONDEMNED, Ordering::Release);
            }
            live_lock.remove(&p);
        }
    }
    // Decrements against condemned members are inert, so finalizer order
    // inside the garbage set does not matter; edges leaving the set are
    // released normally and drain with the next pending sweep.
    for &p in &garbage {
        unsafe {
            let obj = Box::from_raw(p as *mut Obj);
            if let Body::External { class, data } = obj.body {
                (class.finalize)(data);
            }
        }
    }
    garbage.len()
}

unsafe fn trace_edges(p: *mut Obj, sink: &mut dyn FnMut(usize)) {
    unsafe {
        match &(*p).body {
            Body::Array(items) => {
                for r in items {
                    if let Some(c) = r.heap_ptr() {
                        sink(c as usize);
                    }
                }
            }
            Body::External { class, data } => {
                let mut forward = |r: &ObjRef| {
                    if let Some(c) = r.heap_ptr() {
                        sink(c as usize);
                    }
                };
                let mut tracer = Tracer { sink: &mut forward };
                (class.trace)(*data, &mut tracer);
            }
            _ => {}
        }
    }
}
