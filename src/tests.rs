use std::sync::atomic::{AtomicUsize, Ordering};

use tap::Pipe;

use super::*;
use crate::ir::{EngineKind, EngineOptions, Linkage};
use vellum_rt::{ObjRef, collect};

/// Foreign payload with a deletion counter.
struct Probe {
    hits: &'static AtomicUsize,
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

fn probe_ptr(hits: &'static AtomicUsize) -> *mut Probe {
    Box::into_raw(Box::new(Probe { hits }))
}

fn s(text: &str) -> ObjRef {
    ObjRef::string(text)
}

// ---- ownership wrappers ---------------------------------------------------

#[test]
fn exclusive_deletes_exactly_once() {
    static HITS: AtomicUsize = AtomicUsize::new(0);
    let h = unsafe { make_exclusive(probe_ptr(&HITS)) };
    collect();
    assert_eq!(HITS.load(Ordering::SeqCst), 0);
    drop(h);
    collect();
    collect();
    assert_eq!(HITS.load(Ordering::SeqCst), 1);
}

#[test]
fn borrowed_never_frees_its_pointer() {
    static HITS: AtomicUsize = AtomicUsize::new(0);
    let ptr = probe_ptr(&HITS);
    let h = unsafe { make_borrowed(ptr) };
    drop(h);
    collect();
    assert_eq!(HITS.load(Ordering::SeqCst), 0, "borrowed handle freed its pointer");
    // The pointer is still valid; wrapping it again owned reclaims it.
    drop(unsafe { make_exclusive(ptr) });
    collect();
    assert_eq!(HITS.load(Ordering::SeqCst), 1);
}

#[test]
fn anchor_keeps_exclusive_alive() {
    static ANCHOR_HITS: AtomicUsize = AtomicUsize::new(0);
    let dep = Box::into_raw(Box::new(7u32));
    let e = unsafe { make_exclusive(probe_ptr(&ANCHOR_HITS)) };
    let t = unsafe { make_linked_borrowed(e.clone(), dep) };
    drop(e);
    collect();
    // The anchor chain is the only thing keeping the probe alive.
    assert_eq!(ANCHOR_HITS.load(Ordering::SeqCst), 0);
    assert_eq!(unsafe { *unwrap_linked::<u32>(&t) }, 7);
    drop(t);
    collect();
    assert_eq!(ANCHOR_HITS.load(Ordering::SeqCst), 1);
    unsafe { drop(Box::from_raw(dep)) };
}

#[test]
fn linked_exclusive_frees_payload_then_anchor() {
    static ANCHOR_HITS: AtomicUsize = AtomicUsize::new(0);
    static PAYLOAD_HITS: AtomicUsize = AtomicUsize::new(0);
    let e = unsafe { make_exclusive(probe_ptr(&ANCHOR_HITS)) };
    let t = unsafe { make_linked_exclusive(e.clone(), probe_ptr(&PAYLOAD_HITS)) };
    drop(e);
    collect();
    assert_eq!(PAYLOAD_HITS.load(Ordering::SeqCst), 0);
    drop(t);
    collect();
    assert_eq!(PAYLOAD_HITS.load(Ordering::SeqCst), 1);
    assert_eq!(ANCHOR_HITS.load(Ordering::SeqCst), 1);
}

#[test]
fn copy_anchor_extends_borrow_anchor_does_not() {
    static HITS: AtomicUsize = AtomicUsize::new(0);
    let dep = Box::into_raw(Box::new(1u8));
    let e = unsafe { make_exclusive(probe_ptr(&HITS)) };
    let t = unsafe { make_linked_borrowed(e.clone(), dep) };
    let before = borrow_anchor(&t).ref_count();
    let copied = copy_anchor(&t);
    assert_eq!(borrow_anchor(&t).ref_count(), before + 1);
    drop(e);
    drop(t);
    collect();
    // The copied anchor still pins the probe.
    assert_eq!(HITS.load(Ordering::SeqCst), 0);
    drop(copied);
    collect();
    assert_eq!(HITS.load(Ordering::SeqCst), 1);
    unsafe { drop(Box::from_raw(dep)) };
}

#[test]
fn handles_are_not_deduplicated() {
    static HITS: AtomicUsize = AtomicUsize::new(0);
    let ptr = probe_ptr(&HITS);
    let a = unsafe { make_borrowed(ptr) };
    let b = unsafe { make_borrowed(ptr) };
    assert_ne!(a.raw(), b.raw(), "two wraps produced one handle");
    assert_eq!(a.external_data(), b.external_data());
    drop(a);
    drop(b);
    collect();
    assert_eq!(HITS.load(Ordering::SeqCst), 0);
    unsafe { drop(Box::from_raw(ptr)) };
}

#[test]
#[should_panic(expected = "handle class mismatch")]
fn unwrap_checks_the_class() {
    static HITS: AtomicUsize = AtomicUsize::new(0);
    let h = unsafe { make_exclusive(probe_ptr(&HITS)) };
    let _ = unsafe { unwrap_exclusive::<u64>(&h) };
}

#[test]
#[should_panic(expected = "handle class mismatch")]
fn unwrap_checks_the_shape() {
    static HITS: AtomicUsize = AtomicUsize::new(0);
    let h = unsafe { make_exclusive(probe_ptr(&HITS)) };
    let _ = unsafe { unwrap_borrowed::<Probe>(&h) };
}

#[test]
#[should_panic(expected = "null foreign pointer")]
fn wrapping_null_is_fatal() {
    let _ = unsafe { make_exclusive::<Probe>(std::ptr::null_mut()) };
}

#[test]
#[should_panic(expected = "no anchor slot")]
fn exclusive_handles_have_no_anchor() {
    static HITS: AtomicUsize = AtomicUsize::new(0);
    let h = unsafe { make_exclusive(probe_ptr(&HITS)) };
    let _ = borrow_anchor(&h);
}

// ---- the collection scenario over real foreign objects --------------------

#[test]
fn context_outlives_its_last_handle_through_anchors() {
    let ctx = api::context_new();
    let ty = api::type_get_int(&ctx, 32);
    drop(ctx);
    collect();
    // Only the type handle's anchor keeps the context alive now; the
    // foreign type memory must still be readable through it.
    assert_eq!(api::type_get_int_width(&ty), 32);
    let ctx_again = api::type_get_context(&ty);
    assert_eq!(api::type_get_id(&ty), ir::TypeId::Integer);
    drop(ctx_again);
    drop(ty);
    collect();
}

// ---- bignum marshaling ----------------------------------------------------

const WIDTHS: [u32; 10] = [1, 7, 8, 31, 32, 63, 64, 65, 128, 257];

/// Magnitude words of `2^bit`.
fn pow2_words(bit: u32) -> Vec<u64> {
    let mut words = vec![0u64; bit as usize / 64 + 1];
    words[bit as usize / 64] = 1 << (bit % 64);
    words
}

/// Magnitude words of `2^bits - 1`.
fn ones_words(bits: u32) -> Vec<u64> {
    if bits == 0 {
        return Vec::new();
    }
    let mut words = vec![u64::MAX; bits.div_ceil(64) as usize];
    if bits % 64 != 0 {
        let last = words.len() - 1;
        words[last] = u64::MAX >> (64 - bits % 64);
    }
    words
}

fn signed_round_trip(bits: u32, neg: bool, words: &[u64]) {
    let host = ObjRef::int_from_parts(neg, words);
    let ap = ap_of_int(bits, &host);
    let back = int_from_ap(&ap);
    assert_eq!(
        back.int_parts(),
        host.int_parts(),
        "signed round trip failed at width {bits}"
    );
}

fn unsigned_round_trip(bits: u32, words: &[u64]) {
    let host = ObjRef::nat_from_words(words);
    let ap = ap_of_nat(bits, &host);
    let back = nat_from_ap(&ap);
    assert_eq!(
        back.nat_parts(),
        host.nat_parts(),
        "unsigned round trip failed at width {bits}"
    );
}

#[test]
fn bignum_round_trips_across_widths() {
    for &w in &WIDTHS {
        unsigned_round_trip(w, &[]);
        unsigned_round_trip(w, &ones_words(w));
        signed_round_trip(w, false, &[]);
        signed_round_trip(w, true, &[1]);
        if w > 1 {
            // min and max signed
            signed_round_trip(w, true, &pow2_words(w - 1));
            signed_round_trip(w, false, &ones_words(w - 1));
        }
    }
}

#[test]
fn out_of_range_values_truncate() {
    // 2^w truncates to zero unsigned.
    for &w in &WIDTHS {
        let too_big = ObjRef::nat_from_words(&pow2_words(w));
        assert_eq!(nat_from_ap(&ap_of_nat(w, &too_big)).nat_parts(), Vec::<u64>::new());
    }
    // 255 read back signed at width 8 is -1.
    let v = ObjRef::small_nat(255).unwrap();
    let back = int_from_ap(&ap_of_int(8, &v));
    assert_eq!(back.int_parts(), (true, vec![1]));
}

#[test]
fn fast_and_slow_paths_agree_at_the_word_boundary() {
    for w in 62..=66u32 {
        for &v in &[1u64 << 61, (1 << 62) - 1, 1 << 62, u64::MAX >> 1] {
            let fast = ap_of_nat(w, &ObjRef::small_nat(v).unwrap());
            let slow = ap_of_nat(w, &ObjRef::big_nat(vec![v]));
            assert_eq!(fast, slow, "unsigned disagreement at width {w} value {v}");
        }
        for &v in &[(1i64 << 61), -(1i64 << 61), (1 << 62) - 1, -(1i64 << 62)] {
            let fast = ap_of_int(w, &ObjRef::small_int(v).unwrap());
            let slow = ap_of_int(w, &ObjRef::big_int(v < 0, vec![v.unsigned_abs()]));
            assert_eq!(fast, slow, "signed disagreement at width {w} value {v}");
        }
    }
}

#[test]
fn signed_minimum_crosses_without_double_negation() {
    // -2^256 at width 257: the two's-complement minimum maps to itself
    // under negation, the classic double-negation trap.
    let host = ObjRef::int_from_parts(true, &pow2_words(256));
    let ap = ap_of_int(257, &host);
    assert!(ap.is_negative());
    assert_eq!(ap.min_signed_bits(), 257);
    let back = int_from_ap(&ap);
    assert_eq!(back.int_parts(), (true, pow2_words(256)));
}

// ---- wrapper layer end to end ---------------------------------------------

#[test]
fn module_builds_and_runs_through_handles() {
    let ctx = api::context_new();
    let i64t = api::type_get_int(&ctx, 64);
    let fn_ty = api::type_get_function(&i64t, &ObjRef::array(vec![i64t.clone(), i64t.clone()]), false);
    let f = api::function_new(&fn_ty, &s("add2"), Linkage::External, 0);
    api::value_set_name(&s("x"), &api::function_get_arg(&f, 0));
    api::value_set_name(&s("y"), &api::function_get_arg(&f, 1));

    let bb = api::basic_block_new(&s("entry"), &ctx);
    let sum = api::add_new(
        &api::function_get_arg(&f, 0),
        &api::function_get_arg(&f, 1),
        &s("sum"),
    );
    let ret = api::ret_new(Some(&sum), &ctx);
    api::basic_block_append_instruction(&sum, &bb);
    api::basic_block_append_instruction(&ret, &bb);
    api::function_append_basic_block(&bb, &f);

    let m = api::module_new(&s("demo"), &ctx);
    api::module_append_function(&m, &f);
    assert!(api::module_get_function(&m, &s("add2")).is_some());

    let text = api::module_print(&m);
    assert!(text.as_str().contains("define i64 @add2(i64 %x, i64 %y)"));

    let engine = api::engine_create_for_module(&m, EngineOptions::default()).unwrap();
    let args = ObjRef::array(vec![
        api::generic_value_of_nat(&ObjRef::small_nat(40).unwrap(), 64),
        api::generic_value_of_nat(&ObjRef::small_nat(2).unwrap(), 64),
    ]);
    let out = api::engine_run_function(&f, &args, &engine)
        .unwrap()
        .pipe(|gv| api::generic_value_to_nat(&gv));
    assert_eq!(out.nat_parts(), vec![42]);

    // Instructions now belong to the block; their handles still read.
    let insts = api::basic_block_get_instructions(&bb);
    assert_eq!(insts.array_items().len(), 2);
    assert!(api::ret_get_value(&ret).is_some());
}

#[test]
fn wide_constants_round_trip_through_the_graph() {
    let ctx = api::context_new();
    let i257 = api::type_get_int(&ctx, 257);
    let big = ObjRef::big_nat(ones_words(257));
    let c = api::const_nat(&big, &i257);
    assert_eq!(api::const_int_get_nat_value(&c).nat_parts(), ones_words(257));
    // Read back signed, all ones is -1.
    assert_eq!(api::const_int_get_value(&c).int_parts(), (true, vec![1]));
    // Null and all-ones constants agree with the marshaled values.
    assert_eq!(
        api::const_int_get_nat_value(&api::const_all_ones(&i257)).nat_parts(),
        ones_words(257)
    );
    assert_eq!(
        api::const_int_get_nat_value(&api::const_null(&i257)).nat_parts(),
        Vec::<u64>::new()
    );
}

#[test]
fn global_variables_carry_their_properties() {
    let ctx = api::context_new();
    let i8t = api::type_get_int(&ctx, 8);
    let init = api::const_nat(&ObjRef::small_nat(1).unwrap(), &i8t);
    let g = api::global_variable_new_with_init(
        &i8t,
        true,
        Linkage::Internal,
        &init,
        &s("flag"),
        ir::ThreadLocalMode::NotThreadLocal,
        0,
        false,
    );
    assert!(api::global_variable_is_constant(&g));
    assert!(api::global_variable_has_initializer(&g));
    assert_eq!(
        api::const_int_get_nat_value(&api::global_variable_get_initializer(&g)).nat_parts(),
        vec![1]
    );
    api::global_set_visibility(ir::Visibility::Hidden, &g);
    assert_eq!(api::global_get_visibility(&g), ir::Visibility::Hidden);
    api::global_set_section(&s(".rodata"), &g);
    assert!(api::global_has_section(&g));
    assert_eq!(api::global_get_section(&g).as_str(), ".rodata");
    api::global_set_alignment(8, &g);
    assert_eq!(api::global_get_alignment(&g), 8);
    assert_eq!(api::global_get_address_space(&g), 0);

    let m = api::module_new(&s("demo"), &ctx);
    api::module_append_global(&m, &g);
    assert!(api::module_print(&m).as_str().contains("@flag = constant i8 1"));
}

#[test]
fn buffer_wrappers_surface_io_errors() {
    let err = api::buffer_from_file(&s("/nonexistent/vellum-input")).unwrap_err();
    assert!(matches!(err, BridgeError::BufferIo { .. }));
    let buf = api::buffer_from_bytes(b"abc");
    assert_eq!(api::buffer_size(&buf), 3);
}

#[test]
fn jit_only_engine_requests_fail_as_values() {
    let ctx = api::context_new();
    let m = api::module_new(&s("demo"), &ctx);
    let opts = EngineOptions {
        kind: EngineKind::Jit,
        ..EngineOptions::default()
    };
    let err = api::engine_create_for_module(&m, opts).unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Engine(ir::EngineError::UnsupportedKind(EngineKind::Jit))
    ));
}

#[test]
fn value_wrappers_expose_names_and_types() {
    let ctx = api::context_new();
    let i32t = api::type_get_int(&ctx, 32);
    let c = api::const_nat(&ObjRef::small_nat(5).unwrap(), &i32t);
    assert!(!api::value_has_name(&c));
    let ty = api::value_get_type(&c);
    assert_eq!(api::type_get_int_width(&ty), 32);
    assert_eq!(api::value_print(&c).as_str(), "i32 5");
    let ctx2 = api::value_get_context(&c);
    assert_eq!(
        unsafe { refs::to_context(&ctx2) },
        unsafe { refs::to_context(&ctx) },
    );
}
