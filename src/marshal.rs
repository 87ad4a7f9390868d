//! Bignum marshaling: host integers to and from fixed-width bit vectors.
//!
//! Values that fit the host's boxed-scalar payload convert through a single
//! machine word; everything else moves as little-endian word arrays with no
//! bit shifting. Signed values always travel as an unsigned magnitude plus a
//! negative flag, and are negated in bit-vector representation, so the
//! signed minimum never goes through a host-side negation that could
//! overflow. Truncation and extension to the requested width happen inside
//! the `ApInt` constructors, never here.

use static_assertions::const_assert_eq;
use vellum_ir::ApInt;
use vellum_rt::{Body, ObjRef, SMALL_BITS};

// Scalar fast paths assume the one-tag-bit payload of a 64-bit host word.
const_assert_eq!(SMALL_BITS, 63);

/// Converts a host natural number to a `bits`-wide vector, truncating or
/// zero-extending as needed.
pub fn ap_of_nat(bits: u32, nat: &ObjRef) -> ApInt {
    if nat.is_scalar() {
        return ApInt::new(bits, nat.unbox(), false);
    }
    match nat.body() {
        Body::BigNat(words) => ApInt::from_words(bits, words),
        _ => panic!("expected a natural number object"),
    }
}

/// Converts a host integer to a `bits`-wide vector, truncating or
/// sign-extending as needed.
pub fn ap_of_int(bits: u32, int: &ObjRef) -> ApInt {
    if int.is_scalar() {
        return ApInt::new(bits, int.unbox_int() as u64, true);
    }
    match int.body() {
        Body::BigInt { neg, words } => {
            let mag = ApInt::from_words(bits, words);
            if *neg { mag.negate() } else { mag }
        }
        Body::BigNat(words) => ApInt::from_words(bits, words),
        _ => panic!("expected an integer object"),
    }
}

/// Reads a bit vector as an unsigned host integer.
pub fn nat_from_ap(ap: &ApInt) -> ObjRef {
    if ap.active_bits() <= SMALL_BITS {
        ObjRef::small_nat(ap.zext_u64()).expect("active bits fit the scalar payload")
    } else {
        ObjRef::big_nat(ap.words().to_vec())
    }
}

/// Reads a bit vector as a signed (two's-complement) host integer.
pub fn int_from_ap(ap: &ApInt) -> ObjRef {
    if ap.min_signed_bits() <= SMALL_BITS {
        ObjRef::small_int(ap.sext_i64()).expect("signed bits fit the scalar payload")
    } else {
        let neg = ap.is_negative();
        ObjRef::big_int(neg, ap.abs().words().to_vec())
    }
}
