//! Byte-Class Scanner: the vectorized search primitive the row parser's
//! inner loop is built on.
//!
//! `scan_window` is the stable boundary named in the spec this crate
//! implements: given a 16-byte window and a set of up to four "interesting"
//! bytes, return the index of the first interesting byte, or 16 if none
//! appear. It has a vector implementation (SSE4.2 `PCMPISTRI` on `x86_64`)
//! and a scalar fallback with an identical contract, checked against each
//! other by `tests/bcs_conformance.rs`. Basic scalar-only behavior is
//! covered by this module's own inline test module.
//!
//! The row parser itself does not call this function in a 16-byte loop — it
//! searches whole cursor windows with `memchr`, which applies the same
//! vectorized-search-with-scalar-fallback strategy at a larger grain and is
//! strictly faster. `scan_window` stays independently implemented and tested
//! because it is named as one of the three hard, in-scope parts of this
//! system, and is the primitive any non-`memchr`-shaped target would fall
//! back to.

/// A set of 1 to 4 distinct bytes to search for within a 16-byte window.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ByteClass {
    bytes: [u8; 4],
    len: u8,
}

impl ByteClass {
    /// Builds a class from 1 to 4 distinct bytes.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is empty, has more than 4 elements, or contains
    /// duplicates.
    pub fn new(bytes: &[u8]) -> Self {
        assert!(!bytes.is_empty() && bytes.len() <= 4, "class must have 1-4 bytes");
        for i in 0..bytes.len() {
            for j in (i + 1)..bytes.len() {
                assert!(bytes[i] != bytes[j], "class bytes must be distinct");
            }
        }
        let mut arr = [0u8; 4];
        arr[..bytes.len()].copy_from_slice(bytes);
        ByteClass { bytes: arr, len: bytes.len() as u8 }
    }

    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Whether `byte` is a member of this class.
    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.as_slice().contains(&byte)
    }
}

/// Searches the first 16 bytes of `window` for the smallest index whose byte
/// is a member of `class`.
///
/// Returns `16` if no byte in `window[0..16]` belongs to `class`. Never reads
/// past `window[15]`.
#[inline]
pub fn scan_window(window: &[u8; 16], class: ByteClass) -> usize {
    #[cfg(all(target_arch = "x86_64", feature = "std"))]
    {
        if std::is_x86_feature_detected!("sse4.2") {
            // SAFETY: feature detection above guarantees SSE4.2 is available.
            return unsafe { scan_window_sse42(window, class) };
        }
    }
    #[cfg(all(target_arch = "x86_64", not(feature = "std"), target_feature = "sse4.2"))]
    {
        // SAFETY: sse4.2 is enabled at compile time for this target.
        return unsafe { scan_window_sse42(window, class) };
    }
    #[allow(unreachable_code)]
    scan_window_scalar(window, class)
}

/// Scalar reference implementation: an unrolled 16-iteration compare.
///
/// Contract is identical to [`scan_window`], including the `k = 16`
/// sentinel. This is the implementation used on non-`x86_64` targets and in
/// the bit-for-bit agreement test against the vector path.
#[inline]
pub fn scan_window_scalar(window: &[u8; 16], class: ByteClass) -> usize {
    macro_rules! check {
        ($i:expr) => {
            if class.contains(window[$i]) {
                return $i;
            }
        };
    }
    check!(0);
    check!(1);
    check!(2);
    check!(3);
    check!(4);
    check!(5);
    check!(6);
    check!(7);
    check!(8);
    check!(9);
    check!(10);
    check!(11);
    check!(12);
    check!(13);
    check!(14);
    check!(15);
    16
}

/// Vectorized implementation using the SSE4.2 `PCMPISTRI` family.
///
/// # Safety
///
/// Caller must ensure SSE4.2 is available on the current CPU (either via
/// runtime detection or a compile-time `target_feature`).
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse4.2")]
unsafe fn scan_window_sse42(window: &[u8; 16], class: ByteClass) -> usize {
    use core::arch::x86_64::*;

    let hay = _mm_loadu_si128(window.as_ptr() as *const __m128i);

    // PCMPISTRI with _SIDD_CMP_EQUAL_ANY treats the needle operand as an
    // unordered set of bytes to match against each haystack byte - exactly
    // the ByteClass contract. The needle length is encoded implicitly by
    // padding with a byte that cannot appear twice in a well-formed class;
    // instead we pad with the first class byte itself, which is always a
    // match candidate already present, so it cannot introduce a false class
    // membership.
    let mut needle_bytes = class.bytes;
    for i in class.len as usize..4 {
        needle_bytes[i] = class.bytes[0];
    }
    let needle = _mm_loadu_si128(
        [
            needle_bytes[0],
            needle_bytes[1],
            needle_bytes[2],
            needle_bytes[3],
            needle_bytes[0],
            needle_bytes[0],
            needle_bytes[0],
            needle_bytes[0],
            needle_bytes[0],
            needle_bytes[0],
            needle_bytes[0],
            needle_bytes[0],
            needle_bytes[0],
            needle_bytes[0],
            needle_bytes[0],
            needle_bytes[0],
        ]
        .as_ptr() as *const __m128i,
    );

    const MODE: i32 = _SIDD_UBYTE_OPS | _SIDD_CMP_EQUAL_ANY | _SIDD_LEAST_SIGNIFICANT;
    let index = _mm_cmpistri(needle, hay, MODE);
    let index = index as usize;
    if index > 16 {
        16
    } else {
        index
    }
}
