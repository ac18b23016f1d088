// Constant-time digest comparison

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Fixed key for the comparison MACs; it only has to be the same on both sides.
const COMPARISON_KEY: &[u8] = b"passhash.digest-comparison.v1";

/// Compare two byte strings without an early exit on the first difference
///
/// Both inputs are run through HMAC-SHA256 and the tags are checked with
/// `Mac::verify_slice`, whose comparison runs in constant time. Inputs of
/// different lengths compare unequal immediately; lengths are not secret here.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let (Ok(mut expected), Ok(mut actual)) = (
        HmacSha256::new_from_slice(COMPARISON_KEY),
        HmacSha256::new_from_slice(COMPARISON_KEY),
    ) else {
        return false;
    };

    expected.update(a);
    let expected_tag = expected.finalize().into_bytes();

    actual.update(b);
    actual.verify_slice(&expected_tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_inputs() {
        assert!(constant_time_eq(b"digest-bytes", b"digest-bytes"));
        assert!(constant_time_eq(&[], &[]));
    }

    #[test]
    fn test_single_byte_difference() {
        let a = [7u8; 23];
        for i in 0..a.len() {
            let mut b = a;
            b[i] ^= 0x01;
            assert!(!constant_time_eq(&a, &b), "difference at {} not detected", i);
        }
    }

    #[test]
    fn test_length_mismatch() {
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(!constant_time_eq(b"", b"a"));
    }
}
