use chrono::{DateTime, Utc};
use rand::Rng;

/// Namespace tag every generated tool barcode starts with.
pub const BARCODE_TAG: &str = "TOOL";

/// Length of the random suffix.
pub const SUFFIX_LEN: usize = 9;

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Mints a barcode for a newly registered tool: `TOOL-<millis>-<random9>`.
///
/// Uniqueness is probabilistic. The registry's unique constraint on
/// `tools.barcode` is what actually rejects a duplicate.
pub fn generate_barcode() -> String {
    generate_barcode_with(&mut rand::rng(), Utc::now())
}

/// Same as [`generate_barcode`] with the random source and clock supplied.
pub fn generate_barcode_with<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}-{}", BARCODE_TAG, now.timestamp_millis(), suffix)
}

/// Checks that `value` has the shape produced by [`generate_barcode`].
pub fn is_generated_barcode(value: &str) -> bool {
    let mut parts = value.splitn(3, '-');
    let (Some(tag), Some(millis), Some(suffix)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    tag == BARCODE_TAG
        && !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b))
}
