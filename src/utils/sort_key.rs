//! Sort keys and key comparison for StarDict indexes.
//!
//! StarDict readers binary-search `.idx` and `.syn` with a fixed two-tier
//! comparison over the UTF-8 bytes of each key:
//!
//! 1. bytes compared with ASCII letters folded to lowercase (non-ASCII bytes as-is),
//! 2. on a tie, the raw bytes.
//!
//! Files written with any other order (locale collation, Unicode case folding)
//! cannot be searched by those readers.
//!
//! # Examples
//!
//! ```
//! use std::cmp::Ordering;
//! use hawdict::utils::sort_key::{stardict_key_compare, get_sort_key};
//!
//! assert_eq!(get_sort_key("Apple"), b"apple".to_vec());
//! assert_eq!(stardict_key_compare("Apple", "apple"), Ordering::Less);
//! assert_eq!(stardict_key_compare("apple", "Banana"), Ordering::Less);
//! ```

use std::cmp::Ordering;

/// Folds ASCII capitals to lowercase, byte by byte.
///
/// This is the tier-one sort key. Multi-byte UTF-8 sequences are left
/// untouched, so `Ā` does not fold to `ā`.
pub fn get_sort_key(key: &str) -> Vec<u8> {
    let mut folded_key = Vec::with_capacity(key.len());
    for &ch in key.as_bytes() {
        if (ch >= b'A') && (ch <= b'Z') {
            folded_key.push(ch - b'A' + b'a');
        } else {
            folded_key.push(ch);
        }
    }
    folded_key
}

/// Tier one: ASCII case-insensitive byte comparison.
pub fn ascii_fold_compare(first: &str, second: &str) -> Ordering {
    let first = first.bytes().map(|b| b.to_ascii_lowercase());
    let second = second.bytes().map(|b| b.to_ascii_lowercase());
    first.cmp(second)
}

/// Full StarDict ordering: [`ascii_fold_compare`], ties broken by raw bytes.
pub fn stardict_key_compare(first: &str, second: &str) -> Ordering {
    ascii_fold_compare(first, second).then_with(|| first.as_bytes().cmp(second.as_bytes()))
}
