//! DJB2-variant hash used for extension and basename lookups.
//!
//! `h = 33*h + lower(b)` folded once with `h += h >> 5`. Case-insensitive by
//! construction so it can be computed once per file and compared directly
//! against a hash of a query-supplied extension string without needing to
//! allocate a lowercased copy of either side.

pub fn hash_bytes(bytes: &[u8]) -> u32 {
    let mut h: u32 = 0;
    for &b in bytes {
        h = h.wrapping_mul(33).wrapping_add(b.to_ascii_lowercase() as u32);
    }
    h.wrapping_add(h >> 5)
}

pub fn hash_prefix(bytes: &[u8], n: usize) -> u32 {
    hash_bytes(&bytes[..n.min(bytes.len())])
}

pub fn hash_str(s: &str) -> u32 {
    hash_bytes(s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive() {
        assert_eq!(hash_str("Cpp"), hash_str("cpp"));
        assert_eq!(hash_str("CPP"), hash_str("cpp"));
    }

    #[test]
    fn distinct_strings_usually_differ() {
        assert_ne!(hash_str("cpp"), hash_str("h"));
        assert_ne!(hash_str("main.cpp"), hash_str("main.h"));
    }

    #[test]
    fn prefix_matches_truncated_hash() {
        assert_eq!(hash_prefix(b"hello world", 5), hash_str("hello"));
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(hash_bytes(b""), 0);
    }
}
