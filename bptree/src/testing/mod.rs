//! Key helpers shared by tests and the simulator.
//!
//! Ordinals are encoded as big-endian `u16`, so bytewise key order matches
//! numeric order.

/// Encode an ordinal as a 2-byte sortable key.
#[must_use]
pub fn key_from_ord(ord: u16) -> Vec<u8> {
    ord.to_be_bytes().to_vec()
}

/// Keys for every ordinal in `start..=end`, ascending.
#[must_use]
pub fn keys_from_range(start: u16, end: u16) -> Vec<Vec<u8>> {
    (start..=end).map(key_from_ord).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_ord_sorts_numerically() {
        assert_eq!(key_from_ord(0), vec![0, 0]);
        assert_eq!(key_from_ord(258), vec![1, 2]);
        assert!(key_from_ord(255) < key_from_ord(256));
    }

    #[test]
    fn test_keys_from_range_is_inclusive() {
        let keys = keys_from_range(3, 5);
        assert_eq!(keys, vec![key_from_ord(3), key_from_ord(4), key_from_ord(5)]);
        assert!(keys_from_range(5, 4).is_empty());
    }
}
