//! Taxi-zone identifiers

/// Bronx taxi-zone IDs from the TLC zone lookup table.
///
/// Trips are admitted only when both endpoints fall inside this set, so the
/// loaded graph covers a single borough.
pub const BRONX_ZONES: [i64; 43] = [
    3, 18, 20, 31, 32, 46, 47, 51, 58, 59, 60, 69, 78, 81, 94, 119, 126, 136, 147, 159, 167, 168,
    169, 174, 182, 183, 184, 185, 199, 200, 208, 212, 213, 220, 235, 240, 241, 242, 247, 248, 250,
    254, 259,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn allowlist_has_43_distinct_zones() {
        let set: HashSet<i64> = BRONX_ZONES.iter().copied().collect();
        assert_eq!(set.len(), 43);
        assert_eq!(BRONX_ZONES.len(), 43);
    }

    #[test]
    fn allowlist_is_sorted() {
        let mut sorted = BRONX_ZONES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, BRONX_ZONES.to_vec());
    }
}
