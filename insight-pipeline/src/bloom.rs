//! Memory-efficient membership testing for previously-seen comment ids.
//!
//! Exact id sets grow without bound across pipeline runs; the Bloom filter
//! trades a configurable false-positive rate for constant memory. False
//! negatives are impossible, so a seen comment is never resurfaced.

use sha2::{Digest, Sha256};

/// Bloom filter with double hashing derived from a single SHA-256 digest.
pub struct BloomFilter {
    bits: Vec<u8>,
    size: usize,
    num_hashes: usize,
    count: usize,
}

impl BloomFilter {
    /// Size the filter for `expected_items` insertions at roughly `fp_rate`
    /// false positives.
    ///
    /// Optimal bit count: m = -(n * ln(p)) / (ln 2)^2
    /// Optimal hash count: k = (m / n) * ln 2
    pub fn new(expected_items: usize, fp_rate: f64) -> Self {
        let expected = expected_items.max(1) as f64;
        let ln2 = std::f64::consts::LN_2;
        let size = ((-expected * fp_rate.ln()) / (ln2 * ln2)).ceil() as usize;
        let size = size.max(64);
        let num_hashes = (((size as f64 / expected) * ln2) as usize).max(1);

        Self {
            bits: vec![0u8; (size + 7) / 8],
            size,
            num_hashes,
            count: 0,
        }
    }

    /// Two independent 64-bit hashes carved out of one SHA-256 digest.
    fn hash_pair(item: &str) -> (u64, u64) {
        let digest = Sha256::digest(item.as_bytes());
        let mut h1 = [0u8; 8];
        let mut h2 = [0u8; 8];
        h1.copy_from_slice(&digest[0..8]);
        h2.copy_from_slice(&digest[8..16]);
        (u64::from_be_bytes(h1), u64::from_be_bytes(h2))
    }

    fn positions(&self, item: &str) -> Vec<usize> {
        let (h1, h2) = Self::hash_pair(item);
        (0..self.num_hashes as u64)
            .map(|i| (h1.wrapping_add(i.wrapping_mul(h2)) % self.size as u64) as usize)
            .collect()
    }

    fn get_bit(&self, index: usize) -> bool {
        self.bits[index / 8] & (1 << (index % 8)) != 0
    }

    fn set_bit(&mut self, index: usize) {
        self.bits[index / 8] |= 1 << (index % 8);
    }

    pub fn add(&mut self, item: &str) {
        for position in self.positions(item) {
            self.set_bit(position);
        }
        self.count += 1;
    }

    /// Membership test: false positives possible, false negatives not.
    pub fn contains(&self, item: &str) -> bool {
        self.positions(item)
            .into_iter()
            .all(|position| self.get_bit(position))
    }

    pub fn bulk_add<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for item in items {
            self.add(item.as_ref());
        }
    }

    /// Number of insertions so far.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_items_are_always_found() {
        let mut filter = BloomFilter::new(1000, 0.01);
        for i in 0..500 {
            filter.add(&format!("comment-{}", i));
        }
        for i in 0..500 {
            assert!(filter.contains(&format!("comment-{}", i)));
        }
        assert_eq!(filter.len(), 500);
    }

    #[test]
    fn false_positive_rate_stays_reasonable() {
        let mut filter = BloomFilter::new(1000, 0.01);
        for i in 0..1000 {
            filter.add(&format!("seen-{}", i));
        }
        let false_positives = (0..1000)
            .filter(|i| filter.contains(&format!("unseen-{}", i)))
            .count();
        // 1% target; allow generous slack for hash variance
        assert!(
            false_positives < 100,
            "false positive count too high: {}",
            false_positives
        );
    }

    #[test]
    fn tiny_expected_counts_still_work() {
        let mut filter = BloomFilter::new(0, 0.01);
        filter.add("only");
        assert!(filter.contains("only"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn bulk_add_counts_every_item() {
        let mut filter = BloomFilter::new(100, 0.05);
        filter.bulk_add(["a", "b", "c"]);
        assert_eq!(filter.len(), 3);
        assert!(filter.contains("b"));
    }
}
