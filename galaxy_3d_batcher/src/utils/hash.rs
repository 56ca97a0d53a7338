//! Stable 32-bit hashes for identities that feed sort keys.

use std::hash::{Hash, Hasher};
use rustc_hash::FxHasher;

/// Hash any value with FxHash.
pub fn hash64<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Fold a 64-bit hash to 32 bits.
pub fn fold32(hash: u64) -> u32 {
    (hash as u32) ^ ((hash >> 32) as u32)
}

/// 32-bit hash of a resource name.
pub fn name_hash(name: &str) -> u32 {
    fold32(hash64(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_hash_is_stable() {
        assert_eq!(name_hash("base"), name_hash("base"));
        assert_ne!(name_hash("base"), name_hash("litbase"));
    }

    #[test]
    fn test_fold32_mixes_both_halves() {
        assert_eq!(fold32(0x0000_0001_0000_0000), 1);
        assert_eq!(fold32(0x0000_0000_0000_0002), 2);
        assert_eq!(fold32(0xffff_ffff_ffff_ffff), 0);
    }
}
