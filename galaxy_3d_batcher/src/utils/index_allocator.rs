//! Allocates and recycles dense `u32` indices.
//!
//! Drawables receive a dense index at registration time so that per-frame
//! tables (transient data, light accumulators) can be addressed in O(1)
//! instead of through key lookups. Freed indices are recycled lowest-first,
//! which keeps the live range compact and the tables short.
//!
//! # Example
//!
//! ```ignore
//! let mut alloc = IndexAllocator::new();
//! let a = alloc.alloc();  // 0
//! let b = alloc.alloc();  // 1
//! let c = alloc.alloc();  // 2
//! alloc.free(c);
//! alloc.free(a);
//! assert_eq!(alloc.alloc(), 0); // lowest freed index first
//! ```

use std::cmp::Reverse;
use std::collections::BinaryHeap;

pub struct IndexAllocator {
    free: BinaryHeap<Reverse<u32>>,
    next_id: u32,
    len: u32,
}

impl IndexAllocator {
    pub fn new() -> Self {
        Self {
            free: BinaryHeap::new(),
            next_id: 0,
            len: 0,
        }
    }

    /// Allocate the lowest available index
    pub fn alloc(&mut self) -> u32 {
        self.len += 1;
        match self.free.pop() {
            Some(Reverse(id)) => id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
        }
    }

    /// Return an index to the pool for reuse
    pub fn free(&mut self, id: u32) {
        debug_assert!(id < self.next_id, "freeing an unallocated index: {}", id);
        self.len -= 1;
        self.free.push(Reverse(id));
    }

    /// Highest index ever allocated + 1.
    ///
    /// Per-drawable tables must be at least this long.
    pub fn high_water_mark(&self) -> u32 {
        self.next_id
    }

    /// Number of live indices
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for IndexAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "index_allocator_tests.rs"]
mod tests;
