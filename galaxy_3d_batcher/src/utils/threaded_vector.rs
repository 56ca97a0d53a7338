//! Segmented append-only collection.
//!
//! Parallel stages produce one segment per chunk. Segments are appended in
//! input order and the collection is read as a single logical sequence,
//! so merging thread-local output is a concatenation instead of a lock.

#[derive(Debug, Clone)]
pub struct ThreadedVector<T> {
    segments: Vec<Vec<T>>,
    len: usize,
}

impl<T> ThreadedVector<T> {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            len: 0,
        }
    }

    /// Remove all segments.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.len = 0;
    }

    /// Append a segment. Empty segments are skipped.
    pub fn push_segment(&mut self, segment: Vec<T>) {
        if segment.is_empty() {
            return;
        }
        self.len += segment.len();
        self.segments.push(segment);
    }

    /// Total number of elements across all segments.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Segments in append order.
    pub fn segments(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.segments.iter().map(|s| s.as_slice())
    }

    /// Global index of the first element of every segment.
    pub fn segment_offsets(&self) -> Vec<usize> {
        let mut offset = 0;
        self.segments
            .iter()
            .map(|s| {
                let start = offset;
                offset += s.len();
                start
            })
            .collect()
    }

    /// All elements in logical order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.segments.iter().flat_map(|s| s.iter())
    }

    /// Element at a global index.
    pub fn get(&self, mut index: usize) -> Option<&T> {
        for segment in &self.segments {
            if index < segment.len() {
                return segment.get(index);
            }
            index -= segment.len();
        }
        None
    }
}

impl<T> Default for ThreadedVector<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "threaded_vector_tests.rs"]
mod tests;
