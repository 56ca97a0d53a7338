//! Utility types shared by the frame pipeline.

mod hash;
mod index_allocator;
mod threaded_vector;
mod work_queue;

pub use hash::{hash64, fold32, name_hash};
pub use index_allocator::IndexAllocator;
pub use threaded_vector::ThreadedVector;
pub use work_queue::{WorkQueue, WorkQueueConfig};
