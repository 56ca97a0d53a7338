use super::*;

// ============================================================================
// Allocation order
// ============================================================================

#[test]
fn test_sequential_alloc() {
    let mut alloc = IndexAllocator::new();
    assert_eq!(alloc.alloc(), 0);
    assert_eq!(alloc.alloc(), 1);
    assert_eq!(alloc.alloc(), 2);
}

#[test]
fn test_new_is_empty() {
    let alloc = IndexAllocator::default();
    assert!(alloc.is_empty());
    assert_eq!(alloc.high_water_mark(), 0);
}

#[test]
fn test_recycles_lowest_index_first() {
    let mut alloc = IndexAllocator::new();
    for _ in 0..5 {
        alloc.alloc();
    }
    alloc.free(3);
    alloc.free(1);
    alloc.free(4);

    assert_eq!(alloc.alloc(), 1);
    assert_eq!(alloc.alloc(), 3);
    assert_eq!(alloc.alloc(), 4);
    assert_eq!(alloc.alloc(), 5);
}

// ============================================================================
// len() and high_water_mark()
// ============================================================================

#[test]
fn test_high_water_mark_never_decreases() {
    let mut alloc = IndexAllocator::new();
    alloc.alloc();
    alloc.alloc();
    alloc.free(0);
    alloc.free(1);
    assert_eq!(alloc.high_water_mark(), 2);
    assert_eq!(alloc.len(), 0);

    alloc.alloc();
    assert_eq!(alloc.high_water_mark(), 2);
    assert_eq!(alloc.len(), 1);
}

#[test]
fn test_live_indices_stay_unique() {
    let mut alloc = IndexAllocator::new();
    let mut live = std::collections::HashSet::new();
    for _ in 0..64 {
        live.insert(alloc.alloc());
    }
    for id in (0..64).step_by(3) {
        alloc.free(id);
        live.remove(&id);
    }
    for _ in 0..30 {
        let id = alloc.alloc();
        assert!(live.insert(id), "duplicate index: {}", id);
    }
    assert_eq!(alloc.high_water_mark(), 72);
}
