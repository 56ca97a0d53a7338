use super::*;

#[test]
fn test_segments_concatenate_in_push_order() {
    let mut v = ThreadedVector::new();
    v.push_segment(vec![1, 2, 3]);
    v.push_segment(vec![]);
    v.push_segment(vec![4, 5]);

    assert_eq!(v.len(), 5);
    assert_eq!(v.num_segments(), 2);
    assert_eq!(v.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    assert_eq!(v.segment_offsets(), vec![0, 3]);
}

#[test]
fn test_get_by_global_index() {
    let mut v = ThreadedVector::new();
    v.push_segment(vec!['a', 'b']);
    v.push_segment(vec!['c']);

    assert_eq!(v.get(0), Some(&'a'));
    assert_eq!(v.get(2), Some(&'c'));
    assert_eq!(v.get(3), None);
}

#[test]
fn test_clear() {
    let mut v = ThreadedVector::new();
    v.push_segment(vec![1]);
    v.clear();
    assert!(v.is_empty());
    assert_eq!(v.num_segments(), 0);
}
