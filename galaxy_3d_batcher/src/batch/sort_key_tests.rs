use std::sync::Arc;
use slotmap::SlotMap;
use crate::batch::{PipelineState, SceneBatchSource};
use crate::scene::{DrawableKey, GeometryId, Material, MaterialPass, SourceBatch, ViewDistance};
use super::*;

#[derive(Debug)]
struct TestState {
    shader: u32,
    state: u64,
}

impl PipelineState for TestState {
    fn shader_hash(&self) -> u32 {
        self.shader
    }

    fn state_hash(&self) -> u64 {
        self.state
    }
}

fn make_batch(
    key: DrawableKey,
    material: &Arc<Material>,
    geometry: u32,
    shader: u32,
    distance: f32,
    light_index: u32,
) -> SceneBatch {
    let source = SourceBatch::new(GeometryId(geometry), Some(material.clone()));
    let source = SceneBatchSource {
        drawable: key,
        drawable_index: 0,
        source_batch_index: 0,
        source_batch: &source,
        view_distance: ViewDistance { distance, lod_distance: distance },
    };
    let mut batch = SceneBatch::new(&source, light_index, Arc::new(MaterialPass::new("base", "Lit")), material);
    batch.pipeline_state = Some(Arc::new(TestState { shader, state: shader as u64 * 31 }));
    batch
}

/// Deterministic pseudo-random batch list with many equal-state groups.
fn generated_batches(count: usize) -> Vec<SceneBatch> {
    let mut keys = SlotMap::<DrawableKey, ()>::with_key();
    let key = keys.insert(());
    let materials = [
        Arc::new(Material::new("Stone")),
        Arc::new(Material::new("Grass")),
        Arc::new(Material::new("Glass").with_render_order(200)),
    ];

    let mut state = 12345u64;
    (0..count)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let r = (state >> 33) as u32;
            make_batch(
                key,
                &materials[(r % 3) as usize],
                r % 4,
                (r >> 4) % 3,
                ((r >> 8) % 5) as f32 * 2.5,
                (r >> 12) % 3,
            )
        })
        .collect()
}

// ============================================================================
// Bit helpers
// ============================================================================

#[test]
fn test_ordered_bits_matches_total_cmp() {
    let values = [-100.0f32, -1.5, -0.0, 0.0, 0.25, 1.0, 3.5, 1e9, f32::INFINITY];
    for a in values {
        for b in values {
            assert_eq!(ordered_bits(a).cmp(&ordered_bits(b)), a.total_cmp(&b), "{} vs {}", a, b);
        }
    }
}

#[test]
fn test_pipeline_key_layout() {
    let mut keys = SlotMap::<DrawableKey, ()>::with_key();
    let material = Arc::new(Material::new("Stone").with_render_order(7));
    let batch = make_batch(keys.insert(()), &material, 1, 0xABCD_1234, 1.0, 0);

    let key = StateSortKey::new(&batch, 0);
    assert_eq!(key.pipeline_key >> 56, 7);
    assert_eq!((key.pipeline_key >> 24) & 0xffff_ffff, 0xABCD_1234);
}

// ============================================================================
// State order
// ============================================================================

#[test]
fn test_radix_sort_matches_ord() {
    let batches = generated_batches(300);
    let sorted = sort_batches_by_state(&batches);

    let mut reference: Vec<StateSortKey> = batches.iter().enumerate()
        .map(|(i, b)| StateSortKey::new(b, i as u32))
        .collect();
    reference.sort();

    assert_eq!(sorted, reference);
}

#[test]
fn test_state_order_is_strict_total_order() {
    let batches = generated_batches(60);
    let keys: Vec<StateSortKey> = batches.iter().enumerate()
        .map(|(i, b)| StateSortKey::new(b, i as u32))
        .collect();

    for a in &keys {
        assert_eq!(a.cmp(a), Ordering::Equal);
        for b in &keys {
            if a.batch_index != b.batch_index {
                assert_ne!(a.cmp(b), Ordering::Equal);
            }
            assert_eq!(a.cmp(b), b.cmp(a).reverse());
            for c in &keys {
                if a < b && b < c {
                    assert!(a < c);
                }
            }
        }
    }
}

#[test]
fn test_state_sort_is_idempotent() {
    let batches = generated_batches(200);
    let first = sort_batches_by_state(&batches);
    assert_eq!(first, sort_batches_by_state(&batches));

    // Sorting the already sorted sequence keeps it in place.
    let reordered: Vec<SceneBatch> = first.iter().map(|k| batches[k.batch_index as usize].clone()).collect();
    let second = sort_batches_by_state(&reordered);
    let indices: Vec<u32> = second.iter().map(|k| k.batch_index).collect();
    assert_eq!(indices, (0..reordered.len() as u32).collect::<Vec<_>>());
}

#[test]
fn test_render_order_dominates() {
    let batches = generated_batches(100);
    let sorted = sort_batches_by_state(&batches);
    let orders: Vec<u8> = sorted.iter().map(|k| batches[k.batch_index as usize].material.render_order()).collect();
    assert!(orders.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_equal_state_sorted_back_to_front() {
    let mut keys = SlotMap::<DrawableKey, ()>::with_key();
    let key = keys.insert(());
    let material = Arc::new(Material::new("Stone"));
    let batches: Vec<SceneBatch> = [1.0, 9.0, 4.0]
        .iter()
        .map(|&d| make_batch(key, &material, 1, 5, d, 0))
        .collect();

    let sorted = sort_batches_by_state(&batches);
    let distances: Vec<f32> = sorted.iter().map(|k| k.distance).collect();
    assert_eq!(distances, vec![9.0, 4.0, 1.0]);
}

// ============================================================================
// Light order
// ============================================================================

#[test]
fn test_light_batches_grouped_by_light() {
    let batches = generated_batches(200);
    let sorted = sort_light_batches_by_state(&batches);

    let mut reference: Vec<LightStateSortKey> = batches.iter().enumerate()
        .map(|(i, b)| LightStateSortKey::new(b, i as u32))
        .collect();
    reference.sort();
    assert_eq!(sorted, reference);

    assert!(sorted.windows(2).all(|w| w[0].light_index <= w[1].light_index));
    assert_eq!(sorted.len(), batches.len());
}

// ============================================================================
// Back to front
// ============================================================================

#[test]
fn test_back_to_front_matches_ord() {
    let batches = generated_batches(150);
    let sorted = sort_batches_back_to_front(&batches);

    let mut reference: Vec<BackToFrontSortKey> = batches.iter().enumerate()
        .map(|(i, b)| BackToFrontSortKey::new(b, i as u32))
        .collect();
    reference.sort();
    assert_eq!(sorted, reference);

    for w in sorted.windows(2) {
        assert!(w[0].render_order < w[1].render_order
            || (w[0].render_order == w[1].render_order && w[0].distance <= w[1].distance));
    }
}

#[test]
fn test_empty_input() {
    assert!(sort_batches_by_state(&[]).is_empty());
    assert!(sort_batches_back_to_front(&[]).is_empty());
}
