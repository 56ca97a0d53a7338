use super::*;

fn ctx(light_index: u32, importance: LightImportance, max_pixel_lights: usize) -> LightAccumulatorContext {
    LightAccumulatorContext {
        light_index,
        importance,
        force_pixel: false,
        max_pixel_lights,
    }
}

fn auto(light_index: u32, max_pixel_lights: usize) -> LightAccumulatorContext {
    ctx(light_index, LightImportance::Auto, max_pixel_lights)
}

fn count_lights(indices: &[u32]) -> usize {
    indices.iter().filter(|&&i| i != NO_LIGHT).count()
}

/// Small deterministic permutation generator (LCG based Fisher-Yates).
fn shuffled(mut items: Vec<(u32, f32)>, seed: u64) -> Vec<(u32, f32)> {
    let mut state = seed;
    for i in (1..items.len()).rev() {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let j = (state >> 33) as usize % (i + 1);
        items.swap(i, j);
    }
    items
}

// ============================================================================
// Tiers
// ============================================================================

#[test]
fn test_empty_accumulator() {
    let acc = LightAccumulator::new();
    assert_eq!(acc.num_pixel_lights(), 0);
    assert_eq!(acc.pixel_lights(), [NO_LIGHT; MAX_PIXEL_LIGHTS]);
    assert_eq!(acc.vertex_lights(), [NO_LIGHT; MAX_VERTEX_LIGHTS]);
}

#[test]
fn test_best_lights_go_to_pixel_tier() {
    let mut acc = LightAccumulator::new();
    acc.accumulate(&auto(0, 2), 1.0);
    acc.accumulate(&auto(1, 2), 5.0);
    acc.accumulate(&auto(2, 2), 3.0);

    assert_eq!(acc.num_pixel_lights(), 2);
    assert_eq!(acc.pixel_lights(), [1, 2, NO_LIGHT, NO_LIGHT]);
    assert_eq!(acc.vertex_lights(), [0, NO_LIGHT, NO_LIGHT, NO_LIGHT]);
}

#[test]
fn test_overflow_is_dropped() {
    let mut acc = LightAccumulator::new();
    for i in 0..12 {
        acc.accumulate(&auto(i, 1), i as f32);
    }

    assert_eq!(acc.pixel_lights(), [11, NO_LIGHT, NO_LIGHT, NO_LIGHT]);
    assert_eq!(acc.vertex_lights(), [10, 9, 8, 7]);
    assert!(acc.num_candidates() <= MAX_PIXEL_LIGHTS + MAX_VERTEX_LIGHTS + MAX_VERTEX_LIGHTS);
}

#[test]
fn test_pixel_limit_is_capped_by_capacity() {
    let mut acc = LightAccumulator::new();
    for i in 0..6 {
        acc.accumulate(&auto(i, 10), i as f32);
    }
    assert_eq!(acc.num_pixel_lights(), MAX_PIXEL_LIGHTS);
    assert_eq!(acc.pixel_lights(), [5, 4, 3, 2]);
    assert_eq!(acc.vertex_lights(), [1, 0, NO_LIGHT, NO_LIGHT]);
}

#[test]
fn test_zero_pixel_limit_sends_auto_lights_to_vertex_tier() {
    let mut acc = LightAccumulator::new();
    acc.accumulate(&auto(0, 0), 2.0);
    acc.accumulate(&auto(1, 0), 3.0);

    assert_eq!(acc.num_pixel_lights(), 0);
    assert_eq!(acc.vertex_lights(), [1, 0, NO_LIGHT, NO_LIGHT]);
}

// ============================================================================
// Importance
// ============================================================================

#[test]
fn test_important_light_evicts_pixel_entries() {
    let mut acc = LightAccumulator::new();
    for i in 0..4 {
        acc.accumulate(&auto(i, 4), 100.0 + i as f32);
    }
    acc.accumulate(&ctx(9, LightImportance::Important, 4), 0.001);

    let pixel = acc.pixel_lights();
    assert_eq!(pixel[0], 9);
    assert_eq!(pixel, [9, 3, 2, 1]);
    assert_eq!(acc.vertex_lights(), [0, NO_LIGHT, NO_LIGHT, NO_LIGHT]);
}

#[test]
fn test_forced_lights_exceed_soft_limit() {
    let mut acc = LightAccumulator::new();
    acc.accumulate(&auto(0, 1), 50.0);
    acc.accumulate(&LightAccumulatorContext { force_pixel: true, ..auto(1, 1) }, 1.0);
    acc.accumulate(&ctx(2, LightImportance::Important, 1), 2.0);

    assert_eq!(acc.num_pixel_lights(), 2);
    assert_eq!(acc.pixel_lights(), [2, 1, NO_LIGHT, NO_LIGHT]);
    assert_eq!(acc.vertex_lights(), [0, NO_LIGHT, NO_LIGHT, NO_LIGHT]);
}

#[test]
fn test_not_important_lights_stay_in_vertex_tier() {
    let mut acc = LightAccumulator::new();
    acc.accumulate(&ctx(0, LightImportance::NotImportant, 4), 1000.0);
    acc.accumulate(&auto(1, 4), 1.0);

    assert_eq!(acc.pixel_lights(), [1, NO_LIGHT, NO_LIGHT, NO_LIGHT]);
    assert_eq!(acc.vertex_lights(), [0, NO_LIGHT, NO_LIGHT, NO_LIGHT]);
}

#[test]
fn test_not_important_lights_do_not_block_pixel_candidates() {
    let mut acc = LightAccumulator::new();
    for i in 0..8 {
        acc.accumulate(&ctx(i, LightImportance::NotImportant, 1), 100.0 + i as f32);
    }
    acc.accumulate(&auto(20, 1), 0.5);

    assert_eq!(acc.pixel_lights()[0], 20);
    assert_eq!(acc.vertex_lights(), [7, 6, 5, 4]);
}

#[test]
fn test_equal_scores_prefer_lower_index() {
    let mut acc = LightAccumulator::new();
    acc.accumulate(&auto(3, 1), 1.0);
    acc.accumulate(&auto(1, 1), 1.0);
    acc.accumulate(&auto(2, 1), 1.0);

    assert_eq!(acc.pixel_lights()[0], 1);
    assert_eq!(acc.vertex_lights(), [2, 3, NO_LIGHT, NO_LIGHT]);
}

// ============================================================================
// Order independence
// ============================================================================

#[test]
fn test_insertion_order_does_not_change_tiers() {
    let candidates: Vec<(u32, f32)> = (0..14u32)
        .map(|i| (i, ((i * 37) % 11) as f32 * 0.5 + 0.25))
        .collect();

    let run = |order: &[(u32, f32)]| {
        let mut acc = LightAccumulator::new();
        for &(index, score) in order {
            let importance = match index % 5 {
                0 => LightImportance::NotImportant,
                3 => LightImportance::Important,
                _ => LightImportance::Auto,
            };
            acc.accumulate(&ctx(index, importance, 2), score);
        }
        (acc.pixel_lights(), acc.vertex_lights())
    };

    let reference = run(&candidates);
    for seed in 1..20 {
        assert_eq!(run(&shuffled(candidates.clone(), seed)), reference, "seed {}", seed);
    }

    let (pixel, vertex) = reference;
    assert!(count_lights(&pixel) <= MAX_PIXEL_LIGHTS);
    assert!(count_lights(&vertex) <= MAX_VERTEX_LIGHTS);
}

#[test]
fn test_reset_clears_state() {
    let mut acc = LightAccumulator::new();
    acc.accumulate(&ctx(0, LightImportance::Important, 4), 1.0);
    acc.reset();

    assert_eq!(acc.num_candidates(), 0);
    assert_eq!(acc.num_pixel_lights(), 0);
}
