//! Tests for the CPU reference stage

use glam::{Vec3, Vec4};

use super::*;

fn sample_positions() -> Vec<Vec3> {
    vec![
        Vec3::ZERO,
        Vec3::new(1.0, 2.0, 3.0),
        Vec3::new(-0.0, 0.0, -0.0),
        Vec3::new(f32::MIN_POSITIVE, -f32::MIN_POSITIVE, 1e-45),
        Vec3::new(f32::MAX, f32::MIN, f32::INFINITY),
        Vec3::new(f32::NEG_INFINITY, 123_456.79, -0.333_333_34),
    ]
}

// =============================================================================
// Declared behavior (w = 0)
// =============================================================================

#[test]
fn test_example_one_two_three() {
    let stage = PassThroughStage::default();
    let out = stage.invoke(&VertexInput::new(Vec3::new(1.0, 2.0, 3.0), 5));
    assert_eq!(out.clip_position, Vec4::new(1.0, 2.0, 3.0, 0.0));
    assert_eq!(out.tex_index, 5);
}

#[test]
fn test_example_origin() {
    let stage = PassThroughStage::default();
    let out = stage.invoke(&VertexInput::new(Vec3::ZERO, 0));
    assert_eq!(out.clip_position, Vec4::ZERO);
    assert_eq!(out.tex_index, 0);
}

#[test]
fn test_xyz_is_bit_exact_copy() {
    let stage = PassThroughStage::default();
    for p in sample_positions() {
        let out = stage.invoke(&VertexInput::new(p, 1));
        assert_eq!(out.clip_position.x.to_bits(), p.x.to_bits());
        assert_eq!(out.clip_position.y.to_bits(), p.y.to_bits());
        assert_eq!(out.clip_position.z.to_bits(), p.z.to_bits());
    }
}

#[test]
fn test_nan_position_is_forwarded() {
    let stage = PassThroughStage::default();
    let out = stage.invoke(&VertexInput::new(Vec3::new(f32::NAN, 1.0, 2.0), 9));
    assert!(out.clip_position.x.is_nan());
    assert_eq!(out.clip_position.w.to_bits(), 0.0f32.to_bits());
}

#[test]
fn test_w_is_positive_zero() {
    let stage = PassThroughStage::default();
    for p in sample_positions() {
        let out = stage.invoke(&VertexInput::new(p, 0));
        assert_eq!(out.clip_position.w.to_bits(), 0.0f32.to_bits());
    }
}

#[test]
fn test_tex_index_forwarded_unchanged() {
    let stage = PassThroughStage::default();
    for t in [0, 1, 5, 255, 256, 65_535, 1 << 31, u32::MAX - 1, u32::MAX] {
        let out = stage.invoke(&VertexInput::new(Vec3::ONE, t));
        assert_eq!(out.tex_index, t);
    }
}

// =============================================================================
// Overridden w
// =============================================================================

#[test]
fn test_clip_w_one_only_changes_w() {
    let zero = PassThroughStage::new(ClipW::Zero);
    let one = PassThroughStage::new(ClipW::One);
    for p in sample_positions() {
        let input = VertexInput::new(p, 42);
        let a = zero.invoke(&input);
        let b = one.invoke(&input);
        assert_eq!(
            a.clip_position.truncate().to_array().map(f32::to_bits),
            b.clip_position.truncate().to_array().map(f32::to_bits)
        );
        assert_eq!(b.clip_position.w, 1.0);
        assert_eq!(a.tex_index, b.tex_index);
    }
}

#[test]
fn test_clip_w_default_is_zero() {
    assert_eq!(ClipW::default(), ClipW::Zero);
    assert_eq!(PassThroughStage::default().clip_w(), ClipW::Zero);
}

// =============================================================================
// Batch invocation
// =============================================================================

#[test]
fn test_invoke_batch_preserves_order() {
    let stage = PassThroughStage::default();
    let inputs: Vec<VertexInput> = (0..10_000u32)
        .map(|i| VertexInput::new(Vec3::new(i as f32, -(i as f32), 0.5), i))
        .collect();

    let outputs = stage.invoke_batch(&inputs);
    assert_eq!(outputs.len(), inputs.len());
    for (input, output) in inputs.iter().zip(&outputs) {
        assert_eq!(*output, stage.invoke(input));
    }
}

#[test]
fn test_invoke_batch_empty() {
    assert!(PassThroughStage::default().invoke_batch(&[]).is_empty());
}
