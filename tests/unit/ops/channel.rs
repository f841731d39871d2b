use std::sync::Arc;

use super::*;
use crate::memory::bucket::BucketAllocator;

fn setup() -> (Dispatcher, Arc<BucketAllocator>) {
    (
        Dispatcher::new(Some(3)).unwrap(),
        Arc::new(BucketAllocator::default()),
    )
}

fn filled(a: &Arc<BucketAllocator>, v: Texel) -> PixelBuffer {
    let mut b = PixelBuffer::blank(a, 16, 16).unwrap();
    b.texels_mut().fill(v);
    b
}

fn mask(bits: u32) -> ChannelMask {
    ChannelMask::new(bits).unwrap()
}

#[test]
fn copy_channel_spreads_into_mask() {
    let (d, a) = setup();
    let src = filled(&a, Texel::new(0.1, 0.2, 0.3, 0.4));
    let mut dst = filled(&a, Texel::splat(9.0));
    copy_channel(&d, &mut dst, Some(&src), Channel::B, mask(0b1011)).unwrap();
    assert_eq!(dst.get(4, 4), Texel::new(0.3, 0.3, 9.0, 0.3));
}

#[test]
fn copy_channel_from_self_reads_before_writing() {
    let (d, a) = setup();
    let mut b = filled(&a, Texel::new(0.1, 0.2, 0.3, 0.4));
    copy_channel(&d, &mut b, None, Channel::R, ChannelMask::ALL).unwrap();
    assert_eq!(b.get(0, 0), Texel::splat(0.1));
}

#[test]
fn swap_channels_across_buffers() {
    let (d, a) = setup();
    let mut x = filled(&a, Texel::new(1.0, 2.0, 3.0, 4.0));
    let mut y = filled(&a, Texel::new(5.0, 6.0, 7.0, 8.0));
    swap_channels(&d, &mut x, Channel::R, &mut y, Channel::A).unwrap();
    assert_eq!(x.get(0, 0), Texel::new(8.0, 2.0, 3.0, 4.0));
    assert_eq!(y.get(0, 0), Texel::new(5.0, 6.0, 7.0, 1.0));
}

#[test]
fn swap_channels_within_one_buffer() {
    let (d, a) = setup();
    let mut x = filled(&a, Texel::new(1.0, 2.0, 3.0, 4.0));
    swap_channels_within(&d, &mut x, Channel::G, Channel::B).unwrap();
    assert_eq!(x.get(15, 15), Texel::new(1.0, 3.0, 2.0, 4.0));
}

#[test]
fn blend_channels_formula() {
    let (d, a) = setup();
    let src = filled(&a, Texel::new(1.0, 0.0, 0.0, 0.0));
    let mut dst = filled(&a, Texel::new(0.0, 0.0, 0.5, 1.0));
    blend_channels(&d, &mut dst, Some(&src), Channel::R, 0.5, mask(0b0110)).unwrap();
    assert_eq!(dst.get(1, 2), Texel::new(0.0, 0.5, 0.75, 1.0));
}

#[test]
fn blend_channels_with_self_uses_pre_write_value() {
    let (d, a) = setup();
    let mut b = filled(&a, Texel::new(1.0, 0.0, 0.0, 1.0));
    blend_channels(&d, &mut b, None, Channel::R, 0.5, ChannelMask::ALL).unwrap();
    // Every channel reads R = 1 from before this texel was written.
    assert_eq!(b.get(0, 0), Texel::new(1.0, 0.5, 0.5, 1.0));
}

#[test]
fn diffs_are_absolute() {
    let (d, a) = setup();
    let src = filled(&a, Texel::new(0.25, 0.5, 1.0, 0.0));
    let mut dst = filled(&a, Texel::new(0.0, 1.0, 0.5, 0.75));
    texture_diff(&d, &mut dst, Some(&src), ChannelMask::ALL).unwrap();
    assert_eq!(dst.get(0, 0), Texel::new(0.25, 0.5, 0.5, 0.75));

    let mut dst = filled(&a, Texel::new(0.0, 1.0, 0.5, 0.75));
    channel_diff(&d, &mut dst, Some(&src), Channel::G, mask(0b0111)).unwrap();
    assert_eq!(dst.get(0, 0), Texel::new(0.5, 0.5, 0.0, 0.75));
}

#[test]
fn texture_diff_with_self_is_zero() {
    let (d, a) = setup();
    let mut b = filled(&a, Texel::new(0.3, -2.0, 5.0, 1.0));
    texture_diff(&d, &mut b, None, ChannelMask::ALL).unwrap();
    assert!(b.texels().iter().all(|t| *t == Texel::ZERO));
}

#[test]
fn merge_blends_constant_factor() {
    let (d, a) = setup();
    let src = filled(&a, Texel::splat(1.0));
    let mut dst = filled(&a, Texel::splat(0.0));
    merge(&d, &mut dst, Some(&src), 0.25, mask(0b0001)).unwrap();
    assert_eq!(dst.get(9, 9), Texel::new(0.25, 0.0, 0.0, 0.0));
}

#[test]
fn blend_with_alpha_uses_alpha_texture_channel() {
    let (d, a) = setup();
    let src = filled(&a, Texel::splat(1.0));
    let alpha = filled(&a, Texel::new(0.0, 0.5, 0.0, 0.0));
    let mut dst = filled(&a, Texel::splat(0.0));
    blend_with_alpha(&d, &mut dst, Some(&src), Some(&alpha), Channel::G, ChannelMask::ALL).unwrap();
    assert_eq!(dst.get(0, 0), Texel::splat(0.5));
}

#[test]
fn fill_background_composites_under_alpha() {
    let (d, a) = setup();
    let mut b = filled(&a, Texel::new(1.0, 1.0, 1.0, 0.25));
    fill_background(&d, &mut b, Texel::new(0.0, 0.0, 0.0, 1.0), mask(0b0111)).unwrap();
    assert_eq!(b.get(0, 0), Texel::new(0.25, 0.25, 0.25, 0.25));
}

#[test]
fn fill_with_channel_uses_coverage() {
    let (d, a) = setup();
    let cover = filled(&a, Texel::new(0.0, 0.0, 0.0, 0.5));
    let mut b = filled(&a, Texel::splat(0.0));
    fill_with_channel(&d, &mut b, Some(&cover), Channel::A, Texel::splat(1.0), ChannelMask::ALL)
        .unwrap();
    assert_eq!(b.get(0, 0), Texel::splat(0.5));
}

#[test]
fn size_mismatch_is_rejected_before_writing() {
    let (d, a) = setup();
    let src = PixelBuffer::blank(&a, 32, 32).unwrap();
    let mut dst = filled(&a, Texel::splat(0.5));
    assert!(merge(&d, &mut dst, Some(&src), 1.0, ChannelMask::ALL).is_err());
    assert!(blend_with_alpha(&d, &mut dst, None, Some(&src), Channel::A, ChannelMask::ALL).is_err());
    assert_eq!(dst.get(0, 0), Texel::splat(0.5));
}
