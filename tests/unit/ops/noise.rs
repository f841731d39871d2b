use std::sync::Arc;

use super::*;
use crate::memory::bucket::BucketAllocator;

fn alloc() -> Arc<BucketAllocator> {
    Arc::new(BucketAllocator::default())
}

#[test]
fn noise_is_reproducible_on_any_thread_count() {
    let a = alloc();
    let mut x = PixelBuffer::blank(&a, 32, 32).unwrap();
    let mut y = PixelBuffer::blank(&a, 32, 32).unwrap();
    noise(
        &Dispatcher::new(Some(1)).unwrap(),
        &mut x,
        &mut RandomDevice::seeded(42),
        ChannelMask::ALL,
    )
    .unwrap();
    noise(
        &Dispatcher::new(Some(5)).unwrap(),
        &mut y,
        &mut RandomDevice::seeded(42),
        ChannelMask::ALL,
    )
    .unwrap();
    assert_eq!(x.texels(), y.texels());
    assert!(x.texels().iter().all(|t| t.0.iter().all(|v| (0.0..=1.0).contains(v))));
    // Channels draw independently.
    assert!(x.texels().iter().any(|t| t[0] != t[1]));
}

#[test]
fn noise_writes_only_masked_channels() {
    let a = alloc();
    let d = Dispatcher::new(Some(2)).unwrap();
    let mut b = PixelBuffer::blank(&a, 16, 16).unwrap();
    b.texels_mut().fill(Texel::splat(7.0));
    noise(&d, &mut b, &mut RandomDevice::seeded(1), ChannelMask::new(0b1001).unwrap()).unwrap();
    for t in b.texels() {
        assert!(t[0] <= 1.0 && t[3] <= 1.0);
        assert_eq!(t[1], 7.0);
        assert_eq!(t[2], 7.0);
    }
}

#[test]
fn white_noise_shares_one_draw_per_texel() {
    let a = alloc();
    let d = Dispatcher::new(Some(3)).unwrap();
    let mut b = PixelBuffer::blank(&a, 16, 16).unwrap();
    white_noise(&d, &mut b, &mut RandomDevice::seeded(9), ChannelMask::new(0b0111).unwrap()).unwrap();
    for t in b.texels() {
        assert_eq!(t[0], t[1]);
        assert_eq!(t[1], t[2]);
        assert_eq!(t[3], 0.0);
    }
    // Same seed, same first value.
    let first = RandomDevice::seeded(9).next_unit();
    assert_eq!(b.get(0, 0)[0], first);
}

#[test]
fn turbulence_single_level_is_identity() {
    let a = alloc();
    let d = Dispatcher::new(Some(3)).unwrap();
    let mut b = PixelBuffer::blank(&a, 16, 16).unwrap();
    noise(&d, &mut b, &mut RandomDevice::seeded(3), ChannelMask::ALL).unwrap();
    let out = turbulence(&d, &b, 1, 0.5, ChannelMask::ALL).unwrap();
    assert_eq!(out.texels(), b.texels());
}

#[test]
fn turbulence_averages_octaves() {
    let a = alloc();
    let d = Dispatcher::new(Some(3)).unwrap();
    let mut b = PixelBuffer::blank(&a, 16, 16).unwrap();
    for (i, t) in b.texels_mut().iter_mut().enumerate() {
        let (x, y) = (i % 16, i / 16);
        *t = Texel::splat(((x + y) % 2) as f32);
    }
    let out = turbulence(&d, &b, 2, 1.0, ChannelMask::ALL).unwrap();
    // Level 1 at (0, 0) reads src(0, 0); at (1, 0) it is halfway to src(1, 0).
    assert_eq!(out.get(0, 0)[0], 0.0);
    assert_eq!(out.get(1, 0)[0], 0.75);
}

fn x_ramp(a: &Arc<BucketAllocator>) -> PixelBuffer {
    let mut b = PixelBuffer::blank(a, 16, 16).unwrap();
    for (i, t) in b.texels_mut().iter_mut().enumerate() {
        *t = Texel::new((i % 16) as f32, 0.0, 0.0, 1.0);
    }
    b
}

#[test]
fn turbulence_magnifies_the_top_left_region_per_level() {
    let a = alloc();
    let d = Dispatcher::new(Some(3)).unwrap();
    let b = x_ramp(&a);

    let two = turbulence(&d, &b, 2, 1.0, ChannelMask::ALL).unwrap();
    // Level 1 at x = 3 blends src(1) and src(2) equally.
    assert_eq!(two.get(3, 0)[0], 2.25);
    // Level 1 at x = 15 blends src(7) with src(0) across the 8-texel tile.
    assert_eq!(two.get(15, 0)[0], 9.25);

    let three = turbulence(&d, &b, 3, 1.0, ChannelMask::ALL).unwrap();
    // Level 2 at x = 5: a quarter of the way from src(1) to src(2).
    let expected = (5.0 + 2.5 + 1.25) / 3.0;
    assert!((three.get(5, 0)[0] - expected).abs() < 1e-5);
}

#[test]
fn turbulence_keeps_unmasked_channels() {
    let a = alloc();
    let d = Dispatcher::new(Some(2)).unwrap();
    let b = x_ramp(&a);
    let out = turbulence(&d, &b, 2, 0.5, ChannelMask::new(0b0010).unwrap()).unwrap();
    assert_eq!(out.texels(), b.texels());
}

#[test]
fn turbulence_validates_levels_and_weights() {
    let a = alloc();
    let d = Dispatcher::new(Some(2)).unwrap();
    let b = PixelBuffer::blank(&a, 16, 32).unwrap();
    assert!(turbulence(&d, &b, 0, 0.5, ChannelMask::ALL).is_err());
    assert!(turbulence(&d, &b, 5, 0.5, ChannelMask::ALL).is_ok());
    assert!(turbulence(&d, &b, 6, 0.5, ChannelMask::ALL).is_err());
    // 1 + (-1) sums to zero.
    assert!(turbulence(&d, &b, 2, -1.0, ChannelMask::ALL).is_err());
}
