use std::sync::Arc;

use super::*;
use crate::memory::bucket::BucketAllocator;

fn setup() -> (Dispatcher, Arc<BucketAllocator>) {
    (
        Dispatcher::new(Some(3)).unwrap(),
        Arc::new(BucketAllocator::default()),
    )
}

fn indexed(a: &Arc<BucketAllocator>, w: u32, h: u32) -> PixelBuffer {
    let mut b = PixelBuffer::blank(a, w, h).unwrap();
    for (i, t) in b.texels_mut().iter_mut().enumerate() {
        *t = Texel::new((i % w as usize) as f32, (i / w as usize) as f32, i as f32, 1.0);
    }
    b
}

#[test]
fn bilinear_on_integer_coordinates_is_exact() {
    let (_, a) = setup();
    let b = indexed(&a, 16, 16);
    assert_eq!(sample_bilinear(&b, 3.0, 5.0), b.get(3, 5));
    // Wraps past the right edge.
    assert_eq!(sample_bilinear(&b, 16.0, 0.0), b.get(0, 0));
}

#[test]
fn bilinear_halfway_averages_neighbours() {
    let (_, a) = setup();
    let b = indexed(&a, 16, 16);
    let t = sample_bilinear(&b, 2.5, 0.0);
    assert_eq!(t[0], 2.5);
}

#[test]
fn resize_round_trips_constant_images() {
    let (d, a) = setup();
    let mut b = PixelBuffer::blank(&a, 32, 16).unwrap();
    b.texels_mut().fill(Texel::new(0.25, 0.5, 0.75, 1.0));
    let up = resize(&d, &b, 128, 64).unwrap();
    assert_eq!(up.dimensions(), (128, 64));
    assert!(up.texels().iter().all(|t| *t == Texel::new(0.25, 0.5, 0.75, 1.0)));
    let down = resize(&d, &up, 16, 16).unwrap();
    assert_eq!(down.dimensions(), (16, 16));
    assert!(down.texels().iter().all(|t| *t == Texel::new(0.25, 0.5, 0.75, 1.0)));
}

#[test]
fn resize_doubles_with_midpoints_and_halves_by_pairs() {
    let (d, a) = setup();
    let b = indexed(&a, 16, 16);
    let up = resize(&d, &b, 32, 16).unwrap();
    assert_eq!(up.get(4, 3)[0], 2.0);
    assert_eq!(up.get(5, 3)[0], 2.5);
    // The last inserted column wraps to the first.
    assert_eq!(up.get(31, 0)[0], 7.5);

    let down = resize(&d, &b, 16, 16).unwrap();
    assert_eq!(down.texels(), b.texels());

    let halved = resize(&d, &indexed(&a, 32, 16), 16, 16).unwrap();
    assert_eq!(halved.get(3, 0)[0], 6.5);
}

#[test]
fn resize_rejects_non_power_of_two_ratio_and_bad_sizes() {
    let (d, a) = setup();
    let b = PixelBuffer::blank(&a, 16, 16).unwrap();
    assert!(resize(&d, &b, 48, 16).is_err());
    assert!(matches!(
        resize(&d, &b, 0, 16),
        Err(TexError::SizeOutOfRange { .. })
    ));
}

#[test]
fn shift_by_zero_and_full_turn_is_identity() {
    let (d, a) = setup();
    let b = indexed(&a, 32, 16);
    let s0 = shift(&d, &b, 0.0, 0.0, ChannelMask::ALL).unwrap();
    assert_eq!(s0.texels(), b.texels());
    let s1 = shift(&d, &b, 1.0, 0.0, ChannelMask::ALL).unwrap();
    assert_eq!(s1.texels(), b.texels());
}

#[test]
fn shift_rolls_with_wraparound() {
    let (d, a) = setup();
    let b = indexed(&a, 16, 16);
    let s = shift(&d, &b, 0.25, -0.125, ChannelMask::ALL).unwrap();
    // dx = 4, dy = -2: out(x, y) = src(x + 4, y - 2)
    assert_eq!(s.get(0, 0), b.get(4, 14));
    assert_eq!(s.get(12, 2), b.get(0, 0));
    assert_eq!(s.get(0, 0)[0], 4.0);
}

#[test]
fn masked_shift_keeps_other_channels() {
    let (d, a) = setup();
    let b = indexed(&a, 16, 16);
    let s = shift(&d, &b, 0.5, 0.0, ChannelMask::new(0b0001).unwrap()).unwrap();
    for y in 0..16 {
        for x in 0..16 {
            let (o, n) = (b.get(x, y), s.get(x, y));
            assert_eq!(n[0], b.get((x + 8) % 16, y)[0]);
            assert_eq!(n[1], o[1]);
            assert_eq!(n[2], o[2]);
        }
    }
}

#[test]
fn warp_with_zero_map_is_identity() {
    let (d, a) = setup();
    let b = indexed(&a, 16, 16);
    let map = PixelBuffer::blank(&a, 16, 16).unwrap();
    let w = warp(&d, &b, &map, 3.0, ChannelMask::ALL).unwrap();
    assert_eq!(w.texels(), b.texels());
}

#[test]
fn warp_by_constant_offset_matches_shift() {
    let (d, a) = setup();
    let b = indexed(&a, 16, 16);
    let mut map = PixelBuffer::blank(&a, 16, 16).unwrap();
    map.texels_mut().fill(Texel::new(2.0, 0.0, 0.0, 0.0));
    // 2 * 2 = 4 texels to the right, the same read as a quarter-width shift.
    let w = warp(&d, &b, &map, 2.0, ChannelMask::ALL).unwrap();
    let s = shift(&d, &b, 0.25, 0.0, ChannelMask::ALL).unwrap();
    assert_eq!(w.texels(), s.texels());
}

#[test]
fn warp_displacement_is_map_times_mult_in_texels() {
    let (d, a) = setup();
    let b = indexed(&a, 16, 16);
    let mut map = PixelBuffer::blank(&a, 16, 16).unwrap();
    map.texels_mut().fill(Texel::new(0.5, 0.0, 0.0, 0.0));
    let w = warp(&d, &b, &map, 1.0, ChannelMask::ALL).unwrap();
    assert_eq!(w.get(3, 0)[0], 3.5);
    // Displacement does not grow with the texture size.
    let wide = indexed(&a, 64, 16);
    let mut map = PixelBuffer::blank(&a, 64, 16).unwrap();
    map.texels_mut().fill(Texel::new(0.5, 0.0, 0.0, 0.0));
    let w = warp(&d, &wide, &map, 1.0, ChannelMask::ALL).unwrap();
    assert_eq!(w.get(3, 0)[0], 3.5);
}

#[test]
fn sample_map_reads_normalized_coordinates() {
    let (d, a) = setup();
    let src = indexed(&a, 32, 32);
    let mut map = PixelBuffer::blank(&a, 16, 16).unwrap();
    map.texels_mut().fill(Texel::new(0.5, 0.25, 0.0, 0.0));
    sample_map(&d, &mut map, &src, ChannelMask::ALL).unwrap();
    assert_eq!(map.get(7, 7), src.get(16, 8));
}

#[test]
fn sample_map_clamps_coordinates_to_the_unit_square() {
    let (d, a) = setup();
    let src = indexed(&a, 16, 16);
    let mut map = PixelBuffer::blank(&a, 16, 16).unwrap();
    map.texels_mut().fill(Texel::new(-2.0, 0.25, 0.0, 0.0));
    sample_map(&d, &mut map, &src, ChannelMask::ALL).unwrap();
    // Below zero pins to the left edge instead of tiling to x = 0.
    assert_eq!(map.get(3, 3), src.get(0, 4));

    map.texels_mut().fill(Texel::new(0.75, 1.5, 0.0, 0.0));
    sample_map(&d, &mut map, &src, ChannelMask::ALL).unwrap();
    // 1.5 clamps to 1.0, which lands on the wrapped first row.
    assert_eq!(map.get(3, 3), src.get(12, 0));
}
