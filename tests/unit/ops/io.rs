use std::sync::Arc;

use super::*;
use crate::memory::bucket::BucketAllocator;

fn setup() -> (Dispatcher, Arc<BucketAllocator>) {
    (
        Dispatcher::new(Some(3)).unwrap(),
        Arc::new(BucketAllocator::default()),
    )
}

#[test]
fn byte_conversion_rounds_and_saturates() {
    assert_eq!(to_u8(0.0), 0);
    assert_eq!(to_u8(1.0), 255);
    assert_eq!(to_u8(0.5), 127);
    assert_eq!(to_u8(-1.0), 0);
    assert_eq!(to_u8(3.0), 255);
}

#[test]
fn rgba8_write_then_read_returns_the_bytes() {
    let (d, a) = setup();
    let mut b = PixelBuffer::blank(&a, 16, 16).unwrap();
    let bytes: Vec<u8> = (0..16 * 16 * 4).map(|i| (i % 256) as u8).collect();
    write_rgba8(&d, &mut b, &bytes).unwrap();
    assert_eq!(read_rgba8(&d, &b).unwrap(), bytes);
}

#[test]
fn f32_io_is_lossless() {
    let (d, a) = setup();
    let mut b = PixelBuffer::blank(&a, 16, 32).unwrap();
    let values: Vec<f32> = (0..16 * 32 * 4).map(|i| i as f32 * 0.01 - 3.0).collect();
    write_rgba_f32(&d, &mut b, &values).unwrap();
    assert_eq!(read_rgba_f32(&b), values);
    assert_eq!(b.get(1, 0)[2], values[6]);
}

#[test]
fn writes_require_exact_length() {
    let (d, a) = setup();
    let mut b = PixelBuffer::blank(&a, 16, 16).unwrap();
    assert!(write_rgba8(&d, &mut b, &[0u8; 16 * 16 * 4 - 1]).is_err());
    assert!(write_rgba_f32(&d, &mut b, &[0f32; 16 * 16 * 4 + 4]).is_err());
    assert!(write_channel_u8(&d, &mut b, &[0u8; 10], ChannelMask::ALL).is_err());
    assert!(write_channel_f32(&d, &mut b, &[0f32; 10], ChannelMask::ALL).is_err());
}

#[test]
fn channel_reads_select_one_channel() {
    let (d, a) = setup();
    let mut b = PixelBuffer::blank(&a, 16, 16).unwrap();
    b.texels_mut().fill(Texel::new(0.0, 0.25, 1.0, 0.5));
    assert!(read_channel_f32(&d, &b, Channel::G).unwrap().iter().all(|v| *v == 0.25));
    assert!(read_channel_u8(&d, &b, Channel::B).unwrap().iter().all(|v| *v == 255));
    assert!(read_channel_u8(&d, &b, Channel::A).unwrap().iter().all(|v| *v == 127));
}

#[test]
fn channel_writes_fill_the_mask() {
    let (d, a) = setup();
    let mut b = PixelBuffer::blank(&a, 16, 16).unwrap();
    let values: Vec<f32> = (0..256).map(|i| i as f32).collect();
    write_channel_f32(&d, &mut b, &values, ChannelMask::new(0b0110).unwrap()).unwrap();
    assert_eq!(b.get(3, 1), Texel::new(0.0, 19.0, 19.0, 0.0));

    let bytes = vec![255u8; 256];
    write_channel_u8(&d, &mut b, &bytes, ChannelMask::new(0b1000).unwrap()).unwrap();
    assert_eq!(b.get(3, 1), Texel::new(0.0, 19.0, 19.0, 1.0));
}
