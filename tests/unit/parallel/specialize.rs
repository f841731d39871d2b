use super::*;

struct SetOne;

impl MaskKernel for SetOne {
    fn apply<const M: u8>(&self, _start: usize, dst: &mut [Texel]) {
        for t in dst {
            store::<M>(t, Texel::splat(1.0));
        }
    }
}

struct Tag;

impl ChannelKernel<u32> for Tag {
    fn apply<const C: usize>(&self, start: usize, dst: &mut [u32]) {
        for (i, v) in dst.iter_mut().enumerate() {
            *v = (C * 1000 + start + i) as u32;
        }
    }
}

struct Move<'a> {
    src: &'a [Texel],
}

impl ChannelPairKernel for Move<'_> {
    fn apply<const D: usize, const S: usize>(&self, start: usize, dst: &mut [Texel]) {
        for (i, t) in dst.iter_mut().enumerate() {
            t.0[D] = self.src[start + i].0[S];
        }
    }
}

struct Spread<'a> {
    src: &'a [Texel],
}

impl ChannelMaskKernel for Spread<'_> {
    fn apply<const C: usize, const M: u8>(&self, start: usize, dst: &mut [Texel]) {
        for (i, t) in dst.iter_mut().enumerate() {
            store::<M>(t, Texel::splat(self.src[start + i].0[C]));
        }
    }
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(Some(3)).unwrap()
}

#[test]
fn every_mask_matches_the_branching_reference() {
    let d = dispatcher();
    for bits in 0..16u32 {
        let mask = ChannelMask::new(bits).unwrap();
        let mut data = vec![Texel::new(0.1, 0.2, 0.3, 0.4); 37];
        d.masked(mask, &mut data, &SetOne).unwrap();
        for t in &data {
            for c in 0..4 {
                let expected = if bits & (1 << c) != 0 {
                    1.0
                } else {
                    [0.1, 0.2, 0.3, 0.4][c]
                };
                assert_eq!(t.0[c].to_bits(), f32::to_bits(expected));
            }
        }
    }
}

#[test]
fn channel_dispatch_picks_the_index() {
    let d = dispatcher();
    let mut out = vec![0u32; 10];
    d.channel(Channel::B, &mut out, &Tag).unwrap();
    assert_eq!(out[0], 2000);
    assert_eq!(out[9], 2009);
}

#[test]
fn channel_pair_moves_between_indices() {
    let d = dispatcher();
    let src = vec![Texel::new(1.0, 2.0, 3.0, 4.0); 20];
    let mut dst = vec![Texel::ZERO; 20];
    d.channel_pair(Channel::A, Channel::G, &mut dst, &Move { src: &src })
        .unwrap();
    assert!(dst.iter().all(|t| *t == Texel::new(0.0, 0.0, 0.0, 2.0)));
}

#[test]
fn channel_mask_combines_both() {
    let d = dispatcher();
    let src = vec![Texel::new(1.0, 2.0, 3.0, 4.0); 20];
    let mut dst = vec![Texel::ZERO; 20];
    let mask = ChannelMask::new(0b0101).unwrap();
    d.channel_masked(Channel::B, mask, &mut dst, &Spread { src: &src })
        .unwrap();
    assert!(dst.iter().all(|t| *t == Texel::new(3.0, 0.0, 3.0, 0.0)));
}
