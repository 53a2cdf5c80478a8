//! Separable box blur.
//!
//! Two 1-D moving-average passes (horizontal, then vertical) over a window of
//! `2 * radius + 1` samples. Samples outside the image are clamped to the
//! nearest edge pixel. Each pass keeps a running per-channel sum and updates
//! it by one sample in and one sample out, so the cost is O(width × height)
//! per pass regardless of radius.
//!
//! The result of the two passes is the usual separable approximation of a
//! square box filter: each pass floors its mean, so the output can differ by
//! a unit from an exact 2-D box convolution.

use image::{Rgba, RgbaImage};

/// Blur `src` with a box of the given radius. A radius of 0 returns an unchanged copy.
pub fn box_blur(src: &RgbaImage, radius: u32) -> RgbaImage {
    if radius == 0 || src.width() == 0 || src.height() == 0 {
        return src.clone();
    }
    let horizontal = blur_pass(src, radius, Axis::Horizontal);
    blur_pass(&horizontal, radius, Axis::Vertical)
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// One sliding-window pass along `axis`, writing into a fresh buffer.
fn blur_pass(src: &RgbaImage, radius: u32, axis: Axis) -> RgbaImage {
    let (width, height) = src.dimensions();
    let (len, lines) = match axis {
        Axis::Horizontal => (width, height),
        Axis::Vertical => (height, width),
    };
    let last = len as i64 - 1;
    let at = |line: u32, pos: i64| -> Rgba<u8> {
        let pos = pos.clamp(0, last) as u32;
        match axis {
            Axis::Horizontal => *src.get_pixel(pos, line),
            Axis::Vertical => *src.get_pixel(line, pos),
        }
    };

    let r = radius as i64;
    let window = 2 * radius as u64 + 1;
    let mut dst = RgbaImage::new(width, height);

    for line in 0..lines {
        let mut sum = seed_window(radius, last, |pos| at(line, pos));

        for pos in 0..len {
            let mean = Rgba(sum.map(|s| (s / window) as u8));
            match axis {
                Axis::Horizontal => dst.put_pixel(pos, line, mean),
                Axis::Vertical => dst.put_pixel(line, pos, mean),
            }

            let pos = pos as i64;
            sub(&mut sum, at(line, pos - r));
            add(&mut sum, at(line, pos + r + 1), 1);
        }
    }

    dst
}

/// Sum of the clamped window centered on position 0.
///
/// Out-of-range positions are counted against the edge pixel they clamp to,
/// so seeding costs O(len) even when the radius is far larger than the line.
fn seed_window(radius: u32, last: i64, at: impl Fn(i64) -> Rgba<u8>) -> [u64; 4] {
    let r = radius as i64;
    let mut sum = [0u64; 4];
    // Positions -r..0 clamp to the first pixel
    add(&mut sum, at(0), radius as u64);
    for pos in 0..=r.min(last) {
        add(&mut sum, at(pos), 1);
    }
    if r > last {
        add(&mut sum, at(last), (r - last) as u64);
    }
    sum
}

#[inline]
fn add(sum: &mut [u64; 4], px: Rgba<u8>, count: u64) {
    for (s, &c) in sum.iter_mut().zip(px.0.iter()) {
        *s += c as u64 * count;
    }
}

#[inline]
fn sub(sum: &mut [u64; 4], px: Rgba<u8>) {
    for (s, &c) in sum.iter_mut().zip(px.0.iter()) {
        *s -= c as u64;
    }
}
