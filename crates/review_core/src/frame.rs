//! Turns raw intensity buffers into fixed-size 8-bit display frames.
//!
//! Windowing clips every sample to `[center - width/2, center + width/2]` and
//! then divides by the clipped maximum, so the brightest sample maps to 255.
//! The minimum is not shifted to zero.

use image::{GrayImage, ImageBuffer, Luma, imageops, imageops::FilterType};
use serde::{Deserialize, Serialize};

/// Raw or windowed intensities, one `f32` per pixel.
pub type IntensityImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Window parameters shared by all frames of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub center: f64,
    pub width: f64,
}

impl Window {
    pub fn new(center: f64, width: f64) -> Self {
        Self { center, width }
    }

    /// Window spanning the full intensity range of `pixels`.
    pub fn from_range(pixels: &IntensityImage) -> Self {
        let (min, max) = pixels
            .as_raw()
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if !min.is_finite() || !max.is_finite() {
            return Self::new(0.0, 0.0);
        }
        let (min, max) = (f64::from(min), f64::from(max));
        Self::new((min + max) / 2.0, max - min)
    }

    /// Lower and upper clip bounds.
    pub fn bounds(&self) -> (f32, f32) {
        let half = self.width / 2.0;
        ((self.center - half) as f32, (self.center + half) as f32)
    }
}

/// Clip to the window and rescale so the clipped maximum becomes 255.
///
/// A buffer whose clipped maximum is not positive has nothing to scale by and
/// comes back all zero.
pub fn normalize(pixels: &IntensityImage, window: Window) -> IntensityImage {
    let (lo, hi) = window.bounds();
    let clip = |v: f32| v.max(lo).min(hi);

    let max = pixels
        .as_raw()
        .iter()
        .map(|&v| clip(v))
        .fold(f32::NEG_INFINITY, f32::max);

    let (w, h) = pixels.dimensions();
    if !(max.is_finite() && max > 0.0) {
        return IntensityImage::new(w, h);
    }

    let data = pixels
        .as_raw()
        .iter()
        .map(|&v| clip(v) / max * 255.0)
        .collect();
    // Same dimensions as the input, so the buffer length always matches.
    IntensityImage::from_raw(w, h, data).unwrap_or_else(|| IntensityImage::new(w, h))
}

/// Size of the content after scaling the larger side to `target`.
///
/// The smaller side scales proportionally and is rounded down, but never
/// below one pixel.
pub fn scaled_size(width: u32, height: u32, target: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    let scale = |side: u32, larger: u32| -> u32 {
        let scaled = (u64::from(side) * u64::from(target)) / u64::from(larger);
        (scaled as u32).max(1)
    };
    if width >= height {
        (target, scale(height, width))
    } else {
        (scale(width, height), target)
    }
}

/// Cubic resize to fit `target` and center on a black `target x target` canvas.
///
/// Odd leftover padding goes to the right and bottom.
pub fn pad_and_resize(img: &IntensityImage, target: u32) -> GrayImage {
    let mut canvas = GrayImage::new(target, target);
    let (w, h) = img.dimensions();
    let (new_w, new_h) = scaled_size(w, h, target);
    if new_w == 0 || new_h == 0 {
        return canvas;
    }

    // `imageops` clamps float samples to [0, 1] while resampling.
    let unit = IntensityImage::from_fn(w, h, |x, y| {
        Luma([img.get_pixel(x, y).0[0].clamp(0.0, 255.0) / 255.0])
    });
    let resized = imageops::resize(&unit, new_w, new_h, FilterType::CatmullRom);
    let content = GrayImage::from_fn(new_w, new_h, |x, y| {
        Luma([unit_to_u8(resized.get_pixel(x, y).0[0])])
    });

    let left = (target - new_w) / 2;
    let top = (target - new_h) / 2;
    imageops::replace(&mut canvas, &content, i64::from(left), i64::from(top));
    canvas
}

/// Windowing followed by resize/pad, the full display pipeline for one frame.
pub fn process(pixels: &IntensityImage, window: Window, target: u32) -> GrayImage {
    pad_and_resize(&normalize(pixels, window), target)
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn ramp(w: u32, h: u32) -> IntensityImage {
        IntensityImage::from_fn(w, h, |x, y| Luma([(x + y * w) as f32 * 10.0]))
    }

    #[rstest]
    #[case(Window::new(100.0, 200.0))]
    #[case(Window::new(50.0, 60.0))]
    #[case(Window::new(1000.0, 4000.0))]
    #[case(Window::new(30.0, 20.0))]
    fn normalize_stays_in_range_and_peaks_at_255(#[case] window: Window) {
        let out = normalize(&ramp(8, 4), window);
        let max = out.as_raw().iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!(out.as_raw().iter().all(|&v| (0.0..=255.0).contains(&v)));
        assert_eq!(max, 255.0);
    }

    #[test]
    fn normalize_divides_by_clipped_max_without_shifting_min() {
        let pixels = IntensityImage::from_raw(4, 1, vec![0.0, 50.0, 100.0, 400.0]).unwrap();
        // bounds [50, 150]
        let out = normalize(&pixels, Window::new(100.0, 100.0));
        let expected = [50.0 / 150.0 * 255.0, 50.0 / 150.0 * 255.0, 100.0 / 150.0 * 255.0, 255.0];
        for (got, want) in out.as_raw().iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-4);
        }
    }

    #[test]
    fn normalize_zero_buffer_is_all_zero() {
        let pixels = IntensityImage::new(5, 3);
        let out = normalize(&pixels, Window::new(0.0, 0.0));
        assert!(out.as_raw().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn normalize_negative_window_is_all_zero() {
        let pixels = IntensityImage::from_raw(2, 1, vec![-900.0, -100.0]).unwrap();
        let out = normalize(&pixels, Window::new(-500.0, 400.0));
        assert!(out.as_raw().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn window_from_range_spans_min_to_max() {
        let pixels = IntensityImage::from_raw(3, 1, vec![10.0, 30.0, 50.0]).unwrap();
        let window = Window::from_range(&pixels);
        assert_relative_eq!(window.center, 30.0);
        assert_relative_eq!(window.width, 40.0);
    }

    #[rstest]
    #[case(100, 50, 356, (356, 178))]
    #[case(50, 100, 356, (178, 356))]
    #[case(192, 256, 356, (267, 356))]
    #[case(356, 356, 356, (356, 356))]
    #[case(1000, 1, 356, (356, 1))]
    fn scaled_size_fits_larger_side(
        #[case] w: u32,
        #[case] h: u32,
        #[case] target: u32,
        #[case] expected: (u32, u32),
    ) {
        assert_eq!(scaled_size(w, h, target), expected);
    }

    #[rstest]
    #[case(64, 64)]
    #[case(120, 40)]
    #[case(40, 120)]
    #[case(7, 3)]
    #[case(512, 300)]
    fn pad_and_resize_is_always_square(#[case] w: u32, #[case] h: u32) {
        let out = pad_and_resize(&ramp(w, h), 356);
        assert_eq!(out.dimensions(), (356, 356));
    }

    #[test]
    fn odd_padding_goes_to_bottom() {
        let flat = IntensityImage::from_pixel(10, 3, Luma([200.0]));
        let out = pad_and_resize(&flat, 10);
        // 3 rows of content, 7 rows of padding split 3 above / 4 below.
        for x in 0..10 {
            assert_eq!(out.get_pixel(x, 2).0[0], 0);
            assert_eq!(out.get_pixel(x, 3).0[0], 200);
            assert_eq!(out.get_pixel(x, 5).0[0], 200);
            assert_eq!(out.get_pixel(x, 6).0[0], 0);
            assert_eq!(out.get_pixel(x, 9).0[0], 0);
        }
    }

    #[test]
    fn odd_padding_goes_to_right() {
        let flat = IntensityImage::from_pixel(3, 10, Luma([120.0]));
        let out = pad_and_resize(&flat, 10);
        assert_eq!(out.get_pixel(2, 5).0[0], 0);
        assert_eq!(out.get_pixel(3, 5).0[0], 120);
        assert_eq!(out.get_pixel(5, 5).0[0], 120);
        assert_eq!(out.get_pixel(6, 5).0[0], 0);
    }

    #[test]
    fn empty_input_gives_black_canvas() {
        let out = pad_and_resize(&IntensityImage::new(0, 0), 16);
        assert_eq!(out.dimensions(), (16, 16));
        assert!(out.as_raw().iter().all(|&v| v == 0));
    }

    #[rstest]
    #[case(64, 32, (356, 178), (0, 89))]
    #[case(32, 64, (178, 356), (89, 0))]
    #[case(100, 60, (356, 213), (0, 71))]
    fn resized_content_keeps_aspect_and_peak(
        #[case] w: u32,
        #[case] h: u32,
        #[case] content: (u32, u32),
        #[case] offset: (u32, u32),
    ) {
        let flat = IntensityImage::from_pixel(w, h, Luma([300.0]));
        let out = process(&flat, Window::new(200.0, 200.0), 356);
        let (cw, ch) = content;
        let (left, top) = offset;

        // Content interior is white, the edges sit where the scaled size says.
        assert_eq!(out.get_pixel(left + cw / 2, top + ch / 2).0[0], 255);
        assert_eq!(out.get_pixel(left, top).0[0], 255);
        assert_eq!(out.get_pixel(left + cw - 1, top + ch - 1).0[0], 255);
        if top > 0 {
            assert_eq!(out.get_pixel(left + cw / 2, top - 1).0[0], 0);
            assert_eq!(out.get_pixel(left + cw / 2, top + ch).0[0], 0);
        }
        if left > 0 {
            assert_eq!(out.get_pixel(left - 1, top + ch / 2).0[0], 0);
            assert_eq!(out.get_pixel(left + cw, top + ch / 2).0[0], 0);
        }
        assert_eq!(out.as_raw().iter().copied().max(), Some(255));
    }

    #[test]
    fn resized_ramp_keeps_full_range() {
        let out = process(&ramp(100, 100), Window::new(50_000.0, 100_000.0), 356);
        let max = out.as_raw().iter().copied().max().unwrap_or(0);
        assert!(max >= 250, "max {max}");
        assert!(out.get_pixel(0, 0).0[0] <= 5);
        // Brightness grows along the ramp.
        assert!(out.get_pixel(300, 300).0[0] > out.get_pixel(50, 50).0[0]);
    }

    #[test]
    fn process_maps_window_peak_to_white() {
        let pixels = IntensityImage::from_pixel(4, 4, Luma([300.0]));
        let out = process(&pixels, Window::new(200.0, 200.0), 4);
        assert!(out.as_raw().iter().all(|&v| v == 255));
    }
}
