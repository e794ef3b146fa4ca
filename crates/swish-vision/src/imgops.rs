//! Pure-Rust pixel helpers shared by the scorer, tracker and analyzer.
//!
//! HSV conversion follows the OpenCV value conventions (H in 0-179,
//! S and V in 0-255) so the ball-tone mask ranges read like the usual
//! `inRange` constants.

use image::{GrayImage, RgbImage};
use imageproc::contours::Contour;

/// Mean and standard deviation of the absolute pixel difference between two
/// grayscale images, in raw 0-255 units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffStats {
    pub mean: f64,
    pub std: f64,
}

/// Compute absolute-difference statistics between two same-sized frames.
pub fn diff_stats(a: &GrayImage, b: &GrayImage) -> DiffStats {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let n = (a.width() * a.height()) as f64;
    if n == 0.0 {
        return DiffStats { mean: 0.0, std: 0.0 };
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for (pa, pb) in a.as_raw().iter().zip(b.as_raw().iter()) {
        let d = (*pa as i32 - *pb as i32).unsigned_abs() as f64;
        sum += d;
        sum_sq += d * d;
    }

    let mean = sum / n;
    let variance = (sum_sq / n - mean * mean).max(0.0);
    DiffStats {
        mean,
        std: variance.sqrt(),
    }
}

/// Fraction of pixels marked as edges by a Canny detector.
pub fn edge_density(gray: &GrayImage) -> f64 {
    let n = (gray.width() * gray.height()) as f64;
    if n == 0.0 {
        return 0.0;
    }
    let edges = imageproc::edges::canny(gray, 50.0, 150.0);
    let on = edges.as_raw().iter().filter(|&&p| p > 0).count() as f64;
    on / n
}

/// An inclusive HSV range in OpenCV conventions (H 0-179, S/V 0-255).
#[derive(Debug, Clone, Copy)]
pub struct HsvRange {
    pub h_lo: u8,
    pub h_hi: u8,
    pub s_lo: u8,
    pub s_hi: u8,
    pub v_lo: u8,
    pub v_hi: u8,
}

impl HsvRange {
    /// True if the HSV triple falls inside the range. Hue wraps when
    /// `h_lo > h_hi`.
    pub fn contains(&self, h: u8, s: u8, v: u8) -> bool {
        let hue_ok = if self.h_lo <= self.h_hi {
            h >= self.h_lo && h <= self.h_hi
        } else {
            h >= self.h_lo || h <= self.h_hi
        };
        hue_ok && s >= self.s_lo && s <= self.s_hi && v >= self.v_lo && v <= self.v_hi
    }
}

/// Convert one RGB pixel to OpenCV-convention HSV.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let v = max;

    let s = if max == 0 {
        0
    } else {
        ((255.0 * (max - min) as f64 / max as f64).round() as i32).clamp(0, 255) as u8
    };

    let delta = (max - min) as f64;
    let h_deg = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g as f64 - b as f64) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b as f64 - r as f64) / delta + 2.0)
    } else {
        60.0 * ((r as f64 - g as f64) / delta + 4.0)
    };

    let h = ((h_deg / 2.0).round() as i32).clamp(0, 179) as u8;
    (h, s, v)
}

/// Build a binary mask (255/0) of pixels whose HSV falls inside the range.
pub fn hsv_mask(frame: &RgbImage, range: &HsvRange) -> GrayImage {
    let mut mask = GrayImage::new(frame.width(), frame.height());
    for (x, y, px) in frame.enumerate_pixels() {
        let (h, s, v) = rgb_to_hsv(px[0], px[1], px[2]);
        if range.contains(h, s, v) {
            mask.put_pixel(x, y, image::Luma([255u8]));
        }
    }
    mask
}

/// Polygon area of a closed contour via the shoelace formula, in px^2.
pub fn contour_area(contour: &Contour<u32>) -> f64 {
    let pts = &contour.points;
    if pts.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0f64;
    for i in 0..pts.len() {
        let p = pts[i];
        let q = pts[(i + 1) % pts.len()];
        acc += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
    }
    acc.abs() / 2.0
}

/// Perimeter of a closed contour: summed segment lengths including the
/// closing edge.
pub fn contour_perimeter(contour: &Contour<u32>) -> f64 {
    let pts = &contour.points;
    if pts.len() < 2 {
        return 0.0;
    }
    let mut acc = 0.0f64;
    for i in 0..pts.len() {
        let p = pts[i];
        let q = pts[(i + 1) % pts.len()];
        let dx = p.x as f64 - q.x as f64;
        let dy = p.y as f64 - q.y as f64;
        acc += (dx * dx + dy * dy).sqrt();
    }
    acc
}

/// Centroid of a contour's boundary points.
pub fn contour_centroid(contour: &Contour<u32>) -> (f32, f32) {
    let pts = &contour.points;
    if pts.is_empty() {
        return (0.0, 0.0);
    }
    let (sx, sy) = pts.iter().fold((0.0f64, 0.0f64), |(sx, sy), p| {
        (sx + p.x as f64, sy + p.y as f64)
    });
    let n = pts.len() as f64;
    ((sx / n) as f32, (sy / n) as f32)
}

/// Number of perimeter samples checked per circle candidate.
const CIRCLE_SAMPLES: usize = 32;
/// Fraction of perimeter samples that must land on edge pixels.
const CIRCLE_SUPPORT: f64 = 0.55;
/// Grid stride for candidate centers and radii, in pixels.
const CIRCLE_STEP: u32 = 2;

/// Parametric circle search over an edge map.
///
/// Scans candidate centers row-major and radii ascending; the first circle
/// whose perimeter support reaches the acceptance fraction wins. Returns
/// `(cx, cy, radius)` in the edge map's coordinates.
pub fn find_circle(edges: &GrayImage, min_radius: u32, max_radius: u32) -> Option<(u32, u32, u32)> {
    let (width, height) = edges.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let mut cy = 0u32;
    while cy < height {
        let mut cx = 0u32;
        while cx < width {
            let mut r = min_radius;
            while r <= max_radius {
                if circle_support(edges, cx, cy, r) >= CIRCLE_SUPPORT {
                    return Some((cx, cy, r));
                }
                r += CIRCLE_STEP;
            }
            cx += CIRCLE_STEP;
        }
        cy += CIRCLE_STEP;
    }
    None
}

fn circle_support(edges: &GrayImage, cx: u32, cy: u32, radius: u32) -> f64 {
    let (width, height) = edges.dimensions();
    let mut hits = 0usize;
    for i in 0..CIRCLE_SAMPLES {
        let theta = i as f64 * std::f64::consts::TAU / CIRCLE_SAMPLES as f64;
        let x = cx as f64 + radius as f64 * theta.cos();
        let y = cy as f64 + radius as f64 * theta.sin();
        if x < 0.0 || y < 0.0 {
            continue;
        }
        let (xi, yi) = (x.round() as u32, y.round() as u32);
        if xi < width && yi < height && edges.get_pixel(xi, yi)[0] > 0 {
            hits += 1;
        }
    }
    hits as f64 / CIRCLE_SAMPLES as f64
}
