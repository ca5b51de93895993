//! Edge-density grid over a Canny edge map.
//!
//! The edge map is computed on the unblurred frame: 3×3 Sobel gradients,
//! L1 magnitude `|gx| + |gy|`, non-maximum suppression along the quantized
//! gradient direction, then hysteresis between the low and high thresholds.
//! A hard luma step of `d` levels yields a magnitude of `4 * d`, so with the
//! reference thresholds (100, 200) any step above 50 levels is an edge.

use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use crate::color::l1_normalize;

/// tan(22.5°) and tan(67.5°), the sector boundaries for direction quantization.
const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

/// Fraction of edge pixels in each tile of a `grid × grid` partition of the
/// Canny edge map, normalized by the sum of fractions.
///
/// Tiles are `max(1, side / grid)` pixels wide and tall; pixels beyond the
/// last full tile are ignored and a tile lying outside the frame counts 0.
pub fn edge_density(gray: &GrayImage, grid: u32, low: f32, high: f32) -> Vec<f32> {
    let edges = canny_edges(gray, low, high);
    let mut densities = tile_densities(&edges, grid);
    l1_normalize(&mut densities);
    densities
}

/// Binary edge map (0 / 255) of `gray`.
pub fn canny_edges(gray: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (w, h) = gray.dimensions();
    let (wu, hu) = (w as usize, h as usize);
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);

    let magnitude: Vec<f32> = gx
        .as_raw()
        .iter()
        .zip(gy.as_raw())
        .map(|(&x, &y)| (x as f32).abs() + (y as f32).abs())
        .collect();
    let at = |x: i64, y: i64| -> f32 {
        if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
            0.0
        } else {
            magnitude[y as usize * wu + x as usize]
        }
    };

    // 0 = suppressed, 1 = weak, 2 = strong
    let mut class = vec![0u8; wu * hu];
    let mut stack = Vec::new();
    for y in 0..hu {
        for x in 0..wu {
            let i = y * wu + x;
            let m = magnitude[i];
            if m <= low {
                continue;
            }
            let dx = gx.as_raw()[i] as f32;
            let dy = gy.as_raw()[i] as f32;
            let (ax, ay) = (dx.abs(), dy.abs());
            let (xi, yi) = (x as i64, y as i64);
            let (a, b) = if ay <= ax * TAN_22_5 {
                (at(xi - 1, yi), at(xi + 1, yi))
            } else if ay >= ax * TAN_67_5 {
                (at(xi, yi - 1), at(xi, yi + 1))
            } else if (dx > 0.0) == (dy > 0.0) {
                (at(xi - 1, yi - 1), at(xi + 1, yi + 1))
            } else {
                (at(xi + 1, yi - 1), at(xi - 1, yi + 1))
            };
            // Ties along a plateau keep the first pixel only.
            if m > a && m >= b {
                if m > high {
                    class[i] = 2;
                    stack.push((x, y));
                } else {
                    class[i] = 1;
                }
            }
        }
    }

    let mut out = GrayImage::new(w, h);
    while let Some((x, y)) = stack.pop() {
        out.put_pixel(x as u32, y as u32, Luma([255]));
        for ny in y.saturating_sub(1)..=(y + 1).min(hu - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(wu - 1) {
                let j = ny * wu + nx;
                if class[j] == 1 {
                    class[j] = 2;
                    stack.push((nx, ny));
                }
            }
        }
    }
    out
}

fn tile_densities(edges: &GrayImage, grid: u32) -> Vec<f32> {
    let (w, h) = edges.dimensions();
    let tile_w = (w / grid).max(1);
    let tile_h = (h / grid).max(1);

    let mut out = Vec::with_capacity((grid * grid) as usize);
    for ty in 0..grid {
        for tx in 0..grid {
            let (x0, y0) = (tx * tile_w, ty * tile_h);
            let x1 = (x0 + tile_w).min(w);
            let y1 = (y0 + tile_h).min(h);
            if x0 >= x1 || y0 >= y1 {
                out.push(0.0);
                continue;
            }
            let mut hits = 0u32;
            for y in y0..y1 {
                for x in x0..x1 {
                    if edges.get_pixel(x, y).0[0] > 0 {
                        hits += 1;
                    }
                }
            }
            out.push(hits as f32 / ((x1 - x0) * (y1 - y0)) as f32);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(width: u32, at: u32, left: u8, right: u8) -> GrayImage {
        GrayImage::from_fn(width, 64, |x, _| if x < at { Luma([left]) } else { Luma([right]) })
    }

    fn edge_columns(edges: &GrayImage) -> Vec<u32> {
        let mut cols: Vec<u32> = edges
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] > 0)
            .map(|(x, _, _)| x)
            .collect();
        cols.sort_unstable();
        cols.dedup();
        cols
    }

    #[test]
    fn flat_frame_has_no_edges() {
        let gray = GrayImage::from_pixel(64, 64, Luma([90]));
        let d = edge_density(&gray, 4, 100.0, 200.0);
        assert_eq!(d.len(), 16);
        assert!(d.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn moderate_luma_step_is_an_edge() {
        // 60 levels: Sobel magnitude 240 clears the 200 high threshold
        let edges = canny_edges(&step(64, 32, 100, 160), 100.0, 200.0);
        assert_eq!(edge_columns(&edges), vec![31]);
        assert_eq!(
            edges.enumerate_pixels().filter(|(_, _, p)| p.0[0] > 0).count(),
            64
        );
    }

    #[test]
    fn faint_step_is_not_an_edge() {
        // 20 levels: magnitude 80 stays under the low threshold
        let edges = canny_edges(&step(64, 32, 100, 120), 100.0, 200.0);
        assert!(edge_columns(&edges).is_empty());
    }

    #[test]
    fn weak_pixels_survive_only_next_to_strong_ones() {
        // 40 levels: magnitude 160 is weak everywhere, nothing seeds it
        let alone = canny_edges(&step(64, 32, 100, 140), 100.0, 200.0);
        assert!(edge_columns(&alone).is_empty());

        // Step height falls from 103 (strong) at the top to 40 (weak) at the
        // bottom; the weak tail is kept through its strong neighbours.
        let tapered = GrayImage::from_fn(64, 64, |x, y| {
            if x < 32 {
                Luma([100])
            } else {
                Luma([(140 + 63 - y) as u8])
            }
        });
        let edges = canny_edges(&tapered, 100.0, 200.0);
        assert_eq!(edge_columns(&edges), vec![32]);
        assert!((0..64).all(|y| edges.get_pixel(32, y).0[0] > 0));
    }

    #[test]
    fn edges_concentrate_in_tiles_that_contain_them() {
        // vertical step at x = 40, inside tile column 2 of a 4x4 grid on 64px
        let gray = step(64, 40, 0, 255);
        let d = edge_density(&gray, 4, 100.0, 200.0);
        let total: f32 = d.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
        for row in 0..4 {
            assert_eq!(d[row * 4], 0.0);
            assert!(d[row * 4 + 2] > 0.0);
        }
    }

    #[test]
    fn tiny_frame_uses_unit_tiles() {
        let edges = GrayImage::from_pixel(2, 2, Luma([255]));
        let d = tile_densities(&edges, 4);
        assert_eq!(d.len(), 16);
        assert_eq!(d[0], 1.0);
        assert_eq!(d[1], 1.0);
        assert_eq!(d[4], 1.0);
        assert_eq!(d[5], 1.0);
        assert_eq!(d[2], 0.0);
        assert_eq!(d[15], 0.0);
    }
}
