//! Iso-lines by marching squares.

use crate::plot::types::{GridData, IsoLine, Point2};

/// `count` levels spread evenly strictly inside the height range.
pub fn levels(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !(max > min) {
        return Vec::new();
    }
    let step = (max - min) / (count + 1) as f64;
    (1..=count).map(|k| min + k as f64 * step).collect()
}

/// Iso-lines of `grid` at `count` evenly spaced levels.
pub fn iso_lines(grid: &GridData, count: usize) -> Vec<IsoLine> {
    let Some((min, max)) = grid.z_range() else {
        return Vec::new();
    };
    levels(min, max, count)
        .into_iter()
        .map(|level| IsoLine {
            level,
            segments: march(grid, level),
        })
        .collect()
}

/// Segments where the piecewise-linear surface crosses `level`.
pub fn march(grid: &GridData, level: f64) -> Vec<(Point2, Point2)> {
    let mut out = Vec::new();
    if grid.xs.len() < 2 || grid.ys.len() < 2 {
        return out;
    }

    for j in 0..grid.ys.len() - 1 {
        for i in 0..grid.xs.len() - 1 {
            // Corners counter-clockwise from the lower left
            let corners = [
                (grid.xs[i], grid.ys[j]),
                (grid.xs[i + 1], grid.ys[j]),
                (grid.xs[i + 1], grid.ys[j + 1]),
                (grid.xs[i], grid.ys[j + 1]),
            ];
            let values = [
                grid.z[j][i],
                grid.z[j][i + 1],
                grid.z[j + 1][i + 1],
                grid.z[j + 1][i],
            ];

            let case = values
                .iter()
                .enumerate()
                .fold(0u8, |acc, (bit, &v)| acc | (((v > level) as u8) << bit));

            let edge = |e: usize| interpolate_edge(e, &corners, &values, level);
            let mut push = |a: usize, b: usize| out.push((edge(a), edge(b)));

            match case {
                0 | 15 => {}
                1 | 14 => push(3, 0),
                2 | 13 => push(0, 1),
                3 | 12 => push(3, 1),
                4 | 11 => push(1, 2),
                6 | 9 => push(0, 2),
                7 | 8 => push(3, 2),
                // Saddles: pick the pairing by the cell average
                5 | 10 => {
                    let center = values.iter().sum::<f64>() / 4.0;
                    if (center > level) == (case == 5) {
                        push(3, 2);
                        push(0, 1);
                    } else {
                        push(3, 0);
                        push(1, 2);
                    }
                }
                _ => {}
            }
        }
    }
    out
}

/// Edge `e` joins corner `e` to corner `e + 1` (mod 4).
fn interpolate_edge(e: usize, corners: &[Point2; 4], values: &[f64; 4], level: f64) -> Point2 {
    let (a, b) = (e, (e + 1) % 4);
    let (pa, pb) = (corners[a], corners[b]);
    let (va, vb) = (values[a], values[b]);
    let denom = vb - va;
    let t = if denom.abs() < 1e-12 {
        0.5
    } else {
        ((level - va) / denom).clamp(0.0, 1.0)
    };
    (pa.0 + (pb.0 - pa.0) * t, pa.1 + (pb.1 - pa.1) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_of(f: impl Fn(f64, f64) -> f64, n: usize) -> GridData {
        let axis: Vec<f64> = (0..n).map(|i| -1.0 + 2.0 * i as f64 / (n - 1) as f64).collect();
        let z = axis
            .iter()
            .map(|&y| axis.iter().map(|&x| f(x, y)).collect())
            .collect();
        GridData {
            xs: axis.clone(),
            ys: axis,
            z,
        }
    }

    #[test]
    fn test_levels_inside_range() {
        assert_eq!(levels(0.0, 9.0, 2), vec![3.0, 6.0]);
        assert!(levels(1.0, 1.0, 8).is_empty());
    }

    #[test]
    fn test_vertical_line() {
        // f = x crosses 0.0 along x = 0 in every row of cells
        let grid = grid_of(|x, _| x, 3);
        let segments = march(&grid, 0.0);
        assert_eq!(segments.len(), 2);
        for (a, b) in segments {
            assert!(a.0.abs() < 1e-12 && b.0.abs() < 1e-12);
        }
    }

    #[test]
    fn test_circle_points_lie_on_level() {
        let grid = grid_of(|x, y| x * x + y * y, 41);
        let segments = march(&grid, 0.25);
        assert!(!segments.is_empty());
        for (a, b) in segments {
            for p in [a, b] {
                let r = (p.0 * p.0 + p.1 * p.1).sqrt();
                assert!((r - 0.5).abs() < 0.01, "r = {}", r);
            }
        }
    }

    #[test]
    fn test_flat_grid_has_no_lines() {
        let grid = grid_of(|_, _| 2.0, 5);
        assert!(iso_lines(&grid, 8).is_empty());
    }

    #[test]
    fn test_saddle_cell_gives_two_segments() {
        let grid = GridData {
            xs: vec![0.0, 1.0],
            ys: vec![0.0, 1.0],
            z: vec![vec![1.0, -1.0], vec![-1.0, 1.0]],
        };
        assert_eq!(march(&grid, 0.0).len(), 2);
    }
}
