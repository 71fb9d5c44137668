//! Binary morphology on occupancy masks.
//!
//! Kernels are lists of (d_col, d_row) offsets. Cells outside the mask are
//! ignored rather than treated as occupied or free, so the map border never
//! grows or eats obstacles on its own.

use super::OccupancyMask;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Structuring element shape for obstacle inflation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelShape {
    /// (2r+1) x (2r+1) square
    #[default]
    Square,
    /// Cells whose offset satisfies dx² + dy² ≤ r²
    Disk,
}

/// Offsets of a `size` x `size` square centered on the origin.
///
/// Even sizes lean toward negative offsets.
pub fn square_kernel(size: usize) -> Vec<(i32, i32)> {
    let size = size as i32;
    let center = size / 2;
    let mut kernel = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        for x in 0..size {
            kernel.push((x - center, y - center));
        }
    }
    kernel
}

/// Offsets of an inflation kernel of radius `radius` cells
pub fn inflation_kernel(shape: KernelShape, radius: usize) -> Vec<(i32, i32)> {
    let r = radius as i32;
    match shape {
        KernelShape::Square => square_kernel(2 * radius + 1),
        KernelShape::Disk => {
            let mut kernel = Vec::new();
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx * dx + dy * dy <= r * r {
                        kernel.push((dx, dy));
                    }
                }
            }
            kernel
        }
    }
}

/// Dilate: a cell becomes occupied if any occupied cell reaches it through
/// a kernel offset.
pub fn dilate(src: &OccupancyMask, kernel: &[(i32, i32)]) -> OccupancyMask {
    apply(src, |cells, width, height, x, y| {
        kernel.iter().any(|&(kx, ky)| {
            let px = x - kx;
            let py = y - ky;
            px >= 0
                && py >= 0
                && px < width
                && py < height
                && cells[(py * width + px) as usize]
        })
    })
}

/// Erode: a cell stays occupied only if every in-bounds kernel neighbor is
/// occupied.
pub fn erode(src: &OccupancyMask, kernel: &[(i32, i32)]) -> OccupancyMask {
    apply(src, |cells, width, height, x, y| {
        kernel.iter().all(|&(kx, ky)| {
            let px = x + kx;
            let py = y + ky;
            if px < 0 || py < 0 || px >= width || py >= height {
                return true;
            }
            cells[(py * width + px) as usize]
        })
    })
}

/// Closing (dilate then erode), OR-ed with the input.
///
/// Bridges gaps narrower than the kernel. The result is always a superset
/// of `src`.
pub fn close(src: &OccupancyMask, kernel: &[(i32, i32)]) -> OccupancyMask {
    let mut closed = erode(&dilate(src, kernel), kernel);
    closed.union_with(src);
    closed
}

fn apply<F>(src: &OccupancyMask, f: F) -> OccupancyMask
where
    F: Fn(&[bool], i32, i32, i32, i32) -> bool + Sync,
{
    let width = src.width();
    let height = src.height();
    let cells = src.cells();
    let mut out = vec![false; width * height];
    if width == 0 {
        return OccupancyMask::from_cells(width, height, out);
    }
    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = f(cells, width as i32, height as i32, x as i32, y as i32);
            }
        });
    OccupancyMask::from_cells(width, height, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GridCoord;

    fn mask_from(rows: &[&str]) -> OccupancyMask {
        let mut mask = OccupancyMask::new(rows[0].len(), rows.len());
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                if ch == '#' {
                    mask.mark(GridCoord::new(c as i32, r as i32));
                }
            }
        }
        mask
    }

    #[test]
    fn test_kernel_sizes() {
        assert_eq!(square_kernel(3).len(), 9);
        assert_eq!(inflation_kernel(KernelShape::Square, 2).len(), 25);
        // Disk of radius 1 is a plus shape
        assert_eq!(inflation_kernel(KernelShape::Disk, 1).len(), 5);
        assert_eq!(inflation_kernel(KernelShape::Disk, 0), vec![(0, 0)]);
    }

    #[test]
    fn test_closing_bridges_one_cell_gap() {
        let mask = mask_from(&[".......", "..#.#..", "......."]);
        let closed = close(&mask, &square_kernel(3));
        assert!(closed.get(GridCoord::new(3, 1)));
        assert!(mask.is_subset_of(&closed));
    }

    #[test]
    fn test_closing_keeps_wide_gap_open() {
        let mask = mask_from(&["#....#"]);
        let closed = close(&mask, &square_kernel(3));
        assert_eq!(closed, mask);
    }

    #[test]
    fn test_dilate_radius_one_square() {
        let mask = mask_from(&[".....", ".....", "..#..", ".....", "....."]);
        let out = dilate(&mask, &inflation_kernel(KernelShape::Square, 1));
        assert_eq!(out.occupied_count(), 9);
        assert!(out.get(GridCoord::new(1, 1)));
        assert!(!out.get(GridCoord::new(0, 2)));
    }

    #[test]
    fn test_dilate_at_border_ignores_outside() {
        let mask = mask_from(&["#..", "...", "..."]);
        let out = dilate(&mask, &inflation_kernel(KernelShape::Square, 1));
        assert_eq!(out.occupied_count(), 4);
    }
}
