use crate::grid::Grid;
use crate::kernel::KernelField;

/// What a pointer press deposits into the grid.
#[derive(Clone, Copy, Debug)]
pub(crate) enum StampMode {
    /// Soft radial bump added to the local state.
    Bump { radius: usize, amount: f32 },
    /// Paint the kernel's own profile, full strength at the ring.
    KernelBrush,
}

/// Stamp a localized perturbation at grid-normalized coordinates.
/// Coordinates outside [0,1] are silently ignored; the device-to-grid
/// mapping is the caller's problem.
pub(crate) fn apply_stamp(grid: &mut Grid, kernel: &KernelField, nx: f32, ny: f32, mode: StampMode) {
    if !(0.0..=1.0).contains(&nx) || !(0.0..=1.0).contains(&ny) {
        return;
    }
    let (w, h) = (grid.width(), grid.height());
    let cx = ((nx * w as f32) as isize).clamp(0, w as isize - 1);
    let cy = ((ny * h as f32) as isize).clamp(0, h as isize - 1);

    match mode {
        StampMode::Bump { radius, amount } => {
            let r = radius as isize;
            for dy in -r..=r {
                for dx in -r..=r {
                    let d2 = dx * dx + dy * dy;
                    if d2 > r * r {
                        continue;
                    }
                    let falloff = 1.0 - (d2 as f32).sqrt() / (r as f32).max(1.0);
                    let v = grid.sample(cx + dx, cy + dy);
                    write_sample(grid, cx + dx, cy + dy, (v + amount * falloff).clamp(0.0, 1.0));
                }
            }
        }
        StampMode::KernelBrush => {
            let size = kernel.size() as isize;
            if size == 0 {
                return;
            }
            let half = size / 2;
            for ky in 0..size {
                for kx in 0..size {
                    let p = kernel.profile(kx as usize, ky as usize);
                    if p == 0.0 {
                        continue;
                    }
                    let x = cx + kx - half;
                    let y = cy + ky - half;
                    let v = grid.sample(x, y);
                    write_sample(grid, x, y, (v + p).clamp(0.0, 1.0));
                }
            }
        }
    }
}

/// Boundary-aware write mirroring `Grid::sample`; clamped grids drop
/// out-of-range writes instead of piling them on the edge cell.
fn write_sample(grid: &mut Grid, x: isize, y: isize, v: f32) {
    let (w, h) = (grid.width() as isize, grid.height() as isize);
    match grid.boundary() {
        crate::grid::Boundary::Wrap => {
            let xx = x.rem_euclid(w) as usize;
            let yy = y.rem_euclid(h) as usize;
            grid.set(xx, yy, v);
        }
        crate::grid::Boundary::Clamp => {
            if x < 0 || y < 0 || x >= w || y >= h {
                return;
            }
            grid.set(x as usize, y as usize, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Boundary;
    use crate::kernel::KernelShape;

    fn kernel(size: usize) -> KernelField {
        let mut k = KernelField::new();
        k.regenerate(size, KernelShape::default());
        k
    }

    #[test]
    fn out_of_range_stamp_is_a_no_op() {
        let mut g = Grid::new(16, 16, Boundary::Wrap).unwrap();
        g.set(3, 3, 0.4);
        let k = kernel(5);
        let before = g.clone();

        apply_stamp(
            &mut g,
            &k,
            -5.0,
            -5.0,
            StampMode::Bump {
                radius: 3,
                amount: 0.5,
            },
        );
        assert_eq!(g, before);

        apply_stamp(&mut g, &k, 1.5, 0.5, StampMode::KernelBrush);
        assert_eq!(g, before);
    }

    #[test]
    fn bump_raises_the_center_and_stays_in_unit_range() {
        let mut g = Grid::new(16, 16, Boundary::Wrap).unwrap();
        let k = kernel(5);
        apply_stamp(
            &mut g,
            &k,
            0.5,
            0.5,
            StampMode::Bump {
                radius: 3,
                amount: 2.0,
            },
        );
        assert_eq!(g.get(8, 8), 1.0);
        assert!(g.cells().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn kernel_brush_paints_the_ring() {
        let mut g = Grid::new(32, 32, Boundary::Wrap).unwrap();
        let k = kernel(9);
        apply_stamp(&mut g, &k, 0.5, 0.5, StampMode::KernelBrush);
        // the ring peaks away from the center, so some off-center cell got
        // more paint than the middle
        let center = g.get(16, 16);
        let ring = g.get(16 + 2, 16);
        assert!(ring > center);
        assert!(ring > 0.0);
    }

    #[test]
    fn clamped_grid_drops_writes_past_the_edge() {
        let mut g = Grid::new(8, 8, Boundary::Clamp).unwrap();
        let k = kernel(5);
        apply_stamp(
            &mut g,
            &k,
            0.0,
            0.0,
            StampMode::Bump {
                radius: 4,
                amount: 1.0,
            },
        );
        // the corner got paint, and nothing wrapped to the far edge
        assert!(g.get(0, 0) > 0.0);
        assert_eq!(g.get(7, 7), 0.0);
        assert_eq!(g.get(7, 0), 0.0);
    }
}
