use anyhow::{bail, Result};

/// How neighborhood sampling treats coordinates past the grid edge.
/// Fixed per grid at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Boundary {
    /// Toroidal: edges connect to the opposite edge.
    Wrap,
    /// Clamp to the nearest edge cell.
    Clamp,
}

/// A 2D scalar field. Cell values live in [0,1] for both rules
/// (the discrete rule stores 0.0 / 1.0).
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Grid {
    w: usize,
    h: usize,
    boundary: Boundary,
    cells: Vec<f32>,
}

impl Grid {
    pub(crate) fn new(w: usize, h: usize, boundary: Boundary) -> Result<Self> {
        if w == 0 || h == 0 {
            bail!("grid dimensions must be positive, got {}x{}", w, h);
        }
        Ok(Self {
            w,
            h,
            boundary,
            cells: vec![0.0; w * h],
        })
    }

    pub(crate) fn width(&self) -> usize {
        self.w
    }

    pub(crate) fn height(&self) -> usize {
        self.h
    }

    pub(crate) fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub(crate) fn cells(&self) -> &[f32] {
        &self.cells
    }

    #[inline]
    pub(crate) fn get(&self, x: usize, y: usize) -> f32 {
        self.cells[y * self.w + x]
    }

    #[inline]
    pub(crate) fn set(&mut self, x: usize, y: usize, v: f32) {
        self.cells[y * self.w + x] = v;
    }

    /// Boundary-aware read at possibly out-of-range coordinates.
    #[inline]
    pub(crate) fn sample(&self, x: isize, y: isize) -> f32 {
        let (xx, yy) = match self.boundary {
            Boundary::Wrap => (
                x.rem_euclid(self.w as isize) as usize,
                y.rem_euclid(self.h as isize) as usize,
            ),
            Boundary::Clamp => (
                x.clamp(0, self.w as isize - 1) as usize,
                y.clamp(0, self.h as isize - 1) as usize,
            ),
        };
        self.cells[yy * self.w + xx]
    }

    pub(crate) fn fill(&mut self, v: f32) {
        self.cells.fill(v);
    }
}

/// The double buffer: `front` is the live state, `back` holds whatever the
/// current tick protocol needs (a full replacement for swap-style rules, a
/// snapshot of front for in-place rules). A single tick uses exactly one of
/// `swap` or `snapshot`, never both.
pub(crate) struct GridPair {
    front: Grid,
    back: Grid,
}

impl GridPair {
    pub(crate) fn new(w: usize, h: usize, boundary: Boundary) -> Result<Self> {
        Ok(Self {
            front: Grid::new(w, h, boundary)?,
            back: Grid::new(w, h, boundary)?,
        })
    }

    pub(crate) fn front(&self) -> &Grid {
        &self.front
    }

    pub(crate) fn front_mut(&mut self) -> &mut Grid {
        &mut self.front
    }

    /// Mutable front alongside the read-only snapshot in back.
    pub(crate) fn split_mut(&mut self) -> (&mut Grid, &Grid) {
        (&mut self.front, &self.back)
    }

    /// Read-only front alongside the mutable back, for rules that build a
    /// full replacement generation before swapping.
    pub(crate) fn split_back_mut(&mut self) -> (&Grid, &mut Grid) {
        (&self.front, &mut self.back)
    }

    /// O(1) role exchange. Used by the CA rule after writing a full
    /// replacement state into `back`.
    pub(crate) fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Copy `front` into `back` so the coming in-place update reads only
    /// pre-tick state. Mirrors the copy-before-dispatch step.
    pub(crate) fn snapshot(&mut self) {
        self.back.cells.copy_from_slice(&self.front.cells);
    }

    /// Reallocate both buffers zero-filled. Only called between ticks.
    pub(crate) fn resize(&mut self, w: usize, h: usize) -> Result<()> {
        let boundary = self.front.boundary;
        self.front = Grid::new(w, h, boundary)?;
        self.back = Grid::new(w, h, boundary)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_sampling_is_toroidal() {
        let mut g = Grid::new(8, 4, Boundary::Wrap).unwrap();
        g.set(7, 0, 0.5);
        g.set(0, 3, 0.25);
        assert_eq!(g.sample(-1, 0), g.sample(7, 0));
        assert_eq!(g.sample(-1, 0), 0.5);
        assert_eq!(g.sample(0, -1), 0.25);
        assert_eq!(g.sample(8, 0), g.sample(0, 0));
    }

    #[test]
    fn clamp_sampling_sticks_to_edges() {
        let mut g = Grid::new(8, 4, Boundary::Clamp).unwrap();
        g.set(0, 0, 0.75);
        g.set(7, 3, 0.125);
        assert_eq!(g.sample(-1, 0), g.sample(0, 0));
        assert_eq!(g.sample(-5, -5), 0.75);
        assert_eq!(g.sample(100, 100), 0.125);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(Grid::new(0, 4, Boundary::Wrap).is_err());
        assert!(Grid::new(4, 0, Boundary::Clamp).is_err());
        assert!(GridPair::new(0, 0, Boundary::Wrap).is_err());
    }

    #[test]
    fn swap_exchanges_roles_without_copying() {
        let mut pair = GridPair::new(2, 2, Boundary::Wrap).unwrap();
        pair.front_mut().set(0, 0, 1.0);
        pair.swap();
        assert_eq!(pair.front().get(0, 0), 0.0);
        assert_eq!(pair.back.get(0, 0), 1.0);
    }

    #[test]
    fn snapshot_copies_front_into_back() {
        let mut pair = GridPair::new(3, 3, Boundary::Clamp).unwrap();
        pair.front_mut().set(1, 1, 0.8);
        pair.snapshot();
        assert_eq!(pair.back.get(1, 1), 0.8);
        // back is a copy, not a swap
        assert_eq!(pair.front().get(1, 1), 0.8);
    }

    #[test]
    fn resize_zero_initializes_both_buffers() {
        let mut pair = GridPair::new(4, 4, Boundary::Wrap).unwrap();
        pair.front_mut().set(2, 2, 1.0);
        pair.resize(6, 5).unwrap();
        assert_eq!(pair.front().width(), 6);
        assert_eq!(pair.front().height(), 5);
        assert!(pair.front().cells().iter().all(|&c| c == 0.0));
        assert!(pair.back.cells().iter().all(|&c| c == 0.0));
        assert_eq!(pair.front().boundary(), Boundary::Wrap);
    }
}
