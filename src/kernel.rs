/// Radial profile of the convolution neighborhood: a gaussian ring ("shell")
/// over normalized radius, the standard Lenia kernel shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct KernelShape {
    /// Where along [0,1] the ring peaks.
    pub(crate) ring_center: f32,
    /// Ring thickness.
    pub(crate) ring_width: f32,
}

impl Default for KernelShape {
    fn default() -> Self {
        Self {
            ring_center: 0.5,
            ring_width: 0.15,
        }
    }
}

/// The convolution weight field, side length = `size`, weights normalized to
/// sum 1 so the convolved potential of a [0,1] grid stays in [0,1].
pub(crate) struct KernelField {
    size: usize,
    weights: Vec<f32>,
    // last regenerated-for stamp; regenerate is a no-op while it matches
    stamp: Option<(usize, KernelShape)>,
}

impl KernelField {
    pub(crate) fn new() -> Self {
        Self {
            size: 0,
            weights: Vec::new(),
            stamp: None,
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub(crate) fn weight(&self, kx: usize, ky: usize) -> f32 {
        self.weights[ky * self.size + kx]
    }

    /// Raw (un-normalized) profile value at kernel cell (kx, ky). Used by
    /// the kernel-shaped brush and the preview overlay, where the sum-to-one
    /// scaling would make every value invisible.
    pub(crate) fn profile(&self, kx: usize, ky: usize) -> f32 {
        if self.size == 0 {
            return 0.0;
        }
        let shape = self.stamp.map(|(_, s)| s).unwrap_or_default();
        profile_at(self.size, shape, kx, ky)
    }

    /// Rebuild the weight field for `size`/`shape`. Safe to call every
    /// frame: while the arguments match the last rebuild this returns
    /// without touching the weights, so repeated calls are bit-identical.
    pub(crate) fn regenerate(&mut self, size: usize, shape: KernelShape) {
        if self.stamp == Some((size, shape)) {
            return;
        }

        self.size = size;
        self.weights.clear();
        self.weights.resize(size * size, 0.0);

        let mut sum = 0.0f32;
        for ky in 0..size {
            for kx in 0..size {
                let w = profile_at(size, shape, kx, ky);
                self.weights[ky * size + kx] = w;
                sum += w;
            }
        }
        if sum > 0.0 {
            for w in &mut self.weights {
                *w /= sum;
            }
        }

        self.stamp = Some((size, shape));
    }
}

fn profile_at(size: usize, shape: KernelShape, kx: usize, ky: usize) -> f32 {
    // Center between cells for even sizes, on a cell for odd.
    let c = (size as f32 - 1.0) * 0.5;
    let radius = (size as f32) * 0.5;
    let dx = kx as f32 - c;
    let dy = ky as f32 - c;
    let r = (dx * dx + dy * dy).sqrt() / radius;
    if r > 1.0 {
        return 0.0;
    }
    let width = shape.ring_width.max(1.0e-4);
    let d = (r - shape.ring_center) / width;
    (-0.5 * d * d).exp()
}
