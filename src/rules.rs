/// Which update rule drives the tick, chosen at configuration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RuleKind {
    /// Continuous: convolution potential -> growth -> Euler step.
    Lenia,
    /// Discrete life-like CA: neighbor count -> survive/born table.
    Ca,
}

const SIGMA_EPS: f32 = 1.0e-6;

/// Bell-shaped Lenia growth: `2*exp(-((p-mu)^2)/(2*sigma^2)) - 1`.
///
/// Always finite and in [-1,1]: sigma is clamped away from zero and any
/// non-finite intermediate (pathological live-edited params) contributes 0
/// rather than poisoning the grid.
#[inline]
pub(crate) fn growth(potential: f32, mu: f32, sigma: f32) -> f32 {
    let sigma = sigma.max(SIGMA_EPS);
    let d = (potential - mu) / sigma;
    let g = 2.0 * (-0.5 * d * d).exp() - 1.0;
    if g.is_finite() {
        g.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Survive/born table for the discrete rule. Defaults to Conway B3/S23.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CaRules {
    pub(crate) survival_min: u32,
    pub(crate) survival_max: u32,
    pub(crate) birth_count: u32,
}

impl Default for CaRules {
    fn default() -> Self {
        Self {
            survival_min: 2,
            survival_max: 3,
            birth_count: 3,
        }
    }
}

impl CaRules {
    #[inline]
    pub(crate) fn next_state(&self, alive: bool, neighbors: u32) -> bool {
        if alive {
            neighbors >= self.survival_min && neighbors <= self.survival_max
        } else {
            neighbors == self.birth_count
        }
    }
}
