use crate::engine::SimParams;
use crate::grid::Boundary;
use crate::rules::RuleKind;
use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum BoundaryOpt {
    Wrap,
    Clamp,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum RuleOpt {
    /// Continuous Lenia rule.
    Lenia,
    /// Discrete life-like cellular automaton.
    Ca,
}

/// Interactive Lenia / cellular-automata toy.
#[derive(Parser, Debug)]
#[command(name = "lenia", about = "Lenia and life-like CA in the terminal")]
pub(crate) struct Options {
    /// Grid width in cells (0 = follow terminal size)
    #[arg(long, default_value_t = 0)]
    pub(crate) width: usize,

    /// Grid height in cells (0 = follow terminal size)
    #[arg(long, default_value_t = 0)]
    pub(crate) height: usize,

    /// Seconds per simulation tick
    #[arg(long, default_value_t = 0.05)]
    pub(crate) timestep: f32,

    /// Convolution kernel side length
    #[arg(long, default_value_t = 12)]
    pub(crate) kernel_size: usize,

    /// Growth function center
    #[arg(long, default_value_t = 0.21)]
    pub(crate) mu: f32,

    /// Growth function width
    #[arg(long, default_value_t = 0.027)]
    pub(crate) sigma: f32,

    /// Edge behavior during neighborhood sampling
    #[arg(long, value_enum, default_value = "wrap")]
    pub(crate) boundary: BoundaryOpt,

    /// Color lookup table resolution
    #[arg(long, default_value_t = 512)]
    pub(crate) lut_samples: usize,

    /// Update rule
    #[arg(long, value_enum, default_value = "lenia")]
    pub(crate) rule: RuleOpt,

    /// Start from a named preset instead of the flags above
    #[arg(long)]
    pub(crate) preset: Option<String>,

    /// RNG seed for the initial state
    #[arg(long, default_value_t = 0xC0FFEE)]
    pub(crate) seed: u64,

    /// Start from an empty grid and draw your own
    #[arg(long)]
    pub(crate) empty: bool,
}

impl Options {
    pub(crate) fn boundary(&self) -> Boundary {
        match self.boundary {
            BoundaryOpt::Wrap => Boundary::Wrap,
            BoundaryOpt::Clamp => Boundary::Clamp,
        }
    }

    pub(crate) fn rule(&self) -> RuleKind {
        match self.rule {
            RuleOpt::Lenia => RuleKind::Lenia,
            RuleOpt::Ca => RuleKind::Ca,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.width == 0 && self.height != 0 || self.width != 0 && self.height == 0 {
            bail!("--width and --height must be given together");
        }
        if self.timestep <= 0.0 || !self.timestep.is_finite() {
            bail!("--timestep must be a positive number of seconds");
        }
        if self.kernel_size < 2 {
            bail!("--kernel-size must be at least 2");
        }
        if self.lut_samples < 2 {
            bail!("--lut-samples must be at least 2");
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Preset {
    pub(crate) name: &'static str,
    pub(crate) params: SimParams,
}

/// Parameter regimes that behave nicely. "Classic" matches the CLI
/// defaults.
pub(crate) const PRESETS: &[Preset] = &[
    Preset {
        name: "Classic",
        params: SimParams {
            timestep: 0.05,
            kernel_size: 12,
            mu: 0.21,
            sigma: 0.027,
        },
    },
    Preset {
        name: "Broad",
        params: SimParams {
            timestep: 0.05,
            kernel_size: 18,
            mu: 0.26,
            sigma: 0.036,
        },
    },
    Preset {
        name: "Tight",
        params: SimParams {
            timestep: 0.05,
            kernel_size: 8,
            mu: 0.15,
            sigma: 0.02,
        },
    },
    Preset {
        name: "Slow",
        params: SimParams {
            timestep: 0.1,
            kernel_size: 12,
            mu: 0.21,
            sigma: 0.03,
        },
    },
];

pub(crate) fn find_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
