/// One stop of a piecewise-linear color gradient, position in [0,1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ColorStop {
    pub(crate) t: f32,
    pub(crate) rgb: (f32, f32, f32),
}

/// A named gradient definition: ordered stops, evaluable at arbitrary t.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GradientDef {
    pub(crate) name: &'static str,
    pub(crate) stops: &'static [ColorStop],
}

impl GradientDef {
    /// Piecewise-linear evaluation between adjacent stops, clamped to the
    /// outermost stops past the ends.
    pub(crate) fn evaluate(&self, t: f32) -> (f32, f32, f32) {
        let t = t.clamp(0.0, 1.0);
        let stops = self.stops;
        if stops.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        if t <= stops[0].t {
            return stops[0].rgb;
        }
        for pair in stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.t {
                let span = (b.t - a.t).max(1.0e-6);
                let alpha = (t - a.t) / span;
                return lerp_color(a.rgb, b.rgb, alpha);
            }
        }
        stops[stops.len() - 1].rgb
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lerp_color(a: (f32, f32, f32), b: (f32, f32, f32), t: f32) -> (f32, f32, f32) {
    (lerp(a.0, b.0, t), lerp(a.1, b.1, t), lerp(a.2, b.2, t))
}

fn to_rgb_u8(c: (f32, f32, f32)) -> (u8, u8, u8) {
    let r = (c.0.clamp(0.0, 1.0) * 255.0).round() as u8;
    let g = (c.1.clamp(0.0, 1.0) * 255.0).round() as u8;
    let b = (c.2.clamp(0.0, 1.0) * 255.0).round() as u8;
    (r, g, b)
}

/// The precomputed lookup ramp: the gradient evaluated at `n` evenly spaced
/// points. Rebuilt wholesale when the active gradient changes, read-only
/// otherwise.
pub(crate) struct GradientLut {
    samples: Vec<(u8, u8, u8)>,
}

impl GradientLut {
    pub(crate) fn build(def: &GradientDef, sample_count: usize) -> Self {
        let n = sample_count.max(2);
        let mut samples = Vec::with_capacity(n);
        for i in 0..n {
            let t = i as f32 / (n - 1) as f32;
            samples.push(to_rgb_u8(def.evaluate(t)));
        }
        Self { samples }
    }

    /// Nearest-sample lookup for t in [0,1].
    #[inline]
    pub(crate) fn lookup(&self, t: f32) -> (u8, u8, u8) {
        let n = self.samples.len();
        let i = (t.clamp(0.0, 1.0) * (n - 1) as f32).round() as usize;
        self.samples[i.min(n - 1)]
    }
}

/// Built-in gradients, cycled at runtime.
pub(crate) const GRADIENTS: &[GradientDef] = &[
    GradientDef {
        name: "Deep",
        stops: &[
            ColorStop {
                t: 0.0,
                rgb: (0.01, 0.01, 0.05),
            },
            ColorStop {
                t: 0.35,
                rgb: (0.05, 0.15, 0.45),
            },
            ColorStop {
                t: 0.65,
                rgb: (0.05, 0.65, 0.65),
            },
            ColorStop {
                t: 1.0,
                rgb: (0.9, 1.0, 0.95),
            },
        ],
    },
    GradientDef {
        name: "Heat",
        stops: &[
            ColorStop {
                t: 0.0,
                rgb: (0.02, 0.0, 0.0),
            },
            ColorStop {
                t: 0.5,
                rgb: (0.9, 0.2, 0.0),
            },
            ColorStop {
                t: 1.0,
                rgb: (1.0, 0.95, 0.6),
            },
        ],
    },
    GradientDef {
        name: "Spectral",
        stops: &[
            ColorStop {
                t: 0.0,
                rgb: (0.02, 0.03, 0.13),
            },
            ColorStop {
                t: 0.25,
                rgb: (0.0, 0.46, 0.95),
            },
            ColorStop {
                t: 0.5,
                rgb: (0.05, 0.92, 0.35),
            },
            ColorStop {
                t: 0.75,
                rgb: (0.98, 0.86, 0.1),
            },
            ColorStop {
                t: 1.0,
                rgb: (0.95, 0.12, 0.18),
            },
        ],
    },
    GradientDef {
        name: "Mono",
        stops: &[
            ColorStop {
                t: 0.0,
                rgb: (0.0, 0.0, 0.0),
            },
            ColorStop {
                t: 1.0,
                rgb: (1.0, 1.0, 1.0),
            },
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_exact() {
        for def in GRADIENTS {
            let lut = GradientLut::build(def, 512);
            assert_eq!(lut.samples.len(), 512);
            assert_eq!(lut.lookup(0.0), to_rgb_u8(def.evaluate(0.0)), "{}", def.name);
            assert_eq!(lut.lookup(1.0), to_rgb_u8(def.evaluate(1.0)), "{}", def.name);
        }
    }

    #[test]
    fn lookup_clamps_out_of_range_t() {
        let lut = GradientLut::build(&GRADIENTS[0], 128);
        assert_eq!(lut.lookup(-3.0), lut.lookup(0.0));
        assert_eq!(lut.lookup(7.0), lut.lookup(1.0));
    }

    #[test]
    fn mono_ramp_is_monotonic() {
        let mono = GRADIENTS.iter().find(|g| g.name == "Mono").unwrap();
        let lut = GradientLut::build(mono, 512);
        let mut prev = lut.lookup(0.0).0;
        for i in 1..512 {
            let t = i as f32 / 511.0;
            let r = lut.lookup(t).0;
            assert!(r >= prev);
            prev = r;
        }
        assert_eq!(lut.lookup(1.0), (255, 255, 255));
    }

    #[test]
    fn evaluation_interpolates_between_stops() {
        let heat = GRADIENTS.iter().find(|g| g.name == "Heat").unwrap();
        let mid = heat.evaluate(0.25);
        // halfway between the first two stops
        assert!((mid.0 - 0.46).abs() < 1.0e-3);
    }
}
