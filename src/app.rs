use crate::brush::StampMode;
use crate::config::{find_preset, Options, PRESETS};
use crate::engine::{Engine, SimParams};
use crate::input::{collect_actions, Action};
use crate::palette::{GradientLut, GRADIENTS};
use crate::render::{self, apply_color, Cell, TermGuard};
use anyhow::{bail, Context, Result};
use crossterm::{cursor, queue, style::Print, terminal};
use std::io::Write;
use std::time::{Duration, Instant};

const HUD_ROWS: usize = 3;
const FRAME_CAP: Duration = Duration::from_millis(33);

struct App {
    term: TermGuard,
    engine: Engine,
    lut: GradientLut,
    lut_samples: usize,
    gradient_idx: usize,
    preset_idx: usize,
    brush_kernel_shaped: bool,
    brush_radius: usize,
    paused: bool,
    follow_terminal: bool,
    seed: u64,
    last_frame: Vec<Cell>,
    cols: usize,
    rows: usize,
}

impl App {
    fn init(opts: Options) -> Result<Self> {
        opts.validate()?;

        let (cols, rows) = terminal::size().context("query terminal size")?;
        let (cols, rows) = (cols as usize, rows as usize);
        let render_rows = rows.saturating_sub(HUD_ROWS);

        let follow_terminal = opts.width == 0;
        let (gw, gh) = if follow_terminal {
            (cols.max(2), (render_rows * 2).max(2))
        } else {
            (opts.width, opts.height)
        };

        let mut params = SimParams {
            timestep: opts.timestep,
            kernel_size: opts.kernel_size,
            mu: opts.mu,
            sigma: opts.sigma,
        };
        let mut preset_idx = 0;
        if let Some(name) = &opts.preset {
            match find_preset(name) {
                Some(p) => {
                    params = p.params;
                    preset_idx = PRESETS
                        .iter()
                        .position(|q| q.name.eq_ignore_ascii_case(name))
                        .unwrap_or(0);
                }
                None => bail!(
                    "unknown preset {name:?}; known presets: {}",
                    PRESETS
                        .iter()
                        .map(|p| p.name)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }
        }

        let mut engine = Engine::new(gw, gh, opts.boundary(), opts.rule(), params)?;
        if !opts.empty {
            engine.seed(opts.seed);
        }

        let gradient_idx = 0;
        let lut = GradientLut::build(&GRADIENTS[gradient_idx], opts.lut_samples);

        let term = TermGuard::new().context("enter raw terminal")?;

        Ok(Self {
            term,
            engine,
            lut,
            lut_samples: opts.lut_samples,
            gradient_idx,
            preset_idx,
            brush_kernel_shaped: opts.rule() == crate::rules::RuleKind::Lenia,
            brush_radius: 6,
            paused: false,
            follow_terminal,
            seed: opts.seed,
            last_frame: Vec::new(),
            cols,
            rows,
        })
    }

    fn run(&mut self) -> Result<()> {
        let mut show_kernel = false;
        let mut tick_accum = Duration::ZERO;
        let mut last_loop = Instant::now();
        let mut fps_timer = Instant::now();
        let mut frames = 0u32;
        let mut fps = 0.0f32;

        loop {
            // terminal resize: follow it with a deferred grid resize
            let (tcols, trows) = terminal::size()?;
            if (tcols as usize, trows as usize) != (self.cols, self.rows) {
                self.cols = tcols as usize;
                self.rows = trows as usize;
                if self.follow_terminal {
                    let render_rows = self.rows.saturating_sub(HUD_ROWS);
                    self.engine
                        .request_resize(self.cols.max(2), (render_rows * 2).max(2));
                }
                self.last_frame.clear();
            }

            // per-frame input / perturbation pass
            let mut quit = false;
            for action in collect_actions(FRAME_CAP)? {
                match action {
                    Action::Quit => quit = true,
                    Action::TogglePause => self.paused = !self.paused,
                    Action::Reseed => {
                        self.seed = self.seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                        self.engine.seed(self.seed);
                    }
                    Action::ClearGrid => self.engine.clear(),
                    Action::CycleGradient => {
                        self.gradient_idx = (self.gradient_idx + 1) % GRADIENTS.len();
                        self.lut =
                            GradientLut::build(&GRADIENTS[self.gradient_idx], self.lut_samples);
                    }
                    Action::CyclePreset => {
                        self.preset_idx = (self.preset_idx + 1) % PRESETS.len();
                        self.engine.params = PRESETS[self.preset_idx].params;
                    }
                    Action::ToggleKernelPreview => show_kernel = !show_kernel,
                    Action::ToggleBrushMode => {
                        self.brush_kernel_shaped = !self.brush_kernel_shaped
                    }
                    Action::KernelSize(d) => {
                        let size = self.engine.params.kernel_size as i32 + d;
                        self.engine.params.kernel_size = size.clamp(2, 64) as usize;
                    }
                    Action::Mu(d) => {
                        self.engine.params.mu = (self.engine.params.mu + d).clamp(0.0, 1.0)
                    }
                    Action::Sigma(d) => {
                        self.engine.params.sigma = (self.engine.params.sigma + d).clamp(0.0, 0.5)
                    }
                    Action::Timestep(d) => {
                        self.engine.params.timestep =
                            (self.engine.params.timestep + d).clamp(0.01, 1.0)
                    }
                    Action::BrushRadius(d) => {
                        self.brush_radius = (self.brush_radius as i32 + d).clamp(1, 60) as usize
                    }
                    Action::Paint { column, row } => self.paint_at(column, row),
                }
            }
            if quit {
                break;
            }

            // fixed-period simulation ticks, strictly between draw passes
            let now = Instant::now();
            tick_accum += now.saturating_duration_since(last_loop);
            last_loop = now;
            let period = Duration::from_secs_f32(self.engine.params.timestep);
            if self.paused {
                tick_accum = Duration::ZERO;
            }
            while tick_accum >= period {
                self.engine.tick()?;
                tick_accum -= period;
                // never let a slow tick build an unbounded debt
                if tick_accum > period * 4 {
                    tick_accum = Duration::ZERO;
                }
            }

            self.render_frame(show_kernel, fps)?;

            frames += 1;
            if fps_timer.elapsed() >= Duration::from_millis(500) {
                fps = frames as f32 / fps_timer.elapsed().as_secs_f32();
                fps_timer = Instant::now();
                frames = 0;
            }

            std::thread::sleep(FRAME_CAP.saturating_sub(now.elapsed()));
        }
        Ok(())
    }

    /// Map a terminal cell to grid-normalized coordinates and stamp there.
    /// Clicks on the HUD fall outside [0,1] and are dropped by the brush.
    fn paint_at(&mut self, column: u16, row: u16) {
        let render_rows = self.rows.saturating_sub(HUD_ROWS).max(1);
        let nx = (column as f32 + 0.5) / self.cols.max(1) as f32;
        let ny = (row as f32 - HUD_ROWS as f32 + 0.5) / render_rows as f32;
        let mode = if self.brush_kernel_shaped {
            StampMode::KernelBrush
        } else {
            StampMode::Bump {
                radius: self.brush_radius,
                amount: 0.5,
            }
        };
        self.engine.paint(nx, ny, mode);
    }

    fn render_frame(&mut self, show_kernel: bool, fps: f32) -> Result<()> {
        let render_rows = self.rows.saturating_sub(HUD_ROWS);
        let colors = apply_color(self.engine.grid(), &self.lut);

        render::present(
            &mut self.term.out,
            self.engine.grid(),
            &colors,
            &mut self.last_frame,
            self.cols,
            render_rows,
            HUD_ROWS,
        )?;

        if show_kernel {
            render::draw_kernel_preview(
                &mut self.term.out,
                self.engine.kernel(),
                self.cols,
                HUD_ROWS,
            )?;
        }

        let p = self.engine.params;
        let line1 = format!(
            "Lenia  rule:{:?}  preset:{}  gradient:{}  paused:{}  fps:{:>5.1}",
            self.engine.rule(),
            PRESETS[self.preset_idx].name,
            GRADIENTS[self.gradient_idx].name,
            if self.paused { "yes" } else { "no " },
            fps
        );
        let line2 = format!(
            "mu:{:.3}  sigma:{:.3}  dt:{:.2}s  kernel:{}  brush:{}  tick:{}",
            p.mu,
            p.sigma,
            p.timestep,
            p.kernel_size,
            if self.brush_kernel_shaped {
                "kernel".to_string()
            } else {
                format!("bump:{}", self.brush_radius)
            },
            self.engine.ticks()
        );
        let line3 = format!(
            "grid:{}x{}  keys: Q quit  SPACE pause  R reseed  E clear  P preset  T gradient  arrows mu/sigma  [ ] kernel  +/- dt  B brush  K kernel view",
            self.engine.grid().width(),
            self.engine.grid().height()
        );

        for (i, line) in [line1, line2, line3].iter().enumerate() {
            let mut padded = line.clone();
            if padded.len() < self.cols {
                padded.push_str(&" ".repeat(self.cols - padded.len()));
            } else {
                padded.truncate(self.cols);
            }
            queue!(
                self.term.out,
                cursor::MoveTo(0, i as u16),
                Print(padded)
            )?;
        }
        self.term.out.flush()?;
        Ok(())
    }
}

pub(crate) fn run(opts: Options) -> Result<()> {
    let mut app = App::init(opts)?;
    app.run()
}
