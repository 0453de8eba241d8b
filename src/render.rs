use crate::grid::Grid;
use crate::kernel::KernelField;
use crate::palette::GradientLut;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};

/// Raw-mode terminal guard; restores the screen on drop, so teardown is
/// safe on any exit path and harmless if the drop runs more than once
/// conceptually (every step is best-effort).
pub(crate) struct TermGuard {
    pub(crate) out: Stdout,
}

impl TermGuard {
    pub(crate) fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            DisableLineWrap,
            EnableMouseCapture,
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        Ok(Self { out })
    }
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Cell state mapped through the LUT, one RGB triple per grid cell.
pub(crate) struct ColorBuffer {
    pub(crate) w: usize,
    pub(crate) h: usize,
    pub(crate) rgb: Vec<(u8, u8, u8)>,
}

/// The color-mapping stage: every cell's scalar through the gradient LUT.
pub(crate) fn apply_color(grid: &Grid, lut: &GradientLut) -> ColorBuffer {
    let (w, h) = (grid.width(), grid.height());
    let mut rgb = Vec::with_capacity(w * h);
    for &v in grid.cells() {
        rgb.push(lut.lookup(v));
    }
    ColorBuffer { w, h, rgb }
}

/// Bilinear sample of the color buffer at normalized (u, v).
pub(crate) fn bilinear_sample(buf: &ColorBuffer, u: f32, v: f32) -> (u8, u8, u8) {
    let fx = (u.clamp(0.0, 1.0) * (buf.w - 1) as f32).max(0.0);
    let fy = (v.clamp(0.0, 1.0) * (buf.h - 1) as f32).max(0.0);
    let x0 = fx as usize;
    let y0 = fy as usize;
    let x1 = (x0 + 1).min(buf.w - 1);
    let y1 = (y0 + 1).min(buf.h - 1);
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let c00 = buf.rgb[y0 * buf.w + x0];
    let c10 = buf.rgb[y0 * buf.w + x1];
    let c01 = buf.rgb[y1 * buf.w + x0];
    let c11 = buf.rgb[y1 * buf.w + x1];

    let mix = |a: u8, b: u8, t: f32| a as f32 + (b as f32 - a as f32) * t;
    let top = (
        mix(c00.0, c10.0, tx),
        mix(c00.1, c10.1, tx),
        mix(c00.2, c10.2, tx),
    );
    let bot = (
        mix(c01.0, c11.0, tx),
        mix(c01.1, c11.1, tx),
        mix(c01.2, c11.2, tx),
    );
    (
        mix2(top.0, bot.0, ty),
        mix2(top.1, bot.1, ty),
        mix2(top.2, bot.2, ty),
    )
}

fn mix2(a: f32, b: f32, t: f32) -> u8 {
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

/// Bilinear intensity sample of the raw grid at normalized (u, v).
pub(crate) fn bilinear_intensity(grid: &Grid, u: f32, v: f32) -> f32 {
    let (w, h) = (grid.width(), grid.height());
    let fx = (u.clamp(0.0, 1.0) * (w - 1) as f32).max(0.0);
    let fy = (v.clamp(0.0, 1.0) * (h - 1) as f32).max(0.0);
    let x0 = fx as usize;
    let y0 = fy as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let top = grid.get(x0, y0) + (grid.get(x1, y0) - grid.get(x0, y0)) * tx;
    let bot = grid.get(x0, y1) + (grid.get(x1, y1) - grid.get(x0, y1)) * tx;
    top + (bot - top) * ty
}

// Braille dot bit positions used by Unicode braille.
const BRAILLE_BASE: u32 = 0x2800;
const DOT1: u8 = 1 << 0;
const DOT2: u8 = 1 << 1;
const DOT3: u8 = 1 << 2;
const DOT4: u8 = 1 << 3;
const DOT5: u8 = 1 << 4;
const DOT6: u8 = 1 << 5;
const DOT7: u8 = 1 << 6;
const DOT8: u8 = 1 << 7;

// 0..8-dot brightness ramp with a pleasant fill order.
const RAMP: [u8; 9] = [
    0,
    DOT1,
    DOT1 | DOT4,
    DOT1 | DOT2 | DOT4,
    DOT1 | DOT2 | DOT4 | DOT5,
    DOT1 | DOT2 | DOT3 | DOT4 | DOT5,
    DOT1 | DOT2 | DOT3 | DOT4 | DOT5 | DOT6,
    DOT1 | DOT2 | DOT3 | DOT4 | DOT5 | DOT6 | DOT7,
    DOT1 | DOT2 | DOT3 | DOT4 | DOT5 | DOT6 | DOT7 | DOT8,
];

fn ramp_braille(level_0_to_8: usize) -> char {
    let m = RAMP[level_0_to_8.min(8)] as u32;
    char::from_u32(BRAILLE_BASE + m).unwrap_or(' ')
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
}

impl Cell {
    pub(crate) fn blank() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
        }
    }
}

/// Upscale + present: sample the color buffer and grid intensity at the
/// terminal's extent (below `hud_rows`), emit braille cells, and only
/// redraw cells that changed since the previous frame.
pub(crate) fn present(
    out: &mut Stdout,
    grid: &Grid,
    colors: &ColorBuffer,
    last_frame: &mut Vec<Cell>,
    cols: usize,
    render_rows: usize,
    hud_rows: usize,
) -> io::Result<()> {
    if cols == 0 || render_rows == 0 {
        return Ok(());
    }
    if last_frame.len() != cols * render_rows {
        last_frame.clear();
        last_frame.resize(cols * render_rows, Cell::blank());
        execute!(out, terminal::Clear(terminal::ClearType::All))?;
    }

    queue!(out, BeginSynchronizedUpdate)?;
    let mut cur_fg = Color::White;

    for ty in 0..render_rows {
        for tx in 0..cols {
            // mean of 2x4 bilinear subpixel taps per terminal cell
            let mut acc = 0.0f32;
            for sy in 0..4 {
                for sx in 0..2 {
                    let u = (tx as f32 + (sx as f32 + 0.5) / 2.0) / cols as f32;
                    let v = (ty as f32 + (sy as f32 + 0.5) / 4.0) / render_rows as f32;
                    acc += bilinear_intensity(grid, u, v);
                }
            }
            let mean = acc * 0.125;

            let u = (tx as f32 + 0.5) / cols as f32;
            let v = (ty as f32 + 0.5) / render_rows as f32;
            let (r, g, b) = bilinear_sample(colors, u, v);

            let dots = (mean * 8.0).round().clamp(0.0, 8.0) as usize;
            let new_cell = Cell {
                ch: ramp_braille(dots),
                fg: Color::Rgb { r, g, b },
            };

            let fi = ty * cols + tx;
            if last_frame[fi] != new_cell {
                queue!(out, cursor::MoveTo(tx as u16, (ty + hud_rows) as u16))?;
                if new_cell.fg != cur_fg {
                    cur_fg = new_cell.fg;
                    queue!(out, SetForegroundColor(cur_fg))?;
                }
                queue!(out, Print(new_cell.ch))?;
                last_frame[fi] = new_cell;
            }
        }
    }

    queue!(out, ResetColor, EndSynchronizedUpdate)?;
    out.flush()
}

/// Small grayscale visualization of the kernel profile, drawn in the top
/// right corner when toggled on.
pub(crate) fn draw_kernel_preview(
    out: &mut Stdout,
    kernel: &KernelField,
    cols: usize,
    hud_rows: usize,
) -> io::Result<()> {
    let size = kernel.size();
    if size == 0 {
        return Ok(());
    }
    // one terminal cell per 1x2 kernel cells keeps it roughly square
    let pw = size;
    let ph = (size + 1) / 2;
    let x0 = cols.saturating_sub(pw + 1);

    for py in 0..ph {
        queue!(out, cursor::MoveTo(x0 as u16, (py + hud_rows) as u16))?;
        for px in 0..pw {
            let top = kernel.profile(px, (py * 2).min(size - 1));
            let bottom = kernel.profile(px, (py * 2 + 1).min(size - 1));
            let level = ((top + bottom) * 0.5 * 255.0).round().clamp(0.0, 255.0) as u8;
            let ch = match ((top + bottom) * 4.0) as usize {
                0 => ' ',
                1..=2 => '░',
                3..=5 => '▒',
                _ => '▓',
            };
            queue!(
                out,
                SetForegroundColor(Color::Rgb {
                    r: level,
                    g: level,
                    b: level
                }),
                Print(ch)
            )?;
        }
    }
    queue!(out, ResetColor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Boundary;
    use crate::palette::{GradientLut, GRADIENTS};

    #[test]
    fn apply_color_covers_every_cell() {
        let mut g = Grid::new(4, 3, Boundary::Wrap).unwrap();
        g.set(0, 0, 1.0);
        let lut = GradientLut::build(&GRADIENTS[0], 128);
        let buf = apply_color(&g, &lut);
        assert_eq!(buf.rgb.len(), 12);
        assert_eq!(buf.rgb[0], lut.lookup(1.0));
        assert_eq!(buf.rgb[1], lut.lookup(0.0));
    }

    #[test]
    fn bilinear_sample_is_exact_on_cell_centers() {
        let mut g = Grid::new(2, 2, Boundary::Clamp).unwrap();
        g.set(0, 0, 0.0);
        g.set(1, 0, 1.0);
        assert_eq!(bilinear_intensity(&g, 0.0, 0.0), 0.0);
        assert_eq!(bilinear_intensity(&g, 1.0, 0.0), 1.0);
        let mid = bilinear_intensity(&g, 0.5, 0.0);
        assert!((mid - 0.5).abs() < 1.0e-6);
    }

    #[test]
    fn braille_ramp_spans_blank_to_full() {
        assert_eq!(ramp_braille(0), '\u{2800}');
        assert_eq!(ramp_braille(8), '\u{28FF}');
        assert_eq!(ramp_braille(100), '\u{28FF}');
    }
}
