use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub(crate) enum Action {
    Quit,
    TogglePause,
    Reseed,
    ClearGrid,
    CycleGradient,
    CyclePreset,
    ToggleKernelPreview,
    ToggleBrushMode,
    KernelSize(i32),
    Mu(f32),
    Sigma(f32),
    Timestep(f32),
    BrushRadius(i32),
    /// Pointer press/drag at terminal cell (column, row).
    Paint { column: u16, row: u16 },
}

/// Drain pending terminal events without blocking the frame.
pub(crate) fn collect_actions(max_wait: Duration) -> Result<Vec<Action>> {
    let mut out = Vec::new();
    let timeout = std::cmp::min(Duration::from_millis(1), max_wait);

    while event::poll(timeout)? {
        match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => {
                if let Some(a) = map_key(k.code, k.modifiers) {
                    out.push(a);
                }
            }
            Event::Mouse(m) => match m.kind {
                MouseEventKind::Down(MouseButton::Left)
                | MouseEventKind::Drag(MouseButton::Left) => {
                    out.push(Action::Paint {
                        column: m.column,
                        row: m.row,
                    });
                }
                _ => {}
            },
            _ => {}
        }
        if out.len() >= 64 {
            break;
        }
    }
    Ok(out)
}

fn map_key(code: KeyCode, mods: KeyModifiers) -> Option<Action> {
    let big = mods.contains(KeyModifiers::SHIFT);
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Reseed),
        KeyCode::Char('e') | KeyCode::Char('E') => Some(Action::ClearGrid),
        KeyCode::Char('t') | KeyCode::Char('T') => Some(Action::CycleGradient),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Action::CyclePreset),
        KeyCode::Char('k') | KeyCode::Char('K') => Some(Action::ToggleKernelPreview),
        KeyCode::Char('b') | KeyCode::Char('B') => Some(Action::ToggleBrushMode),
        KeyCode::Char('[') => Some(Action::KernelSize(-1)),
        KeyCode::Char(']') => Some(Action::KernelSize(1)),
        KeyCode::Up => Some(Action::Mu(if big { 0.01 } else { 0.002 })),
        KeyCode::Down => Some(Action::Mu(if big { -0.01 } else { -0.002 })),
        KeyCode::Right => Some(Action::Sigma(if big { 0.005 } else { 0.001 })),
        KeyCode::Left => Some(Action::Sigma(if big { -0.005 } else { -0.001 })),
        KeyCode::Char('-') => Some(Action::Timestep(-0.01)),
        KeyCode::Char('=') | KeyCode::Char('+') => Some(Action::Timestep(0.01)),
        KeyCode::Char(',') => Some(Action::BrushRadius(-1)),
        KeyCode::Char('.') => Some(Action::BrushRadius(1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_bindings_map() {
        assert!(matches!(
            map_key(KeyCode::Char('q'), KeyModifiers::NONE),
            Some(Action::Quit)
        ));
        assert!(matches!(
            map_key(KeyCode::Char(' '), KeyModifiers::NONE),
            Some(Action::TogglePause)
        ));
        assert!(matches!(
            map_key(KeyCode::Char(']'), KeyModifiers::NONE),
            Some(Action::KernelSize(1))
        ));
        assert!(map_key(KeyCode::Char('z'), KeyModifiers::NONE).is_none());
    }

    #[test]
    fn shift_takes_bigger_parameter_steps() {
        let small = match map_key(KeyCode::Up, KeyModifiers::NONE) {
            Some(Action::Mu(d)) => d,
            other => panic!("unexpected {other:?}"),
        };
        let large = match map_key(KeyCode::Up, KeyModifiers::SHIFT) {
            Some(Action::Mu(d)) => d,
            other => panic!("unexpected {other:?}"),
        };
        assert!(large > small);
    }
}
