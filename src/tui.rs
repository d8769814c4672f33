//! Ratatui rendering of the timer screen.

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Padding, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, stdout, Stdout};

const ACCENT: Color = Color::Indexed(213);
const COUNTDOWN: Color = Color::Indexed(45);
const SOUND_LABEL: Color = Color::Indexed(219);
const STOP_PROMPT: Color = Color::Indexed(82);

const HELP_WIDTH: u16 = 70;

const HELP: &[&str] = &[
    "space start/pause",
    "s stop",
    "up +1m",
    "down -1m",
    "right +1h",
    "left -1h",
    "1-9 set minutes",
    "/ cycle alarm",
    "q quit",
];

pub const STOP_PROMPT_TEXT: &str = "Press s to stop";
pub const ALARM_INFO_TEXT: &str = "Repeating every 1m – pause to silence";

/// Everything drawn for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Fixed-size glyph block
    pub countdown: String,
    pub show_stop_prompt: bool,
    pub alarm_info: Option<&'static str>,
    pub alarm_name: String,
}

/// Restore terminal to normal state.
///
/// This function is safe to call multiple times and handles errors gracefully.
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
}

/// Owns the terminal in raw/alternate-screen mode and restores it on drop
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
            restore_terminal();
            return Err(e);
        }

        // Register panic hook to restore terminal on panic
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            original_hook(panic_info);
        }));

        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                restore_terminal();
                Err(e)
            }
        }
    }

    pub fn draw(&mut self, view: &View) -> io::Result<()> {
        self.terminal.draw(|f| draw_ui(f, view))?;
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

pub fn draw_ui(f: &mut Frame, view: &View) {
    let glyph_rows = view.countdown.lines().count();
    let glyph_cols = view.countdown.lines().map(str::len).max().unwrap_or(0);
    // Rounded border plus 1x2 padding
    let box_height = u16::try_from(glyph_rows + 4).unwrap_or(u16::MAX);
    let box_width = u16::try_from(glyph_cols + 6).unwrap_or(u16::MAX);

    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(box_height),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .split(f.area());

    let title = Paragraph::new(Span::styled(
        "Nag Timer",
        Style::new().fg(ACCENT).add_modifier(Modifier::BOLD),
    ));
    f.render_widget(title, rows[0]);

    let countdown_box = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::new().fg(ACCENT))
        .padding(Padding::new(2, 2, 1, 1));
    let countdown = Paragraph::new(view.countdown.as_str())
        .style(Style::new().fg(COUNTDOWN).add_modifier(Modifier::BOLD))
        .block(countdown_box);
    f.render_widget(countdown, narrow(rows[1], box_width));

    let status = if view.show_stop_prompt {
        Line::from(Span::styled(
            STOP_PROMPT_TEXT,
            Style::new().fg(STOP_PROMPT).add_modifier(Modifier::BOLD),
        ))
    } else if let Some(info) = view.alarm_info {
        Line::from(info)
    } else {
        Line::default()
    };
    f.render_widget(Paragraph::new(status), rows[2]);

    let sound = Line::from(vec![
        Span::raw("Alarm: "),
        Span::styled(
            view.alarm_name.as_str(),
            Style::new().fg(SOUND_LABEL).add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(sound), rows[3]);

    let help = Paragraph::new(HELP.join(" • "))
        .style(Style::new().add_modifier(Modifier::DIM))
        .wrap(Wrap { trim: true });
    f.render_widget(help, narrow(rows[4], HELP_WIDTH));
}

fn narrow(area: Rect, width: u16) -> Rect {
    Rect {
        width: width.min(area.width),
        ..area
    }
}
