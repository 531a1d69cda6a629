//! Terminal setup and teardown with panic safety, and drawing of rendered
//! lines.

use std::io::{self, Stdout, Write};
use std::panic;

use crossterm::{
    cursor, execute, queue,
    style::{
        Attribute, Color as CtColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
        SetForegroundColor,
    },
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use gridline::render::Line;
use gridline::{Color, Style};

/// Raw-mode, alternate-screen terminal that restores itself on drop.
pub struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    pub fn new() -> io::Result<Self> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            // Caught by the table and shown in the cell; keep the screen.
            if gridline::resolving_cell() {
                log::warn!("cell accessor panicked: {panic_info}");
                return;
            }
            let _ = restore_terminal();
            original_hook(panic_info);
        }));

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        Ok(Self { stdout })
    }

    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Draw `lines` from the top of the screen, clearing what is below.
    pub fn draw(&mut self, lines: &[Line]) -> io::Result<()> {
        queue!(self.stdout, cursor::MoveTo(0, 0))?;
        for (y, line) in lines.iter().enumerate() {
            let y = u16::try_from(y).unwrap_or(u16::MAX);
            queue!(self.stdout, cursor::MoveTo(0, y), Clear(ClearType::CurrentLine))?;
            for span in &line.spans {
                apply_style(&mut self.stdout, &span.style)?;
                queue!(self.stdout, Print(&span.text))?;
                queue!(self.stdout, SetAttribute(Attribute::Reset), ResetColor)?;
            }
        }
        queue!(self.stdout, Clear(ClearType::FromCursorDown))?;
        self.stdout.flush()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

fn restore_terminal() -> io::Result<()> {
    terminal::disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)?;
    Ok(())
}

fn apply_style(out: &mut Stdout, style: &Style) -> io::Result<()> {
    if let Some(fg) = style.foreground.as_ref().and_then(theme_color) {
        queue!(out, SetForegroundColor(fg))?;
    }
    if let Some(bg) = style.background.as_ref().and_then(theme_color) {
        queue!(out, SetBackgroundColor(bg))?;
    }
    let attributes = [
        (style.bold, Attribute::Bold),
        (style.dim, Attribute::Dim),
        (style.italic, Attribute::Italic),
        (style.underline, Attribute::Underlined),
        (style.reverse, Attribute::Reverse),
    ];
    for (on, attribute) in attributes {
        if on {
            queue!(out, SetAttribute(attribute))?;
        }
    }
    Ok(())
}

/// Map theme variables to terminal colors. Unknown names use the default.
fn theme_color(color: &Color) -> Option<CtColor> {
    match color {
        Color::Rgb(r, g, b) => Some(CtColor::Rgb {
            r: *r,
            g: *g,
            b: *b,
        }),
        Color::Var(name) => match name.as_str() {
            "danger" => Some(CtColor::Red),
            "accent" => Some(CtColor::Magenta),
            "info" => Some(CtColor::Cyan),
            "muted" | "skeleton" => Some(CtColor::DarkGrey),
            "primary" => Some(CtColor::Blue),
            "table.header_bg" => Some(CtColor::Rgb {
                r: 40,
                g: 44,
                b: 52,
            }),
            "sheet.bg" | "dialog.bg" => Some(CtColor::Rgb {
                r: 30,
                g: 34,
                b: 42,
            }),
            _ => None,
        },
    }
}
