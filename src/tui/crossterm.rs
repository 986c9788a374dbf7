use std::io::Write;

use crossterm::{
    cursor,
    event::{self, Event as CrossTermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style, terminal, ExecutableCommand, QueueableCommand,
};

use super::error::Result;
use super::events::{Event, EventSource, UserInput};
use super::renderer::Renderer;
use super::scene::{Scene, Style};
use crate::engine::grid::Direction;

/// Crossterm draws scenes onto a terminal in raw mode on the alternate screen.
pub(crate) struct Crossterm<T: Write> {
    w: T,
}

impl<T: Write> Crossterm<T> {
    pub(crate) fn new(mut w: T) -> Result<Self> {
        terminal::enable_raw_mode()?;
        w.execute(terminal::EnterAlternateScreen)?;
        w.execute(cursor::Hide)?;
        Ok(Self { w })
    }

    fn restore(&mut self) -> Result<()> {
        self.w.execute(cursor::Show)?;
        self.w.execute(terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn queue_style(&mut self, s: &Style) -> Result<()> {
        self.w.queue(style::SetAttribute(style::Attribute::Reset))?;
        self.w.queue(style::ResetColor)?;
        if let Some(fg) = s.fg {
            self.w.queue(style::SetForegroundColor(fg.into()))?;
        }
        if let Some(bg) = s.bg {
            self.w.queue(style::SetBackgroundColor(bg.into()))?;
        }
        if s.bold {
            self.w.queue(style::SetAttribute(style::Attribute::Bold))?;
        }
        Ok(())
    }
}

impl<T: Write> Drop for Crossterm<T> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("unable to restore terminal: {}", e);
        }
    }
}

impl<T: Write> Renderer for Crossterm<T> {
    fn size_hint(&self) -> Result<(u16, u16)> {
        Ok(terminal::size()?)
    }

    fn render(&mut self, scene: &Scene) -> Result<()> {
        self.w.queue(terminal::BeginSynchronizedUpdate)?;
        for (y, row) in scene.rows().enumerate() {
            self.w.queue(cursor::MoveTo(0, y as u16))?;
            let mut current: Option<Style> = None;
            for cell in row {
                if current != Some(cell.style) {
                    self.queue_style(&cell.style)?;
                    current = Some(cell.style);
                }
                self.w.queue(style::Print(cell.ch))?;
            }
        }
        self.w.queue(style::ResetColor)?;
        self.w.queue(terminal::EndSynchronizedUpdate)?;
        self.w.flush()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.w.queue(style::ResetColor)?;
        self.w.queue(terminal::Clear(terminal::ClearType::All))?;
        self.w.flush()?;
        Ok(())
    }

    fn recover(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("unable to restore terminal: {}", e);
        }
    }
}

/// CrosstermEvents blocks on the terminal for keyboard and resize events.
#[derive(Default)]
pub(crate) struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_event(&mut self) -> Result<Event> {
        loop {
            match event::read()? {
                CrossTermEvent::Key(ke) => match handle_key_event(ke) {
                    Some(input) => return Ok(Event::UserInput(input)),
                    None => continue,
                },
                CrossTermEvent::Resize(_, _) => return Ok(Event::Resize),
                _ => continue,
            };
        }
    }
}

fn handle_key_event(ke: KeyEvent) -> Option<UserInput> {
    if ke.kind != KeyEventKind::Press {
        return None;
    }
    match ke.code {
        KeyCode::Left | KeyCode::Char('h') => Some(UserInput::Direction(Direction::Left)),
        KeyCode::Right | KeyCode::Char('l') => Some(UserInput::Direction(Direction::Right)),
        KeyCode::Up | KeyCode::Char('k') => Some(UserInput::Direction(Direction::Up)),
        KeyCode::Down | KeyCode::Char('j') => Some(UserInput::Direction(Direction::Down)),
        KeyCode::Char('c') if ke.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(UserInput::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('r') => Some(UserInput::NewGame),
        KeyCode::Char('q') | KeyCode::Esc => Some(UserInput::Quit),
        _ => None,
    }
}
