use crate::engine::grid::Direction;
use crate::engine::session::Session;
use crate::error::Result;
use crate::tui::error::TuiError;
use crate::tui::events::{Event, EventSource, UserInput};
use crate::tui::renderer::Renderer;
use crate::tui::scene::{self, Scene};

/// Slide48 ties a game session to a terminal: it draws the session, waits for input and feeds
/// moves back into the session until the player quits.
pub(crate) struct Slide48<R: Renderer, E: EventSource> {
    renderer: R,
    event_source: E,
    session: Session,
}

impl<R: Renderer, E: EventSource> Slide48<R, E> {
    pub(crate) fn new(session: Session, renderer: R, event_source: E) -> Self {
        Self {
            renderer,
            event_source,
            session,
        }
    }

    /// Run consumes the Slide48 instance and plays until the player quits. The terminal is
    /// restored before any error is returned.
    pub(crate) fn run(mut self) -> Result<Session> {
        match self.inner_run() {
            Err(e) => {
                self.renderer.recover();
                Err(e)
            }
            Ok(_) => Ok(self.session),
        }
    }

    fn inner_run(&mut self) -> Result<()> {
        self.renderer.clear()?;
        loop {
            let scene = self.scene()?;
            self.renderer.render(&scene)?;

            match self.event_source.next_event()? {
                Event::UserInput(UserInput::Direction(d)) => self.shift(d),
                Event::UserInput(UserInput::NewGame) => self.session.restart(),
                Event::UserInput(UserInput::Quit) => break,
                Event::Resize => self.renderer.clear()?,
            }
        }
        log::info!(
            "quitting with score {} after {} turns",
            self.session.score(),
            self.session.turns()
        );
        Ok(())
    }

    fn scene(&self) -> Result<Scene> {
        let (width, height) = self.renderer.size_hint()?;
        let (width, height) = (width as usize, height as usize);
        match scene::compose(&self.session.view(), width, height) {
            Ok(s) => Ok(s),
            Err(TuiError::TerminalTooSmall(_, _)) => Ok(scene::too_small(width, height)),
            Err(e) => Err(e.into()),
        }
    }

    fn shift(&mut self, direction: Direction) {
        match self.session.shift(direction) {
            Some(turn) => log::debug!(
                "{} scored {}, spawned {:?}",
                turn.direction,
                turn.points,
                turn.spawned
            ),
            None => log::trace!("{} rejected", direction),
        }
    }
}
