use super::error::Result;
use crate::engine::grid::Direction;

pub(crate) trait EventSource {
    fn next_event(&mut self) -> Result<Event>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Event {
    UserInput(UserInput),
    Resize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum UserInput {
    Direction(Direction),
    NewGame,
    Quit,
}
