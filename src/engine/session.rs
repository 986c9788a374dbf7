use rand::RngCore;

use super::grid::{Direction, Grid, Idx, Score, Tile};
use crate::error::Result;
use crate::store::{BestScore, KeyValueStore};

/// WinPolicy decides whether reaching the winning tile ends the game.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub(crate) enum WinPolicy {
    /// Flag the win and keep accepting moves.
    #[default]
    Continue,
    /// Flag the win and reject every further move.
    Stop,
}

/// Turn describes an accepted move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Turn {
    pub(crate) direction: Direction,
    pub(crate) points: Score,
    pub(crate) spawned: Option<(Idx, Tile)>,
    pub(crate) reached_goal: bool,
}

/// View is a snapshot of everything a front end needs to draw a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct View {
    pub(crate) grid: Grid,
    pub(crate) score: Score,
    pub(crate) best: Score,
    pub(crate) won: bool,
    pub(crate) game_over: bool,
    pub(crate) accepts_input: bool,
}

/// Session owns the authoritative state of one player's game and applies moves to it.
pub(crate) struct Session {
    rng: Box<dyn RngCore>,
    grid: Grid,
    score: Score,
    best: BestScore,
    won: bool,
    game_over: bool,
    turns: usize,
    policy: WinPolicy,
}

impl Session {
    /// Initialize a new session, reading the best score from `store`.
    pub(crate) fn new(
        mut rng: Box<dyn RngCore>,
        store: Box<dyn KeyValueStore>,
        policy: WinPolicy,
    ) -> Result<Self> {
        let best = BestScore::load(store)?;
        let grid = Grid::random(&mut *rng);
        log::info!("new game, best score {}", best.value());
        log::trace!("initial grid\n{}", grid);
        Ok(Self {
            rng,
            grid,
            score: 0,
            best,
            won: false,
            game_over: false,
            turns: 0,
            policy,
        })
    }

    /// Discard the current game and start over. The best score survives.
    pub(crate) fn restart(&mut self) {
        self.grid = Grid::random(&mut *self.rng);
        self.score = 0;
        self.won = false;
        self.game_over = false;
        self.turns = 0;
        log::info!("new game, best score {}", self.best.value());
        log::trace!("initial grid\n{}", self.grid);
    }

    /// shift attempts to move the grid in the given direction and returns the resulting Turn if
    /// the move was accepted.
    ///
    /// An accepted turn is fully applied before the best score is persisted. Failing to persist
    /// it is logged and does not undo the turn.
    pub(crate) fn shift(&mut self, direction: Direction) -> Option<Turn> {
        if !self.accepts_input() {
            log::debug!("ignoring {} after the game ended", direction);
            return None;
        }

        let result = self.grid.shift(direction);
        if !result.moved {
            log::debug!("ignoring {}, nothing moves", direction);
            return None;
        }

        let mut grid = result.board;
        let spawned = grid.place_random_tile(&mut *self.rng);
        self.grid = grid;
        self.score = self.score.saturating_add(result.points);
        self.turns += 1;
        log::trace!("turn {} ({}):\n{}", self.turns, direction, self.grid);

        if result.reached_goal && !self.won {
            log::info!("reached {} on turn {}", super::grid::WINNING_TILE, self.turns);
            self.won = true;
        }
        if !self.grid.has_available_moves() {
            log::info!("game over after {} turns with {}", self.turns, self.score);
            self.game_over = true;
        }
        match self.best.record(self.score) {
            Ok(true) => log::debug!("new best score {}", self.score),
            Ok(false) => (),
            Err(e) => log::error!("unable to persist best score {}: {}", self.score, e),
        }

        Some(Turn {
            direction,
            points: result.points,
            spawned,
            reached_goal: result.reached_goal,
        })
    }

    pub(crate) fn accepts_input(&self) -> bool {
        match self.policy {
            WinPolicy::Continue => !self.game_over,
            WinPolicy::Stop => !self.game_over && !self.won,
        }
    }

    pub(crate) fn grid(&self) -> Grid {
        self.grid
    }

    pub(crate) fn score(&self) -> Score {
        self.score
    }

    pub(crate) fn best(&self) -> Score {
        self.best.value()
    }

    pub(crate) fn has_won(&self) -> bool {
        self.won
    }

    pub(crate) fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub(crate) fn turns(&self) -> usize {
        self.turns
    }

    pub(crate) fn view(&self) -> View {
        View {
            grid: self.grid,
            score: self.score,
            best: self.best(),
            won: self.won,
            game_over: self.game_over,
            accepts_input: self.accepts_input(),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_grid(&mut self, grid: Grid) {
        self.grid = grid;
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rstest::*;

    use super::*;
    use crate::store::{MemoryStore, BEST_SCORE_KEY};

    /// A store that reads nothing and refuses every write.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read only").into())
        }
    }

    fn session(store: &MemoryStore, policy: WinPolicy) -> Session {
        let _ = env_logger::builder().is_test(true).try_init();
        Session::new(
            Box::new(SmallRng::seed_from_u64(42)),
            Box::new(store.clone()),
            policy,
        )
        .expect("memory store never fails")
    }

    fn grid(cells: [[Tile; 4]; 4]) -> Grid {
        Grid::from(cells)
    }

    #[test]
    fn starts_with_two_tiles() {
        let s = session(&MemoryStore::default(), WinPolicy::Continue);
        assert_eq!(s.grid().empty_cells().count(), 14);
        assert_eq!(s.score(), 0);
        assert_eq!(s.turns(), 0);
        assert!(!s.has_won());
        assert!(!s.is_game_over());
        assert!(s.accepts_input());
    }

    #[test]
    fn reads_best_score_from_store() -> Result<()> {
        let mut store = MemoryStore::default();
        store.set(BEST_SCORE_KEY, "512")?;
        let s = session(&store, WinPolicy::Continue);
        assert_eq!(s.best(), 512);
        Ok(())
    }

    #[test]
    fn accepted_move_scores_and_spawns() -> Result<()> {
        let store = MemoryStore::default();
        let mut s = session(&store, WinPolicy::Continue);
        s.set_grid(grid([[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]));

        let turn = s.shift(Direction::Left).expect("move should be accepted");
        assert_eq!(turn.points, 4);
        assert!(!turn.reached_goal);
        let (idx, value) = turn.spawned.expect("a tile should spawn");
        assert_ne!(idx, Idx(0, 0));
        assert_eq!(s.grid().get(idx), value);
        assert_eq!(s.grid().get(Idx(0, 0)), 4);
        assert_eq!(s.grid().empty_cells().count(), 14);
        assert_eq!(s.score(), 4);
        assert_eq!(s.turns(), 1);
        assert_eq!(s.best(), 4);
        assert_eq!(store.get(BEST_SCORE_KEY)?, Some("4".to_string()));
        Ok(())
    }

    #[test]
    fn noop_move_is_rejected() -> Result<()> {
        let mut s = session(&MemoryStore::default(), WinPolicy::Continue);
        let initial = grid([[2, 4, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        s.set_grid(initial);

        assert_eq!(s.shift(Direction::Left), None);
        assert_eq!(s.shift(Direction::Up), None);
        assert_eq!(s.grid(), initial);
        assert_eq!(s.turns(), 0);
        assert_eq!(s.score(), 0);
        Ok(())
    }

    #[test]
    fn best_score_is_not_lowered() -> Result<()> {
        let mut store = MemoryStore::default();
        store.set(BEST_SCORE_KEY, "100")?;
        let mut s = session(&store, WinPolicy::Continue);
        s.set_grid(grid([[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]));
        s.shift(Direction::Left);
        assert_eq!(s.best(), 100);
        assert_eq!(store.get(BEST_SCORE_KEY)?, Some("100".to_string()));
        Ok(())
    }

    #[test]
    fn detects_game_over_after_spawn() -> Result<()> {
        let mut s = session(&MemoryStore::default(), WinPolicy::Continue);
        // sliding right leaves exactly one hole in the top-left corner, and neither a 2 nor a 4
        // can merge with the 8 and 16 next to it
        s.set_grid(grid([
            [8, 16, 0, 32],
            [16, 32, 64, 128],
            [32, 64, 128, 256],
            [64, 128, 256, 512],
        ]));
        let turn = s.shift(Direction::Right).expect("move should be accepted");
        assert_eq!(turn.spawned.map(|(idx, _)| idx), Some(Idx(0, 0)));
        assert!(s.is_game_over());
        assert!(!s.accepts_input());
        assert_eq!(s.shift(Direction::Left), None);
        Ok(())
    }

    #[test]
    fn store_failure_does_not_interrupt_turn() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut s = Session::new(
            Box::new(SmallRng::seed_from_u64(42)),
            Box::new(ReadOnlyStore),
            WinPolicy::Continue,
        )?;
        // the merge leaves one hole next to an 8 and a 64, so the spawned tile cannot merge
        s.set_grid(grid([
            [4, 4, 16, 32],
            [64, 128, 256, 512],
            [128, 256, 512, 1024],
            [256, 512, 1024, 2048],
        ]));

        let turn = s.shift(Direction::Right).expect("move should be accepted");
        assert_eq!(turn.points, 8);
        assert_eq!(turn.spawned.map(|(idx, _)| idx), Some(Idx(0, 0)));
        assert_eq!(s.turns(), 1);
        assert_eq!(s.score(), 8);
        assert_eq!(s.best(), 8);
        assert!(!s.grid().has_available_moves());
        assert!(s.is_game_over());
        assert!(!s.accepts_input());
        Ok(())
    }

    #[rstest]
    #[case::continue_after_win(WinPolicy::Continue, true)]
    #[case::stop_after_win(WinPolicy::Stop, false)]
    fn win_policy(#[case] policy: WinPolicy, #[case] accepts_after_win: bool) -> Result<()> {
        let mut s = session(&MemoryStore::default(), policy);
        s.set_grid(grid([[1024, 1024, 0, 0], [2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]));

        let turn = s.shift(Direction::Left).expect("move should be accepted");
        assert!(turn.reached_goal);
        assert_eq!(turn.points, 2048);
        assert!(s.has_won());
        assert_eq!(s.accepts_input(), accepts_after_win);

        let next = s.shift(Direction::Down);
        assert_eq!(next.is_some(), accepts_after_win);
        // the flag is sticky
        assert!(s.has_won());
        Ok(())
    }

    #[test]
    fn restart_keeps_best_score() -> Result<()> {
        let mut s = session(&MemoryStore::default(), WinPolicy::Stop);
        s.set_grid(grid([[1024, 1024, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]));
        s.shift(Direction::Left);
        assert!(s.has_won());

        s.restart();
        assert_eq!(s.score(), 0);
        assert_eq!(s.turns(), 0);
        assert_eq!(s.best(), 2048);
        assert!(!s.has_won());
        assert!(!s.is_game_over());
        assert!(s.accepts_input());
        assert_eq!(s.grid().empty_cells().count(), 14);
        Ok(())
    }

    #[test]
    fn plays_until_game_over() -> Result<()> {
        let mut s = session(&MemoryStore::default(), WinPolicy::Continue);
        let mut score = 0;
        while !s.is_game_over() {
            let turn = Direction::ALL
                .iter()
                .find_map(|d| s.shift(*d))
                .expect("a live game always has a legal move");
            score += turn.points;
            assert_eq!(s.score(), score);
        }
        assert!(s.is_game_over());
        assert!(!s.grid().has_available_moves());
        assert_eq!(s.best(), s.score());
        Ok(())
    }
}
