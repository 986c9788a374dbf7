use rand::distributions::Distribution;
use rand::distributions::WeightedIndex;
use rand::seq::IteratorRandom;
use rand::Rng;

/// Width and height of the board.
pub(crate) const SIZE: usize = 4;

/// Merging two tiles into this value wins the game.
pub(crate) const WINNING_TILE: Tile = 2048;

const EMPTY: Tile = 0;
const NEW_TILE_CHOICES: [Tile; 2] = [2, 4];
const NEW_TILE_WEIGHTS: [u8; 2] = [9, 1];

pub(crate) type Tile = u32;

pub(crate) type Score = u64;

type Line = [Tile; SIZE];

/// Direction in which every tile on the grid slides.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub(crate) const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    fn orientation(self) -> Orientation {
        match self {
            Direction::Left => Orientation {
                transpose: false,
                reverse: false,
            },
            Direction::Right => Orientation {
                transpose: false,
                reverse: true,
            },
            Direction::Up => Orientation {
                transpose: true,
                reverse: false,
            },
            Direction::Down => Orientation {
                transpose: true,
                reverse: true,
            },
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        write!(f, "{}", s)
    }
}

/// Orientation maps the position of a tile within a line onto grid coordinates so that every
/// direction is handled as a leftward slide.
///
/// Lines are rows unless `transpose` is set, in which case they are columns. Position 0 of a line
/// is the edge tiles slide toward: column/row 0 normally, column/row `SIZE - 1` when `reverse` is
/// set.
#[derive(Clone, Copy, Debug)]
struct Orientation {
    transpose: bool,
    reverse: bool,
}

impl Orientation {
    fn idx(self, line: usize, pos: usize) -> Idx {
        let along = if self.reverse { SIZE - 1 - pos } else { pos };
        if self.transpose {
            Idx(along, line)
        } else {
            Idx(line, along)
        }
    }
}

/// Grid coordinates as (row, column).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct Idx(pub(crate) usize, pub(crate) usize);

impl std::fmt::Display for Idx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "idx({0},{1})", self.0, self.1)
    }
}

impl Idx {
    pub(crate) fn row(&self) -> usize {
        self.0
    }

    pub(crate) fn col(&self) -> usize {
        self.1
    }
}

/// The outcome of sliding a grid in one direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MoveResult {
    pub(crate) board: Grid,
    pub(crate) moved: bool,
    pub(crate) points: Score,
    pub(crate) reached_goal: bool,
}

#[derive(Debug, Default, PartialEq)]
struct LineResult {
    line: Line,
    points: Score,
    reached_goal: bool,
}

/// Grid is an immutable 4x4 2048 board. Every operation returns a new grid.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct Grid {
    cells: [[Tile; SIZE]; SIZE],
}

impl From<[[Tile; SIZE]; SIZE]> for Grid {
    fn from(cells: [[Tile; SIZE]; SIZE]) -> Self {
        debug_assert!(
            cells
                .iter()
                .flatten()
                .all(|t| *t == EMPTY || (t.is_power_of_two() && *t >= 2)),
            "grid tiles must be 0 or a power of two: {:?}",
            cells
        );
        Self { cells }
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.iter() {
            for tile in row.iter() {
                write!(f, "{:>6}", tile)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// public methods
impl Grid {
    /// Initialize a new grid holding two random tiles.
    pub(crate) fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Grid::default()
            .spawn_random_tile(rng)
            .spawn_random_tile(rng)
    }

    pub(crate) fn get(&self, idx: Idx) -> Tile {
        *self
            .cells
            .get(idx.row())
            .unwrap_or_else(|| panic!("invalid row {}", idx.row()))
            .get(idx.col())
            .unwrap_or_else(|| panic!("invalid column {}", idx.col()))
    }

    pub(crate) fn rows(&self) -> &[[Tile; SIZE]; SIZE] {
        &self.cells
    }

    /// Slide and merge every tile toward the edge named by `direction`.
    pub(crate) fn shift(self, direction: Direction) -> MoveResult {
        let orientation = direction.orientation();
        let mut board = self;
        let mut points = 0;
        let mut reached_goal = false;

        for line in 0..SIZE {
            let before = self.line(orientation, line);
            let result = slide_line(before);
            points += result.points;
            reached_goal |= result.reached_goal;
            board.set_line(orientation, line, result.line);
        }

        MoveResult {
            board,
            moved: board != self,
            points,
            reached_goal,
        }
    }

    /// Place a 2 (90%) or a 4 (10%) in a uniformly chosen empty cell. A full grid is returned
    /// unchanged.
    pub(crate) fn spawn_random_tile<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        let _ = self.place_random_tile(rng);
        self
    }

    /// Like spawn_random_tile but mutates in place and reports where the new tile landed.
    pub(crate) fn place_random_tile<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Option<(Idx, Tile)> {
        let idx = self.empty_cells().choose(rng)?;
        let weights =
            WeightedIndex::new(NEW_TILE_WEIGHTS).expect("NEW_TILE_WEIGHTS should never be empty");
        let value = NEW_TILE_CHOICES[weights.sample(rng)];
        self.cells[idx.row()][idx.col()] = value;
        Some((idx, value))
    }

    /// Whether any direction would still change the grid.
    pub(crate) fn has_available_moves(&self) -> bool {
        if self.empty_cells().next().is_some() {
            return true;
        }
        (0..SIZE).any(|row| {
            (0..SIZE).any(|col| {
                let current = self.cells[row][col];
                merge(current).is_some()
                    && ((col + 1 < SIZE && self.cells[row][col + 1] == current)
                        || (row + 1 < SIZE && self.cells[row + 1][col] == current))
            })
        })
    }

    pub(crate) fn empty_cells(&self) -> impl Iterator<Item = Idx> + '_ {
        (0..SIZE)
            .flat_map(|row| (0..SIZE).map(move |col| Idx(row, col)))
            .filter(|idx| self.get(*idx) == EMPTY)
    }

    pub(crate) fn max_tile(&self) -> Tile {
        self.cells.iter().flatten().copied().max().unwrap_or(EMPTY)
    }

    pub(crate) fn tile_sum(&self) -> u64 {
        self.cells.iter().flatten().map(|t| u64::from(*t)).sum()
    }
}

// private methods
impl Grid {
    fn line(&self, orientation: Orientation, line: usize) -> Line {
        let mut out = [EMPTY; SIZE];
        for (pos, tile) in out.iter_mut().enumerate() {
            *tile = self.get(orientation.idx(line, pos));
        }
        out
    }

    fn set_line(&mut self, orientation: Orientation, line: usize, values: Line) {
        for (pos, value) in values.into_iter().enumerate() {
            let idx = orientation.idx(line, pos);
            self.cells[idx.row()][idx.col()] = value;
        }
    }
}

/// The tile two equal `tile`s merge into. The largest representable tile does not merge.
fn merge(tile: Tile) -> Option<Tile> {
    tile.checked_mul(2)
}

/// Compact a line toward position 0, merging each equal pair at most once.
fn slide_line(line: Line) -> LineResult {
    let mut result = LineResult::default();
    let mut tiles = line.iter().copied().filter(|t| *t != EMPTY).peekable();
    let mut slot = 0;
    while let Some(tile) = tiles.next() {
        let merged = merge(tile).filter(|_| tiles.next_if_eq(&tile).is_some());
        let value = match merged {
            Some(merged) => {
                result.points += Score::from(merged);
                result.reached_goal |= merged == WINNING_TILE;
                merged
            }
            None => tile,
        };
        result.line[slot] = value;
        slot += 1;
    }
    result
}
