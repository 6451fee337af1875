//! Board mechanics.
use rand::{rngs::StdRng, Rng};
use relay_core::Dir4;

/// Side length of the board.
pub const BOARD_SIZE: usize = 4;

/// The largest tile exponent representable in observations.
pub const MAX_NUMBER: usize = BOARD_SIZE * BOARD_SIZE + 1;

/// The number of symmetric views of a board: four rotations, each with its
/// mirror image.
pub const NUM_SYMMETRIES: usize = 8;

/// A 4x4 board of tile exponents.
///
/// A cell holds `0` when empty and `n` for the tile `2^n`. The board is the
/// observation type of [`G2048Env`](crate::G2048Env).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[u8; BOARD_SIZE]; BOARD_SIZE],
}

/// The symmetric view index under which a move in the given direction
/// becomes a leftward slide.
pub(crate) fn slide_index(action: Dir4) -> usize {
    match action {
        Dir4::Left => 0,
        Dir4::Down => 1,
        Dir4::Right => 2,
        Dir4::Up => 3,
    }
}

impl Board {
    /// Builds a board from raw cell exponents, row-major.
    pub fn from_cells(cells: [[u8; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    /// The raw cell exponents, row-major.
    pub fn cells(&self) -> &[[u8; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Reads cell `(x, y)` of the `dir`-th symmetric view.
    pub(crate) fn sym(&self, dir: usize, x: usize, y: usize) -> u8 {
        let s = BOARD_SIZE - 1;
        match dir {
            0 => self.cells[y][x],
            1 => self.cells[s - x][y],
            2 => self.cells[s - y][s - x],
            3 => self.cells[x][s - y],
            4 => self.cells[x][y],
            5 => self.cells[y][s - x],
            6 => self.cells[s - x][s - y],
            7 => self.cells[s - y][x],
            _ => unreachable!("symmetry index out of range: {}", dir),
        }
    }

    fn sym_mut(&mut self, dir: usize, x: usize, y: usize) -> &mut u8 {
        let s = BOARD_SIZE - 1;
        match dir {
            0 => &mut self.cells[y][x],
            1 => &mut self.cells[s - x][y],
            2 => &mut self.cells[s - y][s - x],
            3 => &mut self.cells[x][s - y],
            4 => &mut self.cells[x][y],
            5 => &mut self.cells[y][s - x],
            6 => &mut self.cells[s - x][s - y],
            7 => &mut self.cells[s - y][x],
            _ => unreachable!("symmetry index out of range: {}", dir),
        }
    }

    /// Slides and merges leftward in the `dir`-th symmetric view.
    ///
    /// Each pair of equal tiles merges at most once per move, scanning from
    /// the low end of the row.
    fn slide(&mut self, dir: usize) {
        for y in 0..BOARD_SIZE {
            for new_x in 0..BOARD_SIZE {
                let mut val1 = 0;
                let mut val2 = 0;
                for x in new_x..BOARD_SIZE {
                    let v = self.sym(dir, x, y);
                    if v != 0 {
                        if val1 == 0 {
                            val1 = v;
                            *self.sym_mut(dir, x, y) = 0;
                        } else {
                            val2 = v;
                            *self.sym_mut(dir, x, y) = 0;
                            break;
                        }
                    }
                }
                if val1 == 0 {
                    break;
                }
                if val1 == val2 {
                    *self.sym_mut(dir, new_x, y) = val1 + 1;
                } else {
                    *self.sym_mut(dir, new_x, y) = val1;
                    if val2 != 0 {
                        *self.sym_mut(dir, new_x + 1, y) = val2;
                    }
                }
            }
        }
    }

    /// Applies a move.
    pub fn apply(&mut self, action: Dir4) {
        self.slide(slide_index(action));
    }

    /// Returns `true` if applying `action` would change the board.
    pub fn changes_under(&self, action: Dir4) -> bool {
        let mut moved = self.clone();
        moved.apply(action);
        moved != *self
    }

    /// The number of empty cells.
    pub fn count_empty(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell == 0)
            .count()
    }

    /// Returns `true` if no move changes the board.
    pub fn is_dead(&self) -> bool {
        [Dir4::Left, Dir4::Down, Dir4::Right, Dir4::Up]
            .into_iter()
            .all(|action| !self.changes_under(action))
    }

    /// Places a new tile in a uniformly chosen empty cell: exponent `1`
    /// with probability 9/10, else `2`.
    pub fn spawn(&mut self, rng: &mut StdRng) {
        debug_assert!(self.count_empty() > 0);
        let mut position = rng.gen_range(0..self.count_empty());
        let value = if rng.gen_range(0..10) == 0 { 2 } else { 1 };
        for row in self.cells.iter_mut() {
            for cell in row.iter_mut() {
                if *cell == 0 {
                    if position == 0 {
                        *cell = value;
                        return;
                    }
                    position -= 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn row(cells: [u8; 4]) -> Board {
        Board::from_cells([cells, [0; 4], [0; 4], [0; 4]])
    }

    #[test]
    fn slide_left_merges_pairs() {
        let mut board = row([1, 1, 0, 0]);
        board.apply(Dir4::Left);
        assert_eq!(board, row([2, 0, 0, 0]));
    }

    #[test]
    fn slide_left_merges_across_gaps() {
        let mut board = row([1, 0, 0, 1]);
        board.apply(Dir4::Left);
        assert_eq!(board, row([2, 0, 0, 0]));
    }

    #[test]
    fn merge_happens_at_most_once_per_pair() {
        let mut board = row([1, 1, 1, 1]);
        board.apply(Dir4::Left);
        assert_eq!(board, row([2, 2, 0, 0]));

        let mut board = row([2, 1, 1, 0]);
        board.apply(Dir4::Left);
        assert_eq!(board, row([2, 2, 0, 0]));
    }

    #[test]
    fn unequal_tiles_keep_their_order() {
        let mut board = row([1, 2, 2, 1]);
        board.apply(Dir4::Left);
        assert_eq!(board, row([1, 3, 1, 0]));
    }

    #[test]
    fn slide_right_mirrors_slide_left() {
        let mut board = row([1, 1, 0, 2]);
        board.apply(Dir4::Right);
        assert_eq!(board, row([0, 0, 2, 2]));
    }

    #[test]
    fn slide_up_and_down_work_on_columns() {
        let mut board = Board::from_cells([
            [1, 0, 0, 0],
            [0, 0, 0, 0],
            [1, 0, 0, 0],
            [2, 0, 0, 0],
        ]);
        board.apply(Dir4::Up);
        assert_eq!(
            board,
            Board::from_cells([
                [2, 0, 0, 0],
                [2, 0, 0, 0],
                [0, 0, 0, 0],
                [0, 0, 0, 0],
            ])
        );
        board.apply(Dir4::Down);
        assert_eq!(
            board,
            Board::from_cells([
                [0, 0, 0, 0],
                [0, 0, 0, 0],
                [0, 0, 0, 0],
                [3, 0, 0, 0],
            ])
        );
    }

    #[test]
    fn dead_board_is_detected() {
        let alternating = Board::from_cells([
            [1, 2, 1, 2],
            [2, 1, 2, 1],
            [1, 2, 1, 2],
            [2, 1, 2, 1],
        ]);
        assert!(alternating.is_dead());

        let mergeable = Board::from_cells([
            [1, 1, 2, 1],
            [2, 3, 1, 2],
            [1, 2, 3, 1],
            [2, 1, 2, 1],
        ]);
        assert!(!mergeable.is_dead());
    }

    #[test]
    fn spawn_fills_exactly_one_empty_cell() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut board = Board::default();
        for expected in 1..=8 {
            board.spawn(&mut rng);
            assert_eq!(16 - board.count_empty(), expected);
        }
        for row in board.cells() {
            for &cell in row {
                assert!(cell <= 2);
            }
        }
    }
}
