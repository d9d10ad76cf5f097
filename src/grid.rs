use std::fmt;
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;

use crate::Coord;
use crate::aabb::Aabb;
use crate::rule_set::B3S23;
use crate::rule_set::RuleSet;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid grid dimensions {width}x{height}, both must be at least 1 and the grid addressable")]
    InvalidDimensions { width: usize, height: usize },

    #[error("cell matrix is empty or its rows differ in length")]
    ShapeMismatch,
}

/// A finite Life universe. Cells outside of `[0, width) x [0, height)` are always dead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,

    /// Number of steps since the grid was created, reset, or randomized
    generation: u64,

    /// Row-major cell buffer, always exactly `width * height` long
    cells: Vec<bool>,
}

impl Grid {
    /// Create an empty grid at generation 0. Fails if either side is 0 or the cell count does
    /// not fit in memory.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        let len = width
            .checked_mul(height)
            .filter(|&n| n > 0 && n <= isize::MAX as usize)
            .ok_or(GridError::InvalidDimensions { width, height })?;

        Ok(Self {
            width,
            height,
            generation: 0,
            cells: vec![false; len],
        })
    }

    /// Build a grid at generation 0 from a row-major matrix. The extents of the matrix become
    /// the grid's dimensions.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self, GridError> {
        let (width, height, cells) = flatten(rows)?;

        Ok(Self {
            width,
            height,
            generation: 0,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of live cells
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Whether the cell at `(x, y)` is alive. Off-grid coordinates are dead.
    pub fn is_alive(&self, x: Coord, y: Coord) -> bool {
        self.index(x, y).is_some_and(|i| self.cells[i])
    }

    /// Flip the cell at `(x, y)`. Off-grid coordinates are ignored.
    pub fn toggle(&mut self, x: Coord, y: Coord) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = !self.cells[i];
        }
    }

    /// Turn on the cell at `(x, y)`, returning whether it lies on the grid.
    pub fn set_alive(&mut self, x: Coord, y: Coord) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };

        self.cells[i] = true;

        true
    }

    /// Replace the whole cell matrix. The grid keeps its current state if the matrix is
    /// rejected.
    pub fn set_cells<R: AsRef<[bool]>>(&mut self, rows: &[R]) -> Result<(), GridError> {
        let (width, height, cells) = flatten(rows)?;

        self.width = width;
        self.height = height;
        self.cells = cells;

        Ok(())
    }

    /// Kill every cell and go back to generation 0
    pub fn reset(&mut self) {
        self.cells.fill(false);
        self.generation = 0;
    }

    /// Fill the grid with noise from the thread-local RNG and go back to generation 0
    pub fn randomize(&mut self) {
        self.randomize_with(&mut rand::rng());
    }

    /// Like `randomize`, drawing from `rng`. Each cell is alive with probability 1/2.
    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for c in self.cells.iter_mut() {
            *c = rng.random_bool(0.5);
        }

        self.generation = 0;
    }

    /// Advance one generation under Conway's rules.
    pub fn step(&mut self) {
        self.step_with(&B3S23);
    }

    /// Advance one generation under `rule`.
    ///
    /// Every cell is computed from the current buffer into a fresh one, which then replaces
    /// the current buffer in a single move.
    pub fn step_with(&mut self, rule: &RuleSet) {
        let mut next = vec![false; self.cells.len()];

        for (i, c) in next.iter_mut().enumerate() {
            let (x, y) = self.xy_to(i);
            *c = rule.next(self.cells[i], self.neighbours(x, y));
        }

        self.cells = next;
        self.generation += 1;
    }

    /// Number of live cells among the 8 cells surrounding `(x, y)`
    fn neighbours(&self, x: Coord, y: Coord) -> u8 {
        let mut n = 0;

        for dy in -1..=1 {
            for dx in -1..=1 {
                if (dx, dy) != (0, 0) && self.is_alive(x + dx, y + dy) {
                    n += 1;
                }
            }
        }

        n
    }

    /// Bounding box of all live cells, or `None` if everything is dead
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.alive_cells())
    }

    /// Translate the live cells so that their bounding box sits in the middle of the grid.
    ///
    /// Per axis the shift is `(dimension - box_size) / 2 - box_min`. Cells that would land
    /// off the grid are dropped. The generation is left alone.
    pub fn center_align(&mut self) {
        let Some(b) = self.bounds() else { return };

        let dx = (self.width as Coord - b.width()) / 2 - b.min_x;
        let dy = (self.height as Coord - b.height()) / 2 - b.min_y;

        if (dx, dy) == (0, 0) {
            return;
        }

        let mut next = vec![false; self.cells.len()];
        for (x, y) in self.alive_cells() {
            if let Some(i) = self.index(x + dx, y + dy) {
                next[i] = true;
            }
        }

        self.cells = next;
    }

    /// Coordinates of every live cell, in row-major order
    pub fn alive_cells(&self) -> impl Iterator<Item = (Coord, Coord)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c)
            .map(|(i, _)| self.xy_to(i))
    }

    /// Rows of the grid, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.cells.chunks_exact(self.width)
    }

    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.rows().map(<[bool]>::to_vec).collect()
    }

    fn index(&self, x: Coord, y: Coord) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height)?;

        Some(y * self.width + x)
    }

    fn xy_to(&self, i: usize) -> (Coord, Coord) {
        ((i % self.width) as Coord, (i / self.width) as Coord)
    }
}

/// Validate a matrix and flatten it into `(width, height, cells)`
fn flatten<R: AsRef<[bool]>>(rows: &[R]) -> Result<(usize, usize, Vec<bool>), GridError> {
    let Some(first) = rows.first() else {
        return Err(GridError::ShapeMismatch);
    };

    let width = first.as_ref().len();
    if width == 0 || rows.iter().any(|r| r.as_ref().len() != width) {
        return Err(GridError::ShapeMismatch);
    }

    let cells = rows.iter().flat_map(|r| r.as_ref().iter().copied()).collect();

    Ok((width, rows.len(), cells))
}

/// Plaintext form: one line per row, `O` for alive and `.` for dead.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }

            for &c in row {
                f.write_str(if c { "O" } else { "." })?;
            }
        }

        Ok(())
    }
}

impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<Vec<bool>> = s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| l.chars().map(|c| matches!(c, 'O' | 'o' | '*')).collect())
            .collect();

        Grid::from_rows(&rows)
    }
}
