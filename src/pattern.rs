//! Named seed patterns.
//!
//! Every pattern is stored as a list of live-cell offsets relative to its top-left corner.
//! Larger shapes are authored in the plaintext `.cells` style and converted when the
//! registry is first touched.
//!
//! See: https://conwaylife.com/wiki/Plaintext

use std::sync::LazyLock;

use crate::Coord;
use crate::aabb::Aabb;
use crate::grid::Grid;

/// Offset of a live cell from a pattern's stamp origin
pub type Offset = (Coord, Coord);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    name: &'static str,
    offsets: Vec<Offset>,
}

impl Pattern {
    pub fn new(name: &'static str, offsets: &[Offset]) -> Self {
        Self {
            name,
            offsets: offsets.to_vec(),
        }
    }

    /// Convert a dense row-major matrix, where `true` marks a live cell.
    pub fn from_matrix<R: AsRef<[bool]>>(name: &'static str, rows: &[R]) -> Self {
        let offsets = rows
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.as_ref()
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| **c)
                    .map(move |(x, _)| (x as Coord, y as Coord))
            })
            .collect();

        Self { name, offsets }
    }

    /// Convert plaintext art. `O` and `*` are alive, anything else is dead, and lines
    /// starting with `!` are comments.
    pub fn from_plaintext(name: &'static str, text: &str) -> Self {
        let rows: Vec<Vec<bool>> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('!'))
            .map(|l| l.chars().map(|c| matches!(c, 'O' | '*')).collect())
            .collect();

        Self::from_matrix(name, &rows)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    /// Bounding box of the pattern's live cells
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.offsets.iter().copied())
    }

    /// Bring the pattern's cells to life on `grid`, with its origin placed at `(x, y)`.
    ///
    /// Cells that fall off the grid are skipped. Nothing is ever killed, and the generation
    /// is left alone.
    pub fn stamp(&self, grid: &mut Grid, x: Coord, y: Coord) {
        for &(dx, dy) in &self.offsets {
            grid.set_alive(x.saturating_add(dx), y.saturating_add(dy));
        }
    }
}

static REGISTRY: LazyLock<Vec<Pattern>> = LazyLock::new(build_registry);

/// Every known pattern, in catalog order
pub fn patterns() -> &'static [Pattern] {
    &REGISTRY
}

pub fn get(index: usize) -> Option<&'static Pattern> {
    REGISTRY.get(index)
}

/// Look up a pattern by name, ignoring ASCII case
pub fn find(name: &str) -> Option<&'static Pattern> {
    REGISTRY.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

fn build_registry() -> Vec<Pattern> {
    vec![
        Pattern::new("Glider", &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]),
        Pattern::new("Blinker", &[(0, 1), (1, 1), (2, 1)]),
        Pattern::from_plaintext(
            "Pulsar",
            "
            ..OOO...OOO..
            .............
            O....O.O....O
            O....O.O....O
            O....O.O....O
            ..OOO...OOO..
            .............
            ..OOO...OOO..
            O....O.O....O
            O....O.O....O
            O....O.O....O
            .............
            ..OOO...OOO..
            ",
        ),
        Pattern::new(
            "Toad",
            &[(1, 1), (2, 1), (3, 1), (2, 2), (3, 2), (4, 2)],
        ),
        Pattern::new(
            "Beacon",
            &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
        ),
        Pattern::from_plaintext(
            "Icon",
            "
            .OOO.
            O...O
            O.O.O
            O...O
            .OOO.
            ",
        ),
        Pattern::from_plaintext(
            "Gosper Glider Gun",
            "
            ! Emits a glider every 30 generations
            ........................O...........
            ......................O.O...........
            ............OO......OO............OO
            ...........O...O....OO............OO
            OO........O.....O...OO..............
            OO........O...O.OO....O.O...........
            ..........O.....O.......O...........
            ...........O...O....................
            ............OO......................
            ",
        ),
        Pattern::new("Block", &[(0, 0), (1, 0), (0, 1), (1, 1)]),
        Pattern::new(
            "Beehive",
            &[(1, 0), (2, 0), (0, 1), (3, 1), (1, 2), (2, 2)],
        ),
        Pattern::new(
            "Loaf",
            &[(1, 0), (2, 0), (0, 1), (3, 1), (1, 2), (3, 2), (2, 3)],
        ),
        Pattern::new("Boat", &[(0, 0), (1, 0), (0, 1), (2, 1), (1, 2)]),
        Pattern::new("Tub", &[(1, 0), (0, 1), (2, 1), (1, 2)]),
        Pattern::new(
            "LWSS",
            &[(1, 0), (2, 0), (3, 0), (4, 0), (0, 1), (4, 1), (4, 2), (0, 3), (3, 3)],
        ),
        Pattern::from_plaintext(
            "Acorn",
            "
            .O.....
            ...O...
            OO..OOO
            ",
        ),
        Pattern::new("R-pentomino", &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)]),
    ]
}
