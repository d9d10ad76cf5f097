use crate::Coord;
use crate::ScreenSize;
use crate::grid::Grid;

/// Hex values of braille dots
///
/// ```text
///  1   8
///  2  10
///  4  20
/// 40  80
/// ```
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
///
/// To get other configurations, just add the numbers above.
const BRAILLE_EMPTY: u32 = 0x2800;

/// Renders a grid as braille, packing 2x4 cells into each character.
pub struct Camera {
    /// The cell buffer
    cb: Vec<bool>,

    /// The frame buffer.
    fb: String,

    /// Codepoints. This allows us to construct the framebuffer more easily
    cp: Vec<u32>,

    /// Width of the cell buffer
    w: usize,

    /// Height of the cell buffer
    h: usize,

    /// Cell drawn blinking against its current state, if any
    cursor: Option<(Coord, Coord)>,
}

impl Camera {
    /// A camera showing `w` by `h` cells, or `None` if its buffers would overflow.
    pub fn new(w: usize, h: usize) -> Option<Self> {
        let (bw, bh) = (w.div_ceil(2), h.div_ceil(4));
        let cells = w.checked_mul(h)?;
        let chars = bw.checked_mul(bh)?;

        // Each braille character is 3 bytes, and each line ends in a one byte newline.
        let fb = String::with_capacity(chars.checked_mul(3)?.checked_add(bh)?);

        Some(Self {
            cb: vec![false; cells],
            fb,
            cp: vec![BRAILLE_EMPTY; chars],
            w,
            h,
            cursor: None,
        })
    }

    /// The smallest camera that shows all of `grid`
    pub fn fit(grid: &Grid) -> Option<Self> {
        Self::new(grid.width(), grid.height())
    }

    /// Largest number of cells `(w, h)` that fit in a terminal of `cols` by `rows`
    /// characters, keeping `reserved` rows free for status lines.
    pub fn capacity(cols: ScreenSize, rows: ScreenSize, reserved: ScreenSize) -> (usize, usize) {
        let rows = rows.saturating_sub(reserved);

        (cols as usize * 2, rows as usize * 4)
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn set_cursor(&mut self, cursor: Option<(Coord, Coord)>) {
        self.cursor = cursor;
    }

    /// Copy the visible part of `grid` into the cell buffer
    pub fn draw(&mut self, grid: &Grid) {
        for y in 0..self.h {
            for x in 0..self.w {
                let (gx, gy) = (x as Coord, y as Coord);

                let mut on = grid.is_alive(gx, gy);
                if self.cursor == Some((gx, gy)) {
                    on = !on;
                }

                let i = self.xy_from(x, y);
                self.cb[i] = on;
            }
        }
    }

    /// Reset the cell buffer
    pub fn reset(&mut self) {
        self.cb.fill(false);
    }

    /// Turn the cell buffer into braille lines, one per 4 rows of cells.
    pub fn render(&mut self) -> &str {
        let bw = self.w.div_ceil(2);

        // compute new codepoints
        self.cp.fill(BRAILLE_EMPTY);

        for (n, &px) in self.cb.iter().enumerate() {
            if px {
                let (x, y) = self.xy_to(n);
                self.cp[(y / 4) * bw + (x / 2)] += Self::get_hex_value(x, y);
            }
        }

        // update framebuffer
        self.fb.clear();

        for (i, &c) in self.cp.iter().enumerate() {
            if i > 0 && i % bw == 0 {
                self.fb.push('\n');
            }

            self.fb.push(char::from_u32(c).unwrap_or(' '));
        }
        self.fb.push('\n');

        &self.fb
    }

    fn xy_to(&self, n: usize) -> (usize, usize) {
        (n % self.w, n / self.w)
    }

    fn xy_from(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    fn get_hex_value(x: usize, y: usize) -> u32 {
        match (x % 2, y % 4) {
            (0, 0) => 0x1,
            (1, 0) => 0x8,
            (0, 1) => 0x2,
            (1, 1) => 0x10,
            (0, 2) => 0x4,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_block() {
        let grid: Grid = "OO\nOO\nOO\nOO".parse().unwrap();
        let mut cam = Camera::fit(&grid).unwrap();

        cam.draw(&grid);

        assert_eq!(cam.render(), "\u{28FF}\n");
    }

    #[test]
    fn dots_land_in_their_cells() {
        let grid: Grid = "
            O..O
            ....
            ....
            ....
            .O.."
            .parse()
            .unwrap();
        let mut cam = Camera::fit(&grid).unwrap();

        cam.draw(&grid);

        // Top left dot, top right dot of the second character, then the top right dot of a
        // second line.
        assert_eq!(cam.render(), "\u{2801}\u{2808}\n\u{2808}\u{2800}\n");
    }

    #[test]
    fn cursor_inverts_its_cell() {
        let grid: Grid = "O.\n..".parse().unwrap();
        let mut cam = Camera::fit(&grid).unwrap();

        cam.set_cursor(Some((0, 0)));
        cam.draw(&grid);
        assert_eq!(cam.render(), "\u{2800}\n");

        cam.set_cursor(Some((1, 1)));
        cam.draw(&grid);
        assert_eq!(cam.render(), "\u{2811}\n");
    }

    #[test]
    fn overflowing_size_is_refused() {
        assert!(Camera::new(usize::MAX, 2).is_none());
        assert!(Camera::new(0, 0).is_some());
    }

    #[test]
    fn capacity_reserves_status_rows() {
        assert_eq!(Camera::capacity(80, 24, 2), (160, 88));
        assert_eq!(Camera::capacity(80, 1, 2), (160, 0));
    }
}
