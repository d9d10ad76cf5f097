use crate::Coord;

/// Integer Axis-Aligned Bounding Box over cell coordinates. Both corners are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    pub min_x: Coord,
    pub min_y: Coord,
    pub max_x: Coord,
    pub max_y: Coord,
}

impl Aabb {
    /// A box covering the single point `(x, y)`.
    pub const fn point(x: Coord, y: Coord) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Create an AABB from a list of points. Returns `None` if there are no points.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (Coord, Coord)>,
    {
        let mut points = points.into_iter();
        let (x, y) = points.next()?;

        let mut b = Aabb::point(x, y);
        for (x, y) in points {
            b.add(x, y);
        }

        Some(b)
    }

    /// Grow the box so that it contains `(x, y)`.
    pub fn add(&mut self, x: Coord, y: Coord) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> Coord {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> Coord {
        self.max_y - self.min_y + 1
    }

    pub fn contains(&self, x: Coord, y: Coord) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb;

    #[test]
    fn empty_has_no_box() {
        assert_eq!(Aabb::from_points([]), None);
    }

    #[test]
    fn spans_all_points() {
        let b = Aabb::from_points([(4, 1), (1, 4), (2, 2)]).unwrap();

        assert_eq!(
            b,
            Aabb {
                min_x: 1,
                min_y: 1,
                max_x: 4,
                max_y: 4
            }
        );
        assert_eq!((b.width(), b.height()), (4, 4));
        assert!(b.contains(3, 3));
        assert!(!b.contains(0, 3));
    }

    #[test]
    fn single_point() {
        let b = Aabb::point(-2, 7);

        assert_eq!((b.width(), b.height()), (1, 1));
    }
}
