use crate::types::Coord;

pub const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
pub const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
pub const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
/// One direction per line axis: horizontal, vertical, diagonal, anti-diagonal.
pub const LINE_AXES: [(i8, i8); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Fixed-size square board stored row-major in a flat vector.
///
/// Dimensions never change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    size: u8,
    cells: Vec<T>,
}

impl<T: Copy + PartialEq> Grid<T> {
    pub fn new(size: u8, fill: T) -> Self {
        Self {
            size,
            cells: vec![fill; size as usize * size as usize],
        }
    }

    /// Rebuilds a grid from row-major cells. `None` when the length does not
    /// match `size * size`.
    pub fn from_cells(size: u8, cells: Vec<T>) -> Option<Self> {
        if cells.len() != size as usize * size as usize {
            return None;
        }
        Some(Self { size, cells })
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.is_valid(self.size)
    }

    pub fn get(&self, coord: Coord) -> Option<T> {
        if !self.contains(coord) {
            return None;
        }
        Some(self.cells[coord.index(self.size)])
    }

    /// Writes `value` at `coord`. Returns `false` (and writes nothing) when
    /// the coordinate is off the board.
    pub fn set(&mut self, coord: Coord, value: T) -> bool {
        if !self.contains(coord) {
            return false;
        }
        let idx = coord.index(self.size);
        self.cells[idx] = value;
        true
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Every coordinate in row-major scan order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<T> {
        let size = self.size;
        (0..size as usize * size as usize).map(move |idx| Coord::from_index(idx, size))
    }

    pub fn count(&self, value: T) -> usize {
        self.cells.iter().filter(|&&cell| cell == value).count()
    }

    /// Up, down, left, right neighbours that exist on the board.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + use<T> {
        let size = self.size;
        ORTHOGONAL
            .into_iter()
            .filter_map(move |(dr, dc)| coord.offset(dr, dc, size))
    }

    /// Number of consecutive `value` cells starting one step from `from`
    /// in direction `(dr, dc)`, plus the cell that stopped the run
    /// (`None` when the run reached the edge).
    pub fn run_length(&self, from: Coord, (dr, dc): (i8, i8), value: T) -> (usize, Option<T>) {
        let mut count = 0;
        let mut cursor = from.offset(dr, dc, self.size);
        while let Some(coord) = cursor {
            let cell = self.cells[coord.index(self.size)];
            if cell != value {
                return (count, Some(cell));
            }
            count += 1;
            cursor = coord.offset(dr, dc, self.size);
        }
        (count, None)
    }
}
