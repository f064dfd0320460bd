use itertools::iproduct;
use na::Vector2;
use smallvec::SmallVec;

use crate::membrane::particles::Particles;
use crate::{Scalar, Vec3};

/// A 2d coordinate in the offset ("brick") index square. Signed so that neighbor offsets can
/// step off the edge of the grid.
pub type Coord = Vector2<isize>;

/// Neighbors of a cell on an even row.
const NEIGHBORS_EVEN: [(isize, isize); 6] = [(1, 0), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1)];
/// Neighbors of a cell on an odd row. Odd rows are shifted right by half a cell.
const NEIGHBORS_ODD: [(isize, isize); 6] = [(1, 0), (1, 1), (0, 1), (-1, 0), (0, -1), (1, -1)];

/// Maps grid coordinates to particle indices. Only cells inside the hex clip hold an index.
#[derive(Debug, Clone, Default)]
pub struct HexGrid {
    cells: Vec<Option<usize>>,
    size: usize,
}

impl HexGrid {
    pub fn new(size: usize) -> Self {
        HexGrid {
            cells: vec![None; size * size],
            size,
        }
    }

    /// Side length of the index square.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells that hold a particle.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    fn coord_to_index(&self, c: Coord) -> Option<usize> {
        if c.x < 0 || c.y < 0 || c.x as usize >= self.size || c.y as usize >= self.size {
            return None;
        }
        Some(c.x as usize + self.size * c.y as usize)
    }

    /// The particle stored at `c`, if `c` is inside the grid and passed the hex clip.
    pub fn get(&self, c: Coord) -> Option<usize> {
        self.coord_to_index(c).and_then(|i| self.cells[i])
    }

    fn insert(&mut self, c: Coord, particle: usize) {
        if let Some(i) = self.coord_to_index(c) {
            self.cells[i] = Some(particle);
        }
    }

    /// Every occupied cell with its particle, in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Coord, usize)> + '_ {
        let size = self.size as isize;
        iproduct!(0..size, 0..size)
            .map(|(y, x)| Coord::new(x, y))
            .filter_map(move |c| self.get(c).map(|p| (c, p)))
    }

    /// The particles adjacent to `c` on the hex lattice. Which offsets apply depends on the row
    /// parity, since the storage is an offset layout rather than true axial coordinates.
    pub fn neighbors(&self, c: Coord) -> SmallVec<[usize; 6]> {
        let offsets = if c.y.rem_euclid(2) == 0 {
            &NEIGHBORS_EVEN
        } else {
            &NEIGHBORS_ODD
        };

        offsets
            .iter()
            .filter_map(|&(dx, dy)| self.get(c + Coord::new(dx, dy)))
            .collect()
    }
}

/// Cube-coordinate distance of grid cell `c` from the center of a `grid_size` square.
pub fn hex_distance(c: Coord, grid_size: usize) -> isize {
    let center = (grid_size / 2) as isize;
    let col = c.x - center;
    let row = c.y - center;

    let q = col - row.div_euclid(2);
    let r = row;
    let s = -q - r;

    q.abs().max(r.abs()).max(s.abs())
}

/// Radius of the hexagon that the square grid is clipped to. Negative for grids too small to
/// hold a single cell.
pub fn hex_radius(grid_size: usize) -> isize {
    (grid_size / 2) as isize - 1
}

/// World-space position of cell `c` in the offset layout, centered on the origin at z = 0.
pub fn cell_position(c: Coord, grid_size: usize, spacing: Scalar) -> Vec3 {
    let row_height = spacing * (3. as Scalar).sqrt() / 2.;
    let offset_x = if c.y.rem_euclid(2) == 0 {
        0.
    } else {
        spacing / 2.
    };

    let n = grid_size as Scalar;
    Vec3::new(
        c.x as Scalar * spacing + offset_x - n * spacing / 2.,
        c.y as Scalar * row_height - n * row_height / 2.,
        0.,
    )
}

/// Lays out particles over the hex-clipped grid. Boundary cells of the hexagon are fixed.
/// Particle indices follow row-major creation order.
pub fn build_grid(grid_size: usize, spacing: Scalar) -> (HexGrid, Particles) {
    let mut grid = HexGrid::new(grid_size);
    let mut particles = Particles::default();
    let radius = hex_radius(grid_size);
    let size = grid_size as isize;

    for (y, x) in iproduct!(0..size, 0..size) {
        let c = Coord::new(x, y);
        let distance = hex_distance(c, grid_size);
        if distance > radius {
            continue;
        }

        let index = particles.add_particle(cell_position(c, grid_size, spacing), distance == radius);
        grid.insert(c, index);
    }

    (grid, particles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn small_hexagon() {
        let (grid, particles) = build_grid(4, 1.5);

        assert_eq!(particles.len(), 7);
        assert_eq!(grid.len(), 7);
        assert_eq!(particles.fixed.iter().filter(|&&f| f).count(), 6);

        // The center cell is the only interior one.
        let center = grid.get(Coord::new(2, 2)).unwrap();
        assert!(!particles.fixed[center]);
        assert_eq!(particles.position[center], Vec3::zeros());
        assert_eq!(grid.neighbors(Coord::new(2, 2)).len(), 6);
    }

    #[test]
    fn degenerate_sizes_are_empty() {
        for size in 0..2 {
            let (grid, particles) = build_grid(size, 1.5);
            assert!(grid.is_empty());
            assert_eq!(particles.len(), 0);
        }
    }

    #[test]
    fn neighbors_off_the_grid() {
        let (grid, _) = build_grid(4, 1.);
        assert!(grid.get(Coord::new(-1, 0)).is_none());
        assert!(grid.get(Coord::new(0, 4)).is_none());
        assert!(grid.neighbors(Coord::new(-3, -3)).is_empty());
    }

    #[test]
    fn odd_rows_are_shifted() {
        let even = cell_position(Coord::new(3, 2), 10, 2.);
        let odd = cell_position(Coord::new(3, 3), 10, 2.);
        assert!((odd.x - even.x - 1.).abs() < 1e-12);
        assert!((odd.y - even.y - 3f64.sqrt()).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn topology_matches_particles(size in 0usize..40, spacing in 0.1f64..5.) {
            let (grid, particles) = build_grid(size, spacing);
            prop_assert_eq!(grid.len(), particles.len());

            // Indices are dense and assigned in creation order.
            let indices: Vec<usize> = grid.occupied().map(|(_, p)| p).collect();
            prop_assert_eq!(indices, (0..particles.len()).collect::<Vec<_>>());
        }

        #[test]
        fn fixed_particles_sit_on_the_hex_boundary(size in 0usize..40) {
            let (grid, particles) = build_grid(size, 1.);
            let radius = hex_radius(size);

            let boundary = grid
                .occupied()
                .filter(|&(c, _)| hex_distance(c, size) == radius)
                .count();
            prop_assert_eq!(particles.fixed.iter().filter(|&&f| f).count(), boundary);

            for (c, p) in grid.occupied() {
                prop_assert!(hex_distance(c, size) <= radius);
                prop_assert_eq!(particles.fixed[p], hex_distance(c, size) == radius);
            }
        }
    }
}
