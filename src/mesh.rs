//! Triangulation of the membrane and the per-vertex data handed to the renderer.

use itertools::iproduct;
use serde::{Deserialize, Serialize};

use crate::grid::{Coord, HexGrid};
use crate::{Scalar, Vec3};

/// Three particle indices.
pub type Triangle = [usize; 3];

/// Splits every complete 2x2 block of the grid into two triangles. The split alternates with
/// row parity to follow the offset layout. Blocks with a corner outside the hex are skipped.
pub fn triangulate(grid: &HexGrid) -> Vec<Triangle> {
    let size = grid.size() as isize;
    let mut triangles = Vec::new();

    for (y, x) in iproduct!(0..size - 1, 0..size - 1) {
        let corners = (
            grid.get(Coord::new(x, y)),
            grid.get(Coord::new(x + 1, y)),
            grid.get(Coord::new(x, y + 1)),
            grid.get(Coord::new(x + 1, y + 1)),
        );

        if let (Some(a), Some(b), Some(c), Some(d)) = corners {
            if y % 2 == 0 {
                triangles.push([a, b, c]);
                triangles.push([b, d, c]);
            } else {
                triangles.push([a, d, c]);
                triangles.push([a, b, d]);
            }
        }
    }

    triangles
}

/// Area-weighted vertex normals. Vertices not touched by any triangle get +z.
pub fn vertex_normals(positions: &[Vec3], triangles: &[Triangle]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::zeros(); positions.len()];

    for &[a, b, c] in triangles {
        // Not normalized, so larger triangles weigh more.
        let face = (positions[b] - positions[a]).cross(&(positions[c] - positions[a]));
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    for n in normals.iter_mut() {
        *n = n.try_normalize(Scalar::EPSILON).unwrap_or_else(Vec3::z);
    }

    normals
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// Builds renderer vertices. Sunken vertices fade from light blue to dark blue.
pub fn vertices(positions: &[Vec3], triangles: &[Triangle]) -> Vec<Vertex> {
    let normals = vertex_normals(positions, triangles);

    positions
        .iter()
        .zip(&normals)
        .map(|(p, n)| {
            let depth = (-p.z).max(0.) as f32;
            let shade = 1. / (1. + 0.1 * depth);
            let p = p.cast::<f32>();
            let n = n.cast::<f32>();

            Vertex {
                position: [p.x, p.y, p.z],
                normal: [n.x, n.y, n.z],
                color: [0.53 * shade, 0.8 * shade, 0.93],
            }
        })
        .collect()
}
