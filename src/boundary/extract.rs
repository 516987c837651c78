//! Outer-edge extraction by symmetric difference.

use std::collections::HashSet;

use crate::chunk::TileQuad;
use crate::coords::{EdgeKey, edge_key};

/// Relative tolerance for matching a corner pair to the tile edge length.
///
/// Scaled by the tile size before use, so it only has to separate edges
/// (distance `s`) from diagonals (distance `s * sqrt(2)`); any value well
/// below 0.4 works, and 1e-4 leaves room for accumulated translation noise.
pub const EDGE_EPSILON: f32 = 1e-4;

/// Extracts the outer boundary edge set of a set of tile quads.
///
/// Every unordered pair of corners from the same quad whose distance equals
/// the tile edge length (within epsilon, excluding diagonals) forms an
/// edge. Edges accumulate with toggle semantics: inserting a present edge
/// removes it instead. Interior edges are contributed once by each of the
/// two tiles sharing them and cancel; true boundary edges survive.
///
/// O(tiles * 16) per call; the coordinator only runs it on structural
/// edits, never per frame.
pub fn extract_boundary_edges<'a>(
  quads: impl IntoIterator<Item = &'a TileQuad>,
  tile_size: f32,
) -> HashSet<EdgeKey> {
  let epsilon = EDGE_EPSILON * tile_size;
  let mut edges = HashSet::new();

  for quad in quads {
    for i in 0..4 {
      for j in (i + 1)..4 {
        let a = quad[i];
        let b = quad[j];
        if ((a - b).length() - tile_size).abs() > epsilon {
          continue;
        }
        let key = edge_key(a, b);
        if !edges.remove(&key) {
          edges.insert(key);
        }
      }
    }
  }

  edges
}

#[cfg(test)]
mod tests {
  use bevy::math::Vec2;

  use super::*;
  use crate::chunk::tile_quad;
  use crate::coords::CellPos;

  fn quads(cells: &[(i64, i64)]) -> Vec<TileQuad> {
    cells
      .iter()
      .map(|&(x, y)| tile_quad(CellPos::new(x, y), 1.0))
      .collect()
  }

  #[test]
  fn test_no_tiles_yields_empty_set() {
    let edges = extract_boundary_edges(&[], 1.0);
    assert!(edges.is_empty());
  }

  #[test]
  fn test_single_tile_has_four_edges() {
    let q = quads(&[(0, 0)]);
    assert_eq!(extract_boundary_edges(&q, 1.0).len(), 4);
  }

  #[test]
  fn test_two_by_one_rectangle_has_six_edges() {
    // The shared interior edge is toggled twice and cancels: 8 - 2 = 6.
    let q = quads(&[(0, 0), (1, 0)]);
    assert_eq!(extract_boundary_edges(&q, 1.0).len(), 6);
  }

  #[test]
  fn test_two_by_two_square_has_eight_edges() {
    let q = quads(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
    assert_eq!(extract_boundary_edges(&q, 1.0).len(), 8);
  }

  #[test]
  fn test_plus_shape_has_twelve_edges() {
    let q = quads(&[(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)]);
    assert_eq!(extract_boundary_edges(&q, 1.0).len(), 12);
  }

  #[test]
  fn test_diagonal_corner_pairs_are_excluded() {
    let q = quads(&[(0, 0)]);
    let edges = extract_boundary_edges(&q, 1.0);
    let diagonal = edge_key(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
    assert!(!edges.contains(&diagonal));
  }

  #[test]
  fn test_non_unit_tile_size() {
    let q = vec![
      tile_quad(CellPos::new(0, 0), 2.5),
      tile_quad(CellPos::new(1, 0), 2.5),
    ];
    assert_eq!(extract_boundary_edges(&q, 2.5).len(), 6);
  }
}
