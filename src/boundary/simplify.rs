//! Boundary-walk polyline simplification.
//!
//! Converts an outer-edge set into an ordered polyline that keeps a vertex
//! only where the boundary changes axis direction; collinear runs are never
//! split.

use std::collections::{HashMap, HashSet};

use bevy::math::Vec2;

use crate::coords::{EdgeKey, PointKey, key_point};

/// Axis step between two adjacent boundary points, normalized to signs.
fn step(from: PointKey, to: PointKey) -> (i64, i64) {
  ((to.0 - from.0).signum(), (to.1 - from.1).signum())
}

/// Walks an edge set into an ordered, turn-only closed polyline.
///
/// The walk starts at the point with the smallest X (ties broken by
/// smallest Y) and repeatedly follows an unvisited edge leaving the current
/// point, consuming each edge in both directions. A point is emitted only
/// when the incoming and outgoing directions differ. The walk ends when no
/// unvisited edge remains at the current point or when it turns at a point
/// that was already emitted.
///
/// For the supported input class (outer boundaries of connected unions of
/// axis-aligned squares) the edges form a simple closed curve, so when
/// several unvisited edges leave a point any of them is valid; the smallest
/// neighbor key is taken for determinism.
pub fn simplify_boundary(edges: &HashSet<EdgeKey>) -> Vec<Vec2> {
  if edges.is_empty() {
    return Vec::new();
  }

  // Undirected adjacency, neighbor lists sorted for a deterministic walk.
  let mut adjacency: HashMap<PointKey, Vec<PointKey>> = HashMap::new();
  for &(a, b) in edges {
    adjacency.entry(a).or_default().push(b);
    adjacency.entry(b).or_default().push(a);
  }
  for neighbors in adjacency.values_mut() {
    neighbors.sort_unstable();
  }

  // PointKey tuples order by X first, then Y.
  let Some(&start) = adjacency.keys().min() else {
    return Vec::new();
  };

  let mut visited: HashSet<(PointKey, PointKey)> = HashSet::new();
  let mut emitted: HashSet<PointKey> = HashSet::new();
  let mut polyline: Vec<PointKey> = Vec::new();

  let mut current = start;
  let mut incoming: Option<(i64, i64)> = None;

  loop {
    let next = adjacency
      .get(&current)
      .and_then(|neighbors| {
        neighbors
          .iter()
          .find(|&&n| !visited.contains(&(current, n)))
      })
      .copied();

    let Some(next) = next else {
      break;
    };

    let outgoing = step(current, next);
    match incoming {
      None => {
        polyline.push(current);
        emitted.insert(current);
      }
      Some(direction) if direction != outgoing => {
        if emitted.contains(&current) {
          // Closed loop: the walk came back around to a known corner.
          break;
        }
        polyline.push(current);
        emitted.insert(current);
      }
      // Straight run: skip the midpoint.
      Some(_) => {}
    }

    visited.insert((current, next));
    visited.insert((next, current));
    current = next;
    incoming = Some(outgoing);
  }

  polyline.into_iter().map(key_point).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::boundary::extract_boundary_edges;
  use crate::chunk::{TileQuad, tile_quad};
  use crate::coords::{CellPos, edge_key};

  fn boundary_of(cells: &[(i64, i64)]) -> Vec<Vec2> {
    let quads: Vec<TileQuad> = cells
      .iter()
      .map(|&(x, y)| tile_quad(CellPos::new(x, y), 1.0))
      .collect();
    simplify_boundary(&extract_boundary_edges(&quads, 1.0))
  }

  /// Rebuilds an edge set from a closed polyline's consecutive segments.
  fn edges_of_polyline(points: &[Vec2]) -> HashSet<EdgeKey> {
    (0..points.len())
      .map(|i| edge_key(points[i], points[(i + 1) % points.len()]))
      .collect()
  }

  #[test]
  fn test_empty_edge_set_yields_empty_polyline() {
    assert!(simplify_boundary(&HashSet::new()).is_empty());
  }

  #[test]
  fn test_single_tile_yields_four_corners() {
    let polyline = boundary_of(&[(0, 0)]);
    assert_eq!(polyline.len(), 4);
    assert_eq!(polyline[0], Vec2::new(0.0, 0.0), "walk starts at min corner");
  }

  #[test]
  fn test_rectangle_skips_collinear_midpoints() {
    // A 3x1 strip has midpoints on its long sides that must not be emitted.
    let polyline = boundary_of(&[(0, 0), (1, 0), (2, 0)]);
    assert_eq!(polyline.len(), 4, "only the rectangle corners survive");
    assert!(polyline.contains(&Vec2::new(3.0, 1.0)));
    assert!(!polyline.contains(&Vec2::new(1.0, 0.0)));
  }

  #[test]
  fn test_l_shape_emits_six_corners() {
    let polyline = boundary_of(&[(0, 0), (1, 0), (0, 1)]);
    assert_eq!(polyline.len(), 6, "rectilinear L has 5 convex + 1 concave");
    assert!(polyline.contains(&Vec2::new(1.0, 1.0)), "concave corner kept");
  }

  #[test]
  fn test_plus_shape_emits_twelve_corners() {
    let polyline = boundary_of(&[(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)]);
    assert_eq!(polyline.len(), 12);
  }

  #[test]
  fn test_simplifier_is_idempotent_on_its_own_output() {
    let first = boundary_of(&[(0, 0), (1, 0), (0, 1)]);
    let second = simplify_boundary(&edges_of_polyline(&first));
    assert_eq!(first, second);
  }

  #[test]
  fn test_walk_consumes_every_edge_once() {
    // For a simple closed curve the emitted corners, taken in order and
    // closed, must cover the same point set as the edge endpoints.
    let quads: Vec<TileQuad> = [(0i64, 0i64), (1, 0), (1, 1)]
      .iter()
      .map(|&(x, y)| tile_quad(CellPos::new(x, y), 1.0))
      .collect();
    let edges = extract_boundary_edges(&quads, 1.0);
    let polyline = simplify_boundary(&edges);

    let rebuilt = edges_of_polyline(&polyline);
    let corners: HashSet<_> = rebuilt.iter().flat_map(|&(a, b)| [a, b]).collect();
    for &(a, b) in &edges {
      assert!(
        corners.contains(&a) || corners.contains(&b),
        "edge {:?}-{:?} not covered by walk output",
        a,
        b
      );
    }
  }
}
