//! Connectivity validation for chunk mutations.

use std::collections::{HashMap, HashSet};

use crate::chunk::TileQuad;
use crate::coords::CellPos;

/// Returns true if a chunk's tiles stay 4-connected without one cell.
///
/// Traversal starts from any member neighbor of the excluded cell and runs
/// an explicit stack-based depth-first search restricted to the remaining
/// members; the excluded cell is never entered. The remainder is connected
/// iff the visited count equals the member count minus one.
///
/// A chunk of one tile (the excluded cell itself) is trivially connected.
pub fn is_connected_excluding(cells: &HashMap<CellPos, TileQuad>, excluded: CellPos) -> bool {
  let remaining = cells.len().saturating_sub(usize::from(cells.contains_key(&excluded)));
  if remaining == 0 {
    return true;
  }

  let start = excluded
    .neighbors()
    .into_iter()
    .find(|n| cells.contains_key(n))
    .or_else(|| cells.keys().find(|&&c| c != excluded).copied());
  let Some(start) = start else {
    return true;
  };

  // Iterative DFS; recursion depth would scale with chunk tile count.
  let mut visited: HashSet<CellPos> = HashSet::with_capacity(remaining);
  let mut stack = vec![start];
  visited.insert(start);

  while let Some(cell) = stack.pop() {
    for neighbor in cell.neighbors() {
      if neighbor == excluded
        || visited.contains(&neighbor)
        || !cells.contains_key(&neighbor)
      {
        continue;
      }
      visited.insert(neighbor);
      stack.push(neighbor);
    }
  }

  visited.len() == remaining
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::chunk::tile_quad;

  fn cells(positions: &[(i64, i64)]) -> HashMap<CellPos, TileQuad> {
    positions
      .iter()
      .map(|&(x, y)| {
        let cell = CellPos::new(x, y);
        (cell, tile_quad(cell, 1.0))
      })
      .collect()
  }

  #[test]
  fn test_single_tile_chunk_is_trivially_connected() {
    let tiles = cells(&[(0, 0)]);
    assert!(is_connected_excluding(&tiles, CellPos::new(0, 0)));
  }

  #[test]
  fn test_plus_center_removal_disconnects() {
    let tiles = cells(&[(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)]);
    assert!(!is_connected_excluding(&tiles, CellPos::new(0, 0)));
  }

  #[test]
  fn test_plus_arm_removal_stays_connected() {
    let tiles = cells(&[(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)]);
    for arm in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
      assert!(
        is_connected_excluding(&tiles, CellPos::new(arm.0, arm.1)),
        "removing arm {:?} must keep the plus connected",
        arm
      );
    }
  }

  #[test]
  fn test_strip_end_removal_stays_connected() {
    let tiles = cells(&[(0, 0), (1, 0), (2, 0)]);
    assert!(is_connected_excluding(&tiles, CellPos::new(2, 0)));
  }

  #[test]
  fn test_strip_middle_removal_disconnects() {
    let tiles = cells(&[(0, 0), (1, 0), (2, 0)]);
    assert!(!is_connected_excluding(&tiles, CellPos::new(1, 0)));
  }

  #[test]
  fn test_large_snake_does_not_overflow() {
    // A long serpentine chunk; the explicit stack keeps this cheap.
    let mut positions = Vec::new();
    for row in 0..200i64 {
      for col in 0..50i64 {
        positions.push((col, row * 2));
      }
      let join = if row % 2 == 0 { 49 } else { 0 };
      positions.push((join, row * 2 + 1));
    }
    let tiles = cells(&positions);
    // Removing the dangling tail cell keeps ~10k tiles reachable.
    assert!(is_connected_excluding(&tiles, CellPos::new(0, 399)));
  }
}
