//! Coordinate types and spatial keys.
//!
//! Defines the coordinate system for tile collision chunking:
//! - [`CellPos`]: Tile-grid cell within one layer (i64 for unbounded maps)
//! - [`TileAnchor`]: Cell plus discrete depth layer, the registry key
//! - [`PointKey`] / [`EdgeKey`]: Quantized boundary-point and edge hash keys

use bevy::math::{Vec2, Vec3};

/// Sub-cell resolution for boundary point keys (two decimal places).
///
/// Quad corners land on multiples of the tile edge length, so any tile edge
/// length of 0.02 world units or more maps distinct corners to distinct keys.
pub const POINT_KEY_SCALE: f32 = 100.0;

/// Position in the tile grid of a single layer.
///
/// World positions quantize to cells by flooring `world / tile_size`, so
/// registry keys are exact integers and cannot drift the way rounded floats
/// can.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPos {
  pub x: i64,
  pub y: i64,
}

impl CellPos {
  /// Creates a new cell position.
  pub const fn new(x: i64, y: i64) -> Self {
    Self { x, y }
  }

  /// Returns the 4-neighborhood of this cell (no diagonals).
  ///
  /// Order is +X, -X, +Y, -Y; merge-target scans rely on it being stable.
  pub const fn neighbors(self) -> [CellPos; 4] {
    [
      CellPos::new(self.x + 1, self.y),
      CellPos::new(self.x - 1, self.y),
      CellPos::new(self.x, self.y + 1),
      CellPos::new(self.x, self.y - 1),
    ]
  }

  /// Returns this cell shifted by a whole-cell delta.
  pub const fn offset(self, dx: i64, dy: i64) -> Self {
    Self::new(self.x + dx, self.y + dy)
  }
}

/// The rounded world-space grid position identifying one tile cell.
///
/// The third component is the discrete depth layer; chunks never span
/// layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileAnchor {
  pub cell: CellPos,
  pub layer: i32,
}

impl TileAnchor {
  /// Creates a new tile anchor.
  pub const fn new(cell: CellPos, layer: i32) -> Self {
    Self { cell, layer }
  }
}

/// Converts a world position to the cell containing it.
pub fn world_to_cell(world: Vec2, tile_size: f32) -> CellPos {
  CellPos::new(
    (world.x / tile_size).floor() as i64,
    (world.y / tile_size).floor() as i64,
  )
}

/// Converts a 3D world position to a tile anchor.
///
/// X/Y quantize to the containing cell; Z rounds to the nearest layer.
pub fn world_to_anchor(world: Vec3, tile_size: f32) -> TileAnchor {
  TileAnchor::new(
    world_to_cell(world.truncate(), tile_size),
    world.z.round() as i32,
  )
}

/// Returns the world position of a cell's anchor (its min corner).
pub fn cell_anchor(cell: CellPos, tile_size: f32) -> Vec2 {
  Vec2::new(cell.x as f32 * tile_size, cell.y as f32 * tile_size)
}

/// A boundary point snapped to the integer key grid.
///
/// Tuple ordering is lexicographic (X first, then Y), which the boundary
/// walk uses to pick its smallest-X start point.
pub type PointKey = (i64, i64);

/// A boundary edge as a canonically ordered pair of point keys.
pub type EdgeKey = (PointKey, PointKey);

/// Snaps a world point to the integer key grid for robust hashing.
///
/// Quad corners arrive with floating noise from repeated translation;
/// multiplying by [`POINT_KEY_SCALE`] and rounding gives exact keys.
pub fn point_key(v: Vec2) -> PointKey {
  (
    (v.x * POINT_KEY_SCALE).round() as i64,
    (v.y * POINT_KEY_SCALE).round() as i64,
  )
}

/// Converts a point key back to its world position.
pub fn key_point(k: PointKey) -> Vec2 {
  Vec2::new(k.0 as f32 / POINT_KEY_SCALE, k.1 as f32 / POINT_KEY_SCALE)
}

/// Builds the canonical edge key for an unordered pair of world points.
pub fn edge_key(a: Vec2, b: Vec2) -> EdgeKey {
  let ka = point_key(a);
  let kb = point_key(b);
  if ka <= kb { (ka, kb) } else { (kb, ka) }
}
