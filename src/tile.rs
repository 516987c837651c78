//! Tile records.

use bevy::prelude::Entity;

use crate::arena::ChunkId;
use crate::coords::TileAnchor;

/// A single painted tile cell.
///
/// The record ties together the three things that can exist at one anchor:
/// a visual occupant (owned by the scene, never by this crate), the variant
/// index selecting which sub-image of the tileset is displayed, and the
/// chunk membership when the cell is collidable.
#[derive(Clone, Debug)]
pub struct Tile {
  /// The rounded world-space grid position identifying this cell.
  pub anchor: TileAnchor,
  /// Externally-owned renderable placed at this cell, if any.
  pub visual: Option<Entity>,
  /// Which sub-image of the tileset this tile displays.
  pub variant: u32,
  /// Weak back-reference to the owning chunk, if the cell is collidable.
  pub chunk: Option<ChunkId>,
}

impl Tile {
  /// Creates an empty record at the given anchor.
  pub fn new(anchor: TileAnchor) -> Self {
    Self {
      anchor,
      visual: None,
      variant: 0,
      chunk: None,
    }
  }

  /// Returns true once the record holds nothing worth keeping.
  ///
  /// The registry drops orphaned records; a tile lives only while it has a
  /// visual occupant or a chunk membership.
  pub fn is_orphaned(&self) -> bool {
    self.visual.is_none() && self.chunk.is_none()
  }
}
