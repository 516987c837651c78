//! Chunk state and derived boundary geometry.

use std::collections::{HashMap, HashSet};

use bevy::math::Vec2;
use bevy::prelude::Entity;

use crate::boundary::{extract_boundary_edges, simplify_boundary};
use crate::coords::{CellPos, EdgeKey, cell_anchor};

/// World-space corner quad of one tile, computed once at insertion and
/// translated together on move.
pub type TileQuad = [Vec2; 4];

/// Builds the corner quad for a cell.
pub fn tile_quad(cell: CellPos, tile_size: f32) -> TileQuad {
  let origin = cell_anchor(cell, tile_size);
  [
    origin,
    origin + Vec2::new(tile_size, 0.0),
    origin + Vec2::new(tile_size, tile_size),
    origin + Vec2::new(0.0, tile_size),
  ]
}

/// A maximal connected group of collidable tiles sharing one simplified
/// boundary polygon.
///
/// The tile set is always 4-connected when a mutation completes; the
/// coordinator refuses edits that would violate that instead of repairing
/// it. Edge set, boundary and pivot are derived state, fully recomputed by
/// [`Chunk::recompute`] after every structural change.
pub struct Chunk {
  layer: i32,
  tile_size: f32,
  quads: HashMap<CellPos, TileQuad>,
  edges: HashSet<EdgeKey>,
  boundary: Vec<Vec2>,
  pivot: Vec2,
  active: bool,
  anchor: Option<Entity>,
  generation: u64,
}

impl Chunk {
  /// Creates an empty chunk for a layer.
  pub fn new(layer: i32, tile_size: f32) -> Self {
    Self {
      layer,
      tile_size,
      quads: HashMap::new(),
      edges: HashSet::new(),
      boundary: Vec::new(),
      pivot: Vec2::ZERO,
      active: true,
      anchor: None,
      generation: 0,
    }
  }

  /// The depth layer this chunk belongs to.
  pub fn layer(&self) -> i32 {
    self.layer
  }

  /// Tile edge length in world units.
  pub fn tile_size(&self) -> f32 {
    self.tile_size
  }

  /// Number of member tiles.
  pub fn tile_count(&self) -> usize {
    self.quads.len()
  }

  /// Returns true if the cell is a member of this chunk.
  pub fn contains_cell(&self, cell: CellPos) -> bool {
    self.quads.contains_key(&cell)
  }

  /// Iterates over member cells in unspecified order.
  pub fn cells(&self) -> impl Iterator<Item = CellPos> + '_ {
    self.quads.keys().copied()
  }

  /// The member tile set with per-tile corner quads.
  pub fn quads(&self) -> &HashMap<CellPos, TileQuad> {
    &self.quads
  }

  /// The derived outer-boundary edge set.
  pub fn edges(&self) -> &HashSet<EdgeKey> {
    &self.edges
  }

  /// The simplified boundary polyline (ordered, implicitly closed).
  pub fn boundary(&self) -> &[Vec2] {
    &self.boundary
  }

  /// Centroid of the member tile anchors, the chunk's transform origin.
  pub fn pivot(&self) -> Vec2 {
    self.pivot
  }

  /// Whether this chunk is a real collider or a collisionless tile group.
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Sets the collider flag.
  pub fn set_active(&mut self, active: bool) {
    self.active = active;
  }

  /// The ECS anchor entity member visuals are parented under, once spawned.
  pub fn anchor(&self) -> Option<Entity> {
    self.anchor
  }

  /// Records the spawned anchor entity.
  pub fn set_anchor(&mut self, anchor: Option<Entity>) {
    self.anchor = anchor;
  }

  /// Derived-state generation, bumped by every recompute.
  ///
  /// Consumers that mirror this chunk (physics colliders, gizmo caches)
  /// compare generations to detect staleness.
  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// Inserts a tile at the cell. No-op if already a member.
  pub fn insert_tile(&mut self, cell: CellPos) {
    self
      .quads
      .entry(cell)
      .or_insert_with(|| tile_quad(cell, self.tile_size));
  }

  /// Removes a tile. No-op if the cell is not a member.
  pub fn remove_tile(&mut self, cell: CellPos) {
    self.quads.remove(&cell);
  }

  /// Rigidly translates every member by a whole-cell delta.
  ///
  /// Quads are translated rather than rebuilt so the corner points carry
  /// exactly the same delta the registry keys do.
  pub fn translate(&mut self, dx: i64, dy: i64) {
    let delta = Vec2::new(dx as f32 * self.tile_size, dy as f32 * self.tile_size);
    let quads = std::mem::take(&mut self.quads);
    self.quads = quads
      .into_iter()
      .map(|(cell, quad)| (cell.offset(dx, dy), quad.map(|p| p + delta)))
      .collect();
  }

  /// Recomputes edge set, simplified boundary and pivot from the quads.
  pub fn recompute(&mut self) {
    self.edges = extract_boundary_edges(self.quads.values(), self.tile_size);
    self.boundary = simplify_boundary(&self.edges);
    self.pivot = self.centroid();
    self.generation = self.generation.wrapping_add(1);
  }

  fn centroid(&self) -> Vec2 {
    if self.quads.is_empty() {
      return Vec2::ZERO;
    }
    let sum: Vec2 = self
      .quads
      .keys()
      .map(|&cell| cell_anchor(cell, self.tile_size))
      .sum();
    sum / self.quads.len() as f32
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn chunk_with(cells: &[(i64, i64)]) -> Chunk {
    let mut chunk = Chunk::new(0, 1.0);
    for &(x, y) in cells {
      chunk.insert_tile(CellPos::new(x, y));
    }
    chunk.recompute();
    chunk
  }

  #[test]
  fn test_recompute_derives_boundary_and_pivot() {
    let chunk = chunk_with(&[(0, 0), (1, 0)]);
    assert_eq!(chunk.edges().len(), 6);
    assert_eq!(chunk.boundary().len(), 4);
    assert_eq!(chunk.pivot(), Vec2::new(0.5, 0.0));
  }

  #[test]
  fn test_insert_is_idempotent() {
    let mut chunk = chunk_with(&[(0, 0)]);
    chunk.insert_tile(CellPos::new(0, 0));
    assert_eq!(chunk.tile_count(), 1);
  }

  #[test]
  fn test_translate_moves_cells_and_quads_together() {
    let mut chunk = chunk_with(&[(0, 0), (1, 0)]);
    chunk.translate(2, 1);
    chunk.recompute();

    assert!(chunk.contains_cell(CellPos::new(2, 1)));
    assert!(chunk.contains_cell(CellPos::new(3, 1)));
    assert!(!chunk.contains_cell(CellPos::new(0, 0)));
    // Quad corners carried the same delta as the keys.
    let quad = chunk.quads()[&CellPos::new(2, 1)];
    assert_eq!(quad[0], Vec2::new(2.0, 1.0));
    assert_eq!(chunk.pivot(), Vec2::new(2.5, 1.0));
  }

  #[test]
  fn test_generation_bumps_on_recompute() {
    let mut chunk = chunk_with(&[(0, 0)]);
    let before = chunk.generation();
    chunk.recompute();
    assert_eq!(chunk.generation(), before + 1);
  }

  #[test]
  fn test_empty_chunk_has_empty_boundary() {
    let chunk = chunk_with(&[]);
    assert!(chunk.edges().is_empty());
    assert!(chunk.boundary().is_empty());
  }
}
