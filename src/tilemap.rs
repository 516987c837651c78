//! The tilemap coordinator.
//!
//! [`Tilemap`] is the only surface editors and persistence talk to. It owns
//! the tile registry and the per-layer chunk lists, routes add/remove/move
//! requests to the right chunk, and keeps the derived boundary geometry
//! current. Structural edits are synchronous and all-or-nothing: a rejected
//! precondition leaves every structure exactly as it was.

use std::collections::HashMap;

use bevy::log::debug;
use bevy::prelude::*;

use crate::arena::{ChunkArena, ChunkId};
use crate::boundary::is_connected_excluding;
use crate::chunk::Chunk;
use crate::coords::{CellPos, TileAnchor, world_to_anchor};
use crate::tile::Tile;

/// Why a structural edit was refused.
///
/// All rejections are local, recoverable conditions; the caller changes the
/// request (different cell, different destination) and re-invokes. Silent
/// no-ops (adding collision where it exists, removing where it doesn't) are
/// not errors and are signaled by `None` returns instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditError {
  /// Removing this tile would split its chunk into disconnected parts.
  WouldFragmentChunk,
  /// A destination cell of the move is occupied by a tile outside the
  /// moved chunk.
  WouldOverlap,
  /// The chunk handle no longer resolves to a live chunk.
  StaleChunk,
}

impl std::fmt::Display for EditError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::WouldFragmentChunk => {
        write!(f, "removal would split the chunk into disconnected parts")
      }
      Self::WouldOverlap => write!(f, "move destination overlaps a foreign tile"),
      Self::StaleChunk => write!(f, "chunk handle is stale"),
    }
  }
}

impl std::error::Error for EditError {}

/// Source image and scale information for a tilemap.
#[derive(Clone, Debug)]
pub struct Tileset {
  /// The tile sheet this map draws its sub-images from.
  pub image: Handle<Image>,
  /// Asset path of the sheet, kept for persistence.
  pub source: String,
  /// Pixel size of one tile within the sheet.
  pub tile_px: UVec2,
  /// How many sheet pixels map to one world unit.
  pub pixels_per_unit: f32,
}

impl Tileset {
  /// Creates a tileset description.
  pub fn new(
    image: Handle<Image>,
    source: impl Into<String>,
    tile_px: UVec2,
    pixels_per_unit: f32,
  ) -> Self {
    Self {
      image,
      source: source.into(),
      tile_px,
      pixels_per_unit,
    }
  }

  /// A tileset with no backing image, for headless tools and tests.
  pub fn untextured(tile_size: f32) -> Self {
    Self {
      image: Handle::default(),
      source: String::new(),
      tile_px: UVec2::ONE,
      pixels_per_unit: 1.0 / tile_size,
    }
  }

  /// Tile edge length in world units.
  pub fn tile_size(&self) -> f32 {
    self.tile_px.x as f32 / self.pixels_per_unit
  }
}

/// Tile registry and chunk coordinator for one map.
///
/// One `Tilemap` exists per map entity; there is no shared or static state,
/// so multiple maps and test fixtures never interfere. Dropping the
/// component drops all chunks and tiles with it.
#[derive(Component)]
pub struct Tilemap {
  tileset: Tileset,
  tiles: HashMap<TileAnchor, Tile>,
  chunks: ChunkArena,
  layers: HashMap<i32, Vec<ChunkId>>,
  /// Chunks whose structure changed since the last ECS sync.
  dirty: Vec<ChunkId>,
  /// Chunks deleted since the last ECS sync, with their anchor entities.
  dead: Vec<(ChunkId, Option<Entity>)>,
}

impl Tilemap {
  /// Creates an empty tilemap over a tileset.
  pub fn new(tileset: Tileset) -> Self {
    Self {
      tileset,
      tiles: HashMap::new(),
      chunks: ChunkArena::new(),
      layers: HashMap::new(),
      dirty: Vec::new(),
      dead: Vec::new(),
    }
  }

  /// The tileset this map draws from.
  pub fn tileset(&self) -> &Tileset {
    &self.tileset
  }

  /// Tile edge length in world units.
  pub fn tile_size(&self) -> f32 {
    self.tileset.tile_size()
  }

  /// Number of tile records across all layers.
  pub fn tile_count(&self) -> usize {
    self.tiles.len()
  }

  /// Number of live chunks across all layers.
  pub fn chunk_count(&self) -> usize {
    self.chunks.len()
  }

  /// Looks up a tile record by anchor.
  pub fn tile(&self, anchor: TileAnchor) -> Option<&Tile> {
    self.tiles.get(&anchor)
  }

  /// Iterates over all tile anchors in unspecified order.
  pub fn tile_anchors(&self) -> impl Iterator<Item = TileAnchor> + '_ {
    self.tiles.keys().copied()
  }

  /// Looks up the tile record containing a world position.
  pub fn tile_at(&self, world_pos: Vec3) -> Option<&Tile> {
    self
      .tiles
      .get(&world_to_anchor(world_pos, self.tileset.tile_size()))
  }

  /// Returns true if the cell at this position belongs to a live chunk.
  pub fn is_collidable(&self, world_pos: Vec3) -> bool {
    self
      .tile_at(world_pos)
      .and_then(|tile| tile.chunk)
      .is_some_and(|id| self.chunks.contains(id))
  }

  /// Resolves a chunk handle.
  pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
    self.chunks.get(id)
  }

  /// Iterates over all live chunks.
  pub fn chunks(&self) -> impl Iterator<Item = (ChunkId, &Chunk)> {
    self.chunks.iter()
  }

  /// The chunk handles on one layer.
  pub fn chunks_on_layer(&self, layer: i32) -> &[ChunkId] {
    self.layers.get(&layer).map_or(&[], Vec::as_slice)
  }

  /// Makes the cell at `world_pos` collidable.
  ///
  /// If a 4-neighbor on the same layer already belongs to a chunk, the
  /// tile joins the first such chunk found (one merge target even when
  /// several neighbor chunks exist); otherwise a new single-tile chunk is
  /// created. Returns `None` without mutating when the cell is already
  /// collidable.
  pub fn add_collision(&mut self, world_pos: Vec3) -> Option<ChunkId> {
    let tile_size = self.tileset.tile_size();
    let anchor = world_to_anchor(world_pos, tile_size);

    if let Some(tile) = self.tiles.get(&anchor) {
      if tile.chunk.is_some_and(|id| self.chunks.contains(id)) {
        return None;
      }
    }

    let id = match self.neighbor_chunk(anchor) {
      Some(id) => {
        if let Some(chunk) = self.chunks.get_mut(id) {
          chunk.insert_tile(anchor.cell);
          chunk.recompute();
        }
        id
      }
      None => {
        let mut chunk = Chunk::new(anchor.layer, tile_size);
        chunk.insert_tile(anchor.cell);
        chunk.recompute();
        let id = self.chunks.insert(chunk);
        self.layers.entry(anchor.layer).or_default().push(id);
        id
      }
    };

    let tile = self
      .tiles
      .entry(anchor)
      .or_insert_with(|| Tile::new(anchor));
    tile.chunk = Some(id);

    self.mark_dirty(id);
    debug!("collision added at {:?}", anchor);
    Some(id)
  }

  /// Makes the cell at `world_pos` non-collidable.
  ///
  /// Returns `Ok(None)` without mutating when the cell was not collidable.
  /// Returns [`EditError::WouldFragmentChunk`] without mutating when the
  /// remaining tiles would no longer be 4-connected; the chunk does not
  /// support splitting. An emptied chunk is deleted, and the returned
  /// handle is then stale.
  pub fn remove_collision(&mut self, world_pos: Vec3) -> Result<Option<ChunkId>, EditError> {
    let tile_size = self.tileset.tile_size();
    let anchor = world_to_anchor(world_pos, tile_size);

    let Some(id) = self.tiles.get(&anchor).and_then(|tile| tile.chunk) else {
      return Ok(None);
    };
    let Some(chunk) = self.chunks.get(id) else {
      return Ok(None);
    };

    let member_neighbors = anchor
      .cell
      .neighbors()
      .iter()
      .filter(|&&n| chunk.contains_cell(n))
      .count();
    if member_neighbors >= 2 && !is_connected_excluding(chunk.quads(), anchor.cell) {
      debug!("removal at {:?} rejected: would fragment chunk", anchor);
      return Err(EditError::WouldFragmentChunk);
    }

    let mut emptied = false;
    if let Some(chunk) = self.chunks.get_mut(id) {
      chunk.remove_tile(anchor.cell);
      if chunk.tile_count() == 0 {
        emptied = true;
      } else {
        chunk.recompute();
      }
    }
    if emptied {
      self.delete_chunk(id);
    } else {
      self.mark_dirty(id);
    }

    if let Some(tile) = self.tiles.get_mut(&anchor) {
      tile.chunk = None;
      if tile.is_orphaned() {
        self.tiles.remove(&anchor);
      }
    }

    debug!("collision removed at {:?}", anchor);
    Ok(Some(id))
  }

  /// Rigidly translates a whole chunk.
  ///
  /// The delta is snapped to whole cells. Rejects with
  /// [`EditError::WouldOverlap`] when any destination cell holds a tile
  /// outside the moved chunk (a foreign chunk member or an uncollided
  /// tile); nothing is mutated on rejection. On success the registry is
  /// re-keyed, quads are translated by exactly the snapped delta, and
  /// boundary, simplification and pivot are recomputed.
  pub fn update_position(&mut self, id: ChunkId, delta: Vec2) -> Result<(), EditError> {
    let tile_size = self.tileset.tile_size();
    let Some(chunk) = self.chunks.get(id) else {
      return Err(EditError::StaleChunk);
    };
    let layer = chunk.layer();
    let dx = (delta.x / tile_size).round() as i64;
    let dy = (delta.y / tile_size).round() as i64;
    if dx == 0 && dy == 0 {
      return Ok(());
    }

    for cell in chunk.cells() {
      let dest = cell.offset(dx, dy);
      if chunk.contains_cell(dest) {
        continue;
      }
      if self.tiles.contains_key(&TileAnchor::new(dest, layer)) {
        debug!("move of chunk {:?} rejected: {:?} occupied", id, dest);
        return Err(EditError::WouldOverlap);
      }
    }

    let old_cells: Vec<CellPos> = chunk.cells().collect();
    let mut records: Vec<Tile> = Vec::with_capacity(old_cells.len());
    for cell in &old_cells {
      if let Some(tile) = self.tiles.remove(&TileAnchor::new(*cell, layer)) {
        records.push(tile);
      }
    }
    for mut tile in records {
      tile.anchor = TileAnchor::new(tile.anchor.cell.offset(dx, dy), layer);
      self.tiles.insert(tile.anchor, tile);
    }
    if let Some(chunk) = self.chunks.get_mut(id) {
      chunk.translate(dx, dy);
      chunk.recompute();
    }

    self.mark_dirty(id);
    debug!("chunk {:?} moved by ({}, {}) cells", id, dx, dy);
    Ok(())
  }

  /// The cached simplified boundary usable as a collider shape.
  ///
  /// `None` for stale handles, inactive chunks, and chunks without tiles.
  pub fn collision_shape(&self, id: ChunkId) -> Option<&[Vec2]> {
    let chunk = self.chunks.get(id)?;
    if !chunk.is_active() || chunk.tile_count() == 0 {
      return None;
    }
    Some(chunk.boundary())
  }

  /// Toggles a chunk between real collider and collisionless tile group.
  pub fn set_chunk_active(&mut self, id: ChunkId, active: bool) -> bool {
    let Some(chunk) = self.chunks.get_mut(id) else {
      return false;
    };
    chunk.set_active(active);
    self.mark_dirty(id);
    true
  }

  /// Places a visual occupant at a cell, creating the tile record if
  /// needed. The occupant stays owned by the scene; this map only
  /// references it.
  pub fn place_visual(&mut self, world_pos: Vec3, visual: Entity, variant: u32) {
    let anchor = world_to_anchor(world_pos, self.tileset.tile_size());
    let tile = self
      .tiles
      .entry(anchor)
      .or_insert_with(|| Tile::new(anchor));
    tile.visual = Some(visual);
    tile.variant = variant;
    let chunk = tile.chunk;
    if let Some(id) = chunk {
      if self.chunks.contains(id) {
        // Member visuals get reparented under the chunk anchor.
        self.mark_dirty(id);
      }
    }
  }

  /// Detaches the visual occupant at a cell and returns it.
  ///
  /// The tile record is dropped once it has neither occupant nor chunk.
  pub fn clear_visual(&mut self, world_pos: Vec3) -> Option<Entity> {
    let anchor = world_to_anchor(world_pos, self.tileset.tile_size());
    let tile = self.tiles.get_mut(&anchor)?;
    let visual = tile.visual.take();
    if tile.is_orphaned() {
      self.tiles.remove(&anchor);
    }
    visual
  }

  /// Drops all chunks and tiles without persisting anything.
  pub fn clear(&mut self) {
    let dead: Vec<(ChunkId, Option<Entity>)> = self
      .chunks
      .iter()
      .map(|(id, chunk)| (id, chunk.anchor()))
      .collect();
    self.dead.extend(dead);
    self.chunks.clear();
    self.tiles.clear();
    self.layers.clear();
    self.dirty.clear();
  }

  /// Records the anchor entity spawned for a chunk.
  pub fn set_chunk_anchor(&mut self, id: ChunkId, anchor: Entity) {
    if let Some(chunk) = self.chunks.get_mut(id) {
      chunk.set_anchor(Some(anchor));
    }
  }

  /// Drains the chunks whose structure changed since the last call.
  pub fn take_dirty(&mut self) -> Vec<ChunkId> {
    std::mem::take(&mut self.dirty)
  }

  /// Drains the chunks deleted since the last call, with the anchor
  /// entities that should be despawned.
  pub fn take_dead(&mut self) -> Vec<(ChunkId, Option<Entity>)> {
    std::mem::take(&mut self.dead)
  }

  /// Rebuilds one chunk from a saved member list (grouped replay on load).
  pub(crate) fn insert_loaded_chunk(
    &mut self,
    layer: i32,
    tile_size: f32,
    cells: impl IntoIterator<Item = CellPos>,
  ) -> ChunkId {
    let mut chunk = Chunk::new(layer, tile_size);
    for cell in cells {
      chunk.insert_tile(cell);
    }
    chunk.recompute();
    let id = self.chunks.insert(chunk);
    self.layers.entry(layer).or_default().push(id);
    self.mark_dirty(id);
    id
  }

  /// Restores one tile record on load.
  pub(crate) fn insert_loaded_tile(&mut self, tile: Tile) {
    self.tiles.insert(tile.anchor, tile);
  }

  /// First live chunk among the cell's 4-neighbors on the same layer.
  fn neighbor_chunk(&self, anchor: TileAnchor) -> Option<ChunkId> {
    for cell in anchor.cell.neighbors() {
      if let Some(tile) = self.tiles.get(&TileAnchor::new(cell, anchor.layer)) {
        if let Some(id) = tile.chunk {
          if self.chunks.contains(id) {
            return Some(id);
          }
        }
      }
    }
    None
  }

  fn delete_chunk(&mut self, id: ChunkId) {
    if let Some(chunk) = self.chunks.remove(id) {
      if let Some(list) = self.layers.get_mut(&chunk.layer()) {
        list.retain(|&c| c != id);
      }
      self.dirty.retain(|&c| c != id);
      self.dead.push((id, chunk.anchor()));
    }
  }

  fn mark_dirty(&mut self, id: ChunkId) {
    if !self.dirty.contains(&id) {
      self.dirty.push(id);
    }
  }
}
