//! Tilemap save files.
//!
//! Saves are TOML documents built from plain serde records. Chunks are not
//! replayed edit-by-edit on load: each [`ChunkRecord`] carries its full
//! member-cell list and the chunk is rebuilt in one grouped insertion, then
//! recomputed, which is both faster and independent of edit order.
//!
//! Visual occupants are scene-owned, so a save stores only opaque ids for
//! them; [`TilemapSave::apply_with_visuals`] reconnects them through a
//! caller-provided lookup.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use bevy::prelude::Entity;
use serde::{Deserialize, Serialize};

use crate::coords::{CellPos, TileAnchor};
use crate::tile::Tile;
use crate::tilemap::Tilemap;

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

/// Tileset description as stored on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TilesetRecord {
  /// Asset path of the tile sheet.
  pub source: String,
  /// Pixel size of one tile within the sheet.
  pub tile_px: [u32; 2],
  /// Sheet pixels per world unit.
  pub pixels_per_unit: f32,
}

/// One chunk: layer, scale, opaque id, member cells, simplified boundary.
///
/// The boundary is redundant with the cells (it is recomputed on load) but
/// stays in the file so external consumers can read collider shapes without
/// running the extraction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
  /// Opaque identifier, referenced by [`TileRecord::chunk`].
  pub id: u32,
  /// Depth layer.
  pub layer: i32,
  /// Tile edge size in world units (width, height).
  pub tile_size: [f32; 2],
  /// Member tile anchors.
  pub cells: Vec<[i64; 2]>,
  /// Simplified boundary points.
  pub boundary: Vec<[f32; 2]>,
}

/// One tile record: anchor, variant, and optional reconnection ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
  /// Grid cell of the anchor.
  pub cell: [i64; 2],
  /// Depth layer of the anchor.
  pub layer: i32,
  /// Tileset sub-image index.
  pub variant: u32,
  /// Opaque id of the visual occupant; absent means no occupant.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub visual: Option<u64>,
  /// Owning chunk id; absent means the cell is not collidable.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub chunk: Option<u32>,
}

/// A complete tilemap snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TilemapSave {
  /// Format version for migration.
  pub version: u32,
  /// Tileset the map draws from.
  pub tileset: TilesetRecord,
  /// All chunks, any layer.
  pub chunks: Vec<ChunkRecord>,
  /// All tile records, any layer.
  pub tiles: Vec<TileRecord>,
}

impl TilemapSave {
  /// Captures a snapshot of a tilemap.
  ///
  /// Output is sorted (chunk cells by position, tiles by layer then cell)
  /// so identical maps produce identical documents.
  pub fn capture(map: &Tilemap) -> Self {
    let tileset = map.tileset();
    let mut chunk_ids: HashMap<_, u32> = HashMap::new();

    let mut chunks: Vec<ChunkRecord> = map
      .chunks()
      .map(|(id, chunk)| {
        let record_id = chunk_ids.len() as u32;
        chunk_ids.insert(id, record_id);
        let mut cells: Vec<[i64; 2]> = chunk.cells().map(|c| [c.x, c.y]).collect();
        cells.sort_unstable();
        ChunkRecord {
          id: record_id,
          layer: chunk.layer(),
          tile_size: [chunk.tile_size(), chunk.tile_size()],
          cells,
          boundary: chunk.boundary().iter().map(|p| [p.x, p.y]).collect(),
        }
      })
      .collect();
    chunks.sort_by_key(|record| record.id);

    let mut tiles: Vec<TileRecord> = Vec::with_capacity(map.tile_count());
    let mut anchors: Vec<TileAnchor> = map.tile_anchors().collect();
    anchors.sort_unstable_by_key(|a| (a.layer, a.cell));
    for anchor in anchors {
      if let Some(tile) = map.tile(anchor) {
        tiles.push(TileRecord {
          cell: [anchor.cell.x, anchor.cell.y],
          layer: anchor.layer,
          variant: tile.variant,
          visual: tile.visual.map(Entity::to_bits),
          chunk: tile.chunk.and_then(|id| chunk_ids.get(&id).copied()),
        });
      }
    }

    Self {
      version: SAVE_VERSION,
      tileset: TilesetRecord {
        source: tileset.source.clone(),
        tile_px: [tileset.tile_px.x, tileset.tile_px.y],
        pixels_per_unit: tileset.pixels_per_unit,
      },
      chunks,
      tiles,
    }
  }

  /// Restores this snapshot into a map, dropping its current contents.
  ///
  /// Visual occupant ids are left disconnected; use
  /// [`Self::apply_with_visuals`] to reconnect them.
  pub fn apply(&self, map: &mut Tilemap) {
    self.apply_with_visuals(map, &HashMap::new());
  }

  /// Restores this snapshot, reconnecting visual occupants through a
  /// saved-id to entity lookup.
  pub fn apply_with_visuals(&self, map: &mut Tilemap, visuals: &HashMap<u64, Entity>) {
    map.clear();

    let mut chunk_ids = HashMap::with_capacity(self.chunks.len());
    for record in &self.chunks {
      let id = map.insert_loaded_chunk(
        record.layer,
        record.tile_size[0],
        record.cells.iter().map(|&[x, y]| CellPos::new(x, y)),
      );
      chunk_ids.insert(record.id, id);
    }

    for record in &self.tiles {
      let anchor = TileAnchor::new(CellPos::new(record.cell[0], record.cell[1]), record.layer);
      let mut tile = Tile::new(anchor);
      tile.variant = record.variant;
      tile.visual = record
        .visual
        .and_then(|bits| visuals.get(&bits).copied());
      tile.chunk = record.chunk.and_then(|id| chunk_ids.get(&id).copied());
      if tile.is_orphaned() {
        // A record whose visual could not be reconnected and that has no
        // chunk holds nothing; the registry never keeps such tiles.
        continue;
      }
      map.insert_loaded_tile(tile);
    }

    // A hand-edited file may list chunk cells with no tile record; give
    // those cells registry entries so membership stays consistent.
    for record in &self.chunks {
      let Some(&id) = chunk_ids.get(&record.id) else {
        continue;
      };
      for &[x, y] in &record.cells {
        let anchor = TileAnchor::new(CellPos::new(x, y), record.layer);
        if map.tile(anchor).is_none() {
          let mut tile = Tile::new(anchor);
          tile.chunk = Some(id);
          map.insert_loaded_tile(tile);
        }
      }
    }
  }
}

/// Errors from reading or writing save files.
#[derive(Debug)]
pub enum SaveError {
  Io(io::Error),
  Parse(toml::de::Error),
  Encode(toml::ser::Error),
  UnsupportedVersion(u32),
}

impl std::fmt::Display for SaveError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io(e) => write!(f, "save file i/o error: {}", e),
      Self::Parse(e) => write!(f, "save file parse error: {}", e),
      Self::Encode(e) => write!(f, "save file encode error: {}", e),
      Self::UnsupportedVersion(v) => write!(f, "unsupported save version: {}", v),
    }
  }
}

impl std::error::Error for SaveError {}

impl From<io::Error> for SaveError {
  fn from(e: io::Error) -> Self {
    Self::Io(e)
  }
}

/// Writes a snapshot to a TOML file.
pub fn save_to_path(save: &TilemapSave, path: impl AsRef<Path>) -> Result<(), SaveError> {
  let text = toml::to_string_pretty(save).map_err(SaveError::Encode)?;
  fs::write(path, text)?;
  Ok(())
}

/// Reads a snapshot from a TOML file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<TilemapSave, SaveError> {
  let text = fs::read_to_string(path)?;
  let save: TilemapSave = toml::from_str(&text).map_err(SaveError::Parse)?;
  if save.version > SAVE_VERSION {
    return Err(SaveError::UnsupportedVersion(save.version));
  }
  Ok(save)
}
