//! Connected-chunk tile collider maintenance for Bevy.
//!
//! Editor-painted tiles group into chunks, maximal 4-connected sets of
//! collidable cells per depth layer. Each chunk exposes a simplified
//! outer-boundary polyline usable as a physics collider, and the structure
//! stays correct as tiles are added, removed, or a whole chunk is dragged.
//!
//! # Architecture
//!
//! 1. [`Tilemap`] is the coordinator: it owns the tile registry and the
//!    per-layer chunk lists and is the only mutation surface
//! 2. Structural edits toggle every tile-quad edge into a set; shared
//!    interior edges cancel, leaving the outer boundary, which a walk
//!    reduces to its corner points
//! 3. Edits that would break a chunk's connectivity, or move it onto
//!    occupied cells, are rejected with no partial mutation
//! 4. ECS systems drain the map's dirty list: anchor entities track chunk
//!    pivots, visual occupants get reparented under them, and (feature
//!    `rapier2d`) fixed polyline colliders mirror each active chunk
//!
//! # Usage
//!
//! ```ignore
//! app.add_plugins(TileChunkPlugin);
//!
//! // Spawn a map entity.
//! commands.spawn((Transform::default(), Tilemap::new(tileset)));
//!
//! // Paint collision from an editor system.
//! fn paint(mut maps: Query<&mut Tilemap>, cursor: Res<CursorWorldPos>) {
//!   let mut map = maps.single_mut().unwrap();
//!   if map.add_collision(cursor.0).is_none() {
//!     // cell was already collidable
//!   }
//! }
//! ```

pub mod arena;
pub mod boundary;
pub mod chunk;
pub mod coords;
pub mod persistence;
#[cfg(feature = "rapier2d")]
pub mod physics;
pub mod plugin;
pub mod systems;
pub mod tile;
pub mod tilemap;
#[cfg(feature = "visual_debug")]
pub mod visual_debug;

pub use arena::{ChunkArena, ChunkId};
pub use boundary::{
  EDGE_EPSILON, extract_boundary_edges, is_connected_excluding, simplify_boundary,
};
pub use chunk::{Chunk, TileQuad, tile_quad};
pub use coords::{
  CellPos, EdgeKey, POINT_KEY_SCALE, PointKey, TileAnchor, cell_anchor, edge_key, key_point,
  point_key, world_to_anchor, world_to_cell,
};
pub use persistence::{
  ChunkRecord, SAVE_VERSION, SaveError, TileRecord, TilemapSave, TilesetRecord, load_from_path,
  save_to_path,
};
#[cfg(feature = "rapier2d")]
pub use physics::{ChunkCollider, ChunkColliderRegistry, sync_chunk_colliders};
pub use plugin::{TileChunkConfig, TileChunkPlugin};
pub use systems::{ChunkAnchor, ChunkStructureChanged, sync_chunk_structure};
pub use tile::Tile;
pub use tilemap::{EditError, Tilemap, Tileset};
#[cfg(feature = "visual_debug")]
pub use visual_debug::draw_chunk_gizmos;
