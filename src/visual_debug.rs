//! Debug gizmo rendering for chunk boundaries.

use bevy::prelude::*;

use crate::plugin::TileChunkConfig;
use crate::tilemap::Tilemap;

/// System: draws each active chunk's boundary loop and pivot cross.
pub fn draw_chunk_gizmos(
  maps: Query<&Tilemap>,
  config: Res<TileChunkConfig>,
  mut gizmos: Gizmos,
) {
  if !config.debug_gizmos {
    return;
  }

  // Green boundary edges, orange pivots.
  let edge_color = Color::srgb(0.2, 0.8, 0.3);
  let pivot_color = Color::srgb(0.9, 0.6, 0.1);

  for map in maps.iter() {
    for (_, chunk) in map.chunks() {
      if !chunk.is_active() {
        continue;
      }
      let boundary = chunk.boundary();
      for i in 0..boundary.len() {
        gizmos.line_2d(boundary[i], boundary[(i + 1) % boundary.len()], edge_color);
      }

      let pivot = chunk.pivot();
      let arm = chunk.tile_size() * 0.25;
      gizmos.line_2d(pivot - Vec2::X * arm, pivot + Vec2::X * arm, pivot_color);
      gizmos.line_2d(pivot - Vec2::Y * arm, pivot + Vec2::Y * arm, pivot_color);
    }
  }
}
