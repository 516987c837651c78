//! Rapier collider synchronization for chunk boundaries.
//!
//! Mirrors every active chunk as a fixed polyline collider entity. The
//! polyline is the chunk's simplified boundary expressed relative to the
//! pivot, so the collider body's origin is the pivot the editor moves.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::arena::ChunkId;
use crate::plugin::TileChunkConfig;
use crate::tilemap::Tilemap;

/// Tracks spawned collider entities by map and chunk.
#[derive(Resource, Default)]
pub struct ChunkColliderRegistry {
  pub entities: HashMap<(Entity, ChunkId), Entity>,
}

/// Marker component for chunk collider entities.
#[derive(Component)]
pub struct ChunkCollider {
  pub map: Entity,
  pub chunk: ChunkId,
  /// Chunk generation when this collider was built.
  /// A mismatch means the boundary was rebuilt and this collider is stale.
  pub generation: u64,
}

/// System: keeps one fixed polyline collider per active chunk.
///
/// - Despawns colliders whose chunk died, went inactive, or was rebuilt
/// - Spawns colliders for active chunks that have none
pub fn sync_chunk_colliders(
  mut commands: Commands,
  mut registry: ResMut<ChunkColliderRegistry>,
  config: Res<TileChunkConfig>,
  maps: Query<(Entity, &Tilemap)>,
  colliders: Query<(Entity, &ChunkCollider)>,
) {
  if !config.collider_sync {
    return;
  }

  for (entity, collider) in colliders.iter() {
    let live = maps
      .get(collider.map)
      .ok()
      .and_then(|(_, map)| map.chunk(collider.chunk));
    let stale = match live {
      None => true,
      Some(chunk) => !chunk.is_active() || chunk.generation() != collider.generation,
    };
    if stale {
      commands.entity(entity).despawn();
      registry.entities.remove(&(collider.map, collider.chunk));
    }
  }

  for (map_entity, map) in maps.iter() {
    for (chunk_id, chunk) in map.chunks() {
      if !chunk.is_active() || registry.entities.contains_key(&(map_entity, chunk_id)) {
        continue;
      }
      let boundary = chunk.boundary();
      if boundary.len() < 3 {
        continue;
      }

      let pivot = chunk.pivot();
      let vertices: Vec<Vec2> = boundary.iter().map(|&p| p - pivot).collect();
      let count = vertices.len() as u32;
      // Closed loop: the boundary is implicitly closed, the collider needs
      // the closing segment spelled out.
      let indices: Vec<[u32; 2]> = (0..count).map(|i| [i, (i + 1) % count]).collect();

      let entity = commands
        .spawn((
          RigidBody::Fixed,
          Collider::polyline(vertices, Some(indices)),
          Transform::from_translation(pivot.extend(chunk.layer() as f32)),
          ChunkCollider {
            map: map_entity,
            chunk: chunk_id,
            generation: chunk.generation(),
          },
        ))
        .id();
      registry.entities.insert((map_entity, chunk_id), entity);
    }
  }
}
