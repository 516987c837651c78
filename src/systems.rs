//! Bevy systems for chunk anchors and visual occupants.

use bevy::prelude::*;

use crate::arena::ChunkId;
use crate::coords::{TileAnchor, cell_anchor};
use crate::tilemap::Tilemap;

/// Marker on the anchor entity spawned for each chunk.
///
/// Member tiles' visual occupants are parented under this entity, and the
/// entity sits at the chunk's pivot, so translating it moves the whole
/// chunk visually.
#[derive(Component)]
pub struct ChunkAnchor {
  /// The tilemap entity this anchor belongs to.
  pub map: Entity,
  /// The chunk it anchors.
  pub chunk: ChunkId,
}

/// Sent when a chunk's structure changed or the chunk was deleted.
#[derive(Message)]
pub struct ChunkStructureChanged {
  /// The tilemap entity that owns (or owned) the chunk.
  pub map: Entity,
  /// Handle of the affected chunk; stale if the chunk was deleted.
  pub chunk: ChunkId,
}

/// System: applies pending structural changes to the scene graph.
///
/// Dead chunks get their anchor entities despawned. Each dirty chunk gets
/// an anchor entity at its pivot (spawned on first use, repositioned
/// after), and every member visual occupant is detached and reattached
/// under it with a freshly authored local translation, so world position
/// never compounds across reparents. The occupant's depth coordinate is
/// already consistent and is left untouched.
///
/// All positions are in the owning map entity's space: anchors are
/// children of the map, occupants children of anchors.
pub fn sync_chunk_structure(
  mut commands: Commands,
  mut maps: Query<(Entity, &mut Tilemap)>,
  mut occupants: Query<&mut Transform>,
  mut changed: MessageWriter<ChunkStructureChanged>,
) {
  for (map_entity, mut map) in maps.iter_mut() {
    for (chunk_id, anchor) in map.take_dead() {
      if let Some(anchor) = anchor {
        commands.entity(anchor).despawn();
      }
      changed.write(ChunkStructureChanged {
        map: map_entity,
        chunk: chunk_id,
      });
    }

    for chunk_id in map.take_dirty() {
      let Some(chunk) = map.chunk(chunk_id) else {
        continue;
      };
      let pivot = chunk.pivot();
      let layer = chunk.layer();
      let tile_size = chunk.tile_size();
      let existing = chunk.anchor();

      let members: Vec<(Vec2, Entity)> = chunk
        .cells()
        .filter_map(|cell| {
          map
            .tile(TileAnchor::new(cell, layer))
            .and_then(|tile| tile.visual)
            .map(|visual| (cell_anchor(cell, tile_size), visual))
        })
        .collect();

      let anchor_transform = Transform::from_translation(pivot.extend(layer as f32));
      let anchor_entity = match existing {
        Some(entity) => {
          commands.entity(entity).insert(anchor_transform);
          entity
        }
        None => {
          let entity = commands
            .spawn((
              anchor_transform,
              ChunkAnchor {
                map: map_entity,
                chunk: chunk_id,
              },
              ChildOf(map_entity),
            ))
            .id();
          map.set_chunk_anchor(chunk_id, entity);
          entity
        }
      };

      for (tile_pos, visual) in members {
        // Occupants are scene-owned and may be gone; skip stale handles.
        let Ok(mut transform) = occupants.get_mut(visual) else {
          continue;
        };
        // Detach then reattach so the local transform is authored fresh
        // against the current pivot instead of compounding.
        commands.entity(visual).remove::<ChildOf>();
        commands.entity(visual).insert(ChildOf(anchor_entity));
        let local = tile_pos - pivot;
        transform.translation.x = local.x;
        transform.translation.y = local.y;
      }

      changed.write(ChunkStructureChanged {
        map: map_entity,
        chunk: chunk_id,
      });
    }
  }
}
