//! Plugin wiring and configuration.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::systems::{ChunkStructureChanged, sync_chunk_structure};

/// Configuration for chunk maintenance.
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
pub struct TileChunkConfig {
  /// Whether to render chunk boundaries and pivots as gizmos.
  /// Default: true
  pub debug_gizmos: bool,

  /// Whether to mirror active chunks as physics colliders.
  /// Default: true
  pub collider_sync: bool,
}

impl Default for TileChunkConfig {
  fn default() -> Self {
    Self {
      debug_gizmos: true,
      collider_sync: true,
    }
  }
}

impl TileChunkConfig {
  /// Enables or disables debug gizmo rendering.
  pub fn with_gizmos(mut self, enabled: bool) -> Self {
    self.debug_gizmos = enabled;
    self
  }

  /// Enables or disables physics collider mirroring.
  pub fn with_collider_sync(mut self, enabled: bool) -> Self {
    self.collider_sync = enabled;
    self
  }
}

/// Maintains tilemap chunk structure in the scene.
///
/// Runs the anchor/occupant sync every frame; with the `rapier2d` feature
/// it also mirrors chunk boundaries as fixed colliders, and with
/// `visual_debug` it draws them as gizmos.
pub struct TileChunkPlugin;

impl Plugin for TileChunkPlugin {
  fn build(&self, app: &mut App) {
    app
      .init_resource::<TileChunkConfig>()
      .add_message::<ChunkStructureChanged>()
      .add_systems(Update, sync_chunk_structure);

    #[cfg(feature = "rapier2d")]
    {
      app.init_resource::<crate::physics::ChunkColliderRegistry>();
      app.add_systems(
        Update,
        crate::physics::sync_chunk_colliders.after(sync_chunk_structure),
      );
    }

    #[cfg(feature = "visual_debug")]
    app.add_systems(
      Update,
      crate::visual_debug::draw_chunk_gizmos.after(sync_chunk_structure),
    );
  }
}
