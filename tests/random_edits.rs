//! Randomized editing stress.
//!
//! Drives a long sequence of random adds, removals and moves and checks
//! the structural invariants after every step: chunks stay 4-connected,
//! edge sets match a fresh extraction, and tile/chunk back-references
//! agree in both directions.

use bevy::math::{Vec2, Vec3};
use bevy_tile_chunks::{
  CellPos, TileAnchor, Tilemap, Tileset, extract_boundary_edges, is_connected_excluding,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const REGION: i64 = 8;
const STEPS: usize = 600;

fn cell(x: i64, y: i64) -> Vec3 {
  Vec3::new(x as f32 + 0.5, y as f32 + 0.5, 0.0)
}

/// A cell far outside the edited region; excluding it from the DFS turns
/// the check into a plain full-connectivity validation.
const OUTSIDE: CellPos = CellPos { x: 1 << 40, y: 1 << 40 };

fn assert_invariants(map: &Tilemap) {
  for (id, chunk) in map.chunks() {
    assert!(chunk.tile_count() > 0, "empty chunks must be deleted");
    assert!(
      is_connected_excluding(chunk.quads(), OUTSIDE),
      "chunk {:?} is not 4-connected",
      id
    );

    let fresh = extract_boundary_edges(chunk.quads().values(), chunk.tile_size());
    assert_eq!(
      &fresh,
      chunk.edges(),
      "chunk {:?} edge set diverged from its quads",
      id
    );

    for member in chunk.cells() {
      let tile = map
        .tile(TileAnchor::new(member, chunk.layer()))
        .unwrap_or_else(|| panic!("member {:?} has no registry record", member));
      assert_eq!(tile.chunk, Some(id), "member back-reference mismatch");
    }
  }

  for anchor in map.tile_anchors() {
    let tile = map.tile(anchor).unwrap();
    if let Some(id) = tile.chunk {
      let chunk = map.chunk(id).expect("tile points at a dead chunk");
      assert!(
        chunk.contains_cell(anchor.cell),
        "tile {:?} not a member of its chunk",
        anchor
      );
    }
  }
}

#[test]
fn test_random_edit_storm_holds_invariants() {
  let mut rng = StdRng::seed_from_u64(0x7145);
  let mut map = Tilemap::new(Tileset::untextured(1.0));
  let mut accepted = 0usize;
  let mut rejected = 0usize;

  for _ in 0..STEPS {
    let x = rng.gen_range(0..REGION);
    let y = rng.gen_range(0..REGION);

    match rng.gen_range(0..10) {
      0..=4 => {
        if map.add_collision(cell(x, y)).is_some() {
          accepted += 1;
        }
      }
      5..=8 => match map.remove_collision(cell(x, y)) {
        Ok(Some(_)) => accepted += 1,
        Ok(None) => {}
        Err(_) => rejected += 1,
      },
      _ => {
        let ids: Vec<_> = map.chunks().map(|(id, _)| id).collect();
        if !ids.is_empty() {
          let id = ids[rng.gen_range(0..ids.len())];
          let delta = Vec2::new(
            rng.gen_range(-1..=1) as f32,
            rng.gen_range(-1..=1) as f32,
          );
          match map.update_position(id, delta) {
            Ok(()) => accepted += 1,
            Err(_) => rejected += 1,
          }
        }
      }
    }

    assert_invariants(&map);
  }

  assert!(accepted > 50, "storm should accept plenty of edits");
  assert!(rejected > 0, "storm should hit guarded rejections");
}
