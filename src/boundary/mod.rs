//! Boundary geometry for chunks of axis-aligned tiles.
//!
//! Three stateless algorithms over plain data:
//! 1. [`extract_boundary_edges`] toggles every tile-quad edge into a set;
//!    edges shared by two adjacent tiles cancel, leaving the outer boundary.
//! 2. [`simplify_boundary`] walks that edge set into an ordered polyline
//!    that keeps a vertex only where the boundary turns.
//! 3. [`is_connected_excluding`] answers whether a chunk stays connected
//!    under 4-neighbor adjacency when one cell is taken away.
//!
//! The coordinator runs 1 and 2 after every structural edit and 3 before
//! committing removals; none of them mutate chunk state themselves.

mod connectivity;
mod extract;
mod simplify;

pub use connectivity::is_connected_excluding;
pub use extract::{EDGE_EPSILON, extract_boundary_edges};
pub use simplify::simplify_boundary;
