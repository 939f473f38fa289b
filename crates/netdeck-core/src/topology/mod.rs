//! In-memory topology editing for one open project.
//!
//! The editor is pure state-machine code: no I/O, no async. Mutations
//! either succeed atomically or leave the graph untouched, and every
//! committed mutation pushes an undo snapshot.

mod editor;

pub use editor::{GRID_SIZE, MAX_HISTORY, Snapshot, TopologyEditor};
