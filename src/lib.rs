//! DigiWall host runtime.
//!
//! Wires the [`canvas`] interaction engine to a realtime store: the session
//! loop feeds it snapshots, host input, and frame ticks, and writes its
//! remote ops back to the store.

pub mod config;
pub mod remote;
pub mod session;
pub mod submit;
