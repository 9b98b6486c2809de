//! Interaction engine for the DigiWall sticky-note wall.
//!
//! The crate owns everything between raw input and persisted notes: the
//! ordered note collection, pan/zoom of the 5000×5000 world canvas, note
//! dragging, click disambiguation, bulk delete with undo, and the rich text
//! model behind the note editor. It performs no I/O. Hosts feed it input and
//! frame ticks and apply the returned [`engine::Action`]s, forwarding
//! [`remote::RemoteOp`]s to the realtime store.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EngineCore`] composing every controller below |
//! | [`store`] | Ordered note collection and its remote write-through |
//! | [`note`] | Note record, defaults, and drawing fit |
//! | [`remote`] | Remote operations emitted for the realtime store |
//! | [`camera`] | Viewport transform and clamping |
//! | [`viewport`] | Wheel, pan, pinch, and toolbar zoom |
//! | [`drag`] | Note drag controller and the drag gate |
//! | [`gesture`] | Single/double click and tap disambiguation |
//! | [`undo`] | Bulk delete with a timed undo window |
//! | [`hit`] | Hit-testing notes in paint order |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`coalesce`] | One-commit-per-frame update slots |
//! | [`richtext`] | Styled text model and markup import/export |
//! | [`typing`] | Header typing animation |
//! | [`consts`] | Shared constants (canvas size, zoom limits, timings) |

pub mod camera;
pub mod coalesce;
pub mod consts;
pub mod drag;
pub mod engine;
pub mod gesture;
pub mod hit;
pub mod input;
pub mod note;
pub mod remote;
pub mod richtext;
pub mod store;
pub mod typing;
pub mod undo;
pub mod viewport;
