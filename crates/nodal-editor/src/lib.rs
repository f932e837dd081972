//! Nodal editor crate.
//!
//! An interactive surface of circular nodes that can be panned, zoomed,
//! selected and dragged. The crate is split along the data flow:
//!
//! - [`transform`]: world/screen conversion and zoom-to-cursor math
//! - [`cell`]: observable state cells with explicit subscriptions
//! - [`state`]: per-instance editor state and the instance store
//! - [`registry`] / [`render_object`]: node list → render objects
//! - [`controller`] / [`schedule`]: pointer state machine and frame deferral
//! - [`program`] / [`renderer`]: the GPU side
//! - [`editor`]: the façade tying them together
//!
//! Everything except `program` and `renderer` runs without a GPU.

pub mod cell;
pub mod command;
pub mod config;
pub mod controller;
pub mod editor;
pub mod geometry;
pub mod node;
pub mod overlay;
pub mod program;
pub mod registry;
pub mod render_object;
pub mod renderer;
pub mod schedule;
pub mod state;
pub mod transform;

pub use command::EditorCommand;
pub use config::EditorConfig;
pub use editor::Editor;
pub use node::{Node, NodeKey};
pub use overlay::{LabelOverlay, NoLabels};
pub use controller::DragState;
pub use registry::{ReconcileSummary, Registry};
pub use renderer::{RedrawTracker, SceneRenderer};
pub use state::{EditorState, EditorStore};

pub use nodal_engine::coords::{Vec2, Viewport};
