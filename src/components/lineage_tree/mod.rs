//! Canvas-rendered, collapsible lineage tree with pan, zoom and path highlighting.

mod component;
pub mod config;
pub mod geometry;
pub mod gesture;
pub mod highlight;
pub mod layout;
pub mod model;
mod render;
pub mod scene;
pub mod state;
pub mod style;
pub mod tween;
pub mod viewport;

pub use component::TreeCanvas;
pub use config::TreeConfig;
pub use model::{NodeId, NodeSpec, Tree, TreeError};
pub use render::{Painter, render};
pub use state::TreeState;
pub use viewport::{ViewTransform, ViewportError};
