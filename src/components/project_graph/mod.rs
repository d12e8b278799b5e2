//! Interactive node-link diagram of Qute templates and the Java methods they use.
//!
//! Data flows host -> [`types`] -> [`sizing`] -> [`layout`] -> [`sync`] -> surface, with
//! [`viewport`] handling pan and zoom of the whole drawing. Only [`sync`], [`renderer`] and the
//! canvas glue touch a [`surface::DrawingSurface`]; layout and sizing are pure.

mod component;
pub mod config;
pub mod error;
pub mod layout;
pub mod message;
mod render;
pub mod renderer;
pub mod scene;
pub mod sizing;
pub mod surface;
pub mod sync;
pub mod types;
pub mod viewport;

pub use component::ProjectGraphCanvas;
pub use config::RendererConfig;
pub use error::{GraphError, Result};
pub use message::HostMessage;
pub use renderer::{FrameStatus, NO_DATA_MESSAGE, ProjectGraphRenderer, RenderSummary, SavedLayout};
pub use scene::Scene;
pub use types::{GraphData, Link, LinkLabel, Node, NodeKind, RenderRequest};
