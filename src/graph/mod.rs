//! CI relationship graph: data model, filtering, force layout, interaction
//! and rendering.

pub mod filter;
pub mod frame_loop;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod render;
pub mod sample;
pub mod types;
pub mod view;
pub mod viewport;

pub use filter::{DepthFilter, GraphFilter, RelationshipFilter, TypeFilter, VisibleSet};
pub use frame_loop::FrameLoop;
pub use interaction::{HitTestMode, InteractionState, PointerEvent};
pub use layout::{ForceParams, ForceSimulator};
pub use model::{CanvasSize, GraphModel};
pub use render::{RenderOptions, Scene};
pub use types::{CiStatus, CiType, GraphData, NodeDetail, RelationshipType};
pub use view::{GraphEvent, GraphView, InputEvent};
pub use viewport::Viewport;
