//! Platform-agnostic core of the portfolio 3D widgets.
//!
//! Scene construction, per-frame animation rules, GPU resource bookkeeping and
//! the mount/unmount state machine live here so they can be exercised on the
//! host. The web crate supplies the WebGPU renderer and browser wiring.

pub mod animate;
pub mod builder;
pub mod camera;
pub mod clock;
pub mod color;
pub mod constants;
pub mod controller;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod input;
pub mod instance;
pub mod material;
pub mod registry;
pub mod renderer;
pub mod scene;
pub mod schedule;
pub mod texture;

pub use builder::{blueprint, build, SceneBlueprint};
pub use camera::Camera;
pub use clock::AnimationClock;
pub use controller::{MountController, MountParts, MountPhase, MountTicket, SharedScene};
pub use driver::{AnimationDriver, DriverState};
pub use error::{SceneError, TextureError};
pub use geometry::{GeometryDesc, Polyhedron, Topology};
pub use input::{InputState, SharedInput};
pub use instance::{FrameOutcome, SceneInstance, TextureOutcome};
pub use material::{BlendMode, MaterialDesc, TextureData};
pub use registry::{GeometryId, MaterialId, ResourceCounts, ResourceHandle, ResourceRegistry};
pub use renderer::{DrawItem, RenderFrame, Renderer};
pub use scene::*;
pub use schedule::{CancelToken, FrameTask, ListenerGuard, SurfaceMount};
pub use texture::TextureTicket;
