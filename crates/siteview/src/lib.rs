//! Interactive 3D site view: builds a scene from a [`Site`] model, picks
//! buildings under the pointer and flies the camera between an overview and
//! per-building close-ups while fading everything out of focus.
//!
//! Rasterization is left to the host. It reads poses, opacities and label
//! anchors from the [`Engine`] every frame.

pub mod animation;
pub mod bounds;
pub mod builder;
pub mod camera;
pub mod config;
pub mod engine;
pub mod focus;
pub mod graph;
pub mod highlight;
pub mod label;
pub mod node;
pub mod picker;
pub mod tick;

pub use engine::{Engine, EngineAction, EngineHandle, PickOutcome};
pub use siteview_asset::{Building, Site};

pub use glam;
