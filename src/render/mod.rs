//! 2D rendering module
//!
//! Entities paint onto an abstract canvas-like [`Surface`].

pub mod draw;
pub mod headless;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use draw::{Draw, DrawOptions, Scene, draw_layer};
pub use headless::{DrawOp, HeadlessSurface};
pub use surface::Surface;

#[cfg(target_arch = "wasm32")]
pub use canvas::Canvas2d;
