//! Clear-and-present renderer.
//!
//! Owns the Vulkan resources needed to clear the screen to a solid color
//! and present the result. There is no pipeline and there are no draw
//! calls; the render pass consists of a single color attachment whose load
//! operation performs the clear.

mod renderer;

pub use renderer::{FrameHandle, Renderer};

// Re-export the error types callers see from clear and present
pub use colorcycle_rhi::{RhiError, RhiResult};

/// Maximum number of frames that can be in flight simultaneously.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;
