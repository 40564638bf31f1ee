//! Vulkan abstraction layer for the color-cycle demo.
//!
//! Safe wrappers over the `ash` crate for the handful of Vulkan objects a
//! clear-and-present loop needs:
//! - Instance and device creation
//! - Swapchain management
//! - Synchronization primitives

mod error;

pub mod device;
pub mod instance;
pub mod physical_device;
pub mod swapchain;
pub mod sync;

pub use error::{RhiError, RhiResult};

// Re-export ash types that users might need
pub use ash::vk;
