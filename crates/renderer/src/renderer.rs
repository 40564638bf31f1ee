//! Renderer orchestration: acquire, clear, present.

use std::mem::ManuallyDrop;
use std::sync::Arc;

use ash::vk;
use tracing::{debug, error, info};

use colorcycle_core::ColorState;
use colorcycle_platform::{Surface, Window};
use colorcycle_rhi::device::Device;
use colorcycle_rhi::instance::Instance;
use colorcycle_rhi::physical_device::select_physical_device;
use colorcycle_rhi::swapchain::Swapchain;
use colorcycle_rhi::sync::{Fence, Semaphore};
use colorcycle_rhi::{RhiError, RhiResult};

use crate::MAX_FRAMES_IN_FLIGHT;

/// Per-frame command recording resources.
struct FrameData {
    /// Fence to wait for this frame's GPU work to complete.
    in_flight: Fence,
    /// Command pool for this frame.
    command_pool: vk::CommandPool,
    /// Command buffer for this frame.
    command_buffer: vk::CommandBuffer,
}

/// Per-swapchain-image semaphores.
struct ImageSync {
    /// Semaphore signaled when the swapchain image is available.
    image_available: Semaphore,
    /// Semaphore signaled when the clear is complete.
    render_finished: Semaphore,
}

/// A frame whose clear has been submitted but not yet presented.
///
/// Returned by [`Renderer::clear`] and consumed by [`Renderer::present`].
/// The caller may sleep between the two; that gap is where the frame pacer
/// pads the frame out to its budget.
#[must_use = "a cleared frame must be presented"]
pub struct FrameHandle {
    image_index: u32,
}

/// Renderer that clears the screen to a solid color and presents it.
///
/// # Resource destruction order
///
/// Vulkan resources are destroyed in reverse creation order:
/// per-frame resources, swapchain, surface, device, instance.
/// `ManuallyDrop` pins that order in `Drop`.
pub struct Renderer {
    /// Vulkan instance (destroyed last).
    instance: ManuallyDrop<Instance>,
    /// Logical device (destroyed after the swapchain and surface).
    device: ManuallyDrop<Arc<Device>>,
    /// Window surface (destroyed after the swapchain, before the device).
    surface: ManuallyDrop<Surface>,
    /// Swapchain (destroyed first among the manually ordered resources).
    swapchain: ManuallyDrop<Swapchain>,

    /// Per-frame command resources and fences.
    frame_data: Vec<FrameData>,
    /// Per-swapchain-image semaphores.
    image_sync: Vec<ImageSync>,
    /// Current frame index (0 to MAX_FRAMES_IN_FLIGHT - 1).
    current_frame: usize,
    /// Current acquire-semaphore index (cycles through swapchain images).
    current_semaphore: usize,

    /// Surface dimensions captured at creation (the window never resizes).
    width: u32,
    height: u32,
}

impl Renderer {
    /// Creates a renderer for the given window.
    ///
    /// # Errors
    ///
    /// Returns an error if any Vulkan resource creation fails; the caller
    /// treats this as fatal for the session.
    pub fn new(window: &Window) -> RhiResult<Self> {
        let width = window.width();
        let height = window.height();

        info!("Initializing renderer ({}x{})", width, height);

        let enable_validation = cfg!(debug_assertions);
        let instance = Instance::new(enable_validation)?;

        let surface = window
            .create_surface(instance.entry(), instance.handle())
            .map_err(|e| RhiError::SurfaceError(e.to_string()))?;

        let physical_device_info =
            select_physical_device(instance.handle(), surface.handle(), surface.loader())?;

        let device = Device::new(&instance, &physical_device_info)?;

        let swapchain = Swapchain::new(&instance, device.clone(), surface.handle(), width, height)?;

        let frame_data = Self::create_frame_data(&device, MAX_FRAMES_IN_FLIGHT)?;
        let image_sync = Self::create_image_sync(&device, swapchain.image_count() as usize)?;

        info!(
            "Renderer initialized: {} swapchain images, {} frames in flight",
            swapchain.image_count(),
            MAX_FRAMES_IN_FLIGHT
        );

        Ok(Self {
            instance: ManuallyDrop::new(instance),
            device: ManuallyDrop::new(device),
            surface: ManuallyDrop::new(surface),
            swapchain: ManuallyDrop::new(swapchain),
            frame_data,
            image_sync,
            current_frame: 0,
            current_semaphore: 0,
            width,
            height,
        })
    }

    /// Creates per-frame fences, command pools, and command buffers.
    fn create_frame_data(device: &Arc<Device>, count: usize) -> RhiResult<Vec<FrameData>> {
        let graphics_family = device
            .queue_families()
            .graphics_family
            .ok_or(RhiError::NoSuitableGpu)?;
        let pool_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(graphics_family)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

        let mut frames = Vec::with_capacity(count);

        for i in 0..count {
            // Signaled so the first frame does not wait forever
            let in_flight = Fence::new(device.clone(), true)?;

            let command_pool = unsafe { device.handle().create_command_pool(&pool_info, None)? };

            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffers = unsafe { device.handle().allocate_command_buffers(&alloc_info)? };

            debug!("Created frame data for frame {}", i);

            frames.push(FrameData {
                in_flight,
                command_pool,
                command_buffer: command_buffers[0],
            });
        }

        Ok(frames)
    }

    /// Creates per-swapchain-image semaphores.
    fn create_image_sync(device: &Arc<Device>, count: usize) -> RhiResult<Vec<ImageSync>> {
        let mut sync = Vec::with_capacity(count);

        for i in 0..count {
            let image_available = Semaphore::new(device.clone())?;
            let render_finished = Semaphore::new(device.clone())?;

            debug!("Created image sync for image {}", i);

            sync.push(ImageSync {
                image_available,
                render_finished,
            });
        }

        Ok(sync)
    }

    /// Acquires a swapchain image and submits the clear to the given color.
    ///
    /// Returns `Ok(None)` when the swapchain was out of date and has been
    /// recreated; the caller simply skips this frame.
    ///
    /// # Errors
    ///
    /// Returns an error if any Vulkan operation fails.
    pub fn clear(&mut self, color: ColorState) -> RhiResult<Option<FrameHandle>> {
        let frame = &self.frame_data[self.current_frame];

        // Wait for this frame slot's previous work to complete
        frame.in_flight.wait(u64::MAX)?;

        let acquire_semaphore = self.image_sync[self.current_semaphore].image_available.handle();

        let (image_index, _suboptimal) = match self.swapchain.acquire_next_image(acquire_semaphore)
        {
            Ok(result) => result,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                debug!("Swapchain out of date on acquire, recreating");
                self.recreate_swapchain()?;
                return Ok(None);
            }
            Err(e) => return Err(RhiError::VulkanError(e)),
        };

        // Reset the fence only once we are sure work will be submitted
        frame.in_flight.reset()?;

        self.record_clear(image_index, color)?;

        let image_sync = &self.image_sync[image_index as usize];
        let wait_semaphores = [acquire_semaphore];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [image_sync.render_finished.handle()];
        let command_buffers = [frame.command_buffer];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device.handle().queue_submit(
                self.device.graphics_queue(),
                &[submit_info],
                frame.in_flight.handle(),
            )?;
        }

        Ok(Some(FrameHandle { image_index }))
    }

    /// Presents a previously cleared frame.
    ///
    /// # Errors
    ///
    /// Returns an error if presentation fails for a reason other than the
    /// swapchain going out of date (which is recovered by recreation).
    pub fn present(&mut self, frame: FrameHandle) -> RhiResult<()> {
        let image_sync = &self.image_sync[frame.image_index as usize];

        let present_result = self.swapchain.present(
            self.device.present_queue(),
            frame.image_index,
            image_sync.render_finished.handle(),
        );

        // Advance semaphore index (cycles through all swapchain images)
        self.current_semaphore = (self.current_semaphore + 1) % self.image_sync.len();
        // Advance to the next frame slot
        self.current_frame = (self.current_frame + 1) % MAX_FRAMES_IN_FLIGHT;

        let should_recreate = match present_result {
            Ok(suboptimal) => suboptimal,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) | Err(vk::Result::SUBOPTIMAL_KHR) => true,
            Err(e) => return Err(RhiError::VulkanError(e)),
        };

        if should_recreate {
            debug!("Swapchain needs recreation after present");
            self.recreate_swapchain()?;
        }

        Ok(())
    }

    /// Records the clear pass for one swapchain image.
    fn record_clear(&self, image_index: u32, color: ColorState) -> RhiResult<()> {
        let frame = &self.frame_data[self.current_frame];
        let cmd = frame.command_buffer;

        unsafe {
            self.device
                .handle()
                .reset_command_buffer(cmd, vk::CommandBufferResetFlags::empty())?;

            let begin_info =
                vk::CommandBufferBeginInfo::default().flags(vk::CommandBufferUsageFlags::empty());
            self.device.handle().begin_command_buffer(cmd, &begin_info)?;
        }

        let color_image = self.swapchain.image(image_index as usize);
        self.cmd_transition_image_layout(
            cmd,
            color_image,
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        );

        // The whole pass: one color attachment whose load op clears to the
        // selected color. Nothing is drawn.
        let color_attachment = vk::RenderingAttachmentInfo::default()
            .image_view(self.swapchain.image_view(image_index as usize))
            .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .clear_value(vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: color.clear_value(),
                },
            });

        let rendering_info = vk::RenderingInfo::default()
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: self.swapchain.extent(),
            })
            .layer_count(1)
            .color_attachments(std::slice::from_ref(&color_attachment));

        unsafe {
            self.device
                .handle()
                .cmd_begin_rendering(cmd, &rendering_info);
            self.device.handle().cmd_end_rendering(cmd);
        }

        self.cmd_transition_image_layout(
            cmd,
            color_image,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageLayout::PRESENT_SRC_KHR,
        );

        unsafe {
            self.device.handle().end_command_buffer(cmd)?;
        }

        Ok(())
    }

    /// Records an image layout transition for a swapchain color image.
    fn cmd_transition_image_layout(
        &self,
        cmd: vk::CommandBuffer,
        image: vk::Image,
        old_layout: vk::ImageLayout,
        new_layout: vk::ImageLayout,
    ) {
        let (src_stage, src_access, dst_stage, dst_access) = match (old_layout, new_layout) {
            (vk::ImageLayout::UNDEFINED, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL) => (
                vk::PipelineStageFlags::TOP_OF_PIPE,
                vk::AccessFlags::empty(),
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
                vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
            ),
            (vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL, vk::ImageLayout::PRESENT_SRC_KHR) => (
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
                vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
                vk::PipelineStageFlags::BOTTOM_OF_PIPE,
                vk::AccessFlags::empty(),
            ),
            _ => (
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE,
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE,
            ),
        };

        let barrier = vk::ImageMemoryBarrier::default()
            .old_layout(old_layout)
            .new_layout(new_layout)
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(image)
            .subresource_range(
                vk::ImageSubresourceRange::default()
                    .aspect_mask(vk::ImageAspectFlags::COLOR)
                    .base_mip_level(0)
                    .level_count(1)
                    .base_array_layer(0)
                    .layer_count(1),
            )
            .src_access_mask(src_access)
            .dst_access_mask(dst_access);

        unsafe {
            self.device.handle().cmd_pipeline_barrier(
                cmd,
                src_stage,
                dst_stage,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            );
        }
    }

    /// Recreates the swapchain and its per-image semaphores.
    fn recreate_swapchain(&mut self) -> RhiResult<()> {
        self.device.wait_idle()?;

        self.swapchain.recreate(
            &self.instance,
            self.surface.handle(),
            self.width,
            self.height,
        )?;

        // Semaphore count follows the swapchain image count
        self.image_sync =
            Self::create_image_sync(&self.device, self.swapchain.image_count() as usize)?;
        self.current_semaphore = 0;

        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        // Wait for all GPU work to complete before destroying resources
        if let Err(e) = self.device.wait_idle() {
            error!("Failed to wait for device idle during drop: {:?}", e);
        }

        // Destroy per-frame command pools; fences and semaphores are
        // released by their wrappers' Drop impls
        for frame in &self.frame_data {
            unsafe {
                self.device
                    .handle()
                    .destroy_command_pool(frame.command_pool, None);
            }
        }
        self.frame_data.clear();
        self.image_sync.clear();

        // Manually drop the rest in correct order: swapchain and surface
        // before the device, the device before the instance
        unsafe {
            ManuallyDrop::drop(&mut self.swapchain);
            ManuallyDrop::drop(&mut self.surface);
            ManuallyDrop::drop(&mut self.device);
            ManuallyDrop::drop(&mut self.instance);
        }

        info!("Renderer destroyed");
    }
}
