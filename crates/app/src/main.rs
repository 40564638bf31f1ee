//! Color-cycle demo.
//!
//! Opens a fullscreen window and clears it to a background color that
//! cycles red, green, blue once per second. A frame pacer caps the loop
//! near 60 Hz and per-frame timing diagnostics go to the log. Pressing any
//! key or closing the window quits.

use anyhow::Result;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use colorcycle_core::{init_logging, ColorState, FramePacer, Timer, TimingTracker};
use colorcycle_platform::Window;
use colorcycle_renderer::Renderer;

const WINDOW_TITLE: &str = "Color Cycle";

/// Application state driven by the winit event loop.
struct App {
    window: Option<Window>,
    renderer: Option<Renderer>,
    /// Session clock the color schedule is derived from.
    timer: Timer,
    /// Current background color, fed back into selection as the fallback.
    color: ColorState,
    pacer: FramePacer,
    tracker: TimingTracker,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            renderer: None,
            timer: Timer::new(),
            color: ColorState::default(),
            pacer: FramePacer::default(),
            tracker: TimingTracker::new(),
        }
    }

    /// Clears, paces, and presents one frame.
    fn render_frame(&mut self) -> std::result::Result<(), colorcycle_renderer::RhiError> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        self.color = ColorState::select(self.timer.elapsed(), self.color);

        // The clear is submitted first so the sleep overlaps GPU work; the
        // present happens only after the pacer has padded the frame out.
        if let Some(frame) = renderer.clear(self.color)? {
            self.pacer.pace();
            renderer.present(frame)?;
            self.pacer.mark_swap();

            self.tracker.tick().log();
        }

        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match Window::new(event_loop, WINDOW_TITLE) {
            Ok(window) => window,
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match Renderer::new(&window) {
            Ok(renderer) => renderer,
            Err(e) => {
                error!("Failed to create renderer: {}", e);
                event_loop.exit();
                return;
            }
        };

        self.window = Some(window);
        self.renderer = Some(renderer);

        // Timing starts when the window is up, not at process start.
        self.timer.reset();
        self.pacer.mark_swap();
        self.tracker = TimingTracker::new();

        info!("Session started");
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                // Any key quits.
                if event.state == ElementState::Pressed {
                    info!("Key pressed, shutting down");
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render_frame() {
                    error!("Rendering failed: {}", e);
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    init_logging();

    info!("Starting {}", WINDOW_TITLE);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    info!("Shutdown complete");
    Ok(())
}
