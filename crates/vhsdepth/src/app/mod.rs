//! Application window and event loop management.

mod input;

use std::sync::Arc;

use pollster::FutureExt;
use winit::{
    dpi::PhysicalSize,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use vhsdepth_core::{
    fit_surface_size, FramePacer, FrameToken, Options, Result, Scheduler, VhsDepthError,
};
use vhsdepth_render::{DepthEffectRenderer, RenderEngine, ShaderSource};

use crate::headless::render_error;
use crate::loader::{report_status, PreparedImage, Status};

/// Frame pacing through winit redraw requests.
///
/// winit cannot withdraw a redraw request, so cancelling is a no-op and the
/// scheduler drops frames that arrive after it stopped.
pub(crate) struct WinitPacer<'a> {
    window: &'a Window,
    last_token: &'a mut u64,
}

impl FramePacer for WinitPacer<'_> {
    fn request_frame(&mut self) -> FrameToken {
        self.window.request_redraw();
        *self.last_token += 1;
        FrameToken(*self.last_token)
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        log::trace!("frame {} dropped on stop", token.0);
    }
}

/// The vhsdepth application state.
pub struct App {
    options: Options,
    shaders: Box<dyn ShaderSource>,
    prepared: PreparedImage,
    window: Option<Arc<Window>>,
    renderer: Option<DepthEffectRenderer>,
    scheduler: Scheduler,
    last_token: u64,
    cursor: (f32, f32),
    error: Option<VhsDepthError>,
}

impl App {
    pub fn new(options: Options, prepared: PreparedImage, shaders: Box<dyn ShaderSource>) -> Self {
        Self {
            scheduler: Scheduler::new(options.time_step),
            options,
            shaders,
            prepared,
            window: None,
            renderer: None,
            last_token: 0,
            cursor: (0.0, 0.0),
            error: None,
        }
    }

    /// Window size for the loaded image within the configured bound.
    fn surface_size(&self) -> (u32, u32) {
        fit_surface_size(
            self.prepared.image.dimensions(),
            self.options.max_surface_size,
        )
    }

    /// Creates the window, the renderer and the image session, then starts the loop.
    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (width, height) = self.surface_size();
        let attributes = Window::default_attributes()
            .with_title("vhsdepth")
            .with_inner_size(PhysicalSize::new(width, height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| VhsDepthError::RenderError(format!("failed to create window: {e}")))?,
        );

        let engine = RenderEngine::new_windowed(window.clone())
            .block_on()
            .map_err(render_error)?;
        let mut renderer = DepthEffectRenderer::new(engine, self.shaders.as_ref(), &self.options)
            .map_err(render_error)?;
        renderer
            .load_image(&self.prepared.image, &self.prepared.depth_map)
            .map_err(render_error)?;

        log::info!(
            "surface {width}x{height}, modes available: {:?}",
            renderer.available_modes()
        );
        self.window = Some(window);
        self.renderer = Some(renderer);
        report_status(&Status::Rendering);
        self.start_loop();
        Ok(())
    }

    fn start_loop(&mut self) {
        if let Some(window) = &self.window {
            let mut pacer = WinitPacer {
                window,
                last_token: &mut self.last_token,
            };
            self.scheduler.start(&mut pacer);
        }
    }

    fn stop_loop(&mut self) {
        if let Some(window) = &self.window {
            let mut pacer = WinitPacer {
                window,
                last_token: &mut self.last_token,
            };
            self.scheduler.stop(&mut pacer);
        }
    }

    fn toggle_loop(&mut self) {
        if self.scheduler.is_running() {
            self.stop_loop();
        } else {
            self.start_loop();
        }
    }

    /// Runs one scheduled frame. While stopped, repaints the last frame time.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
            return;
        };
        let mut pacer = WinitPacer {
            window,
            last_token: &mut self.last_token,
        };
        let ticked = self
            .scheduler
            .tick(&mut pacer, |tick| renderer.render_frame(tick.time));
        let result = match ticked {
            Some(result) => result,
            None => renderer.render_frame(self.scheduler.time()),
        };
        if let Err(e) = result {
            self.fail(event_loop, render_error(e));
        }
    }

    /// Asks for a repaint when the loop is not already producing frames.
    fn repaint_if_stopped(&self) {
        if !self.scheduler.is_running() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    /// Records a fatal error and leaves the event loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: VhsDepthError) {
        report_status(&Status::Error(error.to_string()));
        self.stop_loop();
        self.error = Some(error);
        event_loop.exit();
    }

    fn shutdown(&mut self) {
        self.stop_loop();
        if let Some(renderer) = &mut self.renderer {
            renderer.release();
        }
    }
}

/// Opens the window and blocks until it closes.
///
/// Errors raised inside the event loop are returned once it exits.
pub fn run_app(
    options: Options,
    prepared: PreparedImage,
    shaders: Box<dyn ShaderSource>,
) -> Result<()> {
    let event_loop = EventLoop::new()
        .map_err(|e| VhsDepthError::RenderError(format!("failed to create event loop: {e}")))?;
    let mut app = App::new(options, prepared, shaders);
    event_loop
        .run_app(&mut app)
        .map_err(|e| VhsDepthError::RenderError(format!("event loop error: {e}")))?;
    app.error.take().map_or(Ok(()), Err)
}
