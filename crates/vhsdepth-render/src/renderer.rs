//! The depth effect renderer: programs, session and mode dispatch.

use std::collections::HashMap;

use vhsdepth_core::{
    DepthMap, EffectParameters, OrbitCamera, OrbitControls, Options, PointerEvent, SourceImage,
    ViewMode,
};

use crate::compositor::{Compositor, FrameUniforms, PassChain};
use crate::engine::{OutputTarget, RenderEngine};
use crate::error::{RenderError, RenderResult, ShaderError};
use crate::session::ImageSession;
use crate::shader::{ProgramDescriptor, ShaderProgram};
use crate::shaders::{PassName, ShaderSource};
use crate::splat::{SplatRenderer, SPLAT_DEPTH_FORMAT};

/// Renders one loaded image in any [`ViewMode`].
///
/// Programs that fail to compile are recorded rather than fatal: the modes
/// that need them become unavailable and the rest keep working.
pub struct DepthEffectRenderer {
    engine: RenderEngine,
    programs: HashMap<PassName, ShaderProgram>,
    failures: HashMap<PassName, ShaderError>,
    compositor: Compositor,
    source: Compositor,
    splat: SplatRenderer,
    session: Option<ImageSession>,
    params: EffectParameters,
    camera: OrbitCamera,
    controls: OrbitControls,
    mode: ViewMode,
}

impl DepthEffectRenderer {
    /// Compiles every program and picks the starting mode.
    ///
    /// Fails only when no mode at all is usable.
    pub fn new(
        engine: RenderEngine,
        shaders: &dyn ShaderSource,
        options: &Options,
    ) -> RenderResult<Self> {
        let compositor = Compositor::new(PassChain::for_layout(options.compositor_layout));
        let source = Compositor::new(PassChain::blit());

        let mut wanted: Vec<PassName> = compositor.chain().programs().collect();
        wanted.extend([PassName::Blit, PassName::Splat]);

        let mut programs = HashMap::new();
        let mut failures = HashMap::new();
        for pass in wanted {
            if programs.contains_key(&pass) {
                continue;
            }
            match compile(&engine, shaders, pass) {
                Ok(program) => {
                    programs.insert(pass, program);
                }
                Err(e) => {
                    log::warn!("{e}");
                    failures.insert(pass, e);
                }
            }
        }

        let mut renderer = Self {
            engine,
            programs,
            failures,
            compositor,
            source,
            splat: SplatRenderer::new(),
            session: None,
            params: options.params.clamped(),
            camera: OrbitCamera::new(),
            controls: OrbitControls::new(),
            mode: options.initial_view_mode,
        };

        if !renderer.is_mode_available(renderer.mode) {
            let fallback = renderer.available_modes().first().copied();
            match fallback {
                Some(mode) => {
                    log::warn!(
                        "view mode '{}' unavailable, starting in '{mode}'",
                        renderer.mode
                    );
                    renderer.mode = mode;
                }
                None => {
                    let first = PassName::ALL
                        .iter()
                        .find_map(|pass| renderer.failures.remove(pass));
                    return Err(first.map_or(
                        RenderError::ModeUnavailable(renderer.mode),
                        RenderError::Shader,
                    ));
                }
            }
        }
        Ok(renderer)
    }

    fn required_programs(&self, mode: ViewMode) -> Vec<PassName> {
        match mode {
            ViewMode::Effect | ViewMode::DepthMap => self.compositor.chain().programs().collect(),
            ViewMode::Splat => vec![PassName::Splat],
            ViewMode::Source => vec![PassName::Blit],
        }
    }

    /// Whether every program `mode` draws with compiled.
    #[must_use]
    pub fn is_mode_available(&self, mode: ViewMode) -> bool {
        self.required_programs(mode)
            .iter()
            .all(|pass| self.programs.contains_key(pass))
    }

    #[must_use]
    pub fn available_modes(&self) -> Vec<ViewMode> {
        ViewMode::ALL
            .into_iter()
            .filter(|&mode| self.is_mode_available(mode))
            .collect()
    }

    /// The compile error of `pass`, if it failed.
    #[must_use]
    pub fn program_error(&self, pass: PassName) -> Option<&ShaderError> {
        self.failures.get(&pass)
    }

    #[must_use]
    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    /// Uploads a new image and its depth map, releasing the previous session.
    pub fn load_image(&mut self, image: &SourceImage, depth_map: &DepthMap) -> RenderResult<()> {
        let session = ImageSession::new(&self.engine, image, depth_map, self.compositor.chain())?;
        if let Some(previous) = self.session.replace(session) {
            previous.release();
        }
        log::info!(
            "loaded image {}x{} with depth map {}x{}",
            image.width(),
            image.height(),
            depth_map.width(),
            depth_map.height()
        );
        Ok(())
    }

    #[must_use]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn session(&self) -> Option<&ImageSession> {
        self.session.as_ref()
    }

    /// Renders the active mode into the next surface frame and presents it.
    pub fn render_frame(&mut self, time: f32) -> RenderResult<()> {
        if self.session.is_none() {
            return Err(RenderError::NoDepthMap);
        }
        let Some(frame) = self.engine.acquire_frame()? else {
            return Ok(());
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let output = OutputTarget {
            view: &view,
            format: self.engine.surface_format(),
            width: frame.texture.width(),
            height: frame.texture.height(),
        };
        self.render_to(output, time)?;
        frame.present();
        Ok(())
    }

    /// Renders the active mode into `output`.
    pub fn render_to(&mut self, output: OutputTarget<'_>, time: f32) -> RenderResult<()> {
        let session = self.session.as_ref().ok_or(RenderError::NoDepthMap)?;
        let frame = FrameUniforms {
            time,
            mode: self.mode,
            params: &self.params,
        };
        match self.mode {
            ViewMode::Effect | ViewMode::DepthMap => {
                self.compositor
                    .render(&self.engine, &mut self.programs, session, frame, output)
            }
            ViewMode::Source => {
                self.source
                    .render(&self.engine, &mut self.programs, session, frame, output)
            }
            ViewMode::Splat => {
                let program = self
                    .programs
                    .get_mut(&PassName::Splat)
                    .ok_or(RenderError::ModeUnavailable(ViewMode::Splat))?;
                self.splat
                    .render(
                        &self.engine,
                        program,
                        session,
                        &self.camera,
                        &self.params,
                        time,
                        output,
                    )
                    .map(|_| ())
            }
        }
    }

    /// Renders one frame off-screen at the engine size and returns its RGBA8 rows.
    pub fn render_to_image(&mut self, time: f32) -> RenderResult<Vec<u8>> {
        let target = self.engine.create_offscreen_target()?;
        self.render_to(target.output(), time)?;
        self.engine.read_pixels(&target)
    }

    /// Switches mode for the next frame. An unavailable mode leaves the current one active.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> RenderResult<()> {
        if !self.is_mode_available(mode) {
            log::warn!("view mode '{mode}' unavailable: its shader program failed to compile");
            return Err(RenderError::ModeUnavailable(mode));
        }
        if mode != self.mode {
            log::info!("view mode: {mode}");
            self.mode = mode;
            if !mode.routes_pointer() {
                self.controls = OrbitControls::new();
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.mode
    }

    #[must_use]
    pub fn params(&self) -> &EffectParameters {
        &self.params
    }

    /// Live parameters; edits apply from the next frame.
    pub fn params_mut(&mut self) -> &mut EffectParameters {
        &mut self.params
    }

    #[must_use]
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Feeds pointer input to the orbit controls while splats are shown.
    /// Returns whether the camera changed.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        if !self.mode.routes_pointer() {
            return false;
        }
        self.controls.handle_event(&mut self.camera, event)
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
        self.controls = OrbitControls::new();
    }

    /// Splats drawn by the last splat frame.
    #[must_use]
    pub fn last_point_count(&self) -> u32 {
        self.splat.last_point_count()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.engine.resize(width, height);
    }

    /// Destroys the session and the splat depth buffer.
    pub fn release(&mut self) {
        if let Some(session) = self.session.take() {
            session.release();
        }
        self.splat.release();
    }
}

fn compile(
    engine: &RenderEngine,
    shaders: &dyn ShaderSource,
    pass: PassName,
) -> Result<ShaderProgram, ShaderError> {
    let descriptor = match pass {
        PassName::Splat => ProgramDescriptor::sprites(SPLAT_DEPTH_FORMAT),
        _ => ProgramDescriptor::fullscreen(),
    };
    shaders.load(pass)?.builder(pass).build(engine, descriptor)
}
