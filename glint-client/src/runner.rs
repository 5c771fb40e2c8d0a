//! Owns the window and drives a [`Scene`] frame by frame.

use std::time::Instant;

use glint_core::GlintConfig;
use glow::HasContext;
use sdl2::{event::Event, event::WindowEvent, keyboard::Keycode};

use crate::{
    abs::{App, check_gl_errors},
    other::InputState,
    render::ui::uirenderer::UIRenderer,
    scenes::{Scene, SceneError},
};

pub struct SceneRunner {
    app: App,
    ui: UIRenderer,
    debug: bool,
}

impl SceneRunner {
    pub fn new(config: &GlintConfig) -> Result<Self, SceneError> {
        let app = App::new(&config.window.title, &config.window, &config.gl)
            .map_err(SceneError::Window)?;
        let (width, height) = app.drawable_size();
        let ui = UIRenderer::new(&app.gl, width, height)?;

        Ok(Self {
            app,
            ui,
            debug: config.gl.debug,
        })
    }

    pub fn gl(&self) -> &std::sync::Arc<glow::Context> {
        &self.app.gl
    }

    /// Runs `scene` until the window closes or Escape is pressed.
    pub fn run(&mut self, scene: &mut dyn Scene) -> Result<(), SceneError> {
        let (width, height) = self.app.drawable_size();
        scene.set_dimensions(width, height);
        scene.init()?;
        scene.resize(width, height);

        let mut input = InputState::default();
        let start = Instant::now();
        let mut last_frame = start;

        'running: loop {
            check_gl_errors(&self.app.gl, "frame");

            input.begin_frame();
            for event in self.app.event_pump.poll_iter() {
                match event {
                    Event::Quit { .. }
                    | Event::KeyDown {
                        keycode: Some(Keycode::Escape),
                        ..
                    } => break 'running,
                    Event::Window {
                        win_event: WindowEvent::SizeChanged(..),
                        ..
                    } => {
                        let (width, height) = self.app.window.drawable_size();
                        scene.resize(width, height);
                        self.ui.resize(width, height);
                    }
                    _ => {}
                }
                input.handle_event(&event);
                scene.handle_event(&event);
            }

            let now = Instant::now();
            let delta_time = now.duration_since(last_frame).as_secs_f32();
            last_frame = now;

            scene.update(start.elapsed().as_secs_f32(), &input.context(delta_time));
            scene.render(&mut self.ui);
            self.app.window.gl_swap_window();
        }

        if self.debug {
            unsafe {
                self.app.gl.debug_message_insert(
                    glow::DEBUG_SOURCE_APPLICATION,
                    glow::DEBUG_TYPE_MARKER,
                    1,
                    glow::DEBUG_SEVERITY_NOTIFICATION,
                    "End debug",
                );
            }
        }
        log::info!("Exiting");
        Ok(())
    }
}
