//! The glint scene: a spinning sphere with the procedural glint BRDF and a parameter panel.

use std::{f32::consts::TAU, sync::Arc};

use glam::{IVec2, Mat4, Vec2, Vec3, Vec4};
use glint_core::{Camera, CameraMovement, GlintConfig, GlintMaterial};
use glow::HasContext;
use sdl2::keyboard::Keycode;

use crate::{
    abs::ShaderProgram,
    other::{FrameStats, UpdateContext},
    render::{
        dictionary::{self, GpuDictionary},
        model::{self, Model},
        programs,
        ui::{
            uirenderer::UIRenderer,
            widgets::{Column, Label, LayoutContext, Slider, Widget},
        },
    },
    scenes::{Scene, SceneError},
};

/// Radians per second around the Y axis.
const SPIN_SPEED: f32 = 0.1;
/// Mouse offset units applied per frame while an arrow key is held.
const LOOK_STEP: f32 = 5.0;

const CLEAR_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
/// Capabilities set before drawing the model. Faces are never culled.
const MODEL_STATE: [(u32, bool); 3] = [
    (glow::DEPTH_TEST, true),
    (glow::CULL_FACE, false),
    (glow::BLEND, false),
];

const PANEL_ORIGIN: Vec2 = Vec2::new(10.0, 10.0);
const FONT_SIZE: f32 = 16.0;
const TRACK_SIZE: Vec2 = Vec2::new(220.0, 20.0);

// Indices of the panel children.
const ROUGHNESS_X: usize = 1;
const ROUGHNESS_Y: usize = 2;
const LOG_DENSITY: usize = 3;
const RELATIVE_AREA: usize = 4;
const FRAME_TIME: usize = 5;

struct GpuResources {
    program: ShaderProgram,
    dictionary: GpuDictionary,
    model: Model,
}

pub struct SceneGlint {
    gl: Arc<glow::Context>,
    config: GlintConfig,
    introspect: bool,
    resources: Option<GpuResources>,

    width: u32,
    height: u32,
    camera: Camera,
    projection: Mat4,
    light_position: Vec4,
    light_radiance: Vec3,
    material: GlintMaterial,
    object_orientation: f32,
    t_prev: f32,

    panel: Column,
    frame_stats: FrameStats,
}

impl SceneGlint {
    pub fn new(gl: &Arc<glow::Context>, config: &GlintConfig, introspect: bool) -> Self {
        let material = config.material.clamped();
        Self {
            gl: Arc::clone(gl),
            config: config.clone(),
            introspect,
            resources: None,
            width: config.window.width,
            height: config.window.height,
            camera: Camera::new(Vec3::from_array(config.camera.position)),
            projection: Mat4::IDENTITY,
            light_position: Vec4::from_array(config.light.position),
            light_radiance: Vec3::from_array(config.light.radiance),
            material,
            object_orientation: 0.0,
            t_prev: 0.0,
            panel: build_panel(&material),
            frame_stats: FrameStats::default(),
        }
    }

    fn process_input(&mut self, ctx: &UpdateContext, delta_time: f32) {
        let moves = [
            (Keycode::W, CameraMovement::Forward),
            (Keycode::S, CameraMovement::Backward),
            (Keycode::A, CameraMovement::Left),
            (Keycode::D, CameraMovement::Right),
        ];
        for (key, movement) in moves {
            if ctx.key_down(key) {
                self.camera.process_keyboard(movement, delta_time);
            }
        }

        let looks = [
            (Keycode::Left, -LOOK_STEP, 0.0),
            (Keycode::Right, LOOK_STEP, 0.0),
            (Keycode::Up, 0.0, LOOK_STEP),
            (Keycode::Down, 0.0, -LOOK_STEP),
        ];
        for (key, x, y) in looks {
            if ctx.key_down(key) {
                self.camera.process_look(x, y);
            }
        }
    }

    fn sync_panel(&mut self) {
        let targets = [
            (ROUGHNESS_X, &mut self.material.alpha_x),
            (ROUGHNESS_Y, &mut self.material.alpha_y),
            (LOG_DENSITY, &mut self.material.log_microfacet_density),
            (RELATIVE_AREA, &mut self.material.microfacet_relative_area),
        ];
        for (index, target) in targets {
            let Some(slider) = self.panel.get_widget::<Slider>(index) else {
                continue;
            };
            if slider.changed() {
                *target = slider.value();
                log::debug!("{} = {:.3}", slider.label, slider.value());
            }
        }

        let summary = self.frame_stats.summary();
        if let Some(label) = self.panel.get_widget_mut::<Label>(FRAME_TIME) {
            label.set_text(&summary);
        }
    }

    fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(180f32.to_radians() + self.object_orientation)
    }
}

fn build_panel(material: &GlintMaterial) -> Column {
    let mut panel = Column::new(6.0, Vec4::new(10.0, 8.0, 10.0, 8.0))
        .with_background(Vec4::new(0.06, 0.06, 0.06, 0.94));
    panel.add_widget(Label::new("Parameters", FONT_SIZE, Vec4::ONE));
    let sliders = [
        ("Roughness X", material.alpha_x, GlintMaterial::ROUGHNESS_RANGE),
        ("Roughness Y", material.alpha_y, GlintMaterial::ROUGHNESS_RANGE),
        (
            "Log microfacet density",
            material.log_microfacet_density,
            GlintMaterial::LOG_DENSITY_RANGE,
        ),
        (
            "Microfacet relative area",
            material.microfacet_relative_area,
            GlintMaterial::RELATIVE_AREA_RANGE,
        ),
    ];
    for (label, value, range) in sliders {
        panel.add_widget(Slider::new(label, value, range, TRACK_SIZE, FONT_SIZE));
    }
    panel.add_widget(Label::new("", FONT_SIZE * 0.75, Vec4::ONE));
    panel
}

/// Frame delta from two absolute times, zero on the first frame.
fn frame_delta(t_prev: f32, t: f32) -> f32 {
    if t_prev == 0.0 { 0.0 } else { t - t_prev }
}

impl Scene for SceneGlint {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn init(&mut self) -> Result<(), SceneError> {
        let assets = &self.config.assets;
        let mut program = programs::build_program(
            &self.gl,
            &["glint.vert.glsl", "glint.frag.glsl"],
            assets.shader_dir.as_deref(),
            &model::ATTRIBUTE_NAMES,
        )?;
        program.use_program()?;
        if self.introspect {
            log::info!(
                "Glint program {:?}, linked: {}",
                program.handle(),
                program.is_linked()
            );
            if let Err(e) = program.validate() {
                log::warn!("{e}");
            }
            program.log_active_attributes();
            program.log_active_uniforms();
            program.log_active_uniform_blocks();
        }

        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
            let [r, g, b, a] = CLEAR_COLOR.to_array();
            self.gl.clear_color(r, g, b, a);
        }

        program.set_uniform("Light.L", self.light_radiance);
        program.set_uniform("Light.Position", self.light_position);

        let layout = self.config.dictionary_layout()?;
        let dictionary = GpuDictionary::load(&self.gl, &layout)?;
        dictionary.bind();
        dictionary::apply_dictionary_uniforms(&mut program, &dictionary.params());

        program.set_uniform("CameraPosition", self.camera.position);

        let model = Model::load(&self.gl, assets.model.as_deref())?;

        self.resources = Some(GpuResources {
            program,
            dictionary,
            model,
        });
        Ok(())
    }

    fn update(&mut self, time: f32, ctx: &UpdateContext) {
        let delta_time = frame_delta(self.t_prev, time);
        self.t_prev = time;
        self.object_orientation =
            (self.object_orientation + delta_time * SPIN_SPEED).rem_euclid(TAU);

        self.frame_stats.push(ctx.delta_time);
        self.panel.update(ctx);
        self.sync_panel();
        self.process_input(ctx, delta_time);

        let Some(resources) = self.resources.as_mut() else {
            return;
        };
        let program = &mut resources.program;
        if let Err(e) = program.use_program() {
            log::error!("{e}");
            return;
        }
        program.set_uniform("CameraPosition", self.camera.position);
        program.set_uniform("MicrofacetRelativeArea", self.material.microfacet_relative_area);
        program.set_uniform("MaxAnisotropy", self.material.max_anisotropy);
        program.set_uniform(
            "Material.LogMicrofacetDensity",
            self.material.log_microfacet_density,
        );
    }

    fn render(&mut self, ui: &mut UIRenderer) {
        unsafe {
            for (capability, enabled) in MODEL_STATE {
                if enabled {
                    self.gl.enable(capability);
                } else {
                    self.gl.disable(capability);
                }
            }
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let model_matrix = self.model_matrix();
        let mvp = self.projection * self.camera.view_matrix() * model_matrix;
        if let Some(resources) = self.resources.as_mut() {
            let program = &mut resources.program;
            match program.use_program() {
                Ok(()) => {
                    resources.dictionary.bind();
                    program.set_uniform("Light.Position", self.light_position);
                    program.set_uniform("Material.Alpha_x", self.material.alpha_x);
                    program.set_uniform("Material.Alpha_y", self.material.alpha_y);
                    program.set_uniform("ModelMatrix", model_matrix);
                    program.set_uniform("MVP", mvp);
                    resources.model.draw();
                }
                Err(e) => log::error!("{e}"),
            }
        }

        ui.begin();
        self.panel.layout(&LayoutContext {
            max_size: Vec2::new(self.width as f32, self.height as f32) - PANEL_ORIGIN,
            cursor: PANEL_ORIGIN,
        });
        self.panel.draw(ui);
        ui.finish();
    }

    fn resize(&mut self, width: u32, height: u32) {
        unsafe {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
        self.width = width;
        self.height = height;

        let camera = &self.config.camera;
        let aspect = width as f32 / height.max(1) as f32;
        self.projection = Mat4::perspective_rh_gl(
            camera.fov_degrees.to_radians(),
            aspect,
            camera.near,
            camera.far,
        );

        if let Some(resources) = self.resources.as_mut() {
            let program = &mut resources.program;
            if program.use_program().is_ok() {
                program.set_uniform("Resolution", IVec2::new(width as i32, height as i32));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_has_no_delta() {
        assert_eq!(frame_delta(0.0, 3.5), 0.0);
        assert_eq!(frame_delta(1.0, 1.25), 0.25);
    }

    #[test]
    fn test_model_pass_keeps_every_face() {
        assert!(MODEL_STATE.contains(&(glow::CULL_FACE, false)));
        assert!(MODEL_STATE.contains(&(glow::DEPTH_TEST, true)));
        assert_eq!(CLEAR_COLOR, Vec4::W);
    }

    #[test]
    fn test_panel_reflects_material() {
        let material = GlintMaterial {
            alpha_x: 0.2,
            log_microfacet_density: 30.0,
            ..Default::default()
        };
        let panel = build_panel(&material);
        assert_eq!(panel.widgets.len(), 6);
        assert_eq!(panel.get_widget::<Slider>(ROUGHNESS_X).unwrap().value(), 0.2);
        assert_eq!(panel.get_widget::<Slider>(ROUGHNESS_Y).unwrap().value(), 0.5);
        assert_eq!(panel.get_widget::<Slider>(LOG_DENSITY).unwrap().value(), 30.0);
        let area = panel.get_widget::<Slider>(RELATIVE_AREA).unwrap();
        assert_eq!(area.range, GlintMaterial::RELATIVE_AREA_RANGE);
        assert!(panel.get_widget::<Label>(FRAME_TIME).is_some());
    }
}
