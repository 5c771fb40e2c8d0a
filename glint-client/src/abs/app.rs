//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application.

use std::sync::Arc;

use glint_core::config::{GlConfig, WindowConfig};
use glow::HasContext;

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Opens a window with a core profile context as described by the config.
    pub fn new(title: &str, window_config: &WindowConfig, gl_config: &GlConfig) -> Result<Self, String> {
        let sdl = sdl2::init()?;
        let video_subsystem = sdl.video()?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(gl_config.major, gl_config.minor);
        if gl_config.debug {
            gl_attr.set_context_flags().forward_compatible().debug().set();
        } else {
            gl_attr.set_context_flags().forward_compatible().set();
        }
        if window_config.samples > 0 {
            gl_attr.set_multisample_buffers(1);
            gl_attr.set_multisample_samples(window_config.samples);
        }

        let mut builder = video_subsystem.window(title, window_config.width, window_config.height);
        builder.opengl();
        if window_config.resizable {
            builder.resizable();
        }
        let window = builder.build().map_err(|e| e.to_string())?;

        let gl_context = window.gl_create_context()?;
        window.gl_make_current(&gl_context)?;
        let interval = if window_config.vsync {
            sdl2::video::SwapInterval::VSync
        } else {
            sdl2::video::SwapInterval::Immediate
        };
        if let Err(e) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("Unable to set swap interval: {e}");
        }

        let mut gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        if gl_config.debug {
            install_debug_callback(&mut gl);
        }
        dump_gl_info(&gl);

        let event_pump = sdl.event_pump()?;
        let gl = Arc::new(gl);

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl,
            event_pump,
        })
    }

    /// Size of the default framebuffer in pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }
}

fn dump_gl_info(gl: &glow::Context) {
    unsafe {
        log::info!("GL Vendor    : {}", gl.get_parameter_string(glow::VENDOR));
        log::info!("GL Renderer  : {}", gl.get_parameter_string(glow::RENDERER));
        log::info!("GL Version   : {}", gl.get_parameter_string(glow::VERSION));
        log::info!(
            "GLSL Version : {}",
            gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION)
        );
    }
    let version = gl.version();
    log::debug!("GL Version (parsed): {}.{}", version.major, version.minor);
}

/// Forwards driver debug messages to the log. Requires a debug context and `KHR_debug`.
fn install_debug_callback(gl: &mut glow::Context) {
    if !gl.supports_debug() {
        log::warn!("Debug context requested but KHR_debug is not available");
        return;
    }
    unsafe {
        gl.enable(glow::DEBUG_OUTPUT);
        gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
        gl.debug_message_callback(|source, msg_type, id, severity, message| {
            let level = match severity {
                glow::DEBUG_SEVERITY_HIGH => log::Level::Error,
                glow::DEBUG_SEVERITY_MEDIUM => log::Level::Warn,
                glow::DEBUG_SEVERITY_LOW => log::Level::Info,
                _ => log::Level::Debug,
            };
            log::log!(
                target: "gl",
                level,
                "{}:{}[{}]({}): {}",
                debug_source_name(source),
                debug_type_name(msg_type),
                severity_name(severity),
                id,
                message
            );
        });
        gl.debug_message_control(glow::DONT_CARE, glow::DONT_CARE, glow::DONT_CARE, &[], true);
        gl.debug_message_insert(
            glow::DEBUG_SOURCE_APPLICATION,
            glow::DEBUG_TYPE_MARKER,
            0,
            glow::DEBUG_SEVERITY_NOTIFICATION,
            "Start debugging",
        );
    }
}

fn debug_source_name(source: u32) -> &'static str {
    match source {
        glow::DEBUG_SOURCE_WINDOW_SYSTEM => "WindowSys",
        glow::DEBUG_SOURCE_APPLICATION => "App",
        glow::DEBUG_SOURCE_API => "OpenGL",
        glow::DEBUG_SOURCE_SHADER_COMPILER => "ShaderCompiler",
        glow::DEBUG_SOURCE_THIRD_PARTY => "3rdParty",
        _ => "Other",
    }
}

fn debug_type_name(msg_type: u32) -> &'static str {
    match msg_type {
        glow::DEBUG_TYPE_ERROR => "Error",
        glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated",
        glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined",
        glow::DEBUG_TYPE_PORTABILITY => "Portability",
        glow::DEBUG_TYPE_PERFORMANCE => "Performance",
        glow::DEBUG_TYPE_MARKER => "Marker",
        glow::DEBUG_TYPE_PUSH_GROUP => "PushGrp",
        glow::DEBUG_TYPE_POP_GROUP => "PopGrp",
        _ => "Other",
    }
}

fn severity_name(severity: u32) -> &'static str {
    match severity {
        glow::DEBUG_SEVERITY_HIGH => "HIGH",
        glow::DEBUG_SEVERITY_MEDIUM => "MED",
        glow::DEBUG_SEVERITY_LOW => "LOW",
        _ => "NOTIFY",
    }
}

/// Name of a `glGetError` code.
pub fn gl_error_name(error: u32) -> &'static str {
    match error {
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        _ => "Unknown error",
    }
}

/// Drains the GL error queue, logging every error. Returns whether any error was pending.
pub fn check_gl_errors(gl: &glow::Context, location: &str) -> bool {
    let mut found = false;
    loop {
        let error = unsafe { gl.get_error() };
        if error == glow::NO_ERROR {
            break;
        }
        log::error!("{location}: {}", gl_error_name(error));
        found = true;
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names() {
        assert_eq!(gl_error_name(glow::INVALID_OPERATION), "GL_INVALID_OPERATION");
        assert_eq!(gl_error_name(0xdead), "Unknown error");
    }

    #[test]
    fn test_debug_names() {
        assert_eq!(debug_source_name(glow::DEBUG_SOURCE_SHADER_COMPILER), "ShaderCompiler");
        assert_eq!(debug_type_name(glow::DEBUG_TYPE_PERFORMANCE), "Performance");
        assert_eq!(severity_name(glow::DEBUG_SEVERITY_NOTIFICATION), "NOTIFY");
    }
}
