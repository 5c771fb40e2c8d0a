use std::collections::{HashSet, VecDeque};

use glam::Vec2;
use sdl2::{event::Event, keyboard::Keycode, mouse::MouseButton};

/// The current state of the keyboard.
#[derive(Default)]
pub struct KeyboardState {
    pub down: HashSet<Keycode>,
    pub pressed: HashSet<Keycode>,
    pub released: HashSet<Keycode>,
}

/// The current state of the mouse.
#[derive(Default)]
pub struct MouseState {
    pub position: Vec2,
    pub delta: Vec2,
    pub down: HashSet<MouseButton>,
    pub pressed: HashSet<MouseButton>,
    pub released: HashSet<MouseButton>,
}

/// Keyboard and mouse state accumulated from SDL events.
#[derive(Default)]
pub struct InputState {
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
}

impl InputState {
    /// Clears the per-frame edges. Call once before polling a frame's events.
    pub fn begin_frame(&mut self) {
        self.mouse.delta = Vec2::ZERO;
        self.mouse.pressed.clear();
        self.mouse.released.clear();
        self.keyboard.pressed.clear();
        self.keyboard.released.clear();
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::MouseMotion {
                x, y, xrel, yrel, ..
            } => {
                self.mouse.position = Vec2::new(*x as f32, *y as f32);
                self.mouse.delta += Vec2::new(*xrel as f32, *yrel as f32);
            }
            Event::MouseButtonDown { mouse_btn, x, y, .. } => {
                self.mouse.position = Vec2::new(*x as f32, *y as f32);
                self.mouse.down.insert(*mouse_btn);
                self.mouse.pressed.insert(*mouse_btn);
            }
            Event::MouseButtonUp { mouse_btn, x, y, .. } => {
                self.mouse.position = Vec2::new(*x as f32, *y as f32);
                self.mouse.down.remove(mouse_btn);
                self.mouse.released.insert(*mouse_btn);
            }
            Event::KeyDown {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => {
                self.keyboard.down.insert(*keycode);
                self.keyboard.pressed.insert(*keycode);
            }
            Event::KeyUp {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => {
                self.keyboard.down.remove(keycode);
                self.keyboard.released.insert(*keycode);
            }
            _ => {}
        }
    }

    pub fn context(&self, delta_time: f32) -> UpdateContext<'_> {
        UpdateContext::new(&self.keyboard, &self.mouse, delta_time)
    }
}

/// Context provided to scenes and widgets during the update phase.
pub struct UpdateContext<'a> {
    pub keyboard: &'a KeyboardState,
    pub mouse: &'a MouseState,
    pub delta_time: f32,
}

impl<'a> UpdateContext<'a> {
    /// Creates a new `UpdateContext` from the given keyboard and mouse states and delta time.
    pub fn new(keyboard: &'a KeyboardState, mouse: &'a MouseState, delta_time: f32) -> Self {
        Self {
            keyboard,
            mouse,
            delta_time,
        }
    }

    pub fn key_down(&self, key: Keycode) -> bool {
        self.keyboard.down.contains(&key)
    }
}

/// Rolling average of frame durations.
pub struct FrameStats {
    window: usize,
    samples: VecDeque<f32>,
    total: f32,
}

impl FrameStats {
    pub const DEFAULT_WINDOW: usize = 120;

    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            samples: VecDeque::with_capacity(window),
            total: 0.0,
        }
    }

    /// Records one frame duration in seconds.
    pub fn push(&mut self, seconds: f32) {
        if self.samples.len() == self.window {
            if let Some(oldest) = self.samples.pop_front() {
                self.total -= oldest;
            }
        }
        self.samples.push_back(seconds);
        self.total += seconds;
    }

    /// Average frame time in milliseconds, 0 before the first frame.
    pub fn average_ms(&self) -> f32 {
        if self.samples.is_empty() {
            0.0
        } else {
            1000.0 * self.total / self.samples.len() as f32
        }
    }

    pub fn fps(&self) -> f32 {
        let ms = self.average_ms();
        if ms > 0.0 { 1000.0 / ms } else { 0.0 }
    }

    pub fn summary(&self) -> String {
        format!(
            "Application average {:.3} ms/frame ({:.1} FPS)",
            self.average_ms(),
            self.fps()
        )
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_stats_average_over_window() {
        let mut stats = FrameStats::new(4);
        assert_eq!(stats.average_ms(), 0.0);
        assert_eq!(stats.fps(), 0.0);

        for _ in 0..4 {
            stats.push(0.010);
        }
        approx::assert_relative_eq!(stats.average_ms(), 10.0, epsilon = 1e-4);

        // The 10 ms frames roll out of the window.
        for _ in 0..4 {
            stats.push(0.020);
        }
        approx::assert_relative_eq!(stats.average_ms(), 20.0, epsilon = 1e-4);
        approx::assert_relative_eq!(stats.fps(), 50.0, epsilon = 1e-2);
    }

    #[test]
    fn test_frame_stats_summary() {
        let mut stats = FrameStats::default();
        stats.push(0.016);
        assert_eq!(
            stats.summary(),
            "Application average 16.000 ms/frame (62.5 FPS)"
        );
    }

    #[test]
    fn test_input_edges_reset_each_frame() {
        let mut input = InputState::default();
        input.handle_event(&Event::MouseButtonDown {
            timestamp: 0,
            window_id: 0,
            which: 0,
            mouse_btn: MouseButton::Left,
            clicks: 1,
            x: 12,
            y: 34,
        });
        assert!(input.mouse.pressed.contains(&MouseButton::Left));
        assert_eq!(input.mouse.position, Vec2::new(12.0, 34.0));

        input.begin_frame();
        assert!(input.mouse.pressed.is_empty());
        assert!(input.mouse.down.contains(&MouseButton::Left));

        input.handle_event(&Event::MouseButtonUp {
            timestamp: 0,
            window_id: 0,
            which: 0,
            mouse_btn: MouseButton::Left,
            clicks: 1,
            x: 12,
            y: 34,
        });
        assert!(input.mouse.down.is_empty());
        assert!(input.mouse.released.contains(&MouseButton::Left));
    }
}
