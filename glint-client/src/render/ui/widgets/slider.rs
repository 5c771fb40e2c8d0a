use glam::{Vec2, Vec4};
use glint_core::ParamRange;
use sdl2::mouse::MouseButton;

use crate::{
    other::UpdateContext,
    render::ui::{
        font,
        uirenderer::{DrawCommand, UIRenderer},
        widgets::{LayoutContext, Widget},
    },
};

const TRACK_COLOR: Vec4 = Vec4::new(0.16, 0.29, 0.48, 0.54);
const FILL_COLOR: Vec4 = Vec4::new(0.26, 0.59, 0.98, 0.67);
const ACTIVE_COLOR: Vec4 = Vec4::new(0.26, 0.59, 0.98, 1.0);
const GAP: f32 = 8.0;

/// A horizontal slider over a [`ParamRange`], dragged with the left mouse button.
pub struct Slider {
    pub label: String,
    pub range: ParamRange,
    pub track_size: Vec2,
    pub font_size: f32,
    pub text_color: Vec4,
    pub position: Vec2,
    value: f32,
    dragging: bool,
    changed: bool,
}

impl Slider {
    pub fn new(label: &str, value: f32, range: ParamRange, track_size: Vec2, font_size: f32) -> Self {
        Self {
            label: label.to_string(),
            range,
            track_size,
            font_size,
            text_color: Vec4::ONE,
            position: Vec2::ZERO,
            value: range.clamp(value),
            dragging: false,
            changed: false,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Whether the last update moved the value.
    pub fn changed(&self) -> bool {
        self.changed
    }

    fn track_contains(&self, point: Vec2) -> bool {
        let max = self.position + self.track_size;
        point.cmpge(self.position).all() && point.cmple(max).all()
    }

    fn value_at(&self, x: f32) -> f32 {
        let t = (x - self.position.x) / self.track_size.x.max(1.0);
        self.range.lerp(t)
    }
}

impl Widget for Slider {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn size_hint(&self) -> Vec2 {
        let text = font::measure_text(&self.label, self.font_size);
        Vec2::new(
            self.track_size.x + GAP + text.x,
            self.track_size.y.max(text.y),
        )
    }

    fn update(&mut self, ctx: &UpdateContext) {
        self.changed = false;
        let mouse = ctx.mouse;
        if mouse.pressed.contains(&MouseButton::Left) && self.track_contains(mouse.position) {
            self.dragging = true;
        }
        if !mouse.down.contains(&MouseButton::Left) {
            self.dragging = false;
        }
        if self.dragging {
            let value = self.value_at(mouse.position.x);
            if value != self.value {
                self.value = value;
                self.changed = true;
            }
        }
    }

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        self.position = ctx.cursor;
        self.size_hint()
    }

    fn draw(&self, ui_renderer: &mut UIRenderer) {
        let fill = self.track_size.x * self.range.normalize(self.value);
        let fill_color = if self.dragging { ACTIVE_COLOR } else { FILL_COLOR };
        ui_renderer.add_command(DrawCommand::rect(self.position, self.track_size, TRACK_COLOR));
        ui_renderer.add_command(DrawCommand::rect(
            self.position,
            Vec2::new(fill, self.track_size.y),
            fill_color,
        ));

        let value_text = format!("{:.3}", self.value);
        let value_size = font::measure_text(&value_text, self.font_size);
        let centered = self.position + (self.track_size - value_size) * 0.5;
        ui_renderer.text(&value_text, centered, self.font_size, self.text_color);

        let label_y = self.position.y + (self.track_size.y - self.font_size) * 0.5;
        ui_renderer.text(
            &self.label,
            Vec2::new(self.position.x + self.track_size.x + GAP, label_y),
            self.font_size,
            self.text_color,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use approx::assert_relative_eq;

    use super::*;
    use crate::other::{KeyboardState, MouseState};

    fn slider() -> Slider {
        let mut slider = Slider::new(
            "Roughness X",
            0.5,
            ParamRange::new(0.0, 1.0),
            Vec2::new(200.0, 20.0),
            16.0,
        );
        slider.layout(&LayoutContext {
            max_size: Vec2::splat(1000.0),
            cursor: Vec2::new(10.0, 10.0),
        });
        slider
    }

    fn mouse(position: Vec2, down: bool, pressed: bool) -> MouseState {
        let left = HashSet::from([MouseButton::Left]);
        MouseState {
            position,
            down: if down { left.clone() } else { HashSet::new() },
            pressed: if pressed { left } else { HashSet::new() },
            ..Default::default()
        }
    }

    #[test]
    fn test_new_clamps_initial_value() {
        let slider = Slider::new("Area", 3.0, ParamRange::new(0.01, 1.0), Vec2::ONE, 8.0);
        assert_eq!(slider.value(), 1.0);
    }

    #[test]
    fn test_click_on_track_sets_value() {
        let mut slider = slider();
        let keyboard = KeyboardState::default();
        let mouse = mouse(Vec2::new(60.0, 20.0), true, true);
        slider.update(&UpdateContext::new(&keyboard, &mouse, 0.016));

        assert!(slider.changed());
        assert_relative_eq!(slider.value(), 0.25);
    }

    #[test]
    fn test_drag_continues_outside_track_and_clamps() {
        let mut slider = slider();
        let keyboard = KeyboardState::default();

        let press = mouse(Vec2::new(110.0, 20.0), true, true);
        slider.update(&UpdateContext::new(&keyboard, &press, 0.016));
        let drag = mouse(Vec2::new(900.0, 300.0), true, false);
        slider.update(&UpdateContext::new(&keyboard, &drag, 0.016));
        assert_relative_eq!(slider.value(), 1.0);

        let release = mouse(Vec2::new(10.0, 300.0), false, false);
        slider.update(&UpdateContext::new(&keyboard, &release, 0.016));
        assert!(!slider.changed());
        assert_relative_eq!(slider.value(), 1.0);
    }

    #[test]
    fn test_click_outside_track_is_ignored() {
        let mut slider = slider();
        let keyboard = KeyboardState::default();
        let mouse = mouse(Vec2::new(60.0, 80.0), true, true);
        slider.update(&UpdateContext::new(&keyboard, &mouse, 0.016));
        assert!(!slider.changed());
        assert_relative_eq!(slider.value(), 0.5);
    }

    #[test]
    fn test_size_hint_includes_label() {
        let slider = slider();
        // 11 characters of 12 px plus the gap.
        assert_eq!(slider.size_hint(), Vec2::new(200.0 + GAP + 132.0, 20.0));
    }
}
