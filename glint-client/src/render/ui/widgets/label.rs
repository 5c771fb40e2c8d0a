use glam::{Vec2, Vec4};

use crate::render::ui::{
    font,
    uirenderer::UIRenderer,
    widgets::{LayoutContext, Widget},
};

/// A line (or several) of static text.
pub struct Label {
    pub text: String,
    pub position: Vec2,
    pub font_size: f32,
    pub color: Vec4,
}

impl Label {
    pub fn new(text: &str, font_size: f32, color: Vec4) -> Self {
        Self {
            text: text.to_string(),
            position: Vec2::ZERO,
            font_size,
            color,
        }
    }

    pub fn set_text(&mut self, text: &str) {
        if self.text != text {
            self.text.clear();
            self.text.push_str(text);
        }
    }
}

impl Widget for Label {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn size_hint(&self) -> Vec2 {
        font::measure_text(&self.text, self.font_size)
    }

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        self.position = ctx.cursor;
        self.size_hint().min(ctx.max_size)
    }

    fn draw(&self, ui_renderer: &mut UIRenderer) {
        ui_renderer.text(&self.text, self.position, self.font_size, self.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_layout_clamps_to_available_space() {
        let mut label = Label::new("Parameters", 16.0, Vec4::ONE);
        assert_eq!(label.size_hint(), Vec2::new(120.0, 16.0));

        let size = label.layout(&LayoutContext {
            max_size: Vec2::new(100.0, 50.0),
            cursor: Vec2::new(8.0, 4.0),
        });
        assert_eq!(size, Vec2::new(100.0, 16.0));
        assert_eq!(label.position, Vec2::new(8.0, 4.0));
    }
}
