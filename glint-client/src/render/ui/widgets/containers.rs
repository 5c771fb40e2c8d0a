//! Containers that can hold multiple widgets.

use glam::{Vec2, Vec4};

use crate::{
    other::UpdateContext,
    render::ui::{
        uirenderer::{DrawCommand, UIRenderer},
        widgets::{LayoutContext, Widget},
    },
};

/// A vertical column container that arranges its child widgets top to bottom.
pub struct Column {
    pub widgets: Vec<Box<dyn Widget>>,
    pub spacing: f32,
    /// Left, top, right and bottom padding.
    pub padding: Vec4,
    /// Fill color drawn behind the children.
    pub background: Option<Vec4>,
    pub min_size: Vec2,
    position: Vec2,
    size: Vec2,
}

impl Column {
    pub fn new(spacing: f32, padding: Vec4) -> Self {
        Self {
            widgets: Vec::new(),
            spacing,
            padding,
            background: None,
            min_size: Vec2::ZERO,
            position: Vec2::ZERO,
            size: Vec2::ZERO,
        }
    }

    pub fn with_background(mut self, color: Vec4) -> Self {
        self.background = Some(color);
        self
    }

    /// Adds a widget to the column.
    pub fn add_widget<T: Widget + 'static>(&mut self, widget: T) {
        self.widgets.push(Box::new(widget));
    }

    /// Gets a certain widget by index.
    pub fn get_widget<T: Widget + 'static>(&self, index: usize) -> Option<&T> {
        self.widgets.get(index)?.as_any().downcast_ref::<T>()
    }

    /// Gets a certain widget by index as mutable.
    pub fn get_widget_mut<T: Widget + 'static>(&mut self, index: usize) -> Option<&mut T> {
        self.widgets
            .get_mut(index)?
            .as_any_mut()
            .downcast_mut::<T>()
    }
}

impl Widget for Column {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn size_hint(&self) -> Vec2 {
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;

        for widget in &self.widgets {
            let size = widget.size_hint();
            width = width.max(size.x);
            height += size.y;
        }

        height += self.spacing * (self.widgets.len().saturating_sub(1)) as f32;
        width += self.padding.x + self.padding.z;
        height += self.padding.y + self.padding.w;

        Vec2::new(width, height).max(self.min_size)
    }

    fn update(&mut self, ctx: &UpdateContext) {
        for widget in &mut self.widgets {
            widget.update(ctx);
        }
    }

    fn layout(&mut self, ctx: &LayoutContext) -> Vec2 {
        let inner_width = ctx.max_size.x - self.padding.x - self.padding.z;
        let mut cursor = ctx.cursor + Vec2::new(self.padding.x, self.padding.y);

        for widget in self.widgets.iter_mut() {
            let widget_size = widget.size_hint();
            let layout_ctx = LayoutContext {
                max_size: Vec2::new(inner_width, widget_size.y),
                cursor,
            };
            widget.layout(&layout_ctx);
            cursor.y += widget_size.y + self.spacing;
        }

        self.position = ctx.cursor;
        self.size = self.size_hint();
        self.size
    }

    fn draw(&self, ui_renderer: &mut UIRenderer) {
        if let Some(color) = self.background {
            ui_renderer.add_command(DrawCommand::rect(self.position, self.size, color));
        }
        for widget in &self.widgets {
            widget.draw(ui_renderer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ui::widgets::Label;

    #[test]
    fn test_column_stacks_children_inside_padding() {
        let mut column = Column::new(4.0, Vec4::new(10.0, 6.0, 10.0, 6.0));
        column.add_widget(Label::new("Parameters", 16.0, Vec4::ONE));
        column.add_widget(Label::new("FPS", 8.0, Vec4::ONE));

        let size = column.layout(&LayoutContext {
            max_size: Vec2::new(400.0, 400.0),
            cursor: Vec2::new(20.0, 30.0),
        });

        // Widest child is 120 px, heights 16 + 4 + 8.
        assert_eq!(size, Vec2::new(140.0, 40.0));
        assert_eq!(column.position, Vec2::new(20.0, 30.0));

        let first = column.get_widget::<Label>(0).unwrap();
        let second = column.get_widget::<Label>(1).unwrap();
        assert_eq!(first.position, Vec2::new(30.0, 36.0));
        assert_eq!(second.position, Vec2::new(30.0, 56.0));
    }

    #[test]
    fn test_get_widget_checks_type() {
        let mut column = Column::new(0.0, Vec4::ZERO);
        column.add_widget(Label::new("A", 8.0, Vec4::ONE));
        assert!(column.get_widget::<Column>(0).is_none());
        assert!(column.get_widget_mut::<Label>(0).is_some());
        assert!(column.get_widget::<Label>(1).is_none());
    }
}
