//! Widgets of the parameter panel.
//!
//! Each frame runs `update` with the input state, then `layout` from the root container down,
//! then `draw`, which only queues commands on the [`UIRenderer`].

use glam::Vec2;

use super::uirenderer::UIRenderer;
use crate::other::UpdateContext;

/// Space offered to a widget during layout, in pixels from the top left corner.
pub struct LayoutContext {
    pub max_size: Vec2,
    pub cursor: Vec2,
}

pub trait Widget {
    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;

    /// Preferred size, independent of the space offered.
    fn size_hint(&self) -> Vec2;

    /// Reacts to input. Static widgets keep the default.
    fn update(&mut self, _ctx: &UpdateContext) {}

    /// Places the widget at `ctx.cursor` and returns the size it takes.
    fn layout(&mut self, ctx: &LayoutContext) -> Vec2;

    fn draw(&self, ui_renderer: &mut UIRenderer);
}

pub mod containers;
pub mod label;
pub mod slider;

pub use containers::*;
pub use label::*;
pub use slider::*;
