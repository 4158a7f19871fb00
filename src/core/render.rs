use crate::core::prelude::*;
use crate::resource::Texture;
use crate::util::collision::{Obb, Polygonal};

/// The drawing collaborator. Implementations own the window and whatever graphics API sits
/// behind it; the scene only describes what to draw, in world coordinates.
pub trait RenderBackend {
    /// Draws `texture` at `size` scaled pixels, positioned and rotated by `world` about `pivot`
    /// (scaled pixels from the sprite's top-left corner). Scale in `world` is ignored.
    fn draw_sprite(
        &mut self,
        texture: Texture,
        world: &Mat3x3,
        size: Vec2,
        pivot: Vec2,
        tint: Colour,
    );
    fn draw_line(&mut self, start: Vec2, end: Vec2, col: Colour);
    fn draw_circle(&mut self, centre: Vec2, radius: f32, col: Colour);

    fn draw_polygon(&mut self, vertices: &[Vec2], col: Colour) {
        for (start, end) in vertices.iter().circular_tuple_windows() {
            self.draw_line(*start, *end, col);
        }
    }
    fn draw_obb(&mut self, obb: &Obb, col: Colour) {
        self.draw_polygon(obb.vertices(), col);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    Sprite {
        texture: Texture,
        world: Mat3x3,
        size: Vec2,
        pivot: Vec2,
        tint: Colour,
    },
    Line {
        start: Vec2,
        end: Vec2,
        col: Colour,
    },
    Circle {
        centre: Vec2,
        radius: f32,
        col: Colour,
    },
}

/// Headless backend that records every call, for tests and the demo binary.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<RenderCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn sprite_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::Sprite { .. }))
            .count()
    }
    pub fn lines_with(&self, col: Colour) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::Line { col: line_col, .. } if *line_col == col))
            .count()
    }
}

impl RenderBackend for RecordingRenderer {
    fn draw_sprite(
        &mut self,
        texture: Texture,
        world: &Mat3x3,
        size: Vec2,
        pivot: Vec2,
        tint: Colour,
    ) {
        self.commands.push(RenderCommand::Sprite {
            texture,
            world: *world,
            size,
            pivot,
            tint,
        });
    }

    fn draw_line(&mut self, start: Vec2, end: Vec2, col: Colour) {
        self.commands.push(RenderCommand::Line { start, end, col });
    }

    fn draw_circle(&mut self, centre: Vec2, radius: f32, col: Colour) {
        self.commands
            .push(RenderCommand::Circle { centre, radius, col });
    }
}
