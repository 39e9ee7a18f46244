use crate::adaptor::{ImageRef, TextureId};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255, a: 255 };
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Half-open: the right and bottom edges belong to the next rect over.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.x + self.width <= other.x
            || other.x + other.width <= self.x
            || self.y + self.height <= other.y
            || other.y + other.height <= self.y)
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    pub fn inset(&self, amount: f32) -> Rect {
        Rect {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - amount * 2.0).max(0.0),
            height: (self.height - amount * 2.0).max(0.0),
        }
    }

    pub fn scale(&self, sx: f32, sy: f32) -> Rect {
        Rect::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }
}

/// One primitive recorded by the renderer during the paint pass.
///
/// Coordinates are logical; the adaptor applies the frame's scale factor.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clip { rect: Rect },
    PopClip,
    DrawRect {
        rect: Rect,
        color: Option<Color>,
        border_radius: f32,
        border_width: f32,
        border_color: Option<Color>,
    },
    DrawText {
        text: String,
        rect: Rect,
        color: Color,
        font_size: f32,
        font: Option<usize>,
    },
    DrawImage {
        image: ImageRef,
        rect: Rect,
        border_radius: f32,
    },
    DrawTexture {
        texture: TextureId,
        rect: Rect,
    },
}

impl DrawCommand {
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            DrawCommand::Clip { rect } => Some(*rect),
            DrawCommand::PopClip => None,
            DrawCommand::DrawRect { rect, .. } => Some(*rect),
            DrawCommand::DrawText { rect, .. } => Some(*rect),
            DrawCommand::DrawImage { rect, .. } => Some(*rect),
            DrawCommand::DrawTexture { rect, .. } => Some(*rect),
        }
    }
}

pub trait TextMeasurer {
    fn measure_text(&self, text: &str, font_size: f32) -> (f32, f32);
}
