pub mod winit_backend;

use lumen::taffy::prelude::{FlexDirection, Size, Style, length};
use lumen::{Block, Color, Context, Label, TextBox, Viewport};

/// A label, a text box and a clipped swatch, laid out in a column.
pub fn build_form(context: &mut Context, width: f32, height: f32) -> anyhow::Result<()> {
    if let Ok(path) = std::env::var("LUMEN_FONT") {
        context.load_font("body", &path)?;
    }

    let doc = context.document_mut();
    doc.set_viewport(Viewport::new(width, height));

    let body = doc.set_body(
        Block::new().with_background(Color::rgb(245, 245, 245)),
        Style {
            flex_direction: FlexDirection::Column,
            gap: Size { width: length(8.0), height: length(8.0) },
            padding: lumen::taffy::geometry::Rect {
                left: length(16.0),
                right: length(16.0),
                top: length(16.0),
                bottom: length(16.0),
            },
            size: Size { width: length(width), height: length(height) },
            ..Style::default()
        },
    )?;

    doc.append(body, Label::new("Name").with_font("body", 18.0), fixed(200.0, 24.0))?;
    doc.append(body, TextBox::new(), fixed(240.0, 28.0))?;

    let swatch = doc.append(
        body,
        Block::new()
            .with_background(Color::rgb(40, 120, 220))
            .with_border(2.0, Color::BLACK)
            .with_radius(6.0)
            .clipped(),
        fixed(120.0, 60.0),
    )?;
    doc.append(swatch, Block::new().with_background(Color::rgb(220, 60, 60)), fixed(200.0, 30.0))?;

    doc.layout_to_viewport()?;
    Ok(())
}

fn fixed(width: f32, height: f32) -> Style {
    Style {
        size: Size { width: length(width), height: length(height) },
        flex_shrink: 0.0,
        ..Style::default()
    }
}
