use std::collections::HashMap;

use fontdue::Font;
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use lumen::{
    Adaptor, Color, DrawCommand, DrawContext, Error, Image, ImageRef, Rect, Result, TextureId,
};
use tiny_skia::{FillRule, IntSize, Mask, Paint, Pixmap, PixmapPaint, Transform};

/// Software adaptor: rasterises each frame's draw commands into a pixmap.
///
/// Images are decoded from PNG files and cached by name. Textures are
/// straight-alpha RGBA8 buffers, premultiplied on upload.
pub struct SkiaAdaptor {
    pixmap: Pixmap,
    background: Color,
    images: HashMap<ImageRef, Pixmap>,
    image_names: HashMap<String, ImageRef>,
    textures: HashMap<TextureId, Pixmap>,
    next_image: u64,
    next_texture: u32,
}

impl SkiaAdaptor {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(Error::InvalidSize { width, height })?;
        Ok(Self {
            pixmap,
            background: Color::rgb(34, 34, 34),
            images: HashMap::new(),
            image_names: HashMap::new(),
            textures: HashMap::new(),
            next_image: 1,
            next_texture: 1,
        })
    }

    pub fn frame(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Reallocates the frame. Contents are lost until the next render.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if self.pixmap.width() == width && self.pixmap.height() == height {
            return Ok(());
        }
        self.pixmap = Pixmap::new(width, height).ok_or(Error::InvalidSize { width, height })?;
        Ok(())
    }

    fn clip_mask(&self, clip: Option<Rect>) -> Option<Mask> {
        let clip = clip?;
        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())?;
        // An empty intersection leaves the mask fully transparent.
        if let Some(rect) = to_skia_rect(clip) {
            let path = tiny_skia::PathBuilder::from_rect(rect);
            mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
        }
        Some(mask)
    }
}

impl Adaptor for SkiaAdaptor {
    fn load_image(&mut self, name: &str) -> Result<Image> {
        if let Some(handle) = self.image_names.get(name) {
            if let Some(pixmap) = self.images.get(handle) {
                let (width, height) = (pixmap.width(), pixmap.height());
                return Ok(Image { handle: *handle, width, height });
            }
        }

        let data =
            std::fs::read(name).map_err(|source| Error::Io { path: name.into(), source })?;
        let pixmap = Pixmap::decode_png(&data)
            .map_err(|e| Error::ImageDecode(format!("{}: {}", name, e)))?;

        let handle = ImageRef(self.next_image);
        self.next_image += 1;
        let image = Image { handle, width: pixmap.width(), height: pixmap.height() };
        self.images.insert(handle, pixmap);
        self.image_names.insert(name.to_string(), handle);
        log::debug!("loaded image {} ({}x{})", name, image.width, image.height);
        Ok(image)
    }

    fn load_texture(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<TextureId> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::TextureSize { expected, actual: pixels.len() });
        }
        let size = IntSize::from_wh(width, height).ok_or(Error::InvalidSize { width, height })?;

        let mut data = pixels.to_vec();
        for px in data.chunks_exact_mut(4) {
            let a = px[3] as u16;
            px[0] = ((px[0] as u16 * a) / 255) as u8;
            px[1] = ((px[1] as u16 * a) / 255) as u8;
            px[2] = ((px[2] as u16 * a) / 255) as u8;
        }
        let pixmap = Pixmap::from_vec(data, size).ok_or(Error::InvalidSize { width, height })?;

        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, pixmap);
        Ok(id)
    }

    fn render_callback(&mut self, ctx: &DrawContext<'_>) {
        let bg = self.background;
        self.pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));

        let (sx, sy) = ctx.scale_factor();
        let fonts = ctx.renderer().font_manager().fonts();
        let mut clips: Vec<Rect> = Vec::new();
        let mut mask: Option<Mask> = None;

        for command in ctx.renderer().commands() {
            match command {
                DrawCommand::Clip { rect } => {
                    let rect = rect.scale(sx, sy);
                    let clip = match clips.last() {
                        Some(outer) => outer.intersection(&rect).unwrap_or_default(),
                        None => rect,
                    };
                    clips.push(clip);
                    mask = self.clip_mask(Some(clip));
                }
                DrawCommand::PopClip => {
                    clips.pop();
                    mask = self.clip_mask(clips.last().copied());
                }
                DrawCommand::DrawRect {
                    rect,
                    color,
                    border_radius,
                    border_width,
                    border_color,
                } => {
                    draw_rect(
                        &mut self.pixmap,
                        rect.scale(sx, sy),
                        *color,
                        border_radius * sx,
                        border_width * sx,
                        *border_color,
                        mask.as_ref(),
                    );
                }
                DrawCommand::DrawText { text, rect, color, font_size, font } => {
                    draw_text(
                        &mut self.pixmap,
                        fonts,
                        text,
                        rect.scale(sx, sy),
                        *color,
                        font_size * sy,
                        font.unwrap_or(0),
                        mask.as_ref(),
                    );
                }
                DrawCommand::DrawImage { image, rect, border_radius } => {
                    let rect = rect.scale(sx, sy);
                    match self.images.get(image) {
                        Some(source) => draw_pixmap_scaled(
                            &mut self.pixmap,
                            source,
                            rect,
                            border_radius * sx,
                            mask.as_ref(),
                        ),
                        None => draw_placeholder(&mut self.pixmap, rect, mask.as_ref()),
                    }
                }
                DrawCommand::DrawTexture { texture, rect } => {
                    let rect = rect.scale(sx, sy);
                    match self.textures.get(texture) {
                        Some(source) => {
                            draw_pixmap_scaled(&mut self.pixmap, source, rect, 0.0, mask.as_ref())
                        }
                        None => draw_placeholder(&mut self.pixmap, rect, mask.as_ref()),
                    }
                }
            }
        }
    }
}

fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return None;
    }
    tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

fn draw_rect(
    pixmap: &mut Pixmap,
    rect: Rect,
    color: Option<Color>,
    border_radius: f32,
    border_width: f32,
    border_color: Option<Color>,
    mask: Option<&Mask>,
) {
    let Some(r) = to_skia_rect(rect) else {
        return;
    };

    if let Some(c) = color {
        let mut paint = Paint::default();
        paint.set_color_rgba8(c.r, c.g, c.b, c.a);
        paint.anti_alias = true;

        if border_radius > 0.0 {
            if let Some(path) = rounded_rect_path(r, border_radius) {
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), mask);
            }
        } else {
            pixmap.fill_rect(r, &paint, Transform::identity(), mask);
        }
    }

    if border_width > 0.0 {
        if let Some(bc) = border_color {
            let mut stroke_paint = Paint::default();
            stroke_paint.set_color_rgba8(bc.r, bc.g, bc.b, bc.a);
            stroke_paint.anti_alias = true;

            let stroke = tiny_skia::Stroke { width: border_width, ..Default::default() };

            let path = if border_radius > 0.0 {
                rounded_rect_path(r, border_radius)
            } else {
                Some(tiny_skia::PathBuilder::from_rect(r))
            };
            if let Some(path) = path {
                pixmap.stroke_path(&path, &stroke_paint, &stroke, Transform::identity(), mask);
            }
        }
    }
}

fn draw_text(
    pixmap: &mut Pixmap,
    fonts: &[Font],
    text: &str,
    rect: Rect,
    color: Color,
    font_size: f32,
    font_index: usize,
    mask: Option<&Mask>,
) {
    if fonts.is_empty() {
        log::trace!("no fonts loaded, skipping text {:?}", text);
        return;
    }
    let font_index = if font_index < fonts.len() { font_index } else { 0 };

    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings::default());
    layout.append(fonts, &TextStyle::new(text, font_size, font_index));

    for glyph in layout.glyphs() {
        let (metrics, bitmap) =
            fonts[glyph.font_index].rasterize_indexed(glyph.key.glyph_index, glyph.key.px);
        if metrics.width == 0 || metrics.height == 0 {
            continue;
        }

        let Some(mut glyph_pixmap) = Pixmap::new(metrics.width as u32, metrics.height as u32) else {
            continue;
        };
        let data = glyph_pixmap.data_mut();
        for (i, alpha) in bitmap.iter().enumerate() {
            let a = (*alpha as f32 / 255.0) * (color.a as f32 / 255.0);
            // Premultiplied alpha
            data[i * 4] = (color.r as f32 * a) as u8;
            data[i * 4 + 1] = (color.g as f32 * a) as u8;
            data[i * 4 + 2] = (color.b as f32 * a) as u8;
            data[i * 4 + 3] = (a * 255.0) as u8;
        }

        pixmap.draw_pixmap(
            (rect.x + glyph.x) as i32,
            (rect.y + glyph.y) as i32,
            glyph_pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            mask,
        );
    }
}

fn draw_pixmap_scaled(
    pixmap: &mut Pixmap,
    source: &Pixmap,
    rect: Rect,
    border_radius: f32,
    mask: Option<&Mask>,
) {
    let Some(r) = to_skia_rect(rect) else {
        return;
    };
    let sx = rect.width / source.width() as f32;
    let sy = rect.height / source.height() as f32;
    let transform = Transform::from_scale(sx, sy).post_translate(rect.x, rect.y);

    if border_radius > 0.0 {
        // Fill the rounded outline with the image as a pattern.
        if let Some(path) = rounded_rect_path(r, border_radius) {
            let paint = Paint {
                shader: tiny_skia::Pattern::new(
                    source.as_ref(),
                    tiny_skia::SpreadMode::Pad,
                    tiny_skia::FilterQuality::Bilinear,
                    1.0,
                    transform,
                ),
                anti_alias: true,
                ..Paint::default()
            };
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), mask);
        }
    } else {
        pixmap.draw_pixmap(0, 0, source.as_ref(), &PixmapPaint::default(), transform, mask);
    }
}

fn draw_placeholder(pixmap: &mut Pixmap, rect: Rect, mask: Option<&Mask>) {
    if let Some(r) = to_skia_rect(rect) {
        let mut paint = Paint::default();
        paint.set_color_rgba8(200, 200, 200, 255);
        pixmap.fill_rect(r, &paint, Transform::identity(), mask);
    }
}

fn rounded_rect_path(rect: tiny_skia::Rect, radius: f32) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    let r = radius.clamp(0.0, rect.width() / 2.0).clamp(0.0, rect.height() / 2.0);

    if r <= 0.0 {
        return Some(tiny_skia::PathBuilder::from_rect(rect));
    }

    // Cubic approximation of a quarter circle.
    let k = 0.551915024494 * r;

    let x = rect.x();
    let y = rect.y();
    let right = x + rect.width();
    let bottom = y + rect.height();

    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.cubic_to(right - r + k, y, right, y + r - k, right, y + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + r - k, bottom, x, bottom - r + k, x, bottom - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);

    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen::taffy::prelude::{Size, Style, TaffyMaxContent, length};
    use lumen::{Block, Context, Label, Picture, SharedAdaptor, Viewport};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    const BLACK: (u8, u8, u8, u8) = (0, 0, 0, 255);

    fn fixed(width: f32, height: f32) -> Style {
        Style {
            size: Size { width: length(width), height: length(height) },
            flex_shrink: 0.0,
            ..Style::default()
        }
    }

    fn adaptor(width: u32, height: u32) -> Rc<RefCell<SkiaAdaptor>> {
        let skia = Rc::new(RefCell::new(SkiaAdaptor::new(width, height).unwrap()));
        skia.borrow_mut().set_background(Color::BLACK);
        skia
    }

    fn context_with(skia: &Rc<RefCell<SkiaAdaptor>>, viewport: Viewport) -> Context {
        let shared: SharedAdaptor = skia.clone();
        let mut context = Context::with_adaptor(shared);
        context.document_mut().set_viewport(viewport);
        context
    }

    fn rgba_at(skia: &Rc<RefCell<SkiaAdaptor>>, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let skia = skia.borrow();
        let pixel = skia.frame().pixel(x, y).unwrap();
        (pixel.red(), pixel.green(), pixel.blue(), pixel.alpha())
    }

    fn red_at(skia: &Rc<RefCell<SkiaAdaptor>>, x: u32, y: u32) -> u8 {
        rgba_at(skia, x, y).0
    }

    /// Writes a solid PNG to the temp dir and returns its path.
    fn temp_png(tag: &str, width: u32, height: u32, color: tiny_skia::Color) -> PathBuf {
        let mut source = Pixmap::new(width, height).unwrap();
        source.fill(color);
        let name = format!("skia_adaptor_{}_{}.png", tag, std::process::id());
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, source.encode_png().unwrap()).unwrap();
        path
    }

    #[test]
    fn rejects_zero_sized_frames() {
        assert!(matches!(
            SkiaAdaptor::new(0, 10),
            Err(Error::InvalidSize { width: 0, height: 10 })
        ));
    }

    #[test]
    fn paints_blocks_scaled_to_the_screen() {
        let skia = adaptor(20, 20);
        let mut context = context_with(&skia, Viewport::with_scale(10.0, 10.0, 2.0));

        let doc = context.document_mut();
        let body = doc.set_body(Block::new(), fixed(10.0, 10.0)).unwrap();
        let red = Block::new().with_background(Color::rgb(255, 0, 0));
        doc.append(body, red, fixed(5.0, 5.0)).unwrap();
        doc.compute_layout(Size::MAX_CONTENT).unwrap();

        context.render(0.0);

        assert_eq!(red_at(&skia, 8, 8), 255);
        assert_eq!(red_at(&skia, 12, 12), 0);
    }

    #[test]
    fn clipping_confines_children() {
        let skia = adaptor(20, 20);
        let mut context = context_with(&skia, Viewport::new(20.0, 20.0));

        let doc = context.document_mut();
        let body = doc.set_body(Block::new(), fixed(20.0, 20.0)).unwrap();
        let frame = doc.append(body, Block::new().clipped(), fixed(5.0, 5.0)).unwrap();
        let red = Block::new().with_background(Color::rgb(255, 0, 0));
        doc.append(frame, red, fixed(15.0, 15.0)).unwrap();
        doc.compute_layout(Size::MAX_CONTENT).unwrap();

        context.render(0.0);

        assert_eq!(red_at(&skia, 2, 2), 255);
        assert_eq!(red_at(&skia, 10, 10), 0);
    }

    #[test]
    fn textures_are_validated_and_premultiplied() {
        let mut skia = SkiaAdaptor::new(4, 4).unwrap();
        assert!(matches!(
            skia.load_texture(2, 2, &[0; 8]),
            Err(Error::TextureSize { expected: 16, actual: 8 })
        ));

        let id = skia.load_texture(1, 1, &[200, 100, 0, 0]).unwrap();
        let stored = skia.textures[&id].pixel(0, 0).unwrap();
        assert_eq!((stored.red(), stored.alpha()), (0, 0));
        assert_ne!(skia.load_texture(1, 1, &[0, 0, 0, 255]).unwrap(), id);
    }

    #[test]
    fn uploaded_textures_draw_through_a_picture() {
        let skia = adaptor(20, 20);
        let mut context = context_with(&skia, Viewport::with_scale(10.0, 10.0, 2.0));
        let texture = context.load_texture(2, 2, &[255, 0, 0, 255].repeat(4)).unwrap();

        let doc = context.document_mut();
        let body = doc.set_body(Block::new(), fixed(10.0, 10.0)).unwrap();
        doc.append(body, Picture::texture(texture), fixed(5.0, 5.0)).unwrap();
        doc.compute_layout(Size::MAX_CONTENT).unwrap();

        context.render(0.0);

        assert_eq!(rgba_at(&skia, 5, 5), (255, 0, 0, 255));
        assert_eq!(rgba_at(&skia, 9, 9), (255, 0, 0, 255));
        assert_eq!(rgba_at(&skia, 15, 15), BLACK);
    }

    #[test]
    fn unknown_handles_draw_a_placeholder() {
        let skia = adaptor(20, 20);
        let mut context = context_with(&skia, Viewport::new(20.0, 20.0));

        let doc = context.document_mut();
        let body = doc.set_body(Block::new(), fixed(20.0, 20.0)).unwrap();
        doc.append(body, Picture::image(ImageRef(42)), fixed(10.0, 10.0)).unwrap();
        doc.append(body, Picture::texture(TextureId(42)), fixed(10.0, 10.0)).unwrap();
        doc.compute_layout(Size::MAX_CONTENT).unwrap();

        context.render(0.0);

        assert_eq!(rgba_at(&skia, 5, 5), (200, 200, 200, 255));
        assert_eq!(rgba_at(&skia, 15, 5), (200, 200, 200, 255));
        assert_eq!(rgba_at(&skia, 5, 15), BLACK);
    }

    #[test]
    fn rounded_images_leave_the_corners_bare() {
        let green = tiny_skia::Color::from_rgba8(0, 255, 0, 255);
        let path = temp_png("rounded", 4, 4, green);
        let skia = adaptor(20, 20);
        let mut context = context_with(&skia, Viewport::new(20.0, 20.0));
        let image = context.load_image(&path.to_string_lossy());
        std::fs::remove_file(&path).ok();
        let image = image.unwrap();

        let doc = context.document_mut();
        let body = doc.set_body(Block::new(), fixed(20.0, 20.0)).unwrap();
        let picture = Picture::image(image.handle).with_radius(10.0);
        doc.append(body, picture, fixed(20.0, 20.0)).unwrap();
        doc.compute_layout(Size::MAX_CONTENT).unwrap();

        context.render(0.0);

        assert_eq!(rgba_at(&skia, 10, 10), (0, 255, 0, 255));
        assert_eq!(rgba_at(&skia, 0, 0), BLACK);
        assert_eq!(rgba_at(&skia, 19, 19), BLACK);
    }

    #[test]
    fn labels_rasterise_once_a_font_is_loaded() {
        let skia = adaptor(60, 30);
        let mut context = context_with(&skia, Viewport::new(60.0, 30.0));

        let doc = context.document_mut();
        let body = doc.set_body(Block::new(), fixed(60.0, 30.0)).unwrap();
        let label = Label::new("Hi").with_color(Color::WHITE);
        doc.append(body, label, fixed(60.0, 30.0)).unwrap();
        doc.compute_layout(Size::MAX_CONTENT).unwrap();

        let lit = |skia: &Rc<RefCell<SkiaAdaptor>>| {
            skia.borrow().frame().pixels().iter().any(|p| p.red() > 0)
        };

        context.render(0.0);
        assert!(!lit(&skia));

        let font = concat!(env!("CARGO_MANIFEST_DIR"), "/../resources/fonts/DejaVuSansMono.ttf");
        context.load_font("mono", font).unwrap();
        context.render(0.0);
        assert!(lit(&skia));
    }

    #[test]
    fn images_load_from_png_once() {
        let path = temp_png("once", 3, 2, tiny_skia::Color::WHITE);
        let name = path.to_string_lossy().to_string();

        let mut skia = SkiaAdaptor::new(4, 4).unwrap();
        let first = skia.load_image(&name).unwrap();
        let second = skia.load_image(&name).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((first.width, first.height), (3, 2));
        assert_eq!(first.handle, second.handle);
        assert!(matches!(skia.load_image("/nonexistent/image.png"), Err(Error::Io { .. })));
    }

    #[test]
    fn resize_reallocates() {
        let mut skia = SkiaAdaptor::new(4, 4).unwrap();
        skia.resize(8, 6).unwrap();
        assert_eq!((skia.frame().width(), skia.frame().height()), (8, 6));
        assert!(skia.resize(0, 0).is_err());
    }
}
