use std::cell::RefCell;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Instant;

use lumen::{Context, CursorType, Key, Viewport};
use skia_adaptor::SkiaAdaptor;
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key as WinitKey, NamedKey};
use winit::window::{CursorIcon, WindowBuilder};

const DOUBLE_CLICK_MS: u128 = 400;

pub fn run_app(
    title: &str,
    width: u32,
    height: u32,
    mut context: Context,
    skia: Rc<RefCell<SkiaAdaptor>>,
) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let window = Rc::new(
        WindowBuilder::new()
            .with_title(title)
            .with_inner_size(winit::dpi::LogicalSize::new(width as f64, height as f64))
            .build(&event_loop)?,
    );

    let softbuffer_context = softbuffer::Context::new(window.clone())
        .map_err(|e| anyhow::anyhow!("Context error: {}", e))?;
    let mut surface = softbuffer::Surface::new(&softbuffer_context, window.clone())
        .map_err(|e| anyhow::anyhow!("Surface error: {}", e))?;

    let window_clone = window.clone();
    let mut last_click: Option<Instant> = None;
    let mut last_frame = Instant::now();

    event_loop.run(move |event, target| {
        target.set_control_flow(ControlFlow::Wait);

        let Event::WindowEvent { window_id, event } = event else {
            return;
        };
        if window_id != window_clone.id() {
            return;
        }

        match event {
            WindowEvent::RedrawRequested => {
                let size = window_clone.inner_size();
                let (Some(w), Some(h)) =
                    (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                else {
                    return;
                };

                if let Err(e) = surface.resize(w, h) {
                    log::error!("Resize error: {}", e);
                    return;
                }
                if let Err(e) = skia.borrow_mut().resize(size.width, size.height) {
                    log::error!("Resize error: {}", e);
                    return;
                }

                let scale = window_clone.scale_factor() as f32;
                let doc = context.document_mut();
                doc.set_viewport(Viewport::with_scale(
                    size.width as f32 / scale,
                    size.height as f32 / scale,
                    scale,
                ));
                if let Err(e) = doc.layout_to_viewport() {
                    log::error!("Layout error: {}", e);
                }

                let dt = last_frame.elapsed().as_secs_f32();
                last_frame = Instant::now();
                context.update(dt);
                context.render(dt);

                let mut buffer = match surface.buffer_mut() {
                    Ok(b) => b,
                    Err(e) => {
                        log::error!("Buffer error: {}", e);
                        return;
                    }
                };
                let skia = skia.borrow();
                for (i, chunk) in skia.frame().data().chunks_exact(4).enumerate() {
                    let r = chunk[0] as u32;
                    let g = chunk[1] as u32;
                    let b = chunk[2] as u32;
                    // 0RGB format for softbuffer
                    buffer[i] = (r << 16) | (g << 8) | b;
                }
                if let Err(e) = buffer.present() {
                    log::error!("Present error: {}", e);
                }
            }
            WindowEvent::CloseRequested => {
                target.exit();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(window_clone.scale_factor());
                context.set_mouse_position(logical.x as i32, logical.y as i32);
                window_clone.set_cursor_icon(cursor_icon(context.document().cursor()));
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let now = Instant::now();
                let double = last_click
                    .is_some_and(|t| now.duration_since(t).as_millis() < DOUBLE_CLICK_MS);
                context.set_mouse_down();
                if double {
                    context.set_double_click();
                    last_click = None;
                } else {
                    last_click = Some(now);
                }
                window_clone.request_redraw();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                if dy != 0.0 {
                    context.set_scroll_direction(dy.signum() as i32);
                    window_clone.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                if let Some(key) = map_key(&event.logical_key) {
                    context.set_key_press(key);
                } else if let Some(text) = event.text.as_ref() {
                    if !text.chars().any(char::is_control) {
                        context.add_input_characters(text);
                    }
                }
                window_clone.request_redraw();
            }
            _ => {}
        }
    })?;
    Ok(())
}

fn map_key(key: &WinitKey) -> Option<Key> {
    let WinitKey::Named(named) = key else {
        return None;
    };
    Some(match named {
        NamedKey::Backspace => Key::Backspace,
        NamedKey::Delete => Key::Delete,
        NamedKey::Enter => Key::Enter,
        NamedKey::Tab => Key::Tab,
        NamedKey::Escape => Key::Escape,
        NamedKey::ArrowLeft => Key::Left,
        NamedKey::ArrowRight => Key::Right,
        NamedKey::ArrowUp => Key::Up,
        NamedKey::ArrowDown => Key::Down,
        NamedKey::Home => Key::Home,
        NamedKey::End => Key::End,
        NamedKey::PageUp => Key::PageUp,
        NamedKey::PageDown => Key::PageDown,
        _ => return None,
    })
}

fn cursor_icon(cursor: CursorType) -> CursorIcon {
    match cursor {
        CursorType::Arrow => CursorIcon::Default,
        CursorType::IBeam => CursorIcon::Text,
        CursorType::Hand => CursorIcon::Pointer,
        CursorType::Crosshair => CursorIcon::Crosshair,
        CursorType::ResizeHorizontal => CursorIcon::EwResize,
        CursorType::ResizeVertical => CursorIcon::NsResize,
    }
}
