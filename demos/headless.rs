//! Drives a form through scripted input and writes the final frame to a PNG.
//!
//! RUST_LOG=debug cargo run --example headless -- out.png

use std::cell::RefCell;
use std::rc::Rc;

use lumen::{Context, Key, SharedAdaptor};
use skia_adaptor::SkiaAdaptor;

#[path = "support/mod.rs"]
mod support;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let out = std::env::args().nth(1).unwrap_or_else(|| "frame.png".to_string());

    let skia = Rc::new(RefCell::new(SkiaAdaptor::new(400, 300)?));
    let shared: SharedAdaptor = skia.clone();
    let mut context = Context::with_adaptor(shared);
    support::build_form(&mut context, 400.0, 300.0)?;

    // Click into the text box and type.
    context.set_mouse_position(40, 60);
    context.set_mouse_down();
    context.add_input_characters("Grace Hopper");
    context.set_key_press(Key::Backspace);
    context.set_scroll_direction(-1);

    context.update(1.0 / 60.0);
    context.render(1.0 / 60.0);

    log::info!("focused: {:?}", context.document().focused());
    skia.borrow().frame().save_png(&out)?;
    println!("wrote {}", out);
    Ok(())
}
