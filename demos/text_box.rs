//! Interactive window with an editable text box.
//!
//! LUMEN_FONT=/path/to/font.ttf cargo run --example text_box

use std::cell::RefCell;
use std::rc::Rc;

use lumen::{Context, SharedAdaptor};
use skia_adaptor::SkiaAdaptor;

#[path = "support/mod.rs"]
mod support;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let skia = Rc::new(RefCell::new(SkiaAdaptor::new(480, 320)?));
    let shared: SharedAdaptor = skia.clone();
    let mut context = Context::with_adaptor(shared);
    support::build_form(&mut context, 480.0, 320.0)?;

    support::winit_backend::run_app("Lumen Text Box", 480, 320, context, skia)
}
