use crate::demo::DemoMenu;

mod clear_color;
mod color_quad;
mod textured_quads;

pub use clear_color::ClearColor;
pub use color_quad::ColorQuad;
pub use textured_quads::TexturedQuads;

/// Menu with every demo of the sandbox.
pub fn menu() -> DemoMenu {
    DemoMenu::new()
        .with("Clear Color", ClearColor::new)
        .with("Color Quad", ColorQuad::new)
        .with("Textured Quads", TexturedQuads::new)
}
