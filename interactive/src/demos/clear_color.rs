use gl_wrapper::renderer::GlRenderer;

use crate::demo::{Demo, DemoContext, DemoError};

pub struct ClearColor {
    color: [f32; 4],
}

impl ClearColor {
    pub fn new(_ctx: &DemoContext) -> Result<Self, DemoError> {
        Ok(Self {
            color: [0.2, 0.3, 0.8, 1.0],
        })
    }
}

impl Demo for ClearColor {
    fn on_render(&self, renderer: &GlRenderer) {
        let [r, g, b, a] = self.color;
        renderer.set_clear_color(r, g, b, a);
        renderer.clear();
    }

    fn on_imgui_render(&mut self, ui: &imgui::Ui) {
        ui.color_edit4("Clear Color", &mut self.color);
    }
}
