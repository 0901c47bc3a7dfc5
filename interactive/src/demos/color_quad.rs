use gl_wrapper::buffer::{IndexBuffer, VertexBuffer};
use gl_wrapper::layout::VertexBufferLayout;
use gl_wrapper::program::{Shader, ShaderSource};
use gl_wrapper::renderer::GlRenderer;
use gl_wrapper::vertex_array::VertexArray;
use gl_wrapper::{QUAD, QUAD_INDICES};

use crate::demo::{Demo, DemoContext, DemoError};

/// Indexed quad whose red channel bounces between 0 and 1.
pub struct ColorQuad {
    vertex_array: VertexArray,
    // the array reads from this buffer, it must live as long
    _vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
    shader: Shader,
    red: f32,
    /// Change of the red channel per second, sign is the direction.
    velocity: f32,
    speed: f32,
}

impl ColorQuad {
    pub fn new(ctx: &DemoContext) -> Result<Self, DemoError> {
        let vertex_buffer = VertexBuffer::new(&ctx.gl, &QUAD);
        let mut vertex_array = VertexArray::new(&ctx.gl);
        vertex_array.add_buffer(
            &vertex_buffer,
            VertexBufferLayout::new().with::<f32>(2).with::<f32>(2),
        )?;
        let index_buffer = IndexBuffer::new(&ctx.gl, &QUAD_INDICES);

        let source = ShaderSource::from_combined_file(ctx.resource("shaders/color.shader"))?;
        let shader = Shader::new(&ctx.gl, &source)?;

        Ok(Self {
            vertex_array,
            _vertex_buffer: vertex_buffer,
            index_buffer,
            shader,
            red: 0.0,
            velocity: 1.0,
            speed: 1.0,
        })
    }

    fn color(&self) -> [f32; 4] {
        [self.red, 0.3, 0.8, 1.0]
    }
}

/// Advances `value` and reflects it off the [0, 1] bounds.
fn bounce(value: f32, velocity: f32, delta_time: f32) -> (f32, f32) {
    let next = value + velocity * delta_time;

    if next > 1.0 {
        (2.0 - next, -velocity.abs())
    } else if next < 0.0 {
        (-next, velocity.abs())
    } else {
        (next, velocity)
    }
}

impl Demo for ColorQuad {
    fn on_update(&mut self, delta_time: f32) {
        let velocity = self.velocity.signum() * self.speed;
        let (red, velocity) = bounce(self.red, velocity, delta_time);

        self.red = red.clamp(0.0, 1.0);
        self.velocity = velocity;
    }

    fn on_render(&self, renderer: &GlRenderer) {
        self.shader.bind();
        self.shader.set_uniform_4f("u_Color", self.color());
        renderer.draw(&self.vertex_array, &self.index_buffer, &self.shader);
    }

    fn on_imgui_render(&mut self, ui: &imgui::Ui) {
        ui.slider("Speed", 0.0, 5.0, &mut self.speed);
        ui.text(format!("Red channel: {:.2}", self.red));
    }
}
