use cgmath::{Matrix4, Vector3};

use gl_wrapper::backend::GlRef;
use gl_wrapper::buffer::{IndexBuffer, VertexBuffer};
use gl_wrapper::layout::VertexBufferLayout;
use gl_wrapper::program::{Shader, ShaderSource};
use gl_wrapper::renderer::GlRenderer;
use gl_wrapper::texture::Texture2D;
use gl_wrapper::vertex_array::VertexArray;
use gl_wrapper::QUAD_INDICES;

use crate::demo::{Demo, DemoContext, DemoError};

#[rustfmt::skip]
const POSITIONS: [f32; 16] = [
    -50.0, -50.0, 0.0, 0.0,
     50.0, -50.0, 1.0, 0.0,
     50.0,  50.0, 1.0, 1.0,
    -50.0,  50.0, 0.0, 1.0,
];

/// Two copies of one textured quad, placed in pixel coordinates.
pub struct TexturedQuads {
    gl: GlRef,
    vertex_array: VertexArray,
    _vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
    shader: Shader,
    texture: Texture2D,
    projection: Matrix4<f32>,
    view: Matrix4<f32>,
    translation_a: [f32; 3],
    translation_b: [f32; 3],
    width: f32,
}

impl TexturedQuads {
    pub fn new(ctx: &DemoContext) -> Result<Self, DemoError> {
        let vertex_buffer = VertexBuffer::new(&ctx.gl, &POSITIONS);
        let mut vertex_array = VertexArray::new(&ctx.gl);
        vertex_array.add_buffer(
            &vertex_buffer,
            VertexBufferLayout::new().with::<f32>(2).with::<f32>(2),
        )?;
        let index_buffer = IndexBuffer::new(&ctx.gl, &QUAD_INDICES);

        let source = ShaderSource::from_files(
            ctx.resource("shaders/basic.vert"),
            ctx.resource("shaders/basic.frag"),
        )?;
        let shader = Shader::new(&ctx.gl, &source)?;
        shader.bind();
        shader.set_uniform_1i("u_Texture", 0);

        let texture = Texture2D::from_path(&ctx.gl, ctx.resource("textures/checker.png"))?;

        GlRenderer::new(&ctx.gl).enable_blending();

        let (width, height) = (ctx.width as f32, ctx.height as f32);

        Ok(Self {
            gl: ctx.gl.clone(),
            vertex_array,
            _vertex_buffer: vertex_buffer,
            index_buffer,
            shader,
            texture,
            projection: cgmath::ortho(0.0, width, 0.0, height, -1.0, 1.0),
            view: Matrix4::from_translation(Vector3::new(0.0, 0.0, 0.0)),
            translation_a: [200.0, 200.0, 0.0],
            translation_b: [400.0, 200.0, 0.0],
            width,
        })
    }

    fn mvp(&self, translation: [f32; 3]) -> Matrix4<f32> {
        self.projection * self.view * Matrix4::from_translation(Vector3::from(translation))
    }
}

impl Demo for TexturedQuads {
    fn on_render(&self, renderer: &GlRenderer) {
        renderer.set_clear_color(0.0, 0.0, 0.0, 1.0);
        renderer.clear();

        self.texture.bind(0);

        for translation in [self.translation_a, self.translation_b] {
            let mvp: [[f32; 4]; 4] = self.mvp(translation).into();

            self.shader.bind();
            self.shader.set_uniform_mat4("u_MVP", &mvp);
            renderer.draw(&self.vertex_array, &self.index_buffer, &self.shader);
        }
    }

    fn on_imgui_render(&mut self, ui: &imgui::Ui) {
        ui.slider_config("Translation A", 0.0, self.width)
            .build_array(&mut self.translation_a);
        ui.slider_config("Translation B", 0.0, self.width)
            .build_array(&mut self.translation_b);

        let framerate = ui.io().framerate;
        ui.text(format!(
            "Application average {:.3} ms/frame ({:.1} FPS)",
            1000.0 / framerate,
            framerate
        ));
    }
}

impl Drop for TexturedQuads {
    fn drop(&mut self) {
        GlRenderer::new(&self.gl).disable_blending();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use cgmath::Vector4;
    use gl_wrapper::mock::{Call, RecordingGl};

    use super::*;
    use crate::demo::tests::context;

    #[test]
    fn quads_land_at_their_translation() {
        let mock = Rc::new(RecordingGl::new());
        let demo = TexturedQuads::new(&context(&mock)).unwrap();

        // quad center in clip space, 960x540 viewport
        let center = demo.mvp(demo.translation_a) * Vector4::new(0.0, 0.0, 0.0, 1.0);

        assert!((center.x - (200.0 / 480.0 - 1.0)).abs() < 1e-6);
        assert!((center.y - (200.0 / 270.0 - 1.0)).abs() < 1e-6);
    }

    #[test]
    fn render_draws_both_quads() {
        let mock = Rc::new(
            RecordingGl::new()
                .with_uniform("u_MVP", 1)
                .with_uniform("u_Texture", 2),
        );
        let ctx = context(&mock);
        let demo = TexturedQuads::new(&ctx).unwrap();
        assert!(mock.calls().contains(&Call::Uniform1i(2, 0)));
        assert!(mock.calls().contains(&Call::Enable(gl::BLEND)));
        mock.clear_calls();

        demo.on_render(&GlRenderer::new(&ctx.gl));

        assert_eq!(mock.count(|c| matches!(c, Call::UniformMatrix4(1, _))), 2);
        assert_eq!(
            mock.count(|c| matches!(c, Call::DrawElements { count: 6, .. })),
            2
        );
        assert_eq!(mock.count(|c| *c == Call::ActiveTexture(gl::TEXTURE0)), 1);
    }

    #[test]
    fn drop_releases_everything() {
        let mock = Rc::new(RecordingGl::new());
        let demo = TexturedQuads::new(&context(&mock)).unwrap();
        let texture = demo.texture.id();
        let program = demo.shader.id();
        mock.clear_calls();

        drop(demo);

        assert!(mock.calls().contains(&Call::Disable(gl::BLEND)));
        assert!(mock.calls().contains(&Call::DeleteTexture(texture)));
        assert!(mock.calls().contains(&Call::DeleteProgram(program)));
        assert_eq!(mock.count(|c| matches!(c, Call::DeleteBuffer(_))), 2);
        assert_eq!(mock.count(|c| matches!(c, Call::DeleteVertexArray(_))), 1);
    }
}
