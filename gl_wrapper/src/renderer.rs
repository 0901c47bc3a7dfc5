use std::rc::Rc;

use crate::backend::GlRef;
use crate::buffer::IndexBuffer;
use crate::debug::gl_call;
use crate::program::Shader;
use crate::vertex_array::VertexArray;

/// Issues draw calls. Holds no binding state, every draw rebinds its inputs.
pub struct GlRenderer {
    gl: GlRef,
}

impl GlRenderer {
    pub fn new(gl: &GlRef) -> Self {
        Self { gl: Rc::clone(gl) }
    }

    pub fn draw(&self, vertex_array: &VertexArray, index_buffer: &IndexBuffer, shader: &Shader) {
        shader.bind();
        vertex_array.bind();
        index_buffer.bind();

        gl_call(&*self.gl, "glDrawElements", |gl| {
            gl.draw_elements(
                gl::TRIANGLES,
                index_buffer.len() as i32,
                gl::UNSIGNED_INT,
                0,
            )
        });
    }

    /// Clears the color buffer with whatever clear color is set.
    pub fn clear(&self) {
        gl_call(&*self.gl, "glClear", |gl| gl.clear(gl::COLOR_BUFFER_BIT));
    }

    pub fn set_clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        gl_call(&*self.gl, "glClearColor", |gl| gl.clear_color(r, g, b, a));
    }

    pub fn resize(&self, width: u32, height: u32) {
        gl_call(&*self.gl, "glViewport", |gl| {
            gl.viewport(0, 0, width as i32, height as i32)
        });
    }

    /// Standard alpha blending, source over destination.
    pub fn enable_blending(&self) {
        gl_call(&*self.gl, "glEnable", |gl| gl.enable(gl::BLEND));
        gl_call(&*self.gl, "glBlendFunc", |gl| {
            gl.blend_func(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA)
        });
    }

    pub fn disable_blending(&self) {
        gl_call(&*self.gl, "glDisable", |gl| gl.disable(gl::BLEND));
    }

    pub fn gl(&self) -> &GlRef {
        &self.gl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::VertexBuffer;
    use crate::layout::VertexBufferLayout;
    use crate::mock::{Call, RecordingGl};
    use crate::program::ShaderSource;

    #[test]
    fn draw_covers_full_index_buffer() {
        let mock = Rc::new(RecordingGl::new());
        let gl: GlRef = mock.clone();

        let vb = VertexBuffer::new(&gl, &[0.0_f32; 8]);
        let mut va = VertexArray::new(&gl);
        va.add_buffer(&vb, VertexBufferLayout::new().with::<f32>(2))
            .unwrap();
        let ib = IndexBuffer::new(&gl, &[0, 1, 2, 2, 3, 0]);
        let shader = Shader::new(&gl, &ShaderSource::new("v", "f")).unwrap();
        let renderer = GlRenderer::new(&gl);
        mock.clear_calls();

        renderer.draw(&va, &ib, &shader);

        assert_eq!(
            mock.calls(),
            vec![
                Call::UseProgram(shader.id()),
                Call::BindVertexArray(va.id()),
                Call::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ib.id()),
                Call::DrawElements {
                    mode: gl::TRIANGLES,
                    count: 6,
                    kind: gl::UNSIGNED_INT,
                },
            ]
        );
    }

    #[test]
    fn clear_uses_current_color() {
        let mock = Rc::new(RecordingGl::new());
        let gl: GlRef = mock.clone();
        let renderer = GlRenderer::new(&gl);

        renderer.set_clear_color(0.2, 0.3, 0.8, 1.0);
        renderer.clear();
        renderer.clear();

        assert_eq!(
            mock.calls(),
            vec![
                Call::ClearColor([0.2, 0.3, 0.8, 1.0]),
                Call::Clear(gl::COLOR_BUFFER_BIT),
                Call::Clear(gl::COLOR_BUFFER_BIT),
            ]
        );
    }
}
