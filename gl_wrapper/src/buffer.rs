use std::rc::Rc;

use bytemuck::Pod;
use gl::types::GLuint;

use crate::backend::GlRef;
use crate::debug::gl_call;

/// Vertex data uploaded to an `ARRAY_BUFFER`.
pub struct VertexBuffer {
    gl: GlRef,
    id: GLuint,
    size: usize,
}

impl VertexBuffer {
    pub fn new<T: Pod>(gl: &GlRef, data: &[T]) -> Self {
        let bytes: &[u8] = bytemuck::cast_slice(data);

        let id = gl_call(&**gl, "glGenBuffers", |gl| gl.gen_buffer());
        gl_call(&**gl, "glBindBuffer", |gl| gl.bind_buffer(gl::ARRAY_BUFFER, id));
        gl_call(&**gl, "glBufferData", |gl| {
            gl.buffer_data(gl::ARRAY_BUFFER, bytes, gl::STATIC_DRAW)
        });

        Self {
            gl: Rc::clone(gl),
            id,
            size: bytes.len(),
        }
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    /// Size of the uploaded data in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn bind(&self) {
        gl_call(&*self.gl, "glBindBuffer", |gl| {
            gl.bind_buffer(gl::ARRAY_BUFFER, self.id)
        });
    }

    pub fn unbind(&self) {
        gl_call(&*self.gl, "glBindBuffer", |gl| gl.bind_buffer(gl::ARRAY_BUFFER, 0));
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        gl_call(&*self.gl, "glDeleteBuffers", |gl| gl.delete_buffer(self.id));
    }
}

/// `u32` triangle indices uploaded to an `ELEMENT_ARRAY_BUFFER`.
pub struct IndexBuffer {
    gl: GlRef,
    id: GLuint,
    len: usize,
}

impl IndexBuffer {
    pub fn new(gl: &GlRef, indices: &[u32]) -> Self {
        let bytes: &[u8] = bytemuck::cast_slice(indices);

        let id = gl_call(&**gl, "glGenBuffers", |gl| gl.gen_buffer());
        gl_call(&**gl, "glBindBuffer", |gl| {
            gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, id)
        });
        gl_call(&**gl, "glBufferData", |gl| {
            gl.buffer_data(gl::ELEMENT_ARRAY_BUFFER, bytes, gl::STATIC_DRAW)
        });

        Self {
            gl: Rc::clone(gl),
            id,
            len: indices.len(),
        }
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    /// Number of indices.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bind(&self) {
        gl_call(&*self.gl, "glBindBuffer", |gl| {
            gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, self.id)
        });
    }

    pub fn unbind(&self) {
        gl_call(&*self.gl, "glBindBuffer", |gl| {
            gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, 0)
        });
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        gl_call(&*self.gl, "glDeleteBuffers", |gl| gl.delete_buffer(self.id));
    }
}
