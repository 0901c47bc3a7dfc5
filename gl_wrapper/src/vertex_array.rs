use std::rc::Rc;

use gl::types::GLuint;
use thiserror::Error;

use crate::backend::GlRef;
use crate::buffer::VertexBuffer;
use crate::debug::gl_call;
use crate::layout::VertexBufferLayout;

pub struct VertexArray {
    gl: GlRef,
    id: GLuint,
    layout: Option<VertexBufferLayout>,
}

impl VertexArray {
    pub fn new(gl: &GlRef) -> Self {
        let id = gl_call(&**gl, "glGenVertexArrays", |gl| gl.gen_vertex_array());
        gl_call(&**gl, "glBindVertexArray", |gl| gl.bind_vertex_array(id));

        Self {
            gl: Rc::clone(gl),
            id,
            layout: None,
        }
    }

    /// Points the attributes of this array at `buffer`, described by `layout`.
    ///
    /// The layout is kept by the array and can no longer change.
    pub fn add_buffer(
        &mut self,
        buffer: &VertexBuffer,
        layout: VertexBufferLayout,
    ) -> Result<(), VAError> {
        let stride = layout.stride();

        if stride == 0 {
            return Err(VAError::EmptyLayout);
        }

        if buffer.size() % stride != 0 {
            return Err(VAError::InvalidDataLength {
                size: buffer.size(),
                stride,
            });
        }

        self.bind();
        buffer.bind();

        for (i, element, offset) in layout.offsets() {
            gl_call(&*self.gl, "glEnableVertexAttribArray", |gl| {
                gl.enable_vertex_attrib_array(i)
            });
            gl_call(&*self.gl, "glVertexAttribPointer", |gl| {
                gl.vertex_attrib_pointer(
                    i,
                    element.count as i32,
                    element.kind.gl_enum(),
                    element.normalized,
                    stride as i32,
                    offset,
                )
            });
        }

        self.layout = Some(layout);

        Ok(())
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn layout(&self) -> Option<&VertexBufferLayout> {
        self.layout.as_ref()
    }

    pub fn bind(&self) {
        gl_call(&*self.gl, "glBindVertexArray", |gl| gl.bind_vertex_array(self.id));
    }

    pub fn unbind(&self) {
        gl_call(&*self.gl, "glBindVertexArray", |gl| gl.bind_vertex_array(0));
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        gl_call(&*self.gl, "glDeleteVertexArrays", |gl| {
            gl.delete_vertex_array(self.id)
        });
    }
}

#[derive(Debug, Error)]
pub enum VAError {
    #[error("Layout has no elements")]
    EmptyLayout,
    #[error("Buffer of {size} bytes is not a multiple of the {stride} byte stride")]
    InvalidDataLength { size: usize, stride: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, RecordingGl};

    #[rustfmt::skip]
    const QUAD: [f32; 16] = [
        -50.0, -50.0, 0.0, 0.0,
         50.0, -50.0, 1.0, 0.0,
         50.0,  50.0, 1.0, 1.0,
        -50.0,  50.0, 0.0, 1.0,
    ];

    #[test]
    fn attributes_follow_push_order() {
        let mock = Rc::new(RecordingGl::new());
        let gl: GlRef = mock.clone();

        let vb = VertexBuffer::new(&gl, &QUAD);
        let mut va = VertexArray::new(&gl);
        mock.clear_calls();

        va.add_buffer(&vb, VertexBufferLayout::new().with::<f32>(2).with::<f32>(2))
            .unwrap();

        let pointers: Vec<_> = mock
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::VertexAttribPointer { .. }))
            .collect();

        assert_eq!(
            pointers,
            vec![
                Call::VertexAttribPointer {
                    index: 0,
                    size: 2,
                    kind: gl::FLOAT,
                    normalized: false,
                    stride: 16,
                    offset: 0,
                },
                Call::VertexAttribPointer {
                    index: 1,
                    size: 2,
                    kind: gl::FLOAT,
                    normalized: false,
                    stride: 16,
                    offset: 8,
                },
            ]
        );
        assert_eq!(mock.calls()[0], Call::BindVertexArray(va.id()));
        assert_eq!(va.layout().map(|l| l.stride()), Some(16));
    }

    #[test]
    fn rejects_mismatched_data() {
        let mock = Rc::new(RecordingGl::new());
        let gl: GlRef = mock.clone();

        let vb = VertexBuffer::new(&gl, &[0.0_f32; 5]);
        let mut va = VertexArray::new(&gl);

        let err = va.add_buffer(&vb, VertexBufferLayout::new().with::<f32>(2));
        assert!(matches!(
            err,
            Err(VAError::InvalidDataLength {
                size: 20,
                stride: 8
            })
        ));

        let err = va.add_buffer(&vb, VertexBufferLayout::new());
        assert!(matches!(err, Err(VAError::EmptyLayout)));
        assert!(va.layout().is_none());
    }

    #[test]
    fn drop_deletes_array() {
        let mock = Rc::new(RecordingGl::new());
        let gl: GlRef = mock.clone();

        let va = VertexArray::new(&gl);
        let id = va.id();
        drop(va);

        assert_eq!(mock.count(|c| *c == Call::DeleteVertexArray(id)), 1);
    }
}
