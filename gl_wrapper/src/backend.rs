//! The driver entry points used by the wrappers.
//!
//! Every resource type talks to OpenGL through [`GlBackend`] instead of calling
//! `gl::*` directly, so the same wrapper code runs against the real driver
//! ([`NativeGl`]) and against the call-recording double in [`crate::mock`].

use std::ffi::{c_char, c_void, CStr};
use std::rc::Rc;

use gl::types::{GLbitfield, GLenum, GLint, GLsizei, GLuint};

/// Shared handle to the backend of the current context.
///
/// `Rc` keeps every resource on the thread that owns the context.
pub type GlRef = Rc<dyn GlBackend>;

pub trait GlBackend {
    fn get_error(&self) -> GLenum;

    fn gen_buffer(&self) -> GLuint;
    fn delete_buffer(&self, id: GLuint);
    fn bind_buffer(&self, target: GLenum, id: GLuint);
    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum);

    fn gen_vertex_array(&self) -> GLuint;
    fn delete_vertex_array(&self, id: GLuint);
    fn bind_vertex_array(&self, id: GLuint);
    fn enable_vertex_attrib_array(&self, index: GLuint);
    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        kind: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    );

    fn gen_texture(&self) -> GLuint;
    fn delete_texture(&self, id: GLuint);
    fn active_texture(&self, unit: GLenum);
    fn bind_texture(&self, target: GLenum, id: GLuint);
    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: GLenum,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        kind: GLenum,
        pixels: &[u8],
    );

    fn create_shader(&self, stage: GLenum) -> GLuint;
    fn shader_source(&self, id: GLuint, source: &CStr);
    fn compile_shader(&self, id: GLuint);
    fn shader_compile_status(&self, id: GLuint) -> bool;
    fn shader_info_log(&self, id: GLuint) -> String;
    fn delete_shader(&self, id: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn validate_program(&self, program: GLuint);
    /// Queries `LINK_STATUS` or `VALIDATE_STATUS`.
    fn program_status(&self, program: GLuint, pname: GLenum) -> bool;
    fn program_info_log(&self, program: GLuint) -> String;
    fn use_program(&self, program: GLuint);
    fn delete_program(&self, program: GLuint);

    fn get_uniform_location(&self, program: GLuint, name: &CStr) -> GLint;
    fn uniform_1i(&self, location: GLint, value: GLint);
    fn uniform_1f(&self, location: GLint, value: f32);
    fn uniform_4f(&self, location: GLint, value: [f32; 4]);
    fn uniform_matrix_4fv(&self, location: GLint, matrix: &[f32; 16]);

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&self, mask: GLbitfield);
    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn enable(&self, cap: GLenum);
    fn disable(&self, cap: GLenum);
    fn blend_func(&self, src: GLenum, dst: GLenum);
    fn draw_elements(&self, mode: GLenum, count: GLsizei, kind: GLenum, offset: usize);
}

/// Backend forwarding to the function pointers loaded into the `gl` crate.
pub struct NativeGl {
    _loaded: (),
}

impl NativeGl {
    /// Loads the OpenGL function pointers of the current context.
    pub fn load_with<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        Self { _loaded: () }
    }
}

impl GlBackend for NativeGl {
    fn get_error(&self) -> GLenum {
        unsafe { gl::GetError() }
    }

    fn gen_buffer(&self) -> GLuint {
        let mut id = 0;
        unsafe { gl::GenBuffers(1, (&mut id) as *mut u32) };
        id
    }

    fn delete_buffer(&self, id: GLuint) {
        unsafe { gl::DeleteBuffers(1, (&id) as *const u32) }
    }

    fn bind_buffer(&self, target: GLenum, id: GLuint) {
        unsafe { gl::BindBuffer(target, id) }
    }

    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum) {
        unsafe {
            gl::BufferData(
                target,
                data.len() as isize,
                data.as_ptr() as *const c_void,
                usage,
            )
        }
    }

    fn gen_vertex_array(&self) -> GLuint {
        let mut id = 0;
        unsafe { gl::GenVertexArrays(1, (&mut id) as *mut u32) };
        id
    }

    fn delete_vertex_array(&self, id: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, (&id) as *const u32) }
    }

    fn bind_vertex_array(&self, id: GLuint) {
        unsafe { gl::BindVertexArray(id) }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::EnableVertexAttribArray(index) }
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        kind: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        let normalized = if normalized { gl::TRUE } else { gl::FALSE };

        unsafe {
            gl::VertexAttribPointer(
                index,
                size,
                kind,
                normalized,
                stride,
                offset as *const c_void,
            )
        }
    }

    fn gen_texture(&self) -> GLuint {
        let mut id = 0;
        unsafe { gl::GenTextures(1, (&mut id) as *mut u32) };
        id
    }

    fn delete_texture(&self, id: GLuint) {
        unsafe { gl::DeleteTextures(1, (&id) as *const u32) }
    }

    fn active_texture(&self, unit: GLenum) {
        unsafe { gl::ActiveTexture(unit) }
    }

    fn bind_texture(&self, target: GLenum, id: GLuint) {
        unsafe { gl::BindTexture(target, id) }
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        unsafe { gl::TexParameteri(target, pname, param) }
    }

    fn tex_image_2d(
        &self,
        target: GLenum,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        kind: GLenum,
        pixels: &[u8],
    ) {
        unsafe {
            gl::TexImage2D(
                target,
                0,
                internal_format,
                width,
                height,
                0,
                format,
                kind,
                pixels.as_ptr() as *const c_void,
            )
        }
    }

    fn create_shader(&self, stage: GLenum) -> GLuint {
        unsafe { gl::CreateShader(stage) }
    }

    fn shader_source(&self, id: GLuint, source: &CStr) {
        unsafe {
            gl::ShaderSource(
                id,
                1,
                (&source.as_ptr()) as *const *const c_char,
                std::ptr::null(),
            )
        }
    }

    fn compile_shader(&self, id: GLuint) {
        unsafe { gl::CompileShader(id) }
    }

    fn shader_compile_status(&self, id: GLuint) -> bool {
        let mut success: GLint = 0;
        unsafe { gl::GetShaderiv(id, gl::COMPILE_STATUS, (&mut success) as *mut i32) };
        success == gl::TRUE as GLint
    }

    fn shader_info_log(&self, id: GLuint) -> String {
        let mut len: GLint = 0;
        unsafe { gl::GetShaderiv(id, gl::INFO_LOG_LENGTH, (&mut len) as *mut i32) };

        let mut buf = vec![0_u8; len.max(1) as usize];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetShaderInfoLog(
                id,
                buf.len() as GLsizei,
                (&mut written) as *mut i32,
                buf.as_mut_ptr() as *mut c_char,
            )
        };

        buf.truncate(written.max(0) as usize);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn delete_shader(&self, id: GLuint) {
        unsafe { gl::DeleteShader(id) }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn validate_program(&self, program: GLuint) {
        unsafe { gl::ValidateProgram(program) }
    }

    fn program_status(&self, program: GLuint, pname: GLenum) -> bool {
        let mut success: GLint = 0;
        unsafe { gl::GetProgramiv(program, pname, (&mut success) as *mut i32) };
        success == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let mut len: GLint = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, (&mut len) as *mut i32) };

        let mut buf = vec![0_u8; len.max(1) as usize];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetProgramInfoLog(
                program,
                buf.len() as GLsizei,
                (&mut written) as *mut i32,
                buf.as_mut_ptr() as *mut c_char,
            )
        };

        buf.truncate(written.max(0) as usize);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn get_uniform_location(&self, program: GLuint, name: &CStr) -> GLint {
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn uniform_1i(&self, location: GLint, value: GLint) {
        unsafe { gl::Uniform1i(location, value) }
    }

    fn uniform_1f(&self, location: GLint, value: f32) {
        unsafe { gl::Uniform1f(location, value) }
    }

    fn uniform_4f(&self, location: GLint, value: [f32; 4]) {
        unsafe { gl::Uniform4f(location, value[0], value[1], value[2], value[3]) }
    }

    fn uniform_matrix_4fv(&self, location: GLint, matrix: &[f32; 16]) {
        unsafe { gl::UniformMatrix4fv(location, 1, gl::FALSE, matrix.as_ptr()) }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { gl::ClearColor(r, g, b, a) }
    }

    fn clear(&self, mask: GLbitfield) {
        unsafe { gl::Clear(mask) }
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { gl::Viewport(x, y, width, height) }
    }

    fn enable(&self, cap: GLenum) {
        unsafe { gl::Enable(cap) }
    }

    fn disable(&self, cap: GLenum) {
        unsafe { gl::Disable(cap) }
    }

    fn blend_func(&self, src: GLenum, dst: GLenum) {
        unsafe { gl::BlendFunc(src, dst) }
    }

    fn draw_elements(&self, mode: GLenum, count: GLsizei, kind: GLenum, offset: usize) {
        unsafe { gl::DrawElements(mode, count, kind, offset as *const c_void) }
    }
}
