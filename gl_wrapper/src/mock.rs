//! Call-recording backend for tests.
//!
//! [`RecordingGl`] never touches a driver. Object ids come from one counter
//! shared by all object kinds, so ids are unique for the lifetime of the mock.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::ffi::CStr;

use gl::types::{GLbitfield, GLenum, GLint, GLsizei, GLuint};

use crate::backend::GlBackend;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    GenBuffer(GLuint),
    DeleteBuffer(GLuint),
    BindBuffer(GLenum, GLuint),
    BufferData {
        target: GLenum,
        data: Vec<u8>,
    },
    GenVertexArray(GLuint),
    DeleteVertexArray(GLuint),
    BindVertexArray(GLuint),
    EnableVertexAttribArray(GLuint),
    VertexAttribPointer {
        index: GLuint,
        size: GLint,
        kind: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    },
    GenTexture(GLuint),
    DeleteTexture(GLuint),
    ActiveTexture(GLenum),
    BindTexture(GLenum, GLuint),
    TexParameter(GLenum, GLint),
    TexImage2D {
        width: GLsizei,
        height: GLsizei,
        pixels: Vec<u8>,
    },
    CreateShader(GLenum, GLuint),
    ShaderSource(GLuint, String),
    CompileShader(GLuint),
    DeleteShader(GLuint),
    CreateProgram(GLuint),
    AttachShader(GLuint, GLuint),
    LinkProgram(GLuint),
    ValidateProgram(GLuint),
    UseProgram(GLuint),
    DeleteProgram(GLuint),
    GetUniformLocation(GLuint, String),
    Uniform1i(GLint, GLint),
    Uniform1f(GLint, f32),
    Uniform4f(GLint, [f32; 4]),
    UniformMatrix4(GLint, [f32; 16]),
    ClearColor([f32; 4]),
    Clear(GLbitfield),
    Viewport(GLint, GLint, GLsizei, GLsizei),
    Enable(GLenum),
    Disable(GLenum),
    BlendFunc(GLenum, GLenum),
    DrawElements {
        mode: GLenum,
        count: GLsizei,
        kind: GLenum,
    },
}

#[derive(Default)]
pub struct RecordingGl {
    calls: RefCell<Vec<Call>>,
    last_id: Cell<GLuint>,
    errors: RefCell<VecDeque<GLenum>>,
    uniforms: HashMap<String, GLint>,
    shader_stages: RefCell<HashMap<GLuint, GLenum>>,
    failing_stage: Option<GLenum>,
    failing_link: bool,
    failing_validation: bool,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `get_uniform_location` resolve `name`; unknown names resolve to -1.
    pub fn with_uniform(mut self, name: &str, location: GLint) -> Self {
        self.uniforms.insert(name.to_owned(), location);
        self
    }

    /// Shaders of `stage` report a failed compilation.
    pub fn with_failing_stage(mut self, stage: GLenum) -> Self {
        self.failing_stage = Some(stage);
        self
    }

    pub fn with_failing_link(mut self) -> Self {
        self.failing_link = true;
        self
    }

    pub fn with_failing_validation(mut self) -> Self {
        self.failing_validation = true;
        self
    }

    /// Queues an error code for the next `get_error`.
    pub fn push_error(&self, code: GLenum) {
        self.errors.borrow_mut().push_back(code);
    }

    pub fn pending_errors(&self) -> usize {
        self.errors.borrow().len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn next_id(&self) -> GLuint {
        let id = self.last_id.get() + 1;
        self.last_id.set(id);
        id
    }
}

impl GlBackend for RecordingGl {
    fn get_error(&self) -> GLenum {
        self.errors.borrow_mut().pop_front().unwrap_or(gl::NO_ERROR)
    }

    fn gen_buffer(&self) -> GLuint {
        let id = self.next_id();
        self.record(Call::GenBuffer(id));
        id
    }

    fn delete_buffer(&self, id: GLuint) {
        self.record(Call::DeleteBuffer(id));
    }

    fn bind_buffer(&self, target: GLenum, id: GLuint) {
        self.record(Call::BindBuffer(target, id));
    }

    fn buffer_data(&self, target: GLenum, data: &[u8], _usage: GLenum) {
        self.record(Call::BufferData {
            target,
            data: data.to_vec(),
        });
    }

    fn gen_vertex_array(&self) -> GLuint {
        let id = self.next_id();
        self.record(Call::GenVertexArray(id));
        id
    }

    fn delete_vertex_array(&self, id: GLuint) {
        self.record(Call::DeleteVertexArray(id));
    }

    fn bind_vertex_array(&self, id: GLuint) {
        self.record(Call::BindVertexArray(id));
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        self.record(Call::EnableVertexAttribArray(index));
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
        self.record(Call::VertexAttribPointer {
            index,
            size,
            kind,
            normalized,
            stride,
            offset,
        });
    }

    fn gen_texture(&self) -> GLuint {
        let id = self.next_id();
        self.record(Call::GenTexture(id));
        id
    }

    fn delete_texture(&self, id: GLuint) {
        self.record(Call::DeleteTexture(id));
    }

    fn active_texture(&self, unit: GLenum) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: GLenum, id: GLuint) {
        self.record(Call::BindTexture(target, id));
    }

    fn tex_parameter_i(&self, _target: GLenum, pname: GLenum, param: GLint) {
        self.record(Call::TexParameter(pname, param));
    }

    fn tex_image_2d(
        &self,
        _target: GLenum,
        _internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        _format: GLenum,
        _kind: GLenum,
        pixels: &[u8],
    ) {
        self.record(Call::TexImage2D {
            width,
            height,
            pixels: pixels.to_vec(),
        });
    }

    fn create_shader(&self, stage: GLenum) -> GLuint {
        let id = self.next_id();
        self.shader_stages.borrow_mut().insert(id, stage);
        self.record(Call::CreateShader(stage, id));
        id
    }

    fn shader_source(&self, id: GLuint, source: &CStr) {
        self.record(Call::ShaderSource(
            id,
            source.to_string_lossy().into_owned(),
        ));
    }

    fn compile_shader(&self, id: GLuint) {
        self.record(Call::CompileShader(id));
    }

    fn shader_compile_status(&self, id: GLuint) -> bool {
        let stage = self.shader_stages.borrow().get(&id).copied();
        stage.is_none() || stage != self.failing_stage
    }

    fn shader_info_log(&self, id: GLuint) -> String {
        format!("0:1(1): error: shader {id} rejected")
    }

    fn delete_shader(&self, id: GLuint) {
        self.record(Call::DeleteShader(id));
    }

    fn create_program(&self) -> GLuint {
        let id = self.next_id();
        self.record(Call::CreateProgram(id));
        id
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        self.record(Call::AttachShader(program, shader));
    }

    fn link_program(&self, program: GLuint) {
        self.record(Call::LinkProgram(program));
    }

    fn validate_program(&self, program: GLuint) {
        self.record(Call::ValidateProgram(program));
    }

    fn program_status(&self, _program: GLuint, pname: GLenum) -> bool {
        match pname {
            gl::LINK_STATUS => !self.failing_link,
            gl::VALIDATE_STATUS => !self.failing_validation,
            _ => true,
        }
    }

    fn program_info_log(&self, program: GLuint) -> String {
        format!("error: program {program} failed to link")
    }

    fn use_program(&self, program: GLuint) {
        self.record(Call::UseProgram(program));
    }

    fn delete_program(&self, program: GLuint) {
        self.record(Call::DeleteProgram(program));
    }

    fn get_uniform_location(&self, program: GLuint, name: &CStr) -> GLint {
        let name = name.to_string_lossy().into_owned();
        let location = self.uniforms.get(&name).copied().unwrap_or(-1);
        self.record(Call::GetUniformLocation(program, name));
        location
    }

    fn uniform_1i(&self, location: GLint, value: GLint) {
        self.record(Call::Uniform1i(location, value));
    }

    fn uniform_1f(&self, location: GLint, value: f32) {
        self.record(Call::Uniform1f(location, value));
    }

    fn uniform_4f(&self, location: GLint, value: [f32; 4]) {
        self.record(Call::Uniform4f(location, value));
    }

    fn uniform_matrix_4fv(&self, location: GLint, matrix: &[f32; 16]) {
        self.record(Call::UniformMatrix4(location, *matrix));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(Call::ClearColor([r, g, b, a]));
    }

    fn clear(&self, mask: GLbitfield) {
        self.record(Call::Clear(mask));
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.record(Call::Viewport(x, y, width, height));
    }

    fn enable(&self, cap: GLenum) {
        self.record(Call::Enable(cap));
    }

    fn disable(&self, cap: GLenum) {
        self.record(Call::Disable(cap));
    }

    fn blend_func(&self, src: GLenum, dst: GLenum) {
        self.record(Call::BlendFunc(src, dst));
    }

    fn draw_elements(&self, mode: GLenum, count: GLsizei, kind: GLenum, _offset: usize) {
        self.record(Call::DrawElements { mode, count, kind });
    }
}
