use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use gl::types::{GLenum, GLint, GLuint};
use thiserror::Error;

use crate::backend::{GlBackend, GlRef};
use crate::debug::gl_call;

const MARKER: &str = "#shader";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(&self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl Display for ShaderStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// GLSL text of both program stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Reads the two stages from sibling files.
    pub fn from_files(
        vertex: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        Ok(Self {
            vertex: read_source(vertex.as_ref())?,
            fragment: read_source(fragment.as_ref())?,
        })
    }

    /// Reads a single file split by `#shader vertex` / `#shader fragment` lines.
    pub fn from_combined_file(path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        Self::parse_combined(&read_source(path.as_ref())?)
    }

    /// Splits `src` at its stage marker lines.
    ///
    /// Lines before the first marker are dropped, marker lines are not part
    /// of either stage.
    pub fn parse_combined(src: &str) -> Result<Self, ShaderError> {
        let mut vertex: Option<String> = None;
        let mut fragment: Option<String> = None;
        let mut current = None;

        for line in src.lines() {
            if let Some(stage) = parse_marker(line)? {
                current = Some(stage);

                match stage {
                    ShaderStage::Vertex => vertex.get_or_insert_with(String::new),
                    ShaderStage::Fragment => fragment.get_or_insert_with(String::new),
                };

                continue;
            }

            let section = match current {
                Some(ShaderStage::Vertex) => vertex.as_mut(),
                Some(ShaderStage::Fragment) => fragment.as_mut(),
                None => None,
            };

            if let Some(section) = section {
                section.push_str(line);
                section.push('\n');
            }
        }

        Ok(Self {
            vertex: vertex.ok_or(ShaderError::MissingStage(ShaderStage::Vertex))?,
            fragment: fragment.ok_or(ShaderError::MissingStage(ShaderStage::Fragment))?,
        })
    }
}

fn parse_marker(line: &str) -> Result<Option<ShaderStage>, ShaderError> {
    let rest = match line.trim().strip_prefix(MARKER) {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => return Ok(None),
    };

    match rest {
        "vertex" => Ok(Some(ShaderStage::Vertex)),
        "fragment" => Ok(Some(ShaderStage::Fragment)),
        other => Err(ShaderError::UnknownStage(other.to_owned())),
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_owned(),
        source,
    })
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("Cannot read shader file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unknown shader stage marker '{0}'")]
    UnknownStage(String),
    #[error("No {0} section in shader source")]
    MissingStage(ShaderStage),
    #[error("The {0} shader source contains a nul byte")]
    InteriorNul(ShaderStage),
    #[error("Failed to compile {stage} shader: {log}")]
    Compilation { stage: ShaderStage, log: String },
    #[error("Failed to link program: {0}")]
    Linking(String),
}

/// Linked shader program with a lazily filled uniform location cache.
pub struct Shader {
    gl: GlRef,
    id: GLuint,
    uniforms: RefCell<HashMap<String, GLint>>,
}

impl Shader {
    pub fn new(gl: &GlRef, source: &ShaderSource) -> Result<Self, ShaderError> {
        let gl_ref = &**gl;

        let vert = compile_stage(gl_ref, ShaderStage::Vertex, &source.vertex)?;
        let frag = match compile_stage(gl_ref, ShaderStage::Fragment, &source.fragment) {
            Ok(frag) => frag,
            Err(e) => {
                gl_call(gl_ref, "glDeleteShader", |gl| gl.delete_shader(vert));
                return Err(e);
            }
        };

        let program = gl_call(gl_ref, "glCreateProgram", |gl| gl.create_program());
        gl_call(gl_ref, "glAttachShader", |gl| gl.attach_shader(program, vert));
        gl_call(gl_ref, "glAttachShader", |gl| gl.attach_shader(program, frag));
        gl_call(gl_ref, "glLinkProgram", |gl| gl.link_program(program));

        let linked = gl_call(gl_ref, "glGetProgramiv", |gl| {
            gl.program_status(program, gl::LINK_STATUS)
        });

        let result = if linked {
            gl_call(gl_ref, "glValidateProgram", |gl| gl.validate_program(program));

            let valid = gl_call(gl_ref, "glGetProgramiv", |gl| {
                gl.program_status(program, gl::VALIDATE_STATUS)
            });
            if !valid {
                log::warn!(
                    "[OpenGL] program {program} did not validate: {}",
                    gl_ref.program_info_log(program)
                );
            }

            Ok(program)
        } else {
            let info = gl_call(gl_ref, "glGetProgramInfoLog", |gl| {
                gl.program_info_log(program)
            });
            log::error!("[OpenGL] failed to link program:\n{info}");
            gl_call(gl_ref, "glDeleteProgram", |gl| gl.delete_program(program));

            Err(ShaderError::Linking(info))
        };

        gl_call(gl_ref, "glDeleteShader", |gl| gl.delete_shader(vert));
        gl_call(gl_ref, "glDeleteShader", |gl| gl.delete_shader(frag));

        let id = result?;

        Ok(Self {
            gl: Rc::clone(gl),
            id,
            uniforms: RefCell::new(HashMap::new()),
        })
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn bind(&self) {
        gl_call(&*self.gl, "glUseProgram", |gl| gl.use_program(self.id));
    }

    pub fn unbind(&self) {
        gl_call(&*self.gl, "glUseProgram", |gl| gl.use_program(0));
    }

    /// Location of uniform `name`, or -1 when the program has none.
    ///
    /// Only the first lookup of a name reaches the driver.
    pub fn uniform_location(&self, name: &str) -> GLint {
        let cached = self.uniforms.borrow().get(name).copied();
        if let Some(location) = cached {
            return location;
        }

        let location = match CString::new(name) {
            Ok(c_name) => gl_call(&*self.gl, "glGetUniformLocation", |gl| {
                gl.get_uniform_location(self.id, &c_name)
            }),
            Err(_) => -1,
        };

        if location == -1 {
            log::warn!("[OpenGL] uniform '{name}' doesn't exist in program {}", self.id);
        }

        self.uniforms.borrow_mut().insert(name.to_owned(), location);

        location
    }

    pub fn set_uniform_1i(&self, name: &str, value: i32) {
        self.with_location(name, "glUniform1i", |gl, location| {
            gl.uniform_1i(location, value)
        });
    }

    pub fn set_uniform_1f(&self, name: &str, value: f32) {
        self.with_location(name, "glUniform1f", |gl, location| {
            gl.uniform_1f(location, value)
        });
    }

    pub fn set_uniform_4f(&self, name: &str, value: [f32; 4]) {
        self.with_location(name, "glUniform4f", |gl, location| {
            gl.uniform_4f(location, value)
        });
    }

    /// Uploads a column-major 4x4 matrix.
    pub fn set_uniform_mat4(&self, name: &str, matrix: &[[f32; 4]; 4]) {
        let flat: [f32; 16] = bytemuck::cast(*matrix);

        self.with_location(name, "glUniformMatrix4fv", |gl, location| {
            gl.uniform_matrix_4fv(location, &flat)
        });
    }

    fn with_location(&self, name: &str, label: &str, set: impl FnOnce(&dyn GlBackend, GLint)) {
        let location = self.uniform_location(name);

        if location != -1 {
            gl_call(&*self.gl, label, |gl| set(gl, location));
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        gl_call(&*self.gl, "glDeleteProgram", |gl| gl.delete_program(self.id));
    }
}

fn compile_stage(gl: &dyn GlBackend, stage: ShaderStage, src: &str) -> Result<GLuint, ShaderError> {
    let src = CString::new(src).map_err(|_| ShaderError::InteriorNul(stage))?;

    let id = gl_call(gl, "glCreateShader", |gl| gl.create_shader(stage.gl_enum()));
    gl_call(gl, "glShaderSource", |gl| gl.shader_source(id, &src));
    gl_call(gl, "glCompileShader", |gl| gl.compile_shader(id));

    let compiled = gl_call(gl, "glGetShaderiv", |gl| gl.shader_compile_status(id));
    if !compiled {
        let info = gl_call(gl, "glGetShaderInfoLog", |gl| gl.shader_info_log(id));
        log::error!("[OpenGL] failed to compile {stage} shader:\n{info}");
        gl_call(gl, "glDeleteShader", |gl| gl.delete_shader(id));

        return Err(ShaderError::Compilation { stage, log: info });
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, RecordingGl};

    const COMBINED: &str = include_str!("../tests/fixtures/combined.shader");

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    fn source() -> ShaderSource {
        ShaderSource::new("void main() {}\n", "void main() {}\n")
    }

    #[test]
    fn combined_source_splits_at_markers() {
        let src = ShaderSource::parse_combined(COMBINED).unwrap();

        assert!(src.vertex.starts_with("#version 330 core\n"));
        assert!(src.vertex.contains("gl_Position = position;"));
        assert!(!src.vertex.contains("#shader"));
        assert!(!src.vertex.contains("u_Color"));
        assert!(!src.vertex.contains("preamble"));

        assert!(src.fragment.starts_with("#version 330 core\n"));
        assert!(src.fragment.contains("uniform vec4 u_Color;"));
        assert!(!src.fragment.contains("gl_Position"));
        assert!(!src.fragment.contains("#shader"));
    }

    #[test]
    fn combined_file_matches_parsed_text() {
        let from_file = ShaderSource::from_combined_file(fixture("combined.shader")).unwrap();

        assert_eq!(from_file, ShaderSource::parse_combined(COMBINED).unwrap());
    }

    #[test]
    fn separate_files() {
        let src = ShaderSource::from_files(fixture("basic.vert"), fixture("basic.frag")).unwrap();

        assert!(src.vertex.contains("gl_Position"));
        assert!(src.fragment.contains("vec4(1.0, 0.0, 1.0, 1.0)"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ShaderSource::from_files(fixture("nope.vert"), fixture("basic.frag"));

        assert!(matches!(err, Err(ShaderError::Io { .. })));
    }

    #[test]
    fn marker_edge_cases() {
        let src = "#shader fragment\nb\n#shader vertex\na\n";
        let parsed = ShaderSource::parse_combined(src).unwrap();
        assert_eq!(parsed, ShaderSource::new("a\n", "b\n"));

        let err = ShaderSource::parse_combined("#shader vertex\na\n");
        assert!(matches!(
            err,
            Err(ShaderError::MissingStage(ShaderStage::Fragment))
        ));

        let err = ShaderSource::parse_combined("#shader geometry\n");
        assert!(matches!(err, Err(ShaderError::UnknownStage(s)) if s == "geometry"));

        let parsed = ShaderSource::parse_combined("#shader vertex\n#shaders are fun\n#shader fragment\n")
            .unwrap();
        assert_eq!(parsed.vertex, "#shaders are fun\n");
        assert_eq!(parsed.fragment, "");
    }

    #[test]
    fn builds_program_and_releases_stages() {
        let mock = Rc::new(RecordingGl::new());
        let gl: GlRef = mock.clone();

        let shader = Shader::new(&gl, &source()).unwrap();

        assert_eq!(mock.count(|c| matches!(c, Call::CompileShader(_))), 2);
        assert_eq!(mock.count(|c| matches!(c, Call::AttachShader(p, _) if *p == shader.id())), 2);
        assert_eq!(mock.count(|c| matches!(c, Call::DeleteShader(_))), 2);
        assert_eq!(mock.count(|c| *c == Call::ValidateProgram(shader.id())), 1);

        let id = shader.id();
        drop(shader);
        assert_eq!(mock.count(|c| *c == Call::DeleteProgram(id)), 1);
    }

    #[test]
    fn compile_failure_reports_stage() {
        let mock = Rc::new(RecordingGl::new().with_failing_stage(gl::FRAGMENT_SHADER));
        let gl: GlRef = mock.clone();

        let err = Shader::new(&gl, &source());

        assert!(matches!(
            err,
            Err(ShaderError::Compilation {
                stage: ShaderStage::Fragment,
                ..
            })
        ));
        assert_eq!(mock.count(|c| matches!(c, Call::DeleteShader(_))), 2);
        assert_eq!(mock.count(|c| matches!(c, Call::CreateProgram(_))), 0);
    }

    #[test]
    fn link_failure_deletes_program() {
        let mock = Rc::new(RecordingGl::new().with_failing_link());
        let gl: GlRef = mock.clone();

        let err = Shader::new(&gl, &source());

        assert!(matches!(err, Err(ShaderError::Linking(_))));
        assert_eq!(mock.count(|c| matches!(c, Call::DeleteProgram(_))), 1);
        assert_eq!(mock.count(|c| matches!(c, Call::DeleteShader(_))), 2);
    }

    #[test]
    fn failed_validation_is_not_fatal() {
        let mock = Rc::new(RecordingGl::new().with_failing_validation());
        let gl: GlRef = mock.clone();

        assert!(Shader::new(&gl, &source()).is_ok());
    }

    #[test]
    fn uniform_lookup_is_cached() {
        let mock = Rc::new(RecordingGl::new().with_uniform("u_Color", 3));
        let gl: GlRef = mock.clone();
        let shader = Shader::new(&gl, &source()).unwrap();

        shader.set_uniform_4f("u_Color", [0.2, 0.3, 0.8, 1.0]);
        shader.set_uniform_4f("u_Color", [0.3, 0.3, 0.8, 1.0]);

        assert_eq!(shader.uniform_location("u_Color"), 3);
        assert_eq!(
            mock.count(|c| matches!(c, Call::GetUniformLocation(_, n) if n == "u_Color")),
            1
        );
        assert_eq!(mock.count(|c| matches!(c, Call::Uniform4f(3, _))), 2);
    }

    #[test]
    fn missing_uniform_is_cached_and_skipped() {
        let mock = Rc::new(RecordingGl::new());
        let gl: GlRef = mock.clone();
        let shader = Shader::new(&gl, &source()).unwrap();

        shader.set_uniform_1f("u_Missing", 1.0);
        shader.set_uniform_1f("u_Missing", 2.0);

        assert_eq!(shader.uniform_location("u_Missing"), -1);
        assert_eq!(
            mock.count(|c| matches!(c, Call::GetUniformLocation(_, _))),
            1
        );
        assert_eq!(mock.count(|c| matches!(c, Call::Uniform1f(..))), 0);
    }

    #[test]
    fn matrix_is_uploaded_column_major() {
        let mock = Rc::new(RecordingGl::new().with_uniform("u_MVP", 1));
        let gl: GlRef = mock.clone();
        let shader = Shader::new(&gl, &source()).unwrap();

        let mut columns = [[0.0; 4]; 4];
        columns[3] = [10.0, 20.0, 0.0, 1.0];
        shader.set_uniform_mat4("u_MVP", &columns);

        let mut expected = [0.0; 16];
        expected[12..].copy_from_slice(&[10.0, 20.0, 0.0, 1.0]);
        assert!(mock.calls().contains(&Call::UniformMatrix4(1, expected)));
    }
}
