use std::path::{Path, PathBuf};
use std::rc::Rc;

use gl::types::GLuint;
use thiserror::Error;

use crate::backend::GlRef;
use crate::debug::gl_call;

const CHANNELS: usize = 4;

pub struct Texture2D {
    gl: GlRef,
    id: GLuint,
    width: u32,
    height: u32,
}

impl Texture2D {
    /// Decodes the image at `path` to RGBA8 and uploads it bottom row first.
    pub fn from_path(gl: &GlRef, path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();

        let image = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_owned(),
            source,
        })?;
        let image = image.flipv().into_rgba8();
        let (width, height) = image.dimensions();

        log::debug!("Loaded texture {path:?} ({width}x{height})");

        Self::from_rgba8(gl, width, height, image.as_raw(), TextureFilter::Linear)
    }

    pub fn from_rgba8(
        gl: &GlRef,
        width: u32,
        height: u32,
        data: &[u8],
        filter: TextureFilter,
    ) -> Result<Self, TextureError> {
        if width as usize * height as usize * CHANNELS != data.len() {
            return Err(TextureError::InvalidSrcLength);
        }

        let id = gl_call(&**gl, "glGenTextures", |gl| gl.gen_texture());
        gl_call(&**gl, "glBindTexture", |gl| gl.bind_texture(gl::TEXTURE_2D, id));

        let filter = filter.gl_enum() as i32;
        for (pname, param) in [
            (gl::TEXTURE_MIN_FILTER, filter),
            (gl::TEXTURE_MAG_FILTER, filter),
            (gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32),
            (gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32),
        ] {
            gl_call(&**gl, "glTexParameteri", |gl| {
                gl.tex_parameter_i(gl::TEXTURE_2D, pname, param)
            });
        }

        gl_call(&**gl, "glTexImage2D", |gl| {
            gl.tex_image_2d(
                gl::TEXTURE_2D,
                gl::RGBA8 as i32,
                width as i32,
                height as i32,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                data,
            )
        });
        gl_call(&**gl, "glBindTexture", |gl| gl.bind_texture(gl::TEXTURE_2D, 0));

        Ok(Self {
            gl: Rc::clone(gl),
            id,
            width,
            height,
        })
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Binds to texture unit `slot`.
    pub fn bind(&self, slot: u8) {
        gl_call(&*self.gl, "glActiveTexture", |gl| {
            gl.active_texture(gl::TEXTURE0 + slot as u32)
        });
        gl_call(&*self.gl, "glBindTexture", |gl| {
            gl.bind_texture(gl::TEXTURE_2D, self.id)
        });
    }

    pub fn unbind(&self) {
        gl_call(&*self.gl, "glBindTexture", |gl| gl.bind_texture(gl::TEXTURE_2D, 0));
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        gl_call(&*self.gl, "glDeleteTextures", |gl| gl.delete_texture(self.id));
    }
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Invalid source data length")]
    InvalidSrcLength,
    #[error("Failed to load texture {path:?}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

impl TextureFilter {
    pub fn gl_enum(&self) -> u32 {
        match self {
            TextureFilter::Nearest => gl::NEAREST,
            TextureFilter::Linear => gl::LINEAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, RecordingGl};

    fn setup() -> (Rc<RecordingGl>, GlRef) {
        let mock = Rc::new(RecordingGl::new());
        let gl: GlRef = mock.clone();
        (mock, gl)
    }

    #[test]
    fn rejects_wrong_length() {
        let (mock, gl) = setup();

        let err = Texture2D::from_rgba8(&gl, 2, 2, &[0; 15], TextureFilter::Nearest);

        assert!(matches!(err, Err(TextureError::InvalidSrcLength)));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn from_path_flips_rows() {
        let (mock, gl) = setup();

        // top row red, bottom row blue
        let image = image::RgbaImage::from_fn(1, 2, |_, y| {
            if y == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            }
        });
        let path = std::env::temp_dir().join(format!("gl_wrapper_flip_{}.png", std::process::id()));
        image.save(&path).unwrap();

        let texture = Texture2D::from_path(&gl, &path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((texture.width(), texture.height()), (1, 2));
        assert!(mock.calls().contains(&Call::TexImage2D {
            width: 1,
            height: 2,
            pixels: vec![0, 0, 255, 255, 255, 0, 0, 255],
        }));
        assert!(mock
            .calls()
            .contains(&Call::TexParameter(gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32)));
    }

    #[test]
    fn undecodable_file_is_an_error() {
        let (_mock, gl) = setup();
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/basic.vert");

        let err = Texture2D::from_path(&gl, path);

        assert!(matches!(err, Err(TextureError::Decode { .. })));
    }

    #[test]
    fn bind_selects_unit() {
        let (mock, gl) = setup();
        let texture = Texture2D::from_rgba8(&gl, 1, 1, &[0; 4], TextureFilter::Nearest).unwrap();
        mock.clear_calls();

        texture.bind(3);
        texture.unbind();
        let id = texture.id();
        drop(texture);

        assert_eq!(
            mock.calls(),
            vec![
                Call::ActiveTexture(gl::TEXTURE3),
                Call::BindTexture(gl::TEXTURE_2D, id),
                Call::BindTexture(gl::TEXTURE_2D, 0),
                Call::DeleteTexture(id),
            ]
        );
    }
}
