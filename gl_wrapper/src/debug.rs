//! Process-wide GPU error checking.
//!
//! Every wrapper routes its driver calls through [`gl_call`], which drains the
//! error queue before the call and inspects it afterwards. What happens on a
//! new error is decided once per process by [`init`].

use std::panic::Location;

use gl::types::GLenum;
use once_cell::sync::OnceCell;

use crate::backend::GlBackend;

/// Upper bound on queue drains, a lost context can report errors forever.
const MAX_DRAINED: usize = 64;

static GUARD: OnceCell<GuardMode> = OnceCell::new();

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GuardMode {
    /// Calls go straight to the driver.
    Off,
    /// New errors are logged.
    Log,
    /// New errors are logged, then the thread panics.
    Panic,
}

impl Default for GuardMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Panic
        } else {
            Self::Off
        }
    }
}

/// Sets the guard mode for the rest of the process.
///
/// Returns the already active mode when called a second time.
pub fn init(mode: GuardMode) -> Result<(), GuardMode> {
    GUARD.set(mode).map_err(|_| self::mode())
}

pub fn mode() -> GuardMode {
    GUARD.get().copied().unwrap_or_default()
}

/// Runs `call` against `gl` with error checking around it.
///
/// `label` names the driver function for the log line, the caller's source
/// location is attached automatically.
#[track_caller]
pub fn gl_call<T>(gl: &dyn GlBackend, label: &str, call: impl FnOnce(&dyn GlBackend) -> T) -> T {
    let mode = mode();

    if mode == GuardMode::Off {
        return call(gl);
    }

    clear_errors(gl);
    let ret = call(gl);

    let errors = collect_errors(gl);
    if !errors.is_empty() {
        report(label, Location::caller(), &errors, mode);
    }

    ret
}

fn clear_errors(gl: &dyn GlBackend) {
    for _ in 0..MAX_DRAINED {
        if gl.get_error() == gl::NO_ERROR {
            break;
        }
    }
}

fn collect_errors(gl: &dyn GlBackend) -> Vec<GLenum> {
    let mut errors = Vec::new();

    while errors.len() < MAX_DRAINED {
        match gl.get_error() {
            gl::NO_ERROR => break,
            e => errors.push(e),
        }
    }

    errors
}

fn report(label: &str, site: &Location<'_>, errors: &[GLenum], mode: GuardMode) {
    for e in errors {
        log::error!(
            "[OpenGL] {} (0x{e:04X}) in {label} at {}:{}",
            error_name(*e),
            site.file(),
            site.line()
        );
    }

    if mode == GuardMode::Panic {
        panic!(
            "OpenGL call {label} at {}:{} raised {} error(s)",
            site.file(),
            site.line(),
            errors.len()
        );
    }
}

pub fn error_name(code: GLenum) -> &'static str {
    match code {
        gl::INVALID_ENUM => "GL_INVALID_ENUM",
        gl::INVALID_VALUE => "GL_INVALID_VALUE",
        gl::INVALID_OPERATION => "GL_INVALID_OPERATION",
        gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        gl::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        gl::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        _ => "unknown error",
    }
}
