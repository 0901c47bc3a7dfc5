use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use gl_wrapper::debug::GuardMode;

#[derive(Debug, Parser)]
pub struct Args {
    /// JSON5 file with window and demo settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Window width in pixels
    #[arg(long)]
    pub width: Option<u32>,
    /// Window height in pixels
    #[arg(long)]
    pub height: Option<u32>,
    /// Name of the demo to open instead of the menu
    #[arg(short, long)]
    pub start: Option<String>,
    /// Directory containing shaders/ and textures/
    #[arg(long)]
    pub res: Option<PathBuf>,
    /// OpenGL error checking after every call
    #[arg(long, value_enum)]
    pub guard: Option<GuardArg>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum GuardArg {
    Off,
    Log,
    Panic,
}

impl From<GuardArg> for GuardMode {
    fn from(g: GuardArg) -> Self {
        match g {
            GuardArg::Off => Self::Off,
            GuardArg::Log => Self::Log,
            GuardArg::Panic => Self::Panic,
        }
    }
}
