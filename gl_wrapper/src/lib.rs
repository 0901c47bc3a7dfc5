//! Owning wrappers around OpenGL objects.
//!
//! Each wrapper creates its object on construction and deletes it on drop.
//! None of them are `Clone`, so an object id has exactly one owner.

#[rustfmt::skip]
pub const QUAD: [f32; 16] = [
    -0.5, -0.5, 0.0, 0.0,
     0.5, -0.5, 1.0, 0.0,
     0.5,  0.5, 1.0, 1.0,
    -0.5,  0.5, 0.0, 1.0,
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

pub mod backend;
pub mod buffer;
pub mod debug;
pub mod layout;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod program;
pub mod renderer;
pub mod texture;
pub mod vertex_array;
