//! Color model used by scenes and the clear pass.

pub mod color;

pub use color::Color;
