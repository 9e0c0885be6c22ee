//! Paint model shared by shapes, text and the clear color.

pub mod color;

pub use color::Color;
