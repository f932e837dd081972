//! Colors as the node pipeline blends them (premultiplied alpha).

mod color;

pub use color::Color;
