/// Linear RGBA with premultiplied alpha.
///
/// Config and node colors are straight RGBA in `[0, 1]`; [`Color::from_rgba`]
/// clamps and premultiplies them at the boundary.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn from_rgba([r, g, b, a]: [f32; 4]) -> Self {
        let a = a.clamp(0.0, 1.0);
        let premul = |c: f32| c.clamp(0.0, 1.0) * a;
        Self { r: premul(r), g: premul(g), b: premul(b), a }
    }

    /// Uniform-buffer order.
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        let [r, g, b, a] = c.to_array().map(f64::from);
        wgpu::Color { r, g, b, a }
    }
}
