/// Editor configuration.
///
/// Plain data with defaults; pass it to [`crate::Editor::new`]. Invalid values
/// are replaced by defaults through [`EditorConfig::sanitized`] rather than
/// rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Perimeter segments per circle fan.
    pub circle_segments: u32,
    /// Initial shared node radius (logical px).
    pub node_radius: f32,
    /// Width of the border ring drawn outside the fill.
    pub border_width: f32,
    /// Straight RGBA used for nodes without a background color.
    pub fill_color: [f32; 4],
    /// Border color of unselected nodes.
    pub border_color: [f32; 4],
    /// Border color of the selected node.
    pub accent_color: [f32; 4],
    /// Straight RGBA the surface is cleared to each frame.
    pub clear_color: [f32; 4],
    /// Multiplier applied per wheel notch.
    pub wheel_zoom_factor: f32,
    /// Total multiplier of one zoom-in/zoom-out command.
    pub button_zoom_factor: f32,
    /// Frames a zoom command is spread over.
    pub zoom_animation_frames: u32,
}

/// Fan indices are `u16`; `segments + 1` must stay addressable.
pub const MAX_CIRCLE_SEGMENTS: u32 = u16::MAX as u32 - 1;
pub const MIN_CIRCLE_SEGMENTS: u32 = 3;

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            circle_segments: 100,
            node_radius: 80.0,
            border_width: 4.0,
            fill_color: [0.2, 0.6, 1.0, 1.0],
            border_color: [0.0, 0.0, 0.0, 1.0],
            accent_color: [1.0, 0.55, 0.0, 1.0],
            clear_color: [0.96, 0.96, 0.96, 1.0],
            wheel_zoom_factor: 1.05,
            button_zoom_factor: 1.25,
            zoom_animation_frames: 12,
        }
    }
}

impl EditorConfig {
    /// Returns a copy with out-of-range values replaced by defaults.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let positive = |v: f32, fallback: f32| if v.is_finite() && v > 0.0 { v } else { fallback };
        let growth = |v: f32, fallback: f32| if v.is_finite() && v > 1.0 { v } else { fallback };

        Self {
            circle_segments: self.circle_segments.clamp(MIN_CIRCLE_SEGMENTS, MAX_CIRCLE_SEGMENTS),
            node_radius: positive(self.node_radius, d.node_radius),
            border_width: if self.border_width.is_finite() && self.border_width >= 0.0 {
                self.border_width
            } else {
                d.border_width
            },
            fill_color: self.fill_color,
            border_color: self.border_color,
            accent_color: self.accent_color,
            clear_color: self.clear_color,
            wheel_zoom_factor: growth(self.wheel_zoom_factor, d.wheel_zoom_factor),
            button_zoom_factor: growth(self.button_zoom_factor, d.button_zoom_factor),
            zoom_animation_frames: self.zoom_animation_frames.max(1),
        }
    }
}
