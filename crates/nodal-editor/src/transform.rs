//! World/screen conversion and zoom-to-cursor math.
//!
//! Screen space is world space translated by the pan offset. Zoom does not
//! scale the view: it moves node positions about an anchor and scales the
//! shared radius, so the offset stays a pure translation.

use nodal_engine::coords::Vec2;

#[inline]
pub fn world_to_screen(p: Vec2, offset: Vec2) -> Vec2 {
    p + offset
}

#[inline]
pub fn screen_to_world(p: Vec2, offset: Vec2) -> Vec2 {
    p - offset
}

/// Scales `position` by `factor` about the world-space `anchor`.
#[inline]
pub fn zoom_point(position: Vec2, anchor: Vec2, factor: f32) -> Vec2 {
    anchor + (position - anchor) * factor
}

/// Zooms every position about the world point under `cursor` and returns the
/// scaled radius.
///
/// The world point under the cursor is a fixed point, so it stays under the
/// cursor after the call.
pub fn zoom_to_cursor<'a, I>(
    cursor: Vec2,
    offset: Vec2,
    factor: f32,
    positions: I,
    radius: f32,
) -> f32
where
    I: IntoIterator<Item = &'a mut Vec2>,
{
    let anchor = screen_to_world(cursor, offset);
    for p in positions {
        *p = zoom_point(*p, anchor, factor);
    }
    radius * factor
}

/// Zoom multiplier for a vertical wheel delta.
///
/// Positive deltas zoom in by `step`, negative deltas zoom out by `1 / step`.
/// Returns `None` for a zero or non-finite delta.
pub fn zoom_factor_for_wheel(delta_y: f32, step: f32) -> Option<f32> {
    if !delta_y.is_finite() || delta_y == 0.0 {
        return None;
    }
    Some(if delta_y > 0.0 { step } else { 1.0 / step })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    // ── conversion ────────────────────────────────────────────────────────

    #[test]
    fn conversions_are_inverse() {
        let offset = v(-37.5, 120.25);
        for p in [v(0.0, 0.0), v(1e3, -4e2), v(-0.125, 7.0)] {
            let back = screen_to_world(world_to_screen(p, offset), offset);
            assert_relative_eq!(back.x, p.x, epsilon = 1e-4);
            assert_relative_eq!(back.y, p.y, epsilon = 1e-4);
        }
    }

    #[test]
    fn zero_offset_is_identity() {
        assert_eq!(world_to_screen(v(3.0, 4.0), Vec2::zero()), v(3.0, 4.0));
    }

    // ── zoom ──────────────────────────────────────────────────────────────

    #[test]
    fn zoom_point_keeps_anchor_fixed() {
        let anchor = v(10.0, 10.0);
        assert_eq!(zoom_point(anchor, anchor, 3.0), anchor);
        assert_eq!(zoom_point(v(20.0, 10.0), anchor, 2.0), v(30.0, 10.0));
    }

    #[test]
    fn zoom_to_cursor_keeps_point_under_cursor() {
        let offset = v(50.0, -20.0);
        let cursor = v(300.0, 200.0);
        let under = screen_to_world(cursor, offset);

        let mut positions = vec![under, v(0.0, 0.0), v(400.0, 100.0)];
        let r = zoom_to_cursor(cursor, offset, 1.25, positions.iter_mut(), 80.0);

        assert_relative_eq!(r, 100.0);
        assert_relative_eq!(positions[0].x, under.x, epsilon = 1e-3);
        assert_relative_eq!(positions[0].y, under.y, epsilon = 1e-3);
        let screen = world_to_screen(positions[0], offset);
        assert_relative_eq!(screen.x, cursor.x, epsilon = 1e-3);
        assert_relative_eq!(screen.y, cursor.y, epsilon = 1e-3);
    }

    #[test]
    fn successive_zooms_compose() {
        let cursor = v(100.0, 100.0);
        let mut once = vec![v(180.0, 40.0)];
        let mut twice = once.clone();

        let r_once = zoom_to_cursor(cursor, Vec2::zero(), 1.5 * 1.2, once.iter_mut(), 10.0);
        let r = zoom_to_cursor(cursor, Vec2::zero(), 1.5, twice.iter_mut(), 10.0);
        let r_twice = zoom_to_cursor(cursor, Vec2::zero(), 1.2, twice.iter_mut(), r);

        assert_relative_eq!(r_once, r_twice, epsilon = 1e-4);
        assert_relative_eq!(once[0].x, twice[0].x, epsilon = 1e-3);
        assert_relative_eq!(once[0].y, twice[0].y, epsilon = 1e-3);
    }

    #[test]
    fn unit_factor_changes_nothing() {
        let mut positions = vec![v(5.0, 6.0)];
        let r = zoom_to_cursor(v(1.0, 1.0), v(2.0, 2.0), 1.0, positions.iter_mut(), 7.0);
        assert_eq!(r, 7.0);
        assert_eq!(positions[0], v(5.0, 6.0));
    }

    // ── wheel ─────────────────────────────────────────────────────────────

    #[test]
    fn wheel_sign_picks_direction() {
        assert_eq!(zoom_factor_for_wheel(1.0, 1.05), Some(1.05));
        assert_relative_eq!(zoom_factor_for_wheel(-3.0, 1.05).unwrap_or(0.0), 1.0 / 1.05);
        assert_eq!(zoom_factor_for_wheel(0.0, 1.05), None);
        assert_eq!(zoom_factor_for_wheel(f32::NAN, 1.05), None);
    }
}
