use nodal_engine::coords::Vec2;

use crate::node::NodeKey;

/// Receiver for node label placement.
///
/// Positions are screen-space node centers in logical pixels. Text rendering
/// itself happens outside the editor.
pub trait LabelOverlay {
    fn attach(&mut self, key: &NodeKey, text: &str, screen_pos: Vec2);
    fn reposition(&mut self, key: &NodeKey, screen_pos: Vec2);
    fn detach(&mut self, key: &NodeKey);
}

/// Overlay that drops every label.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLabels;

impl LabelOverlay for NoLabels {
    fn attach(&mut self, _key: &NodeKey, _text: &str, _screen_pos: Vec2) {}
    fn reposition(&mut self, _key: &NodeKey, _screen_pos: Vec2) {}
    fn detach(&mut self, _key: &NodeKey) {}
}
