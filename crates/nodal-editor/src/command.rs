use nodal_engine::coords::Vec2;

/// Control-panel commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorCommand {
    /// Smooth zoom in, anchored at the canvas center.
    ZoomIn,
    /// Smooth zoom out, anchored at the canvas center.
    ZoomOut,
    /// Appends a node at `position` (world), or at a random visible spot.
    AddNode { position: Option<Vec2> },
    /// Empties the node list and the selection.
    Clear,
}
