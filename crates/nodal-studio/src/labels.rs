use nodal_editor::{LabelOverlay, NodeKey, Vec2};

/// Label overlay that reports placements to the log.
///
/// The studio has no text renderer; this keeps label traffic observable with
/// `RUST_LOG=nodal_studio=debug`.
pub struct LoggedLabels {
    editor: String,
    attached: usize,
}

impl LoggedLabels {
    pub fn new(editor: impl Into<String>) -> Self {
        Self { editor: editor.into(), attached: 0 }
    }
}

impl LabelOverlay for LoggedLabels {
    fn attach(&mut self, key: &NodeKey, text: &str, screen_pos: Vec2) {
        self.attached += 1;
        log::debug!(
            "[{}] label `{text}` on {key} at ({:.1}, {:.1}); {} attached",
            self.editor,
            screen_pos.x,
            screen_pos.y,
            self.attached
        );
    }

    fn reposition(&mut self, key: &NodeKey, screen_pos: Vec2) {
        log::trace!("[{}] label {key} -> ({:.1}, {:.1})", self.editor, screen_pos.x, screen_pos.y);
    }

    fn detach(&mut self, key: &NodeKey) {
        self.attached = self.attached.saturating_sub(1);
        log::debug!("[{}] label on {key} detached; {} attached", self.editor, self.attached);
    }
}
