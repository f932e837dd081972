//! Editor façade: one interactive diagram instance.

use nodal_engine::coords::{Vec2, Viewport};
use nodal_engine::input::{InputEvent, MouseButton, MouseButtonState};
use nodal_engine::paint::Color;
use nodal_engine::render::{RenderCtx, RenderTarget};

use crate::command::EditorCommand;
use crate::config::EditorConfig;
use crate::controller::{Controller, DragState};
use crate::node::{Node, NodeKey};
use crate::overlay::LabelOverlay;
use crate::registry::{ReconcileSummary, Registry};
use crate::render_object::NodeStyle;
use crate::renderer::{RedrawTracker, SceneRenderer};
use crate::schedule::{FrameThrottle, ZoomAnimation};
use crate::state::EditorState;
use crate::transform::{screen_to_world, zoom_factor_for_wheel};

/// An editor instance bound to one [`EditorState`].
///
/// Every mutation goes through the state cells first; the registry is then
/// reconciled against the canonical node list before control returns, so hit
/// tests always see the current picture.
///
/// Pointer moves are coalesced: only the latest one is applied, once per
/// frame, in [`Editor::on_frame`]. Presses, releases and wheel steps apply
/// immediately.
pub struct Editor<T> {
    config: EditorConfig,
    state: EditorState<T>,
    registry: Registry,
    controller: Controller,
    moves: FrameThrottle<Vec2>,
    zoom: ZoomAnimation,
    redraw: RedrawTracker,
    nodes_added: u64,
    disposed: bool,
}

impl<T: 'static> Editor<T> {
    pub fn new(
        state: EditorState<T>,
        config: EditorConfig,
        overlay: Box<dyn LabelOverlay>,
    ) -> Self {
        let config = config.sanitized();
        let registry = Registry::new(
            NodeStyle::from(&config),
            state.pan_offset().clone(),
            state.node_radius().clone(),
            overlay,
        );
        let redraw = RedrawTracker::new(&state);

        let mut editor = Self {
            config,
            state,
            registry,
            controller: Controller::new(),
            moves: FrameThrottle::new("pointer moves"),
            zoom: ZoomAnimation::new(),
            redraw,
            nodes_added: 0,
            disposed: false,
        };
        editor.sync();
        editor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> &EditorState<T> {
        &self.state
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn drag_state(&self) -> &DragState {
        self.controller.drag_state()
    }

    pub fn clear_color(&self) -> Color {
        Color::from_rgba(self.config.clear_color)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Reconciles the registry with the canonical node list and selection.
    pub fn sync(&mut self) -> ReconcileSummary {
        if self.disposed {
            return ReconcileSummary::default();
        }
        self.state.forget_missing_selection();
        let selection = self.state.selection().get();
        let registry = &mut self.registry;
        self.state.nodes().with(|nodes| registry.reconcile(nodes, selection.as_ref()))
    }

    // ── input ─────────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, pointer: Vec2, button: MouseButton) {
        if self.disposed {
            return;
        }
        self.flush_move();
        self.controller.pointer_down(pointer, button, &self.state, &mut self.registry);
        self.sync();
    }

    /// Records the pointer and defers the move to the next frame.
    pub fn pointer_move(&mut self, pointer: Vec2) {
        if self.disposed {
            return;
        }
        self.controller.track_pointer(pointer);
        if !self.controller.is_idle() {
            self.moves.push(pointer);
        }
    }

    /// Applies any deferred move, then ends the interaction.
    pub fn pointer_up(&mut self, button: MouseButton) {
        if self.disposed {
            return;
        }
        self.flush_move();
        self.controller.pointer_up(button, &mut self.registry);
        self.sync();
    }

    pub fn pointer_leave(&mut self) {
        if self.disposed {
            return;
        }
        self.flush_move();
        self.controller.pointer_leave(&mut self.registry);
        self.sync();
    }

    /// Zooms about the pointer (or the canvas center if it is unknown).
    ///
    /// A deferred move is applied first so the zoom anchors on the current
    /// pan offset.
    pub fn wheel(&mut self, delta_y: f32) {
        if self.disposed {
            return;
        }
        let Some(factor) = zoom_factor_for_wheel(delta_y, self.config.wheel_zoom_factor) else {
            return;
        };
        self.flush_move();
        let anchor = self
            .controller
            .pointer()
            .unwrap_or_else(|| self.state.canvas_size().get().center());
        self.zoom_at(anchor, factor);
        self.sync();
    }

    /// Routes a platform event. Returns whether the editor used it.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerMoved(ev) => {
                self.pointer_move(Vec2::new(ev.x, ev.y));
                true
            }
            InputEvent::PointerButton(ev) => {
                let pointer = Vec2::new(ev.x, ev.y);
                match ev.state {
                    MouseButtonState::Pressed => self.pointer_down(pointer, ev.button),
                    MouseButtonState::Released => self.pointer_up(ev.button),
                }
                true
            }
            InputEvent::MouseWheel { delta, .. } => {
                self.wheel(delta.vertical());
                true
            }
            InputEvent::PointerLeft | InputEvent::Focused(false) => {
                self.pointer_leave();
                true
            }
            _ => false,
        }
    }

    fn flush_move(&mut self) {
        if let Some(pointer) = self.moves.take() {
            self.controller.pointer_move(pointer, &self.state, &self.registry);
        }
    }

    fn zoom_at(&mut self, anchor: Vec2, factor: f32) {
        if self.state.zoom_at(anchor, factor) {
            self.controller.zoomed(factor, &mut self.registry);
        }
    }

    // ── view / frame ──────────────────────────────────────────────────────

    pub fn resize(&mut self, size: Viewport) {
        self.state.resize(size);
    }

    /// Applies deferred work for this frame and reconciles.
    pub fn on_frame(&mut self) {
        if self.disposed {
            return;
        }
        self.flush_move();
        if let Some(step) = self.zoom.tick() {
            self.zoom_at(step.anchor, step.factor);
        }
        self.sync();
    }

    /// Whether a frame should be scheduled: deferred work is pending or the
    /// picture changed since the last repaint.
    pub fn wants_frame(&self) -> bool {
        !self.disposed
            && (self.moves.is_pending() || self.zoom.is_running() || self.redraw.is_dirty())
    }

    /// Runs [`Editor::on_frame`] and draws the registry with `renderer`.
    pub fn render(
        &mut self,
        renderer: &SceneRenderer,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
    ) {
        self.on_frame();
        if self.disposed {
            return;
        }
        self.redraw.take_dirty();
        renderer.render(ctx, target, &mut self.registry);
    }
}

impl<T> Editor<T> {
    // ── teardown ──────────────────────────────────────────────────────────

    /// Releases every render object, subscription and pending callback.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.moves.cancel();
        self.zoom.cancel();
        self.controller.finish(&mut self.registry);
        self.registry.dispose_all();
        self.redraw.dispose();
        self.disposed = true;
        log::debug!("editor disposed");
    }
}

impl<T> Drop for Editor<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T: Default + 'static> Editor<T> {
    pub fn apply(&mut self, command: EditorCommand) {
        if self.disposed {
            return;
        }
        log::debug!("command {command:?}");

        match command {
            EditorCommand::ZoomIn => self.start_zoom(self.config.button_zoom_factor),
            EditorCommand::ZoomOut => self.start_zoom(1.0 / self.config.button_zoom_factor),
            EditorCommand::AddNode { position } => {
                let position = position.unwrap_or_else(|| self.random_visible_position());
                self.nodes_added += 1;
                let node = Node::new(NodeKey::generate(), position, T::default())
                    .with_label(format!("Node {}", self.nodes_added));
                self.state.push_node(node);
            }
            EditorCommand::Clear => {
                self.moves.cancel();
                self.controller.finish(&mut self.registry);
                self.state.clear_nodes();
            }
        }
        self.sync();
    }

    fn start_zoom(&mut self, factor: f32) {
        let anchor = self.state.canvas_size().get().center();
        self.zoom.start(anchor, factor, self.config.zoom_animation_frames);
    }

    /// Uniform random world position whose circle is fully on screen when the
    /// canvas is large enough, otherwise the canvas center.
    fn random_visible_position(&self) -> Vec2 {
        let size = self.state.canvas_size().get();
        let radius = self.state.node_radius().get();

        let pick = |extent: f32| {
            if extent - 2.0 * radius <= 0.0 {
                return extent * 0.5;
            }
            rand::random_range(radius..=extent - radius)
        };

        let screen = Vec2::new(pick(size.width), pick(size.height));
        screen_to_world(screen, self.state.pan_offset().get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::NoLabels;
    use approx::assert_relative_eq;
    use nodal_engine::input::{Modifiers, MouseWheelDelta, PointerButtonEvent, PointerMoveEvent};

    fn editor(nodes: Vec<Node<()>>) -> Editor<()> {
        let state = EditorState::new(80.0);
        state.resize(Viewport::new(800.0, 600.0));
        state.replace_nodes(nodes);
        Editor::new(state, EditorConfig::default(), Box::new(NoLabels))
    }

    fn button(state: MouseButtonState, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state,
            x,
            y,
            modifiers: Modifiers::default(),
        })
    }

    // ── throttling ────────────────────────────────────────────────────────

    #[test]
    fn moves_apply_once_per_frame_latest_wins() {
        let mut ed = editor(vec![Node::new("a", Vec2::new(100.0, 100.0), ())]);
        ed.pointer_down(Vec2::new(100.0, 100.0), MouseButton::Left);

        ed.pointer_move(Vec2::new(110.0, 100.0));
        ed.pointer_move(Vec2::new(150.0, 120.0));
        assert_eq!(ed.state().position_of(&"a".into()), Some(Vec2::new(100.0, 100.0)));
        assert!(ed.wants_frame());

        ed.on_frame();
        assert_eq!(ed.state().position_of(&"a".into()), Some(Vec2::new(150.0, 120.0)));
        ed.dispose();
    }

    #[test]
    fn release_flushes_pending_move() {
        let mut ed = editor(vec![Node::new("a", Vec2::new(100.0, 100.0), ())]);
        ed.pointer_down(Vec2::new(100.0, 100.0), MouseButton::Left);
        ed.pointer_move(Vec2::new(300.0, 300.0));
        ed.pointer_up(MouseButton::Left);

        assert_eq!(ed.state().position_of(&"a".into()), Some(Vec2::new(300.0, 300.0)));
        assert_eq!(ed.drag_state(), &DragState::Idle);
        ed.dispose();
    }

    // ── commands ──────────────────────────────────────────────────────────

    #[test]
    fn add_node_places_labelled_node_on_screen() {
        let mut ed = editor(vec![]);
        ed.apply(EditorCommand::AddNode { position: None });
        ed.apply(EditorCommand::AddNode { position: Some(Vec2::new(5.0, 5.0)) });

        assert_eq!(ed.registry().len(), 2);
        let nodes = ed
            .state()
            .nodes()
            .with(|ns| ns.iter().map(|n| (n.position, n.label.clone())).collect::<Vec<_>>());
        let (p, label) = &nodes[0];
        assert!(p.x >= 80.0 && p.x <= 720.0 && p.y >= 80.0 && p.y <= 520.0);
        assert_eq!(label.as_deref(), Some("Node 1"));
        assert_eq!(nodes[1], (Vec2::new(5.0, 5.0), Some("Node 2".to_string())));
        ed.dispose();
    }

    #[test]
    fn clear_empties_nodes_and_selection() {
        let mut ed = editor(vec![Node::new("a", Vec2::new(100.0, 100.0), ())]);
        ed.pointer_down(Vec2::new(100.0, 100.0), MouseButton::Left);
        ed.apply(EditorCommand::Clear);

        assert!(ed.registry().is_empty());
        assert_eq!(ed.state().selection().get(), None);
        assert_eq!(ed.drag_state(), &DragState::Idle);
        ed.dispose();
    }

    #[test]
    fn zoom_in_animates_about_canvas_center() {
        let center = Vec2::new(400.0, 300.0);
        let mut ed = editor(vec![Node::new("a", Vec2::new(500.0, 300.0), ())]);
        ed.apply(EditorCommand::ZoomIn);

        let mut frames = 0;
        while ed.wants_frame() && frames < 100 {
            ed.on_frame();
            ed.redraw.take_dirty();
            frames += 1;
        }
        assert_eq!(frames, ed.config().zoom_animation_frames as usize);
        assert_relative_eq!(ed.state().node_radius().get(), 100.0, epsilon = 1e-2);
        let p = ed.state().position_of(&"a".into()).unwrap_or(center);
        assert_relative_eq!(p.x, 525.0, epsilon = 1e-2);
        assert_relative_eq!(p.y, 300.0, epsilon = 1e-3);
        ed.dispose();
    }

    // ── events ────────────────────────────────────────────────────────────

    #[test]
    fn platform_events_drive_the_controller() {
        let mut ed = editor(vec![]);
        assert!(ed.handle_input(&button(MouseButtonState::Pressed, 10.0, 10.0)));
        assert!(ed.handle_input(&InputEvent::PointerMoved(PointerMoveEvent { x: 30.0, y: 10.0 })));
        assert!(ed.handle_input(&button(MouseButtonState::Released, 30.0, 10.0)));
        assert_eq!(ed.state().pan_offset().get(), Vec2::new(20.0, 0.0));

        let wheel = InputEvent::MouseWheel {
            delta: MouseWheelDelta::Line { x: 0.0, y: 1.0 },
            modifiers: Modifiers::default(),
        };
        assert!(ed.handle_input(&wheel));
        assert_relative_eq!(ed.state().node_radius().get(), 84.0, epsilon = 1e-3);
        assert!(!ed.handle_input(&InputEvent::Focused(true)));
        ed.dispose();
    }

    #[test]
    fn disposed_editor_ignores_input() {
        let mut ed = editor(vec![Node::new("a", Vec2::zero(), ())]);
        ed.dispose();
        ed.pointer_down(Vec2::zero(), MouseButton::Left);
        ed.apply(EditorCommand::AddNode { position: None });
        assert!(!ed.wants_frame());
        assert!(ed.registry().is_empty());
        assert_eq!(ed.state().pan_offset().subscriber_count(), 0);
    }

    #[test]
    fn add_node_falls_back_to_center_on_tiny_canvas() {
        let mut ed = editor(vec![]);
        ed.resize(Viewport::new(100.0, 600.0));
        ed.apply(EditorCommand::AddNode { position: None });
        let p = ed.state().nodes().with(|ns| ns[0].position);
        assert_eq!(p.x, 50.0);
        assert!(p.y >= 80.0 && p.y <= 520.0);
        ed.dispose();
    }

    // ── zoom during interaction ───────────────────────────────────────────

    #[test]
    fn wheel_during_pan_keeps_world_point_under_cursor() {
        let mut ed = editor(vec![Node::new("n1", Vec2::new(100.0, 100.0), ())]);
        ed.pointer_down(Vec2::new(300.0, 300.0), MouseButton::Left);
        ed.pointer_move(Vec2::new(340.0, 320.0));
        ed.wheel(1.0);
        ed.on_frame();

        let pan = ed.state().pan_offset().get();
        assert_eq!(pan, Vec2::new(40.0, 20.0));
        // World (300,300) sat under the cursor at (340,320) when the wheel fired.
        let n1 = ed.state().position_of(&"n1".into()).unwrap_or_default() + pan;
        assert_relative_eq!(n1.x, 340.0 + (140.0 - 340.0) * 1.05, epsilon = 1e-3);
        assert_relative_eq!(n1.y, 320.0 + (120.0 - 320.0) * 1.05, epsilon = 1e-3);
        ed.dispose();
    }

    #[test]
    fn wheel_during_drag_keeps_node_still_until_pointer_moves() {
        let mut ed = editor(vec![Node::new("n1", Vec2::new(100.0, 100.0), ())]);
        ed.pointer_down(Vec2::new(160.0, 100.0), MouseButton::Left);
        ed.pointer_move(Vec2::new(200.0, 100.0));
        ed.wheel(1.0);
        let zoomed = ed.state().position_of(&"n1".into()).unwrap_or_default();

        ed.pointer_move(Vec2::new(200.0, 100.0));
        ed.on_frame();
        let after = ed.state().position_of(&"n1".into()).unwrap_or_default();
        assert_relative_eq!(after.x, zoomed.x, epsilon = 1e-3);
        assert_relative_eq!(after.y, zoomed.y, epsilon = 1e-3);

        ed.pointer_move(Vec2::new(210.0, 105.0));
        ed.pointer_up(MouseButton::Left);
        let released = ed.state().position_of(&"n1".into()).unwrap_or_default();
        assert_relative_eq!(released.x, zoomed.x + 10.0, epsilon = 1e-3);
        assert_relative_eq!(released.y, zoomed.y + 5.0, epsilon = 1e-3);
        ed.dispose();
    }

    #[test]
    fn button_zoom_during_drag_rescales_grab_offset() {
        let mut ed = editor(vec![Node::new("n1", Vec2::new(100.0, 100.0), ())]);
        ed.pointer_down(Vec2::new(160.0, 100.0), MouseButton::Left);
        ed.apply(EditorCommand::ZoomIn);
        let mut frames = 0;
        while ed.zoom.is_running() && frames < 100 {
            ed.on_frame();
            frames += 1;
        }
        let grab = ed.registry().get(&"n1".into()).map(|o| o.drag_grab_offset());
        let grab = grab.unwrap_or_default();
        assert_relative_eq!(grab.x, 60.0 * 1.25, epsilon = 1e-2);
        assert_relative_eq!(grab.y, 0.0, epsilon = 1e-3);
        ed.dispose();
    }

    // ── selection ─────────────────────────────────────────────────────────

    #[test]
    fn removing_selected_node_clears_selection() {
        let mut ed = editor(vec![
            Node::new("n1", Vec2::new(100.0, 100.0), ()),
            Node::new("n2", Vec2::new(400.0, 100.0), ()),
        ]);
        ed.pointer_down(Vec2::new(100.0, 100.0), MouseButton::Left);
        ed.pointer_up(MouseButton::Left);
        assert_eq!(ed.state().selection().get(), Some("n1".into()));

        ed.state().nodes().update(|ns| ns.retain(|n| n.key.as_str() != "n1"));
        ed.sync();
        assert_eq!(ed.state().selection().get(), None);

        ed.state().push_node(Node::new("n1", Vec2::new(100.0, 100.0), ()));
        ed.sync();
        assert!(!ed.registry().get(&"n1".into()).is_some_and(|o| o.is_selected()));
        ed.dispose();
    }

    #[test]
    fn clicking_overlap_keeps_selected_bottom_node() {
        let mut ed = editor(vec![
            Node::new("bottom", Vec2::new(100.0, 100.0), ()),
            Node::new("top", Vec2::new(200.0, 100.0), ()),
        ]);
        let click = |ed: &mut Editor<()>, x: f32| {
            ed.pointer_down(Vec2::new(x, 100.0), MouseButton::Left);
            ed.pointer_up(MouseButton::Left);
            ed.state().selection().get()
        };

        assert_eq!(click(&mut ed, 150.0), Some("top".into()));
        assert_eq!(click(&mut ed, 40.0), Some("bottom".into()));
        assert_eq!(click(&mut ed, 150.0), Some("bottom".into()));
        assert_eq!(click(&mut ed, 150.0), Some("bottom".into()));
        assert_eq!(ed.registry().order().last().map(NodeKey::as_str), Some("bottom"));
        ed.dispose();
    }
}
