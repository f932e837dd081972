//! Pointer state machine: select, drag nodes, pan the canvas.
//!
//! The controller applies input immediately. Frame throttling of moves lives
//! one layer up in [`crate::Editor`].

use nodal_engine::coords::Vec2;
use nodal_engine::input::MouseButton;

use crate::node::NodeKey;
use crate::registry::Registry;
use crate::state::EditorState;
use crate::transform::screen_to_world;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    PanningCanvas { last_pointer: Vec2 },
    DraggingNode { key: NodeKey },
}

#[derive(Debug, Default)]
pub struct Controller {
    state: DragState,
    /// Last known pointer position, `None` while the pointer is outside.
    pointer: Option<Vec2>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_state(&self) -> &DragState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DragState::Idle
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn track_pointer(&mut self, pointer: Vec2) {
        self.pointer = Some(pointer);
    }

    fn transition(&mut self, next: DragState) {
        if next != self.state {
            log::debug!("drag state: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

    /// Only the left button starts an interaction; others are ignored.
    pub fn pointer_down<T: 'static>(
        &mut self,
        pointer: Vec2,
        button: MouseButton,
        state: &EditorState<T>,
        registry: &mut Registry,
    ) {
        self.track_pointer(pointer);
        if button != MouseButton::Left {
            return;
        }

        match registry.hit_test(pointer).cloned() {
            Some(key) => {
                state.select(key.clone());
                registry.apply_selection(Some(&key));
                let pointer_world = screen_to_world(pointer, state.pan_offset().get());
                if let Some(obj) = registry.get_mut(&key) {
                    obj.begin_drag(pointer_world);
                }
                self.transition(DragState::DraggingNode { key });
            }
            None => {
                state.deselect_all();
                registry.apply_selection(None);
                self.transition(DragState::PanningCanvas { last_pointer: pointer });
            }
        }
    }

    pub fn pointer_move<T: 'static>(
        &mut self,
        pointer: Vec2,
        state: &EditorState<T>,
        registry: &Registry,
    ) {
        self.track_pointer(pointer);

        let mut vanished = false;
        match &mut self.state {
            DragState::Idle => {}
            DragState::PanningCanvas { last_pointer } => {
                let delta = pointer - *last_pointer;
                *last_pointer = pointer;
                state.pan_by(delta);
            }
            DragState::DraggingNode { key } => {
                let pointer_world = screen_to_world(pointer, state.pan_offset().get());
                match registry.get(key).map(|obj| obj.drag_target(pointer_world)) {
                    Some(position) => {
                        state.move_node(key, position);
                    }
                    None => {
                        log::debug!("dragged node `{key}` vanished; drag ended");
                        vanished = true;
                    }
                }
            }
        }
        if vanished {
            self.transition(DragState::Idle);
        }
    }

    /// Keeps drag bookkeeping in step with a zoom of `factor`.
    pub fn zoomed(&self, factor: f32, registry: &mut Registry) {
        if let DragState::DraggingNode { key } = &self.state {
            if let Some(obj) = registry.get_mut(key) {
                obj.scale_grab(factor);
            }
        }
    }

    /// Ends any interaction started by `button`.
    pub fn pointer_up(&mut self, button: MouseButton, registry: &mut Registry) {
        if button == MouseButton::Left {
            self.finish(registry);
        }
    }

    /// Pointer left the surface or focus was lost.
    pub fn pointer_leave(&mut self, registry: &mut Registry) {
        self.finish(registry);
        self.pointer = None;
    }

    /// Returns to `Idle`, clearing drag bookkeeping on the dragged object.
    pub fn finish(&mut self, registry: &mut Registry) {
        if let DragState::DraggingNode { key } = &self.state {
            if let Some(obj) = registry.get_mut(key) {
                obj.end_drag();
            }
        }
        self.transition(DragState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::StateCell;
    use crate::node::Node;
    use crate::overlay::NoLabels;
    use crate::render_object::{NodeStyle, RenderObject};

    struct Fixture {
        state: EditorState<()>,
        registry: Registry,
        ctl: Controller,
    }

    impl Fixture {
        fn new(nodes: Vec<Node<()>>) -> Self {
            let state = EditorState::new(50.0);
            state.replace_nodes(nodes);
            let registry = Registry::new(
                NodeStyle { segments: 8, ..NodeStyle::default() },
                state.pan_offset().clone(),
                state.node_radius().clone(),
                Box::new(NoLabels),
            );
            let mut fx = Self { state, registry, ctl: Controller::new() };
            fx.sync();
            fx
        }

        fn sync(&mut self) {
            let sel = self.state.selection().get();
            let registry = &mut self.registry;
            self.state.nodes().with(|ns| registry.reconcile(ns, sel.as_ref()));
        }

        fn down(&mut self, x: f32, y: f32) {
            let pointer = Vec2::new(x, y);
            self.ctl.pointer_down(pointer, MouseButton::Left, &self.state, &mut self.registry);
            self.sync();
        }

        fn drag_to(&mut self, x: f32, y: f32) {
            self.ctl.pointer_move(Vec2::new(x, y), &self.state, &self.registry);
            self.sync();
        }

        fn up(&mut self) {
            self.ctl.pointer_up(MouseButton::Left, &mut self.registry);
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            self.registry.dispose_all();
        }
    }

    fn pan_cell(fx: &Fixture) -> StateCell<Vec2> {
        fx.state.pan_offset().clone()
    }

    // ── dragging ──────────────────────────────────────────────────────────

    #[test]
    fn drag_moves_node_keeping_grab_point() {
        let mut fx = Fixture::new(vec![Node::new("a", Vec2::new(100.0, 100.0), ())]);
        fx.down(120.0, 100.0);
        assert!(matches!(
            fx.ctl.drag_state(),
            DragState::DraggingNode { key } if key.as_str() == "a"
        ));
        assert_eq!(fx.state.selection().get().map(|k| k.to_string()), Some("a".to_string()));

        fx.drag_to(220.0, 150.0);
        assert_eq!(fx.state.position_of(&"a".into()), Some(Vec2::new(200.0, 150.0)));
        fx.up();
        assert!(fx.ctl.is_idle());
        assert!(!fx.registry.get(&"a".into()).is_some_and(RenderObject::is_dragging));
    }

    #[test]
    fn drag_ends_when_node_disappears() {
        let mut fx = Fixture::new(vec![Node::new("a", Vec2::zero(), ())]);
        fx.down(0.0, 0.0);
        fx.state.clear_nodes();
        fx.sync();
        fx.drag_to(10.0, 10.0);
        assert!(fx.ctl.is_idle());
    }

    // ── panning ───────────────────────────────────────────────────────────

    #[test]
    fn miss_pans_and_deselects() {
        let mut fx = Fixture::new(vec![Node::new("a", Vec2::zero(), ())]);
        fx.down(0.0, 0.0);
        fx.up();
        fx.down(500.0, 500.0);
        assert_eq!(fx.state.selection().get(), None);
        assert!(matches!(fx.ctl.drag_state(), DragState::PanningCanvas { .. }));

        fx.drag_to(510.0, 490.0);
        fx.drag_to(530.0, 480.0);
        assert_eq!(pan_cell(&fx).get(), Vec2::new(30.0, -20.0));
        assert_eq!(fx.state.position_of(&"a".into()), Some(Vec2::zero()));
    }

    #[test]
    fn idle_moves_change_nothing() {
        let mut fx = Fixture::new(vec![Node::new("a", Vec2::zero(), ())]);
        fx.drag_to(40.0, 40.0);
        assert_eq!(pan_cell(&fx).get(), Vec2::zero());
        assert_eq!(fx.ctl.pointer(), Some(Vec2::new(40.0, 40.0)));
    }

    // ── buttons / leave ───────────────────────────────────────────────────

    #[test]
    fn non_primary_buttons_are_ignored() {
        let mut fx = Fixture::new(vec![Node::new("a", Vec2::zero(), ())]);
        fx.ctl.pointer_down(Vec2::zero(), MouseButton::Right, &fx.state, &mut fx.registry);
        assert!(fx.ctl.is_idle());
        assert_eq!(fx.state.selection().get(), None);
    }

    #[test]
    fn leave_returns_to_idle_and_forgets_pointer() {
        let mut fx = Fixture::new(vec![]);
        fx.down(10.0, 10.0);
        fx.ctl.pointer_leave(&mut fx.registry);
        assert!(fx.ctl.is_idle());
        assert_eq!(fx.ctl.pointer(), None);
    }
}
