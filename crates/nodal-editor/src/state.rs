//! Per-instance editor state and the instance store.
//!
//! Every field is a [`StateCell`]; the methods below are the only writers, so
//! observers see each logical change exactly once.

use std::collections::HashMap;

use nodal_engine::coords::{Vec2, Viewport};

use crate::cell::StateCell;
use crate::node::{Node, NodeKey};
use crate::transform::zoom_to_cursor;

/// Observable state of one editor instance.
///
/// Cloning yields another handle to the same cells.
pub struct EditorState<T> {
    nodes: StateCell<Vec<Node<T>>>,
    pan_offset: StateCell<Vec2>,
    /// Last applied zoom multiplier, not a cumulative scale.
    zoom_step: StateCell<f32>,
    node_radius: StateCell<f32>,
    selection: StateCell<Option<NodeKey>>,
    canvas_size: StateCell<Viewport>,
}

impl<T> Clone for EditorState<T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            pan_offset: self.pan_offset.clone(),
            zoom_step: self.zoom_step.clone(),
            node_radius: self.node_radius.clone(),
            selection: self.selection.clone(),
            canvas_size: self.canvas_size.clone(),
        }
    }
}

impl<T: 'static> EditorState<T> {
    pub fn new(node_radius: f32) -> Self {
        Self {
            nodes: StateCell::new(Vec::new()),
            pan_offset: StateCell::new(Vec2::zero()),
            zoom_step: StateCell::new(1.0),
            node_radius: StateCell::new(node_radius),
            selection: StateCell::new(None),
            canvas_size: StateCell::new(Viewport::default()),
        }
    }

    pub fn nodes(&self) -> &StateCell<Vec<Node<T>>> {
        &self.nodes
    }

    pub fn pan_offset(&self) -> &StateCell<Vec2> {
        &self.pan_offset
    }

    pub fn zoom_step(&self) -> &StateCell<f32> {
        &self.zoom_step
    }

    pub fn node_radius(&self) -> &StateCell<f32> {
        &self.node_radius
    }

    pub fn selection(&self) -> &StateCell<Option<NodeKey>> {
        &self.selection
    }

    pub fn canvas_size(&self) -> &StateCell<Viewport> {
        &self.canvas_size
    }

    pub fn node_count(&self) -> usize {
        self.nodes.with(Vec::len)
    }

    pub fn position_of(&self, key: &NodeKey) -> Option<Vec2> {
        self.nodes
            .with(|ns| ns.iter().find(|n| &n.key == key).map(|n| n.position))
    }

    // ── nodes ─────────────────────────────────────────────────────────────

    /// Replaces the whole canonical list. A selection naming a node that is
    /// not in the new list is dropped.
    pub fn replace_nodes(&self, nodes: Vec<Node<T>>) {
        self.nodes.set(nodes);
        self.forget_missing_selection();
    }

    pub fn push_node(&self, node: Node<T>) {
        self.nodes.update(|ns| ns.push(node));
    }

    /// Empties the node list and drops the selection.
    pub fn clear_nodes(&self) {
        self.nodes.set(Vec::new());
        self.selection.set_if_changed(None);
    }

    /// Moves the node `key` to `position`. Returns `false` if no such node
    /// exists, in which case nothing is emitted.
    pub fn move_node(&self, key: &NodeKey, position: Vec2) -> bool {
        let Some(index) = self.nodes.with(|ns| ns.iter().position(|n| &n.key == key)) else {
            return false;
        };
        self.nodes.update(|ns| ns[index].position = position);
        true
    }

    // ── view ──────────────────────────────────────────────────────────────

    pub fn pan_by(&self, delta: Vec2) {
        if delta == Vec2::zero() || !delta.is_finite() {
            return;
        }
        self.pan_offset.update(|o| *o += delta);
    }

    /// Zooms by `factor` about the world point under the screen-space `cursor`.
    ///
    /// Non-finite or non-positive factors are ignored. Returns whether the
    /// zoom was applied.
    pub fn zoom_at(&self, cursor: Vec2, factor: f32) -> bool {
        if !factor.is_finite() || factor <= 0.0 || !cursor.is_finite() {
            return false;
        }

        let offset = self.pan_offset.get();
        let radius = self.node_radius.get();

        self.zoom_step.set(factor);
        let new_radius = self.nodes.update(|ns| {
            zoom_to_cursor(cursor, offset, factor, ns.iter_mut().map(|n| &mut n.position), radius)
        });
        self.node_radius.set(new_radius);
        true
    }

    pub fn resize(&self, size: Viewport) {
        self.canvas_size.set_if_changed(size);
    }

    // ── selection ─────────────────────────────────────────────────────────

    pub fn select(&self, key: NodeKey) {
        self.selection.set_if_changed(Some(key));
    }

    pub fn deselect_all(&self) {
        self.selection.set_if_changed(None);
    }

    /// Clears the selection if its node is gone from the list.
    pub fn forget_missing_selection(&self) {
        let Some(key) = self.selection.get() else {
            return;
        };
        if self.position_of(&key).is_none() {
            log::debug!("selected node `{key}` removed; selection cleared");
            self.selection.set(None);
        }
    }
}

/// Explicit registry of editor states keyed by instance key.
///
/// Instances never share cells; each key owns an independent state.
pub struct EditorStore<T> {
    states: HashMap<String, EditorState<T>>,
}

impl<T> Default for EditorStore<T> {
    fn default() -> Self {
        Self { states: HashMap::new() }
    }
}

impl<T: 'static> EditorStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state for `key`, creating it on first use.
    pub fn create_state(&mut self, key: &str, node_radius: f32) -> EditorState<T> {
        self.states
            .entry(key.to_string())
            .or_insert_with(|| {
                log::debug!("editor state `{key}` created");
                EditorState::new(node_radius)
            })
            .clone()
    }

    pub fn state(&self, key: &str) -> Option<EditorState<T>> {
        self.states.get(key).cloned()
    }

    /// Forgets the state for `key`. Returns whether it existed.
    pub fn destroy(&mut self, key: &str) -> bool {
        let existed = self.states.remove(key).is_some();
        if existed {
            log::debug!("editor state `{key}` destroyed");
        }
        existed
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
