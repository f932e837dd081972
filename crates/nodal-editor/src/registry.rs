//! Node registry: keeps exactly one [`RenderObject`] per canonical node key.

use std::collections::{HashMap, HashSet};

use nodal_engine::coords::Vec2;

use crate::cell::StateCell;
use crate::node::{Node, NodeKey};
use crate::overlay::LabelOverlay;
use crate::program::NodeProgram;
use crate::render_object::{NodeStyle, RenderObject};

/// Outcome of one reconciliation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub added: usize,
    pub removed: usize,
    pub kept: usize,
}

impl ReconcileSummary {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.removed > 0
    }
}

/// Render objects keyed by node key, plus the draw order.
///
/// Draw order is canonical order with the selected node moved last, so it
/// paints on top and wins hit tests.
pub struct Registry {
    objects: HashMap<NodeKey, RenderObject>,
    order: Vec<NodeKey>,
    style: NodeStyle,
    pan_offset: StateCell<Vec2>,
    node_radius: StateCell<f32>,
    overlay: Box<dyn LabelOverlay>,
    next_serial: u64,
}

impl Registry {
    pub fn new(
        style: NodeStyle,
        pan_offset: StateCell<Vec2>,
        node_radius: StateCell<f32>,
        overlay: Box<dyn LabelOverlay>,
    ) -> Self {
        Self {
            objects: HashMap::new(),
            order: Vec::new(),
            style,
            pan_offset,
            node_radius,
            overlay,
            next_serial: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, key: &NodeKey) -> Option<&RenderObject> {
        self.objects.get(key)
    }

    pub fn get_mut(&mut self, key: &NodeKey) -> Option<&mut RenderObject> {
        self.objects.get_mut(key)
    }

    /// Keys in draw order.
    pub fn order(&self) -> &[NodeKey] {
        &self.order
    }

    pub fn iter_draw_order(&self) -> impl Iterator<Item = &RenderObject> {
        self.order.iter().filter_map(|k| self.objects.get(k))
    }

    /// Diffs `nodes` against the current objects: removed ones are disposed,
    /// new ones created, kept ones reused and synced. Then selection and draw
    /// order are applied and stale geometry is rebuilt.
    pub fn reconcile<T>(
        &mut self,
        nodes: &[Node<T>],
        selection: Option<&NodeKey>,
    ) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        let mut seen: HashSet<&NodeKey> = HashSet::with_capacity(nodes.len());
        let mut order = Vec::with_capacity(nodes.len());
        let overlay = self.overlay.as_mut();

        for node in nodes {
            if !seen.insert(&node.key) {
                log::warn!("duplicate node key `{}` ignored", node.key);
                continue;
            }

            match self.objects.get_mut(&node.key) {
                Some(obj) => {
                    obj.sync_from(node, overlay);
                    summary.kept += 1;
                }
                None => {
                    let obj = RenderObject::new(
                        self.next_serial,
                        node,
                        self.style,
                        self.pan_offset.clone(),
                        self.node_radius.clone(),
                        overlay,
                    );
                    self.next_serial += 1;
                    self.objects.insert(node.key.clone(), obj);
                    summary.added += 1;
                }
            }
            order.push(node.key.clone());
        }

        self.objects.retain(|key, obj| {
            if seen.contains(key) {
                return true;
            }
            obj.dispose(overlay);
            summary.removed += 1;
            false
        });

        self.order = order;
        self.apply_selection(selection);
        self.refresh_geometry();

        if summary.changed() {
            log::debug!(
                "registry reconciled: added={} removed={} kept={}",
                summary.added,
                summary.removed,
                summary.kept
            );
        }
        summary
    }

    /// Marks `selection` selected, everything else unselected, and moves it
    /// to the end of the draw order.
    pub fn apply_selection(&mut self, selection: Option<&NodeKey>) {
        for (key, obj) in self.objects.iter_mut() {
            obj.set_selected(Some(key) == selection);
        }
        if let Some(sel) = selection {
            if let Some(i) = self.order.iter().position(|k| k == sel) {
                let key = self.order.remove(i);
                self.order.push(key);
            }
        }
    }

    /// Rebuilds geometry of every stale object; returns how many were rebuilt.
    pub fn refresh_geometry(&mut self) -> usize {
        let overlay = self.overlay.as_mut();
        self.objects
            .values_mut()
            .map(|obj| obj.refresh(overlay))
            .filter(|regenerated| *regenerated)
            .count()
    }

    /// Topmost node containing the screen-space `pointer`.
    pub fn hit_test(&self, pointer: Vec2) -> Option<&NodeKey> {
        self.order
            .iter()
            .rev()
            .find(|k| self.objects.get(*k).is_some_and(|obj| obj.hit_test(pointer)))
    }

    // ── gpu ───────────────────────────────────────────────────────────────

    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, program: &NodeProgram) {
        for obj in self.objects.values_mut() {
            obj.prepare(device, queue, program);
        }
    }

    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, program: &NodeProgram) {
        for obj in self.iter_draw_order() {
            obj.draw(rpass, program);
        }
    }

    // ── teardown ──────────────────────────────────────────────────────────

    /// Disposes every object and empties the registry.
    pub fn dispose_all(&mut self) {
        let overlay = self.overlay.as_mut();
        for obj in self.objects.values_mut() {
            obj.dispose(overlay);
        }
        let count = self.objects.len();
        self.objects.clear();
        self.order.clear();
        if count > 0 {
            log::debug!("registry disposed {count} render objects");
        }
    }
}
