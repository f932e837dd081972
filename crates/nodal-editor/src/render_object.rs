//! Per-node render object: fan geometry, colors, GPU buffers, hit test and
//! drag bookkeeping.

use std::cell::Cell;
use std::rc::Rc;

use nodal_engine::coords::Vec2;
use nodal_engine::paint::Color;

use crate::cell::{StateCell, SubscriptionSet};
use crate::config::EditorConfig;
use crate::geometry::{circle_fan, FanVertex};
use crate::node::{Node, NodeKey};
use crate::overlay::LabelOverlay;
use crate::program::{NodeBuffers, NodeProgram};
use crate::transform::{screen_to_world, world_to_screen};

/// Appearance shared by every node of one editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub segments: u32,
    pub border_width: f32,
    pub fill: Color,
    pub border: Color,
    pub accent: Color,
}

impl From<&EditorConfig> for NodeStyle {
    fn from(cfg: &EditorConfig) -> Self {
        Self {
            segments: cfg.circle_segments,
            border_width: cfg.border_width,
            fill: Color::from_rgba(cfg.fill_color),
            border: Color::from_rgba(cfg.border_color),
            accent: Color::from_rgba(cfg.accent_color),
        }
    }
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

/// Drawable state of one canonical node.
///
/// Geometry is regenerated lazily: the pan-offset and radius cells only flag
/// the object stale, and [`RenderObject::refresh`] rebuilds the fans once no
/// matter how many changes arrived in between.
pub struct RenderObject {
    key: NodeKey,
    serial: u64,
    style: NodeStyle,

    world_position: Vec2,
    label: Option<String>,
    fill_color: Color,
    border_color: Color,

    pan_offset: StateCell<Vec2>,
    node_radius: StateCell<f32>,
    stale: Rc<Cell<bool>>,
    subscriptions: SubscriptionSet,

    fill_vertices: Vec<FanVertex>,
    border_vertices: Vec<FanVertex>,
    generation: u64,

    gpu: Option<NodeBuffers>,
    gpu_geometry_stale: bool,
    gpu_color_stale: bool,

    is_selected: bool,
    is_dragging: bool,
    drag_grab_offset: Vec2,

    disposed: bool,
}

impl RenderObject {
    pub fn new<T>(
        serial: u64,
        node: &Node<T>,
        style: NodeStyle,
        pan_offset: StateCell<Vec2>,
        node_radius: StateCell<f32>,
        overlay: &mut dyn LabelOverlay,
    ) -> Self {
        let stale = Rc::new(Cell::new(true));
        let mut subscriptions = SubscriptionSet::new();
        let on_pan = stale.clone();
        subscriptions.push(pan_offset.subscribe(move |_| on_pan.set(true)));
        let on_radius = stale.clone();
        subscriptions.push(node_radius.subscribe(move |_| on_radius.set(true)));

        let mut obj = Self {
            key: node.key.clone(),
            serial,
            style,
            world_position: node.position,
            label: node.label.clone(),
            fill_color: node.background_color.map(Color::from_rgba).unwrap_or(style.fill),
            border_color: style.border,
            pan_offset,
            node_radius,
            stale,
            subscriptions,
            fill_vertices: Vec::new(),
            border_vertices: Vec::new(),
            generation: 0,
            gpu: None,
            gpu_geometry_stale: true,
            gpu_color_stale: true,
            is_selected: false,
            is_dragging: false,
            drag_grab_offset: Vec2::zero(),
            disposed: false,
        };

        obj.regenerate();
        if let Some(text) = &obj.label {
            overlay.attach(&obj.key, text, obj.screen_center());
        }
        obj
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    /// Creation serial; unchanged for as long as the object is reused.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn world_position(&self) -> Vec2 {
        self.world_position
    }

    pub fn radius(&self) -> f32 {
        self.node_radius.get()
    }

    pub fn border_width(&self) -> f32 {
        self.style.border_width
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn fill_color(&self) -> Color {
        self.fill_color
    }

    pub fn border_color(&self) -> Color {
        self.border_color
    }

    pub fn fill_vertices(&self) -> &[FanVertex] {
        &self.fill_vertices
    }

    pub fn border_vertices(&self) -> &[FanVertex] {
        &self.border_vertices
    }

    /// Number of geometry regenerations so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_stale(&self) -> bool {
        self.stale.get()
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn drag_grab_offset(&self) -> Vec2 {
        self.drag_grab_offset
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn has_gpu_buffers(&self) -> bool {
        self.gpu.is_some()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn screen_center(&self) -> Vec2 {
        world_to_screen(self.world_position, self.pan_offset.get())
    }

    // ── sync ──────────────────────────────────────────────────────────────

    /// Copies position, label and fill color from the canonical node.
    pub fn sync_from<T>(&mut self, node: &Node<T>, overlay: &mut dyn LabelOverlay) {
        if node.position != self.world_position {
            self.world_position = node.position;
            self.stale.set(true);
        }

        if node.label != self.label {
            if self.label.is_some() {
                overlay.detach(&self.key);
            }
            self.label = node.label.clone();
            if let Some(text) = &self.label {
                overlay.attach(&self.key, text, self.screen_center());
            }
        }

        let fill = node.background_color.map(Color::from_rgba).unwrap_or(self.style.fill);
        if fill != self.fill_color {
            self.fill_color = fill;
            self.gpu_color_stale = true;
        }
    }

    /// Rebuilds the fans if anything they depend on changed. Returns whether a
    /// regeneration happened.
    pub fn refresh(&mut self, overlay: &mut dyn LabelOverlay) -> bool {
        if !self.stale.get() || self.disposed {
            return false;
        }
        self.regenerate();
        if self.label.is_some() {
            overlay.reposition(&self.key, self.screen_center());
        }
        true
    }

    fn regenerate(&mut self) {
        let center = self.screen_center();
        let radius = self.node_radius.get();
        self.fill_vertices = circle_fan(center, radius, self.style.segments);
        let border_radius = radius + self.style.border_width;
        self.border_vertices = circle_fan(center, border_radius, self.style.segments);
        self.generation += 1;
        self.gpu_geometry_stale = true;
        self.stale.set(false);
    }

    // ── selection / drag ──────────────────────────────────────────────────

    /// Swaps the border color. Geometry is left untouched.
    pub fn set_selected(&mut self, selected: bool) {
        if selected == self.is_selected {
            return;
        }
        self.is_selected = selected;
        self.border_color = if selected { self.style.accent } else { self.style.border };
        self.gpu_color_stale = true;
    }

    /// Inclusive circle test against a screen-space point.
    pub fn hit_test(&self, pointer: Vec2) -> bool {
        let world = screen_to_world(pointer, self.pan_offset.get());
        world.distance(self.world_position) <= self.node_radius.get()
    }

    /// Records where inside the node the pointer grabbed it.
    pub fn begin_drag(&mut self, pointer_world: Vec2) {
        self.is_dragging = true;
        self.drag_grab_offset = pointer_world - self.world_position;
    }

    /// World position that keeps the grab point under `pointer_world`.
    pub fn drag_target(&self, pointer_world: Vec2) -> Vec2 {
        pointer_world - self.drag_grab_offset
    }

    /// Rescales the grab offset after the view zoomed by `factor`, so the
    /// grab point keeps its place on the scaled circle.
    pub fn scale_grab(&mut self, factor: f32) {
        if self.is_dragging {
            self.drag_grab_offset = self.drag_grab_offset * factor;
        }
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
        self.drag_grab_offset = Vec2::zero();
    }

    // ── gpu ───────────────────────────────────────────────────────────────

    /// Creates the GPU buffers on first use and uploads whatever changed.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, program: &NodeProgram) {
        assert!(!self.disposed, "prepare on disposed render object `{}`", self.key);
        assert_eq!(
            program.segments(),
            self.style.segments,
            "program and render object `{}` disagree on fan size",
            self.key
        );

        match &self.gpu {
            None => {
                self.gpu = Some(NodeBuffers::new(
                    device,
                    program,
                    &self.border_vertices,
                    &self.fill_vertices,
                    self.border_color,
                    self.fill_color,
                ));
            }
            Some(buffers) => {
                if self.gpu_geometry_stale {
                    buffers.write_geometry(queue, &self.border_vertices, &self.fill_vertices);
                }
                if self.gpu_color_stale {
                    buffers.write_colors(queue, self.border_color, self.fill_color);
                }
            }
        }
        self.gpu_geometry_stale = false;
        self.gpu_color_stale = false;
    }

    /// Border fan, then fill fan. The program must already be bound.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, program: &NodeProgram) {
        assert!(!self.disposed, "draw on disposed render object `{}`", self.key);
        let Some(buffers) = self.gpu.as_ref() else {
            panic!("render object `{}` drawn before prepare", self.key);
        };
        buffers.draw(rpass, program.index_count());
    }

    // ── teardown ──────────────────────────────────────────────────────────

    /// Releases GPU buffers, the label and every subscription. Idempotent.
    pub fn dispose(&mut self, overlay: &mut dyn LabelOverlay) {
        if self.disposed {
            return;
        }
        if let Some(buffers) = self.gpu.take() {
            buffers.destroy();
        }
        if self.label.is_some() {
            overlay.detach(&self.key);
        }
        self.subscriptions.unsubscribe_all();
        self.disposed = true;
        log::trace!("render object `{}` disposed", self.key);
    }
}

impl Drop for RenderObject {
    fn drop(&mut self) {
        if !self.disposed {
            log::warn!("render object `{}` dropped without dispose", self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl LabelOverlay for Recorder {
        fn attach(&mut self, key: &NodeKey, text: &str, p: Vec2) {
            self.0.push(format!("attach {key} {text} {} {}", p.x, p.y));
        }
        fn reposition(&mut self, key: &NodeKey, p: Vec2) {
            self.0.push(format!("move {key} {} {}", p.x, p.y));
        }
        fn detach(&mut self, key: &NodeKey) {
            self.0.push(format!("detach {key}"));
        }
    }

    struct Fixture {
        pan: StateCell<Vec2>,
        radius: StateCell<f32>,
        overlay: Recorder,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                pan: StateCell::new(Vec2::zero()),
                radius: StateCell::new(80.0),
                overlay: Recorder::default(),
            }
        }

        fn object(&mut self, node: &Node<()>) -> RenderObject {
            RenderObject::new(
                1,
                node,
                NodeStyle { segments: 16, ..NodeStyle::default() },
                self.pan.clone(),
                self.radius.clone(),
                &mut self.overlay,
            )
        }
    }

    fn node(x: f32, y: f32) -> Node<()> {
        Node::new("n", Vec2::new(x, y), ())
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn fans_are_centered_on_screen_position() {
        let mut fx = Fixture::new();
        fx.pan.set(Vec2::new(10.0, 20.0));
        let mut obj = fx.object(&node(100.0, 100.0));

        assert_eq!(obj.fill_vertices().len(), 18);
        assert_eq!(obj.fill_vertices()[0].position, [110.0, 120.0]);
        let rim = Vec2::from(obj.border_vertices()[1].position);
        assert_relative_eq!(rim.distance(Vec2::new(110.0, 120.0)), 84.0, epsilon = 1e-3);
        obj.dispose(&mut fx.overlay);
    }

    #[test]
    fn pan_and_radius_changes_regenerate_once() {
        let mut fx = Fixture::new();
        let mut obj = fx.object(&node(0.0, 0.0));
        assert_eq!(obj.generation(), 1);

        fx.pan.set(Vec2::new(5.0, 0.0));
        fx.radius.set(40.0);
        assert!(obj.is_stale());
        assert!(obj.refresh(&mut fx.overlay));
        assert!(!obj.refresh(&mut fx.overlay));
        assert_eq!(obj.generation(), 2);
        assert_eq!(obj.fill_vertices()[0].position, [5.0, 0.0]);
        obj.dispose(&mut fx.overlay);
    }

    #[test]
    fn selection_changes_color_not_geometry() {
        let mut fx = Fixture::new();
        let mut obj = fx.object(&node(0.0, 0.0));
        let style = NodeStyle::default();

        obj.set_selected(true);
        assert_eq!(obj.border_color(), style.accent);
        assert!(!obj.is_stale());
        obj.set_selected(false);
        assert_eq!(obj.border_color(), style.border);
        assert_eq!(obj.generation(), 1);
        obj.dispose(&mut fx.overlay);
    }

    #[test]
    fn background_color_overrides_fill() {
        let mut fx = Fixture::new();
        let mut obj = fx.object(&node(0.0, 0.0).with_background([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(obj.fill_color(), Color::from_rgba([1.0, 0.0, 0.0, 1.0]));
        obj.sync_from(&node(0.0, 0.0), &mut fx.overlay);
        assert_eq!(obj.fill_color(), NodeStyle::default().fill);
        obj.dispose(&mut fx.overlay);
    }

    // ── hit test ──────────────────────────────────────────────────────────

    #[test]
    fn hit_boundary_is_inclusive() {
        let mut fx = Fixture::new();
        fx.pan.set(Vec2::new(50.0, 0.0));
        let mut obj = fx.object(&node(100.0, 100.0));

        assert!(obj.hit_test(Vec2::new(150.0 + 80.0, 100.0)));
        assert!(!obj.hit_test(Vec2::new(150.0 + 80.01, 100.0)));
        assert!(obj.hit_test(Vec2::new(150.0, 100.0)));
        obj.dispose(&mut fx.overlay);
    }

    // ── drag ──────────────────────────────────────────────────────────────

    #[test]
    fn drag_keeps_grab_point() {
        let mut fx = Fixture::new();
        let mut obj = fx.object(&node(100.0, 100.0));
        obj.begin_drag(Vec2::new(110.0, 95.0));
        assert_eq!(obj.drag_grab_offset(), Vec2::new(10.0, -5.0));
        assert_eq!(obj.drag_target(Vec2::new(210.0, 195.0)), Vec2::new(200.0, 200.0));
        obj.end_drag();
        assert!(!obj.is_dragging());
    }

    #[test]
    fn grab_offset_follows_zoom_only_while_dragging() {
        let mut fx = Fixture::new();
        let mut obj = fx.object(&node(100.0, 100.0));
        obj.scale_grab(2.0);
        assert_eq!(obj.drag_grab_offset(), Vec2::zero());

        obj.begin_drag(Vec2::new(160.0, 100.0));
        obj.scale_grab(1.5);
        assert_eq!(obj.drag_grab_offset(), Vec2::new(90.0, 0.0));
        obj.end_drag();
        obj.dispose(&mut fx.overlay);
    }

    // ── labels / teardown ─────────────────────────────────────────────────

    #[test]
    fn label_lifecycle_follows_object() {
        let mut fx = Fixture::new();
        let mut obj = fx.object(&node(1.0, 2.0).with_label("A"));
        fx.pan.set(Vec2::new(1.0, 1.0));
        obj.refresh(&mut fx.overlay);
        obj.sync_from(&node(1.0, 2.0).with_label("B"), &mut fx.overlay);
        obj.dispose(&mut fx.overlay);

        assert_eq!(
            fx.overlay.0,
            vec!["attach n A 1 2", "move n 2 3", "detach n", "attach n B 2 3", "detach n"]
        );
    }

    #[test]
    fn dispose_releases_subscriptions() {
        let mut fx = Fixture::new();
        let mut obj = fx.object(&node(0.0, 0.0));
        assert_eq!(fx.pan.subscriber_count(), 1);
        assert_eq!(fx.radius.subscriber_count(), 1);

        obj.dispose(&mut fx.overlay);
        obj.dispose(&mut fx.overlay);
        assert!(obj.is_disposed());
        assert_eq!(fx.pan.subscriber_count(), 0);
        assert_eq!(fx.radius.subscriber_count(), 0);
        assert!(!obj.refresh(&mut fx.overlay));
    }
}
