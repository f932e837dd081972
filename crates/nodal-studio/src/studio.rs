use std::collections::HashMap;

use anyhow::{Context, Result};
use nodal_editor::{
    Editor, EditorCommand, EditorConfig, EditorStore, Node, SceneRenderer, Vec2, Viewport,
};
use nodal_engine::core::{App, AppControl, FrameCtx};
use nodal_engine::input::{InputEvent, Key, KeyState};
use nodal_engine::window::RuntimeConfig;
use winit::window::WindowId;

use crate::labels::LoggedLabels;

/// One editor per window.
struct EditorWindow {
    key: String,
    editor: Editor<()>,
    /// Built on the first frame, once the window's device is available.
    renderer: Option<SceneRenderer>,
}

/// Studio application: hosts any number of independent editor windows.
#[derive(Default)]
pub struct Studio {
    config: EditorConfig,
    store: EditorStore<()>,
    windows: HashMap<WindowId, EditorWindow>,
    opened: u32,
    open_requested: bool,
}

impl Studio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window_title(n: u32) -> String {
        format!("nodal editor {n}")
    }

    fn command_for(key: Key) -> Option<EditorCommand> {
        match key {
            Key::Equal | Key::NumpadAdd => Some(EditorCommand::ZoomIn),
            Key::Minus | Key::NumpadSubtract => Some(EditorCommand::ZoomOut),
            Key::A | Key::N => Some(EditorCommand::AddNode { position: None }),
            Key::C | Key::Delete | Key::Backspace => Some(EditorCommand::Clear),
            _ => None,
        }
    }

    fn seed_nodes(canvas: Viewport) -> Vec<Node<()>> {
        let c = canvas.center();
        vec![
            Node::new("seed-1", c - Vec2::new(160.0, 0.0), ()).with_label("Node A"),
            Node::new("seed-2", c + Vec2::new(160.0, 0.0), ())
                .with_label("Node B")
                .with_background([0.95, 0.35, 0.45, 1.0]),
        ]
    }
}

impl App for Studio {
    fn on_window_created(&mut self, window_id: WindowId, size: Viewport) {
        self.opened += 1;
        let key = format!("editor-{}", self.opened);

        let state = self.store.create_state(&key, self.config.node_radius);
        state.resize(size);
        state.replace_nodes(Self::seed_nodes(size));

        let labels = Box::new(LoggedLabels::new(key.clone()));
        let editor = Editor::new(state, self.config.clone(), labels);
        log::info!("{key} opened ({} editors)", self.store.len());
        self.windows.insert(window_id, EditorWindow { key, editor, renderer: None });
    }

    fn on_window_closed(&mut self, window_id: WindowId) {
        if let Some(mut win) = self.windows.remove(&window_id) {
            win.editor.dispose();
            self.store.destroy(&win.key);
            log::info!("{} closed", win.key);
        }
    }

    fn on_resize(&mut self, window_id: WindowId, size: Viewport) {
        if let Some(win) = self.windows.get_mut(&window_id) {
            win.editor.resize(size);
        }
    }

    fn on_input(&mut self, window_id: WindowId, event: &InputEvent) -> AppControl {
        let Some(win) = self.windows.get_mut(&window_id) else {
            return AppControl::Continue;
        };

        if let InputEvent::Key { key, state: KeyState::Pressed, repeat: false, .. } = event {
            match key {
                Key::Escape => return AppControl::Exit,
                Key::W => self.open_requested = true,
                other => {
                    if let Some(cmd) = Self::command_for(*other) {
                        win.editor.apply(cmd);
                    }
                }
            }
            return AppControl::Continue;
        }

        win.editor.handle_input(event);
        AppControl::Continue
    }

    fn needs_redraw(&self, window_id: WindowId) -> bool {
        self.open_requested || self.windows.get(&window_id).is_some_and(|w| w.editor.wants_frame())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        if self.open_requested {
            self.open_requested = false;
            ctx.runtime.create_window(RuntimeConfig {
                title: Self::window_title(self.opened + 1),
                ..RuntimeConfig::default()
            });
        }

        let Some(win) = self.windows.get_mut(&ctx.window_id) else {
            return Ok(AppControl::Continue);
        };

        if win.renderer.is_none() {
            let segments = win.editor.config().circle_segments;
            let renderer = SceneRenderer::new(ctx.gpu.device(), ctx.gpu.surface_format(), segments)
                .with_context(|| format!("{}: renderer setup failed", win.key))?;
            win.renderer = Some(renderer);
        }
        let Some(renderer) = win.renderer.as_ref() else {
            return Ok(AppControl::Continue);
        };

        let editor = &mut win.editor;
        let clear = editor.clear_color();
        ctx.render(clear, |rctx, target| editor.render(renderer, rctx, target))?;
        Ok(AppControl::Continue)
    }
}
