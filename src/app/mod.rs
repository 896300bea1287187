use std::collections::{BTreeSet, HashMap};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Color32, Context, Rect, Vec2};

use crate::catalog::{Catalog, load_catalog};

mod camera;
mod graph;
mod highlight;
mod physics;
mod refocus;
mod render_utils;
mod selection;
mod ui;

use camera::Viewport;
use physics::Simulation;
use selection::SelectionState;

pub struct SourceAtlasApp {
    data_path: String,
    state: AppState,
    reload_rx: Option<Receiver<Result<Catalog, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Catalog, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Collection,
    Source,
}

impl NodeKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Source => "source",
        }
    }
}

/// Immutable per-rebuild node identity and metadata. Mutable layout state
/// lives in the simulation's `PhysicsBody` arena under the same index.
pub(crate) struct NodeMeta {
    id: String,
    name: String,
    kind: NodeKind,
    /// Display label for the detail panel: the record's `type` field, or a
    /// generic fallback when the record carries none.
    type_label: String,
    /// Rendering tier: collections 0, sources 1. Lower tiers draw on top.
    group: u8,
    tags: Vec<String>,
    content: Option<String>,
    color: Color32,
}

/// One (collection, source) containment relation. A source referenced by
/// several collections keeps a single node but one edge per relation.
pub(crate) struct GraphEdge {
    collection: usize,
    source: usize,
    weight: f32,
}

pub(crate) struct RenderGraph {
    nodes: Vec<NodeMeta>,
    edges: Vec<GraphEdge>,
    index_by_id: HashMap<String, usize>,
    source_to_collections: HashMap<usize, Vec<usize>>,
}

/// The selection state machine's three modes. A click on a source, a
/// collection, or the background moves between them; the transition logic
/// lives in [`selection`] and [`refocus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Focus {
    None,
    Source(String),
    Collection(String),
}

impl Focus {
    pub(crate) fn collection_id(&self) -> Option<&str> {
        match self {
            Self::Collection(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
struct NodeDrag {
    index: usize,
}

pub(crate) struct ViewModel {
    catalog: Catalog,
    all_tags: Vec<String>,
    selected_tags: BTreeSet<String>,
    keyword_input: String,
    active_keyword: String,
    tag_search: String,
    hide_titles: bool,
    viewport: Viewport,
    selection: SelectionState,
    graph_dirty: bool,
    graph_cache: Option<RenderGraph>,
    simulation: Option<Simulation>,
    position_cache: HashMap<String, Vec2>,
    container_size: Vec2,
    graph_rect: Rect,
    drag: Option<NodeDrag>,
    pan_active: bool,
}

impl ViewModel {
    pub(crate) fn new(catalog: Catalog) -> Self {
        let all_tags = catalog.all_tags();
        Self {
            catalog,
            all_tags,
            selected_tags: BTreeSet::new(),
            keyword_input: String::new(),
            active_keyword: String::new(),
            tag_search: String::new(),
            hide_titles: false,
            viewport: Viewport::new(),
            selection: SelectionState::new(),
            graph_dirty: true,
            graph_cache: None,
            simulation: None,
            position_cache: HashMap::new(),
            container_size: Vec2::ZERO,
            graph_rect: Rect::ZERO,
            drag: None,
            pan_active: false,
        }
    }

    /// Swaps in freshly loaded data while keeping the position cache, the
    /// camera, and the active filters, so a data refresh does not scatter
    /// the layout.
    pub(crate) fn replace_catalog(&mut self, catalog: Catalog) {
        self.all_tags = catalog.all_tags();
        self.selected_tags
            .retain(|tag| self.all_tags.contains(tag));
        self.catalog = catalog;
        self.graph_dirty = true;
    }

    pub(crate) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_graph(ui);
            });

        self.draw_detail_panel(ctx);
        self.draw_overlays(ctx, reload_requested, is_reloading);
    }

    /// Current simulation position of a node, or None when the node has no
    /// body yet or its coordinates are not finite.
    fn node_world_position(&self, index: usize) -> Option<Vec2> {
        let simulation = self.simulation.as_ref()?;
        let body = simulation.bodies().get(index)?;
        let position = body.position();
        (position.x.is_finite() && position.y.is_finite()).then_some(position)
    }
}

impl Drop for ViewModel {
    fn drop(&mut self) {
        // Deterministic teardown of the three cooperative loops: the tick
        // loop, the camera animation, and the refocus settle timer.
        if let Some(simulation) = &mut self.simulation {
            simulation.stop();
        }
        self.viewport.cancel_animation();
        self.selection.clear_timers();
    }
}

impl SourceAtlasApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_path: String) -> Self {
        let state = Self::start_load(data_path.clone());
        Self {
            data_path,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(data_path: String) -> Receiver<Result<Catalog, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_catalog(&data_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: String) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use eframe::egui::{Pos2, Rect, vec2};
    use serde_json::json;

    use super::ViewModel;
    use crate::catalog::Catalog;

    pub(crate) fn sample_catalog() -> Catalog {
        let raw = json!({
            "collections": [
                { "id": "c1", "name": "Docs" },
                { "id": "c2", "name": "Notes" }
            ],
            "sources": {
                "c1": [
                    { "id": "s1", "name": "Intro", "type": "article", "tags": ["guide"] },
                    { "id": "s2", "name": "Shared", "type": "article", "tags": ["guide", "shared"] }
                ],
                "c2": [
                    { "id": "s2", "name": "Shared", "type": "article", "tags": ["guide", "shared"] },
                    { "id": "s3", "name": "Draft", "type": "note", "tags": ["draft"],
                      "content": "physics notes" }
                ]
            }
        });
        serde_json::from_value(raw).unwrap()
    }

    /// A ViewModel with the catalog above, an 800x600 canvas, and a built
    /// graph, ready for headless interaction tests.
    pub(crate) fn sample_model() -> ViewModel {
        let mut model = ViewModel::new(sample_catalog());
        model.container_size = vec2(800.0, 600.0);
        model.graph_rect = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));
        model.rebuild_graph(800.0, 600.0);
        model
    }
}

impl eframe::App for SourceAtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(catalog) => AppState::Ready(Box::new(ViewModel::new(catalog))),
                        Err(error) => {
                            log::error!("catalog load failed: {error}");
                            AppState::Error(error)
                        }
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading collection catalog...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load collection catalog");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.data_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(catalog)) => model.replace_catalog(catalog),
                        Ok(Err(error)) => {
                            log::error!("catalog reload failed: {error}");
                            transition = Some(AppState::Error(error));
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
