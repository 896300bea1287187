use eframe::egui::vec2;

use super::camera::{AnimationId, CameraTransform};
use super::ui::details::PANEL_WIDTH;
use super::{Focus, NodeKind, ViewModel};

pub(in crate::app) const SOURCE_FOCUS_SCALE: f32 = 1.75;
pub(in crate::app) const SOURCE_FOCUS_ANIMATION_SECS: f64 = 0.75;
pub(in crate::app) const PANEL_SETTLE_SECS: f64 = 0.05;
pub(in crate::app) const PANEL_CLOSE_SECS: f64 = 0.3;

/// The data object handed to the detail-panel renderer; nothing else
/// crosses that boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) struct SourceDetail {
    pub name: String,
    pub kind: String,
    pub tags: Vec<String>,
    pub content: Option<String>,
    /// Names of the collections this source belongs to.
    pub collections: Vec<String>,
}

/// Selection and refocus bookkeeping. `focus` is the state machine proper
/// (Idle / SourceSelected / CollectionSelected); the rest is the camera
/// snapshot, panel state, and the refocus protocol's in-flight markers.
pub(in crate::app) struct SelectionState {
    pub focus: Focus,
    pub return_transform: Option<CameraTransform>,
    pub panel_visible: bool,
    pub manual_interaction_since_selection: bool,
    pub pending_refocus_target: Option<String>,
    pub refocusing: bool,
    pub detail: Option<SourceDetail>,
    /// Deadline for opening the detail panel after a source click.
    pub panel_open_at: Option<f64>,
    /// Deadline for the refocus settle re-validation.
    pub refocus_settle_at: Option<f64>,
    pub refocus_animation: Option<AnimationId>,
    /// Node pinned by the refocus protocol, unpinned on completion/abort.
    pub refocus_pinned: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self {
            focus: Focus::None,
            return_transform: None,
            panel_visible: false,
            manual_interaction_since_selection: false,
            pending_refocus_target: None,
            refocusing: false,
            detail: None,
            panel_open_at: None,
            refocus_settle_at: None,
            refocus_animation: None,
            refocus_pinned: None,
        }
    }

    pub fn clear_timers(&mut self) {
        self.panel_open_at = None;
        self.refocus_settle_at = None;
    }
}

impl ViewModel {
    /// Click on a source node: snapshot the camera, frame the node beside
    /// the detail panel, and open the panel after a short settle delay.
    /// The panel-open step later animates back to the snapshot, so the
    /// durable end state is panel open + camera restored.
    pub(in crate::app) fn click_source(&mut self, id: &str, now: f64) {
        let Some(graph) = &self.graph_cache else {
            return;
        };
        let Some(&index) = graph.index_by_id.get(id) else {
            return;
        };
        let meta = &graph.nodes[index];
        if meta.kind != NodeKind::Source {
            return;
        }

        let collections = graph
            .source_to_collections
            .get(&index)
            .map(|owners| {
                owners
                    .iter()
                    .map(|&owner| graph.nodes[owner].name.clone())
                    .collect()
            })
            .unwrap_or_default();
        let detail = SourceDetail {
            name: meta.name.clone(),
            kind: meta.type_label.clone(),
            tags: meta.tags.clone(),
            content: meta.content.clone(),
            collections,
        };

        self.clear_refocus_flight();
        self.selection.pending_refocus_target = None;
        self.selection.focus = Focus::Source(id.to_owned());
        self.selection.detail = Some(detail);
        self.selection.return_transform = Some(self.viewport.transform());

        if let Some(world) = self.node_world_position(index) {
            let rect = self.graph_rect;
            let frame_point = vec2(
                PANEL_WIDTH + (rect.width() - PANEL_WIDTH).max(0.0) * 0.75,
                rect.height() * 0.5,
            );
            self.viewport.animate_to(
                CameraTransform::framing(world, frame_point, SOURCE_FOCUS_SCALE),
                SOURCE_FOCUS_ANIMATION_SECS,
                now,
            );
        }

        self.selection.panel_open_at = Some(now + PANEL_SETTLE_SECS);
    }

    /// Click on empty canvas: collection focus clears unconditionally; an
    /// open panel slides shut and the camera returns to the snapshot.
    pub(in crate::app) fn click_background(&mut self, now: f64) {
        self.selection.pending_refocus_target = None;
        self.clear_refocus_flight();

        if matches!(self.selection.focus, Focus::Collection(_)) {
            self.selection.focus = Focus::None;
        }

        if self.selection.panel_visible {
            // Source focus itself clears once the slide-out finishes.
            self.selection.panel_visible = false;
            self.selection.panel_open_at = None;
            if let Some(previous) = self.selection.return_transform.take() {
                self.viewport.animate_to(previous, PANEL_CLOSE_SECS, now);
            }
        } else if matches!(self.selection.focus, Focus::Source(_)) {
            // Clicked away inside the settle window, before the panel opened.
            self.selection.focus = Focus::None;
            self.selection.detail = None;
            self.selection.panel_open_at = None;
            if let Some(previous) = self.selection.return_transform.take() {
                self.viewport.animate_to(previous, PANEL_CLOSE_SECS, now);
            }
        }
    }

    /// Click on a collection node or its legend entry. Toggles off when the
    /// same collection is clicked again; otherwise hands off to the refocus
    /// protocol.
    pub(in crate::app) fn click_collection(&mut self, id: &str, now: f64) {
        let toggled_off = self.selection.focus.collection_id() == Some(id);

        self.selection.panel_open_at = None;
        self.selection.panel_visible = false;
        self.clear_refocus_flight();

        if toggled_off {
            self.selection.focus = Focus::None;
            self.selection.pending_refocus_target = None;
            return;
        }

        self.selection.focus = Focus::Collection(id.to_owned());
        self.selection.manual_interaction_since_selection = false;
        self.selection.pending_refocus_target = Some(id.to_owned());
        self.trigger_refocus(now);
    }

    /// Advances the panel settle delay; firing it opens the panel, marks
    /// the interaction complete, and animates back to the snapshot.
    pub(in crate::app) fn poll_selection_timers(&mut self, now: f64) {
        let Some(at) = self.selection.panel_open_at else {
            return;
        };
        if now < at {
            return;
        }

        self.selection.panel_open_at = None;
        self.selection.panel_visible = true;
        self.selection.manual_interaction_since_selection = true;
        if let Some(previous) = self.selection.return_transform {
            self.viewport
                .animate_to(previous, SOURCE_FOCUS_ANIMATION_SECS, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::camera::CameraEvent;
    use super::super::test_fixtures::sample_model;
    use super::super::Focus;
    use super::*;

    fn drive(model: &mut ViewModel, from: f64, until: f64) -> Vec<CameraEvent> {
        let mut all = Vec::new();
        let mut now = from;
        while now <= until {
            let events = model.viewport.advance(now);
            model.handle_camera_events(&events);
            all.extend(events);
            model.poll_selection_timers(now);
            model.poll_refocus(now);
            now += 1.0 / 60.0;
        }
        all
    }

    #[test]
    fn source_click_opens_panel_and_restores_camera() {
        let mut model = sample_model();
        let start = model.viewport.transform();

        model.click_source("s1", 0.0);
        assert_eq!(model.selection.focus, Focus::Source("s1".to_owned()));
        assert!(!model.selection.panel_visible);
        assert!(model.selection.detail.is_some());

        drive(&mut model, 0.0, 2.0);

        assert!(model.selection.panel_visible);
        assert!(model.selection.manual_interaction_since_selection);
        assert_eq!(model.selection.return_transform, Some(start));
        let end = model.viewport.transform();
        assert!((end.x - start.x).abs() < 0.001);
        assert!((end.scale - start.scale).abs() < 0.001);
    }

    #[test]
    fn background_click_closes_panel_and_clears_collection_focus() {
        let mut model = sample_model();
        model.click_source("s1", 0.0);
        drive(&mut model, 0.0, 2.0);
        assert!(model.selection.panel_visible);

        model.click_background(2.0);
        assert!(!model.selection.panel_visible);

        let mut model = sample_model();
        model.click_collection("c1", 0.0);
        model.click_background(0.5);
        assert_eq!(model.selection.focus, Focus::None);
        assert!(!model.selection.refocusing);
    }

    #[test]
    fn collection_click_twice_returns_to_idle_without_second_refocus() {
        let mut model = sample_model();

        model.click_collection("c1", 0.0);
        assert_eq!(model.selection.focus, Focus::Collection("c1".to_owned()));
        assert!(model.selection.refocusing);

        model.click_collection("c1", 0.01);
        assert_eq!(model.selection.focus, Focus::None);
        assert!(!model.selection.refocusing);
        assert!(model.selection.pending_refocus_target.is_none());
        assert!(model.selection.refocus_settle_at.is_none());

        // Nothing fires later either.
        let events = drive(&mut model, 0.01, 1.5);
        assert!(
            events
                .iter()
                .all(|event| !matches!(event, CameraEvent::Completed(_)))
        );
    }

    #[test]
    fn source_click_supersedes_collection_focus() {
        let mut model = sample_model();
        model.click_collection("c1", 0.0);
        model.click_source("s1", 0.01);

        assert_eq!(model.selection.focus, Focus::Source("s1".to_owned()));
        assert!(!model.selection.refocusing);
        assert!(model.selection.pending_refocus_target.is_none());
    }
}
