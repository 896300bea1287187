use eframe::egui::vec2;

use super::camera::{CameraEvent, CameraTransform};
use super::ViewModel;

pub(in crate::app) const REFOCUS_SCALE: f32 = 1.5;
pub(in crate::app) const REFOCUS_ANIMATION_SECS: f64 = 0.75;
pub(in crate::app) const REFOCUS_SETTLE_SECS: f64 = 0.05;

/// Centering a collection after a legend or node click runs in three
/// phases: a short settle delay, a single eased camera flight, and a
/// completion step that unpins the node. Each phase re-validates, and any
/// manual interaction in between aborts the whole protocol.
impl ViewModel {
    /// Arms the settle timer for `pending_refocus_target` and pins the
    /// target so the layout cannot drift out from under the flight.
    pub(in crate::app) fn trigger_refocus(&mut self, now: f64) {
        let Some(target) = self.selection.pending_refocus_target.clone() else {
            return;
        };

        self.clear_refocus_flight();

        let Some(index) = self
            .graph_cache
            .as_ref()
            .and_then(|graph| graph.index_by_id.get(&target).copied())
        else {
            self.selection.pending_refocus_target = None;
            return;
        };
        let Some(position) = self.node_world_position(index) else {
            log::warn!("refocus target {target} has no defined position");
            self.selection.pending_refocus_target = None;
            return;
        };

        if let Some(simulation) = &mut self.simulation
            && let Some(body) = simulation.body_mut(index)
        {
            body.pin_at(position);
            self.selection.refocus_pinned = Some(target);
        }

        self.selection.refocusing = true;
        self.selection.refocus_settle_at = Some(now + REFOCUS_SETTLE_SECS);
    }

    /// Fires the settle timer: re-validates the target and, if it still
    /// holds up, starts the camera flight to center it.
    pub(in crate::app) fn poll_refocus(&mut self, now: f64) {
        let Some(at) = self.selection.refocus_settle_at else {
            return;
        };
        if now < at {
            return;
        }
        self.selection.refocus_settle_at = None;

        if !self.selection.refocusing {
            return;
        }
        if self.selection.manual_interaction_since_selection {
            self.abort_refocus();
            return;
        }

        let target = self.selection.pending_refocus_target.clone();
        let index = target
            .as_deref()
            .and_then(|id| self.graph_cache.as_ref()?.index_by_id.get(id).copied());
        let Some(world) = index.and_then(|index| self.node_world_position(index)) else {
            log::warn!("refocus target disappeared before the settle delay fired");
            self.abort_refocus();
            return;
        };

        let rect = self.graph_rect;
        let center = vec2(rect.width() * 0.5, rect.height() * 0.5);
        let id = self.viewport.animate_to(
            CameraTransform::framing(world, center, REFOCUS_SCALE),
            REFOCUS_ANIMATION_SECS,
            now,
        );
        self.selection.refocus_animation = Some(id);
    }

    /// Routes camera animation outcomes back into the protocol. Completion
    /// finishes the refocus; interruption (a superseding animation or a
    /// gesture) tears down the flight without touching the new state.
    pub(in crate::app) fn handle_camera_events(&mut self, events: &[CameraEvent]) {
        for event in events {
            match *event {
                CameraEvent::Completed(id) => {
                    if self.selection.refocus_animation == Some(id) {
                        self.unpin_refocus_target();
                        self.selection.refocus_animation = None;
                        self.selection.refocusing = false;
                        self.selection.pending_refocus_target = None;
                        self.selection.manual_interaction_since_selection = true;
                    }
                }
                CameraEvent::Interrupted(id) => {
                    if self.selection.refocus_animation == Some(id) {
                        self.unpin_refocus_target();
                        self.selection.refocus_animation = None;
                        self.selection.refocusing = false;
                    }
                }
            }
        }
    }

    /// A pan, zoom, or node drag by the user. Marks the selection as
    /// manually adjusted and aborts any refocus in flight.
    pub(in crate::app) fn note_manual_interaction(&mut self) {
        self.selection.manual_interaction_since_selection = true;
        if self.selection.refocusing || self.selection.refocus_settle_at.is_some() {
            self.abort_refocus();
        }
    }

    /// Tears down the current flight and forgets the target.
    pub(in crate::app) fn abort_refocus(&mut self) {
        self.clear_refocus_flight();
        self.selection.pending_refocus_target = None;
    }

    /// Tears down the current flight only. The pending target survives, so
    /// a caller that just set a new one can re-trigger immediately.
    pub(in crate::app) fn clear_refocus_flight(&mut self) {
        self.unpin_refocus_target();
        self.selection.refocus_settle_at = None;
        self.selection.refocusing = false;
        if self.selection.refocus_animation.take().is_some() {
            self.viewport.cancel_animation();
        }
    }

    fn unpin_refocus_target(&mut self) {
        let Some(id) = self.selection.refocus_pinned.take() else {
            return;
        };
        let index = self
            .graph_cache
            .as_ref()
            .and_then(|graph| graph.index_by_id.get(&id).copied());
        if let Some(index) = index
            && let Some(simulation) = &mut self.simulation
            && let Some(body) = simulation.body_mut(index)
        {
            body.unpin();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::camera::CameraEvent;
    use super::super::test_fixtures::sample_model;
    use super::super::{Focus, ViewModel};
    use super::*;
    use eframe::egui::vec2;

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
    fn refocus_centers_collection_and_unpins() {
        let mut model = sample_model();
        model.click_collection("c1", 0.0);

        let pinned_index = model.graph_cache.as_ref().unwrap().index_by_id["c1"];
        assert!(
            model.simulation.as_ref().unwrap().bodies()[pinned_index].is_pinned()
        );

        let events = drive(&mut model, 0.0, 2.0);
        assert!(
            events
                .iter()
                .any(|event| matches!(event, CameraEvent::Completed(_)))
        );

        let transform = model.viewport.transform();
        assert!((transform.scale - REFOCUS_SCALE).abs() < 0.001);

        let world = model.node_world_position(pinned_index).unwrap();
        let rect = model.graph_rect;
        let screen = transform.world_to_screen(rect, world);
        assert!((screen.x - rect.center().x).abs() < 0.5);
        assert!((screen.y - rect.center().y).abs() < 0.5);

        assert!(
            !model.simulation.as_ref().unwrap().bodies()[pinned_index].is_pinned()
        );
        assert!(!model.selection.refocusing);
        assert!(model.selection.pending_refocus_target.is_none());
        assert!(model.selection.manual_interaction_since_selection);
    }

    #[test]
    fn superseding_refocus_yields_a_single_completion() {
        let mut model = sample_model();
        model.click_collection("c1", 0.0);
        model.poll_refocus(0.06);
        model.click_collection("c2", 0.1);

        let completions = drive(&mut model, 0.1, 2.0)
            .iter()
            .filter(|event| matches!(event, CameraEvent::Completed(_)))
            .count();
        assert_eq!(completions, 1);
        assert_eq!(model.selection.focus, Focus::Collection("c2".to_owned()));
    }

    #[test]
    fn gesture_during_settle_aborts_refocus() {
        let mut model = sample_model();
        model.click_collection("c1", 0.0);

        model.viewport.gesture_pan(vec2(12.0, 0.0));
        model.note_manual_interaction();
        model.poll_refocus(0.06);

        assert!(!model.selection.refocusing);
        assert!(model.selection.refocus_animation.is_none());
        assert!(model.selection.pending_refocus_target.is_none());
        let index = model.graph_cache.as_ref().unwrap().index_by_id["c1"];
        assert!(!model.simulation.as_ref().unwrap().bodies()[index].is_pinned());
        // The selection itself survives the abort.
        assert_eq!(model.selection.focus, Focus::Collection("c1".to_owned()));
    }

    #[test]
    fn gesture_during_flight_interrupts_and_unpins() {
        let mut model = sample_model();
        model.click_collection("c1", 0.0);
        model.poll_refocus(0.06);
        assert!(model.selection.refocus_animation.is_some());

        // Partway through the flight the user pans.
        let events = model.viewport.advance(0.3);
        model.handle_camera_events(&events);
        model.viewport.gesture_pan(vec2(5.0, 5.0));
        model.note_manual_interaction();

        let index = model.graph_cache.as_ref().unwrap().index_by_id["c1"];
        assert!(!model.simulation.as_ref().unwrap().bodies()[index].is_pinned());
        assert!(!model.selection.refocusing);
        assert!(
            drive(&mut model, 0.35, 1.5)
                .iter()
                .all(|event| !matches!(event, CameraEvent::Completed(_)))
        );
    }
}
