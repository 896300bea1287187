use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::physics::DRAG_ALPHA_TARGET;
use super::super::{NodeDrag, NodeKind, ViewModel};
use super::view::{COLLECTION_RADIUS, SOURCE_RADIUS};

/// Slack added to the hit radius so small sources stay clickable when
/// zoomed out.
const HIT_PADDING: f32 = 2.0;
const MIN_HIT_RADIUS: f32 = 4.0;

impl ViewModel {
    pub(in crate::app) fn node_screen_radius(&self, kind: NodeKind) -> f32 {
        let world = match kind {
            NodeKind::Collection => COLLECTION_RADIUS,
            NodeKind::Source => SOURCE_RADIUS,
        };
        world * self.viewport.transform().scale
    }

    /// Closest node under the pointer, if any is within its hit radius.
    pub(in crate::app) fn hovered_node(&self, rect: Rect, pointer: Pos2) -> Option<usize> {
        let graph = self.graph_cache.as_ref()?;
        let simulation = self.simulation.as_ref()?;
        let transform = self.viewport.transform();

        let mut best: Option<(usize, f32)> = None;
        for (index, node) in graph.nodes.iter().enumerate() {
            let Some(body) = simulation.bodies().get(index) else {
                continue;
            };
            let screen = transform.world_to_screen(rect, body.position());
            let radius = self.node_screen_radius(node.kind).max(MIN_HIT_RADIUS) + HIT_PADDING;
            let distance = screen.distance(pointer);
            if distance <= radius && best.is_none_or(|(_, nearest)| distance < nearest) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }

    pub(in crate::app) fn handle_zoom_input(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.viewport.gesture_zoom(pointer - rect.min, factor);
    }

    /// Primary drag moves a node when it starts on one, otherwise pans.
    /// Secondary and middle drags always pan. A dragged node stays pinned
    /// where it is dropped.
    pub(in crate::app) fn handle_drag_input(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            let hovered = ui
                .input(|input| input.pointer.interact_pos())
                .and_then(|pointer| self.hovered_node(rect, pointer));
            match hovered {
                Some(index) => self.drag = Some(NodeDrag { index }),
                None => self.pan_active = true,
            }
        }

        if let Some(drag) = self.drag {
            if let Some(pointer) = ui.input(|input| input.pointer.interact_pos()) {
                let world = self.viewport.transform().screen_to_world(rect, pointer);
                if let Some(simulation) = &mut self.simulation {
                    if let Some(body) = simulation.body_mut(drag.index) {
                        body.pin_at(world);
                    }
                    simulation.set_alpha_target(DRAG_ALPHA_TARGET);
                }
                self.note_manual_interaction();
            }
            // However the drag ends, the alpha target must come back down.
            if response.drag_stopped() {
                self.drag = None;
                if let Some(simulation) = &mut self.simulation {
                    simulation.set_alpha_target(0.0);
                }
            }
            return;
        }

        let mut pan_delta = Vec2::ZERO;
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            pan_delta += response.drag_delta();
        } else if self.pan_active && response.dragged_by(egui::PointerButton::Primary) {
            pan_delta += response.drag_delta();
        }
        if pan_delta != Vec2::ZERO {
            self.viewport.gesture_pan(pan_delta);
        }
        if response.drag_stopped() {
            self.pan_active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::test_fixtures::sample_model;
    use eframe::egui::pos2;

    #[test]
    fn hovered_node_picks_the_closest_hit() {
        let model = sample_model();
        let graph = model.graph_cache.as_ref().unwrap();
        let rect = model.graph_rect;
        let transform = model.viewport.transform();

        let c1 = graph.index_by_id["c1"];
        let screen = transform.world_to_screen(rect, model.node_world_position(c1).unwrap());
        assert_eq!(model.hovered_node(rect, screen), Some(c1));

        // Far away from everything.
        assert_eq!(model.hovered_node(rect, pos2(-500.0, -500.0)), None);
    }
}
