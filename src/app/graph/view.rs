use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui, vec2};

use super::super::camera::TransformOrigin;
use super::super::highlight::compute_opacity;
use super::super::render_utils::{
    circle_visible, draw_background, draw_edge, edge_visible, with_opacity,
};
use super::super::{NodeKind, ViewModel};

pub(in crate::app) const COLLECTION_RADIUS: f32 = 10.0;
pub(in crate::app) const SOURCE_RADIUS: f32 = 5.0;

const LABEL_COLOR: Color32 = Color32::from_gray(220);

impl ViewModel {
    /// One frame of the graph canvas: input, timers, a physics tick, then
    /// edges, nodes, and labels in that order. Collections draw over
    /// sources so they stay clickable inside dense clusters.
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let now = ui.input(|input| input.time);

        self.graph_rect = rect;
        let size = rect.size();
        if (size - self.container_size).length() > 0.5 {
            self.container_size = size;
            self.graph_dirty = true;
        }
        if self.graph_dirty {
            self.rebuild_graph(size.x, size.y);
        }

        self.handle_zoom_input(ui, rect, &response);
        self.handle_drag_input(ui, rect, &response);
        if self.viewport.take_transform_origin() == Some(TransformOrigin::UserGesture) {
            self.note_manual_interaction();
        }

        let events = self.viewport.advance(now);
        self.handle_camera_events(&events);
        self.poll_selection_timers(now);
        self.poll_refocus(now);

        let mut simulation_active = false;
        if let Some(simulation) = &mut self.simulation {
            simulation_active = simulation.tick();
        }
        if simulation_active {
            self.snapshot_positions();
        }

        let transform = self.viewport.transform();
        draw_background(&painter, rect, transform.translation(), transform.scale);

        let hovered = ui
            .input(|input| input.pointer.hover_pos())
            .and_then(|pointer| self.hovered_node(rect, pointer));
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            let clicked = hovered.and_then(|index| {
                let node = self.graph_cache.as_ref()?.nodes.get(index)?;
                Some((node.id.clone(), node.kind))
            });
            match clicked {
                Some((id, NodeKind::Source)) => self.click_source(&id, now),
                Some((id, NodeKind::Collection)) => self.click_collection(&id, now),
                None => self.click_background(now),
            }
        }

        let repaint = simulation_active
            || self.viewport.is_animating()
            || response.dragged()
            || self.selection.panel_open_at.is_some()
            || self.selection.refocus_settle_at.is_some();
        if repaint {
            ui.ctx().request_repaint();
        }

        let (Some(graph), Some(simulation)) = (&self.graph_cache, &self.simulation) else {
            return;
        };

        let opacity = compute_opacity(graph, &self.selection.focus, self.hide_titles);
        let screen_positions: Vec<Pos2> = simulation
            .bodies()
            .iter()
            .map(|body| transform.world_to_screen(rect, body.position()))
            .collect();

        for (index, edge) in graph.edges.iter().enumerate() {
            let start = screen_positions[edge.collection];
            let end = screen_positions[edge.source];
            if !edge_visible(rect, start, end, 2.5) {
                continue;
            }
            draw_edge(
                &painter,
                start,
                end,
                graph.nodes[edge.collection].color,
                graph.nodes[edge.source].color,
                opacity.edges[index],
                (1.2 * edge.weight).max(1.0),
            );
        }

        // Sources in the first pass, collections over them.
        for pass in [1u8, 0u8] {
            for (index, node) in graph.nodes.iter().enumerate() {
                if node.group != pass {
                    continue;
                }
                let position = screen_positions[index];
                let radius = self.node_screen_radius(node.kind).max(1.5);
                if !circle_visible(rect, position, radius) {
                    continue;
                }
                painter.circle_filled(position, radius, with_opacity(node.color, opacity.nodes[index]));
                if hovered == Some(index) {
                    painter.circle_stroke(
                        position,
                        radius + 1.5,
                        Stroke::new(1.0, with_opacity(Color32::WHITE, opacity.nodes[index])),
                    );
                }
            }
        }

        for (index, node) in graph.nodes.iter().enumerate() {
            let alpha = opacity.labels[index];
            if alpha <= 0.0 {
                continue;
            }
            let position = screen_positions[index];
            let radius = self.node_screen_radius(node.kind);
            if !circle_visible(rect, position, radius + 60.0) {
                continue;
            }
            let font = match node.kind {
                NodeKind::Collection => FontId::proportional(13.0),
                NodeKind::Source => FontId::proportional(10.5),
            };
            painter.text(
                position + vec2(0.0, radius + 3.0),
                Align2::CENTER_TOP,
                &node.name,
                font,
                with_opacity(LABEL_COLOR, alpha),
            );
        }
    }
}
