use eframe::egui::{self, Context, Id, RichText, pos2};

use super::super::{Focus, ViewModel};

pub(in crate::app) const PANEL_WIDTH: f32 = 400.0;
const SLIDE_SECS: f32 = 0.3;

impl ViewModel {
    /// Source detail panel. Slides in over the canvas when a source is
    /// selected and back out when deselected; the detail snapshot and the
    /// source focus are released only once the slide-out finishes.
    pub(in crate::app) fn draw_detail_panel(&mut self, ctx: &Context) {
        let slide = ctx.animate_bool_with_time(
            Id::new("detail_panel_slide"),
            self.selection.panel_visible,
            SLIDE_SECS,
        );

        if slide <= 0.0 {
            if !self.selection.panel_visible && self.selection.detail.take().is_some() {
                if matches!(self.selection.focus, Focus::Source(_)) {
                    self.selection.focus = Focus::None;
                }
                self.selection.return_transform = None;
            }
            return;
        }

        let Some(detail) = self.selection.detail.clone() else {
            return;
        };

        let screen = ctx.screen_rect();
        // Slides in from the left edge; the graph framing point sits in the
        // region to its right.
        let panel_left = screen.left() - PANEL_WIDTH * (1.0 - slide);
        let mut close_clicked = false;

        egui::Area::new(Id::new("detail_panel"))
            .fixed_pos(pos2(panel_left, screen.top()))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::window(ui.style()).show(ui, |ui| {
                    ui.set_width(PANEL_WIDTH - 24.0);
                    ui.set_min_height(screen.height() - 24.0);

                    ui.horizontal(|ui| {
                        ui.heading(&detail.name);
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                if ui.button("Close").clicked() {
                                    close_clicked = true;
                                }
                            },
                        );
                    });
                    ui.small(&detail.kind);
                    ui.add_space(6.0);

                    if !detail.collections.is_empty() {
                        ui.label(format!("Collections: {}", detail.collections.join(", ")));
                    }
                    if detail.tags.is_empty() {
                        ui.label("No tags");
                    } else {
                        ui.label(format!("Tags: {}", detail.tags.join(", ")));
                    }

                    ui.separator();
                    ui.label(RichText::new("Content").strong());
                    match detail.content.as_deref() {
                        Some(content) if !content.is_empty() => {
                            egui::ScrollArea::vertical()
                                .id_salt("detail_content_scroll")
                                .auto_shrink([false, true])
                                .show(ui, |ui| {
                                    ui.label(content);
                                });
                        }
                        _ => {
                            ui.label("No content available for this source.");
                        }
                    }
                });
            });

        if close_clicked {
            let now = ctx.input(|input| input.time);
            self.click_background(now);
        }
    }
}
