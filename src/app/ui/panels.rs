use eframe::egui::{self, Align2, Color32, Context, Key, RichText, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::with_opacity;
use super::super::{Focus, NodeKind, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_overlays(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        self.draw_filter_controls(ctx);
        self.draw_legend(ctx);
        self.draw_view_controls(ctx, reload_requested, is_reloading);
    }

    /// Keyword search plus the tag filter menu, floating top-right.
    fn draw_filter_controls(&mut self, ctx: &Context) {
        egui::Area::new(egui::Id::new("filter_controls"))
            .anchor(Align2::RIGHT_TOP, vec2(-12.0, 12.0))
            .show(ctx, |ui| {
                egui::Frame::window(ui.style()).show(ui, |ui| {
                    ui.set_width(240.0);

                    let keyword_edit = ui.add(
                        egui::TextEdit::singleline(&mut self.keyword_input)
                            .hint_text("Search name or content"),
                    );
                    let committed = keyword_edit.lost_focus()
                        && ui.input(|input| input.key_pressed(Key::Enter));
                    if committed {
                        let keyword = self.keyword_input.trim().to_owned();
                        if keyword != self.active_keyword {
                            self.active_keyword = keyword;
                            self.graph_dirty = true;
                        }
                    }

                    let header = if self.selected_tags.is_empty() {
                        "Tags".to_owned()
                    } else {
                        format!("Tags ({})", self.selected_tags.len())
                    };
                    egui::CollapsingHeader::new(header)
                        .id_salt("tag_filter_menu")
                        .show(ui, |ui| {
                            ui.add(
                                egui::TextEdit::singleline(&mut self.tag_search)
                                    .hint_text("Filter tags"),
                            );

                            let matcher = SkimMatcherV2::default();
                            let query = self.tag_search.trim();
                            let visible_tags: Vec<String> = self
                                .all_tags
                                .iter()
                                .filter(|tag| {
                                    query.is_empty()
                                        || matcher.fuzzy_match(tag, query).is_some()
                                })
                                .cloned()
                                .collect();

                            egui::ScrollArea::vertical()
                                .id_salt("tag_list_scroll")
                                .max_height(220.0)
                                .show(ui, |ui| {
                                    for tag in visible_tags {
                                        let mut checked = self.selected_tags.contains(&tag);
                                        if ui.checkbox(&mut checked, tag.as_str()).changed() {
                                            if checked {
                                                self.selected_tags.insert(tag);
                                            } else {
                                                self.selected_tags.remove(&tag);
                                            }
                                            self.graph_dirty = true;
                                        }
                                    }
                                });

                            if !self.selected_tags.is_empty()
                                && ui.button("Clear tag filter").clicked()
                            {
                                self.selected_tags.clear();
                                self.graph_dirty = true;
                            }
                        });
                });
            });
    }

    /// Collection legend, bottom-left. A row click behaves exactly like
    /// clicking the collection's node.
    fn draw_legend(&mut self, ctx: &Context) {
        let rows: Vec<(String, String, Color32)> = self
            .graph_cache
            .as_ref()
            .map(|graph| {
                graph
                    .nodes
                    .iter()
                    .filter(|node| node.kind == NodeKind::Collection)
                    .map(|node| (node.id.clone(), node.name.clone(), node.color))
                    .collect()
            })
            .unwrap_or_default();
        if rows.is_empty() {
            return;
        }

        let focused = match &self.selection.focus {
            Focus::Collection(id) => Some(id.clone()),
            _ => None,
        };

        egui::Area::new(egui::Id::new("collection_legend"))
            .anchor(Align2::LEFT_BOTTOM, vec2(12.0, -12.0))
            .show(ctx, |ui| {
                egui::Frame::window(ui.style()).show(ui, |ui| {
                    ui.label(RichText::new("Collections").strong());
                    ui.add_space(2.0);
                    for (id, name, color) in rows {
                        let dimmed =
                            focused.as_deref().is_some_and(|focus_id| focus_id != id);
                        let alpha = if dimmed { 0.35 } else { 1.0 };
                        ui.horizontal(|ui| {
                            let (dot_rect, _) = ui
                                .allocate_exact_size(vec2(10.0, 10.0), egui::Sense::hover());
                            ui.painter().circle_filled(
                                dot_rect.center(),
                                4.0,
                                with_opacity(color, alpha),
                            );
                            let text = if dimmed {
                                RichText::new(name).weak()
                            } else {
                                RichText::new(name)
                            };
                            if ui
                                .add(egui::Label::new(text).sense(egui::Sense::click()))
                                .clicked()
                            {
                                let now = ui.input(|input| input.time);
                                self.click_collection(&id, now);
                            }
                        });
                    }
                });
            });
    }

    /// Zoom buttons, label toggle, and reload, bottom-right.
    fn draw_view_controls(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        egui::Area::new(egui::Id::new("view_controls"))
            .anchor(Align2::RIGHT_BOTTOM, vec2(-12.0, -12.0))
            .show(ctx, |ui| {
                egui::Frame::window(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let now = ui.input(|input| input.time);
                        let viewport_center = self.graph_rect.size() * 0.5;
                        if ui.button("+").clicked() {
                            self.viewport.zoom_in(viewport_center, now);
                        }
                        if ui.button("\u{2212}").clicked() {
                            self.viewport.zoom_out(viewport_center, now);
                        }
                        ui.separator();
                        if ui
                            .checkbox(&mut self.hide_titles, "Hide titles")
                            .changed()
                        {
                            ctx.request_repaint();
                        }
                        ui.separator();
                        let reload_button =
                            ui.add_enabled(!is_reloading, egui::Button::new("Reload data"));
                        if reload_button.clicked() {
                            *reload_requested = true;
                        }
                    });
                });
            });
    }
}
