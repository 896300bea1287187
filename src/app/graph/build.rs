use std::collections::{HashMap, HashSet};

use eframe::egui::{Color32, vec2};

use crate::catalog::{Source, parse_tags};
use crate::util::stable_pair;

use super::super::physics::{PhysicsBody, Simulation};
use super::super::{Focus, GraphEdge, NodeKind, NodeMeta, RenderGraph, ViewModel};

/// Collection colors, assigned by ordinal and wrapping after seven.
const PALETTE: [Color32; 7] = [
    Color32::from_rgb(250, 226, 100),
    Color32::from_rgb(243, 174, 61),
    Color32::from_rgb(234, 88, 80),
    Color32::from_rgb(87, 191, 128),
    Color32::from_rgb(128, 194, 194),
    Color32::from_rgb(98, 134, 247),
    Color32::from_rgb(152, 83, 210),
];

pub(in crate::app) fn collection_color(ordinal: usize) -> Color32 {
    PALETTE[ordinal % PALETTE.len()]
}

/// How far new nodes scatter from the canvas center at seed time.
const SEED_JITTER: f32 = 60.0;

impl ViewModel {
    fn source_passes(&self, source: &Source) -> bool {
        if !self.selected_tags.is_empty() {
            let tags = parse_tags(source.tags.as_ref());
            if !tags.iter().any(|tag| self.selected_tags.contains(tag)) {
                return false;
            }
        }

        if !self.active_keyword.is_empty() {
            let needle = self.active_keyword.to_lowercase();
            let in_name = source.name.to_lowercase().contains(&needle);
            let in_content = source
                .content
                .as_deref()
                .is_some_and(|content| content.to_lowercase().contains(&needle));
            if !in_name && !in_content {
                return false;
            }
        }

        true
    }

    /// Rebuilds nodes, edges, and the physics arena from the catalog and
    /// the active filters. Nodes seen before resume from the position
    /// cache; collections additionally re-pin there so a filter toggle
    /// does not scatter the layout.
    pub(in crate::app) fn rebuild_graph(&mut self, width: f32, height: f32) {
        // A rebuild invalidates any camera flight and pending timers.
        self.clear_refocus_flight();
        self.selection.pending_refocus_target = None;
        self.selection.panel_open_at = None;
        self.drag = None;

        self.snapshot_positions();
        if let Some(simulation) = &mut self.simulation {
            simulation.stop();
        }

        let mut nodes: Vec<NodeMeta> = Vec::new();
        let mut edges: Vec<GraphEdge> = Vec::new();
        let mut index_by_id: HashMap<String, usize> = HashMap::new();
        let mut source_to_collections: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut seen_edges: HashSet<(usize, usize)> = HashSet::new();

        for (ordinal, collection) in self.catalog.collections.iter().enumerate() {
            index_by_id.insert(collection.id.clone(), nodes.len());
            nodes.push(NodeMeta {
                id: collection.id.clone(),
                name: collection.name.clone(),
                kind: NodeKind::Collection,
                type_label: NodeKind::Collection.label().to_owned(),
                group: 0,
                tags: Vec::new(),
                content: None,
                color: collection_color(ordinal),
            });
        }

        for collection in &self.catalog.collections {
            let collection_index = index_by_id[&collection.id];
            let collection_color = nodes[collection_index].color;

            for source in self.catalog.sources_of(&collection.id) {
                if !self.source_passes(source) {
                    continue;
                }

                // A source listed under several collections keeps one node;
                // its color comes from the first collection that claims it.
                let source_index = match index_by_id.get(&source.id) {
                    Some(&index) => index,
                    None => {
                        let index = nodes.len();
                        index_by_id.insert(source.id.clone(), index);
                        nodes.push(NodeMeta {
                            id: source.id.clone(),
                            name: source.name.clone(),
                            kind: NodeKind::Source,
                            type_label: if source.kind.is_empty() {
                                NodeKind::Source.label().to_owned()
                            } else {
                                source.kind.clone()
                            },
                            group: 1,
                            tags: parse_tags(source.tags.as_ref()),
                            content: source.content.clone(),
                            color: collection_color,
                        });
                        index
                    }
                };

                if seen_edges.insert((collection_index, source_index)) {
                    edges.push(GraphEdge {
                        collection: collection_index,
                        source: source_index,
                        weight: 1.0,
                    });
                    source_to_collections
                        .entry(source_index)
                        .or_default()
                        .push(collection_index);
                }
            }
        }

        let center = vec2(width * 0.5, height * 0.5);
        let bodies = nodes
            .iter()
            .map(|node| match self.position_cache.get(&node.id) {
                Some(&cached) => {
                    let mut body = PhysicsBody::at(cached);
                    if node.kind == NodeKind::Collection {
                        body.pin_at(cached);
                    }
                    body
                }
                None => {
                    let (jx, jy) = stable_pair(&node.id);
                    PhysicsBody::at(center + vec2(jx, jy) * SEED_JITTER)
                }
            })
            .collect();
        let links = edges
            .iter()
            .map(|edge| (edge.collection, edge.source))
            .collect();
        self.simulation = Some(Simulation::start(bodies, links, width, height));

        self.drop_stale_selection(&index_by_id);

        log::debug!(
            "graph rebuilt: {} nodes, {} edges",
            nodes.len(),
            edges.len()
        );

        self.graph_cache = Some(RenderGraph {
            nodes,
            edges,
            index_by_id,
            source_to_collections,
        });
        self.graph_dirty = false;
    }

    /// Copies current body positions into the cross-rebuild cache.
    pub(in crate::app) fn snapshot_positions(&mut self) {
        let (Some(graph), Some(simulation)) = (&self.graph_cache, &self.simulation) else {
            return;
        };
        for (node, body) in graph.nodes.iter().zip(simulation.bodies()) {
            let position = body.position();
            if position.x.is_finite() && position.y.is_finite() {
                self.position_cache.insert(node.id.clone(), position);
            }
        }
    }

    /// Clears any focus whose referent the new graph no longer contains.
    fn drop_stale_selection(&mut self, index_by_id: &HashMap<String, usize>) {
        let stale = match &self.selection.focus {
            Focus::None => false,
            Focus::Source(id) | Focus::Collection(id) => !index_by_id.contains_key(id),
        };
        if stale {
            self.selection.focus = Focus::None;
            self.selection.detail = None;
            self.selection.panel_visible = false;
            self.selection.pending_refocus_target = None;
            self.selection.return_transform = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::test_fixtures::sample_model;
    use super::super::super::{Focus, NodeKind};

    #[test]
    fn shared_source_keeps_one_node_and_two_edges() {
        let model = sample_model();
        let graph = model.graph_cache.as_ref().unwrap();

        // 2 collections + 3 distinct sources.
        assert_eq!(graph.nodes.len(), 5);
        assert_eq!(graph.edges.len(), 4);

        let s2 = graph.index_by_id["s2"];
        let owners = &graph.source_to_collections[&s2];
        assert_eq!(owners.len(), 2);
        // Color follows the first claiming collection.
        assert_eq!(graph.nodes[s2].color, graph.nodes[owners[0]].color);
    }

    #[test]
    fn tag_filter_prunes_sources_and_their_edges() {
        let mut model = sample_model();
        model.selected_tags.insert("guide".to_owned());
        model.rebuild_graph(800.0, 600.0);

        let graph = model.graph_cache.as_ref().unwrap();
        assert!(graph.index_by_id.contains_key("s1"));
        assert!(graph.index_by_id.contains_key("s2"));
        assert!(!graph.index_by_id.contains_key("s3"));
        assert_eq!(graph.edges.len(), 3);

        model.selected_tags.clear();
        model.selected_tags.insert("nonexistent".to_owned());
        model.rebuild_graph(800.0, 600.0);
        let graph = model.graph_cache.as_ref().unwrap();
        assert!(
            graph
                .nodes
                .iter()
                .all(|node| node.kind == NodeKind::Collection)
        );
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn keyword_filter_matches_name_and_content() {
        let mut model = sample_model();
        model.active_keyword = "PHYSICS".to_owned();
        model.rebuild_graph(800.0, 600.0);

        let graph = model.graph_cache.as_ref().unwrap();
        // Only s3 matches, via its content.
        assert!(graph.index_by_id.contains_key("s3"));
        assert!(!graph.index_by_id.contains_key("s1"));
        assert!(!graph.index_by_id.contains_key("s2"));
    }

    #[test]
    fn filter_toggle_restores_node_set_and_positions() {
        let mut model = sample_model();
        let simulation = model.simulation.as_mut().unwrap();
        for _ in 0..300 {
            if !simulation.tick() {
                break;
            }
        }
        model.snapshot_positions();
        let settled: Vec<String> = {
            let graph = model.graph_cache.as_ref().unwrap();
            graph.nodes.iter().map(|node| node.id.clone()).collect()
        };
        let c1 = model.graph_cache.as_ref().unwrap().index_by_id["c1"];
        let c1_position = model.node_world_position(c1).unwrap();

        model.selected_tags.insert("draft".to_owned());
        model.rebuild_graph(800.0, 600.0);
        model.selected_tags.clear();
        model.rebuild_graph(800.0, 600.0);

        let graph = model.graph_cache.as_ref().unwrap();
        let mut restored: Vec<String> = graph.nodes.iter().map(|node| node.id.clone()).collect();
        let mut expected = settled;
        restored.sort();
        expected.sort();
        assert_eq!(restored, expected);

        // Collections resume pinned at their cached spot.
        let c1 = graph.index_by_id["c1"];
        let body = &model.simulation.as_ref().unwrap().bodies()[c1];
        assert!(body.is_pinned());
        assert!((body.position() - c1_position).length() < 0.001);
    }

    #[test]
    fn rebuild_cancels_refocus_and_its_pending_target() {
        let mut model = sample_model();
        model.click_collection("c1", 0.0);
        assert!(model.selection.refocusing);
        assert!(model.selection.pending_refocus_target.is_some());

        // The collection survives the rebuild, but the protocol run does not.
        model.rebuild_graph(800.0, 600.0);
        assert!(!model.selection.refocusing);
        assert!(model.selection.pending_refocus_target.is_none());
        assert!(model.selection.refocus_settle_at.is_none());
        assert_eq!(model.selection.focus, Focus::Collection("c1".to_owned()));
    }

    #[test]
    fn rebuild_clears_focus_on_removed_source() {
        let mut model = sample_model();
        model.click_source("s3", 0.0);
        assert_eq!(model.selection.focus, Focus::Source("s3".to_owned()));

        model.selected_tags.insert("guide".to_owned());
        model.rebuild_graph(800.0, 600.0);

        assert_eq!(model.selection.focus, Focus::None);
        assert!(model.selection.detail.is_none());
        assert!(!model.selection.panel_visible);
    }
}
