use super::{Focus, RenderGraph};

pub(in crate::app) const NODE_ALPHA: f32 = 1.0;
pub(in crate::app) const LABEL_ALPHA: f32 = 0.7;
pub(in crate::app) const EDGE_ALPHA: f32 = 0.6;
pub(in crate::app) const DIMMED_ALPHA: f32 = 0.05;

/// Per-element opacities for one frame, indexed like the graph's node and
/// edge vectors.
pub(in crate::app) struct OpacitySet {
    pub nodes: Vec<f32>,
    pub labels: Vec<f32>,
    pub edges: Vec<f32>,
}

/// Pure highlight rule. A focused source lights itself and the collections
/// it belongs to; a focused collection lights itself, its member sources,
/// and their connecting edges; no focus lights everything. `hide_titles`
/// zeroes label opacity on top of whatever the rule picked.
pub(in crate::app) fn compute_opacity(
    graph: &RenderGraph,
    focus: &Focus,
    hide_titles: bool,
) -> OpacitySet {
    let node_count = graph.nodes.len();
    let mut nodes = vec![NODE_ALPHA; node_count];
    let mut edges = vec![EDGE_ALPHA; graph.edges.len()];

    match focus {
        Focus::None => {}
        Focus::Source(id) => {
            if let Some(&focused) = graph.index_by_id.get(id) {
                let mut lit = vec![false; node_count];
                lit[focused] = true;
                for edge in &graph.edges {
                    if edge.source == focused {
                        lit[edge.collection] = true;
                    }
                }
                apply_dim(&mut nodes, &lit);
                for (alpha, edge) in edges.iter_mut().zip(&graph.edges) {
                    if edge.source != focused {
                        *alpha = DIMMED_ALPHA;
                    }
                }
            }
        }
        Focus::Collection(id) => {
            if let Some(&focused) = graph.index_by_id.get(id) {
                let mut lit = vec![false; node_count];
                lit[focused] = true;
                for edge in &graph.edges {
                    if edge.collection == focused {
                        lit[edge.source] = true;
                    }
                }
                apply_dim(&mut nodes, &lit);
                for (alpha, edge) in edges.iter_mut().zip(&graph.edges) {
                    if edge.collection != focused {
                        *alpha = DIMMED_ALPHA;
                    }
                }
            }
        }
    }

    let labels = if hide_titles {
        vec![0.0; node_count]
    } else {
        nodes
            .iter()
            .map(|&alpha| if alpha >= NODE_ALPHA { LABEL_ALPHA } else { alpha })
            .collect()
    };

    OpacitySet {
        nodes,
        labels,
        edges,
    }
}

fn apply_dim(nodes: &mut [f32], lit: &[bool]) {
    for (alpha, &keep) in nodes.iter_mut().zip(lit) {
        if !keep {
            *alpha = DIMMED_ALPHA;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_fixtures::sample_model;
    use super::super::Focus;
    use super::*;

    #[test]
    fn no_focus_is_fully_lit() {
        let model = sample_model();
        let graph = model.graph_cache.as_ref().unwrap();
        let set = compute_opacity(graph, &Focus::None, false);
        assert!(set.nodes.iter().all(|&alpha| alpha == NODE_ALPHA));
        assert!(set.labels.iter().all(|&alpha| alpha == LABEL_ALPHA));
        assert!(set.edges.iter().all(|&alpha| alpha == EDGE_ALPHA));
    }

    #[test]
    fn collection_focus_dims_everything_outside_it() {
        let model = sample_model();
        let graph = model.graph_cache.as_ref().unwrap();
        let set = compute_opacity(graph, &Focus::Collection("c1".to_owned()), false);

        let lit_ids = ["c1", "s1", "s2"];
        for (index, node) in graph.nodes.iter().enumerate() {
            let expected = if lit_ids.contains(&node.id.as_str()) {
                NODE_ALPHA
            } else {
                DIMMED_ALPHA
            };
            assert_eq!(set.nodes[index], expected, "node {}", node.id);
        }

        let c1 = graph.index_by_id["c1"];
        for (index, edge) in graph.edges.iter().enumerate() {
            let expected = if edge.collection == c1 {
                EDGE_ALPHA
            } else {
                DIMMED_ALPHA
            };
            assert_eq!(set.edges[index], expected);
        }
    }

    #[test]
    fn source_focus_lights_its_collections() {
        let model = sample_model();
        let graph = model.graph_cache.as_ref().unwrap();
        // s2 belongs to both collections.
        let set = compute_opacity(graph, &Focus::Source("s2".to_owned()), false);

        let lit_ids = ["s2", "c1", "c2"];
        for (index, node) in graph.nodes.iter().enumerate() {
            let expected = if lit_ids.contains(&node.id.as_str()) {
                NODE_ALPHA
            } else {
                DIMMED_ALPHA
            };
            assert_eq!(set.nodes[index], expected, "node {}", node.id);
        }

        let s2 = graph.index_by_id["s2"];
        for (index, edge) in graph.edges.iter().enumerate() {
            let expected = if edge.source == s2 {
                EDGE_ALPHA
            } else {
                DIMMED_ALPHA
            };
            assert_eq!(set.edges[index], expected);
        }
    }

    #[test]
    fn hide_titles_zeroes_labels_only() {
        let model = sample_model();
        let graph = model.graph_cache.as_ref().unwrap();
        let set = compute_opacity(graph, &Focus::None, true);
        assert!(set.labels.iter().all(|&alpha| alpha == 0.0));
        assert!(set.nodes.iter().all(|&alpha| alpha == NODE_ALPHA));
    }
}
