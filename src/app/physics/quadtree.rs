use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy)]
pub(super) struct QuadBounds {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl QuadBounds {
    fn from_points(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);

        for point in points {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }

        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let center = (min + max) * 0.5;
        let span = (max.x - min.x).max(max.y - min.y).max(1.0);

        Some(Self {
            center,
            half_extent: (span * 0.5) + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    pub(super) fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }

    /// Squared distance from `point` to the nearest edge of this cell, zero
    /// when the point is inside.
    pub(super) fn distance_sq_to_point(self, point: Vec2) -> f32 {
        let dx = ((point.x - self.center.x).abs() - self.half_extent).max(0.0);
        let dy = ((point.y - self.center.y).abs() - self.half_extent).max(0.0);
        (dx * dx) + (dy * dy)
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = match quadrant {
            0 => vec2(-quarter, -quarter),
            1 => vec2(quarter, -quarter),
            2 => vec2(-quarter, quarter),
            _ => vec2(quarter, quarter),
        };

        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_for(self, point: Vec2) -> usize {
        let right = point.x >= self.center.x;
        let lower = point.y >= self.center.y;
        match (right, lower) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }
}

/// Barnes-Hut quadtree over body positions, rebuilt every tick. Interior
/// nodes carry the aggregate mass and center of mass of their subtree;
/// leaves keep the body indices.
pub(super) struct QuadNode {
    pub(super) bounds: QuadBounds,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let bounds = QuadBounds::from_points(positions)?;
        let indices = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::build_node(bounds, indices, positions, 0))
    }

    fn build_node(
        bounds: QuadBounds,
        indices: Vec<usize>,
        positions: &[Vec2],
        depth: usize,
    ) -> Self {
        let mut center_of_mass = Vec2::ZERO;
        for &index in &indices {
            center_of_mass += positions[index];
        }

        let mass = indices.len() as f32;
        if mass > 0.0 {
            center_of_mass /= mass;
        }

        let mut node = Self {
            bounds,
            center_of_mass,
            mass,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || node.indices.len() <= LEAF_CAPACITY {
            return node;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &node.indices {
            buckets[bounds.quadrant_for(positions[index])].push(index);
        }

        // All points in one quadrant (coincident positions): stop splitting.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            node.children[quadrant] = Some(Box::new(Self::build_node(
                bounds.child(quadrant),
                bucket,
                positions,
                depth + 1,
            )));
        }
        node.indices.clear();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(|child| child.is_none())
    }

    /// Calls `visit` for every body index within `radius` of `point`,
    /// pruning subtrees whose bounds cannot intersect the disc.
    pub(super) fn for_each_within(
        &self,
        point: Vec2,
        radius: f32,
        positions: &[Vec2],
        visit: &mut impl FnMut(usize),
    ) {
        if self.bounds.distance_sq_to_point(point) > radius * radius {
            return;
        }

        if self.is_leaf() {
            for &index in &self.indices {
                if (positions[index] - point).length_sq() <= radius * radius {
                    visit(index);
                }
            }
            return;
        }

        for child in self.children.iter().flatten() {
            child.for_each_within(point, radius, positions, visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_handles_empty_and_single_point() {
        assert!(QuadNode::build(&[]).is_none());
        let tree = QuadNode::build(&[vec2(3.0, 4.0)]).expect("single point builds");
        assert!(tree.is_leaf());
        assert_eq!(tree.mass, 1.0);
    }

    #[test]
    fn range_query_finds_exactly_the_nearby_points() {
        let positions = (0..64)
            .map(|i| vec2((i % 8) as f32 * 50.0, (i / 8) as f32 * 50.0))
            .collect::<Vec<_>>();
        let tree = QuadNode::build(&positions).expect("tree builds");

        let mut found = Vec::new();
        tree.for_each_within(vec2(100.0, 100.0), 60.0, &positions, &mut |index| {
            found.push(index);
        });
        found.sort_unstable();

        let mut expected = (0..positions.len())
            .filter(|&i| (positions[i] - vec2(100.0, 100.0)).length() <= 60.0)
            .collect::<Vec<_>>();
        expected.sort_unstable();
        assert_eq!(found, expected);
    }

    #[test]
    fn coincident_points_do_not_recurse_forever() {
        let positions = vec![vec2(5.0, 5.0); 100];
        let tree = QuadNode::build(&positions).expect("tree builds");
        assert_eq!(tree.mass, 100.0);
    }
}
