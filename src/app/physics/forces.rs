use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

/// Accumulates the many-body charge on `index` by walking the quadtree,
/// approximating far subtrees by their center of mass when the usual
/// size/distance criterion passes. `strength` is the per-body charge already
/// scaled by the simulation alpha; negative repels.
pub(super) fn accumulate_charge(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    theta: f32,
    velocity: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            *velocity += charge_between(point, positions[other], strength);
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance = delta.length().max(0.01);
    let can_approximate =
        !node.bounds.contains(point) && (node.bounds.side_length() / distance) < theta;

    if can_approximate {
        *velocity += charge_between(point, node.center_of_mass, strength * node.mass);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_charge(child, index, positions, strength, theta, velocity);
    }
}

fn charge_between(point: Vec2, other: Vec2, strength: f32) -> Vec2 {
    let delta = point - other;
    let distance_sq = delta.length_sq().max(1.0);
    // Negative strength pushes `point` away from `other`.
    delta * (-strength / distance_sq)
}

/// Resolves overlaps against every neighbor closer than `2 * radius`,
/// nudging velocities apart in proportion to the overlap. Each unordered
/// pair is visited once by only acting on higher indices.
pub(super) fn accumulate_collisions(
    tree: &QuadNode,
    positions: &[Vec2],
    radius: f32,
    strength: f32,
    velocities: &mut [Vec2],
) {
    let min_distance = radius * 2.0;

    for index in 0..positions.len() {
        let point = positions[index];
        tree.for_each_within(point, min_distance, positions, &mut |other| {
            if other <= index {
                return;
            }

            let delta = point - positions[other];
            let distance = delta.length();
            let direction = if distance > 0.0001 {
                delta / distance
            } else {
                // Coincident bodies separate along a stable pseudo-random axis.
                let angle =
                    ((index as f32) * 0.618_034 + (other as f32) * 0.414_214) * std::f32::consts::TAU;
                vec2(angle.cos(), angle.sin())
            };

            let push = direction * ((min_distance - distance) * strength * 0.5);
            velocities[index] += push;
            velocities[other] -= push;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_charge_is_repulsive() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let tree = QuadNode::build(&positions).expect("tree builds");

        let mut velocity = Vec2::ZERO;
        accumulate_charge(&tree, 0, &positions, -5.0, 0.9, &mut velocity);
        assert!(velocity.x < 0.0, "left body pushed further left");

        let mut velocity = Vec2::ZERO;
        accumulate_charge(&tree, 1, &positions, -5.0, 0.9, &mut velocity);
        assert!(velocity.x > 0.0, "right body pushed further right");
    }

    #[test]
    fn collision_separates_overlapping_pair_symmetrically() {
        let positions = vec![vec2(0.0, 0.0), vec2(12.0, 0.0)];
        let tree = QuadNode::build(&positions).expect("tree builds");
        let mut velocities = vec![Vec2::ZERO; 2];

        accumulate_collisions(&tree, &positions, 30.0, 0.2, &mut velocities);

        assert!(velocities[0].x < 0.0);
        assert!(velocities[1].x > 0.0);
        assert!((velocities[0].x + velocities[1].x).abs() < 0.0001);
    }

    #[test]
    fn collision_ignores_separated_bodies() {
        let positions = vec![vec2(0.0, 0.0), vec2(200.0, 0.0)];
        let tree = QuadNode::build(&positions).expect("tree builds");
        let mut velocities = vec![Vec2::ZERO; 2];

        accumulate_collisions(&tree, &positions, 30.0, 0.2, &mut velocities);
        assert_eq!(velocities, vec![Vec2::ZERO; 2]);
    }
}
