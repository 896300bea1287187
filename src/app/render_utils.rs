use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

/// Segment count for two-color gradient edges. egui strokes are single
/// color, so the gradient is approximated with short interpolated pieces.
const GRADIENT_SEGMENTS: usize = 12;

pub(super) fn with_opacity(color: Color32, alpha: f32) -> Color32 {
    let alpha = alpha.clamp(0.0, 1.0);
    // Color32 stores premultiplied components, so scale in unmultiplied
    // space to keep the hue intact.
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    Color32::from_rgba_unmultiplied(r, g, b, (a as f32 * alpha) as u8)
}

pub(super) fn mix_color(from: Color32, to: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let inverse = 1.0 - t;
    Color32::from_rgba_unmultiplied(
        ((from.r() as f32 * inverse) + (to.r() as f32 * t)) as u8,
        ((from.g() as f32 * inverse) + (to.g() as f32 * t)) as u8,
        ((from.b() as f32 * inverse) + (to.b() as f32 * t)) as u8,
        ((from.a() as f32 * inverse) + (to.a() as f32 * t)) as u8,
    )
}

/// Draws one edge. Same color at both ends gives a single stroke; distinct
/// colors give a gradient from the collection end to the source end.
pub(super) fn draw_edge(
    painter: &Painter,
    start: Pos2,
    end: Pos2,
    from_color: Color32,
    to_color: Color32,
    alpha: f32,
    width: f32,
) {
    if from_color == to_color {
        painter.line_segment([start, end], Stroke::new(width, with_opacity(from_color, alpha)));
        return;
    }

    let delta = end - start;
    for segment in 0..GRADIENT_SEGMENTS {
        let t0 = segment as f32 / GRADIENT_SEGMENTS as f32;
        let t1 = (segment + 1) as f32 / GRADIENT_SEGMENTS as f32;
        let color = mix_color(from_color, to_color, (t0 + t1) * 0.5);
        painter.line_segment(
            [start + delta * t0, start + delta * t1],
            Stroke::new(width, with_opacity(color, alpha)),
        );
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, translation: Vec2, scale: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * scale.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + translation;

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    if max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom() {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let top_left = rect.left_top();
    let top_right = rect.right_top();
    let bottom_left = rect.left_bottom();
    let bottom_right = rect.right_bottom();

    segments_intersect(start, end, top_left, top_right)
        || segments_intersect(start, end, top_right, bottom_right)
        || segments_intersect(start, end, bottom_right, bottom_left)
        || segments_intersect(start, end, bottom_left, top_left)
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    let a_min_x = a1.x.min(a2.x);
    let a_max_x = a1.x.max(a2.x);
    let a_min_y = a1.y.min(a2.y);
    let a_max_y = a1.y.max(a2.y);
    let b_min_x = b1.x.min(b2.x);
    let b_max_x = b1.x.max(b2.x);
    let b_min_y = b1.y.min(b2.y);
    let b_max_y = b1.y.max(b2.y);

    if a_max_x < b_min_x || b_max_x < a_min_x || a_max_y < b_min_y || b_max_y < a_min_y {
        return false;
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}
