use eframe::egui::{Pos2, Rect, Vec2, vec2};

pub const MIN_SCALE: f32 = 0.25;
pub const MAX_SCALE: f32 = 2.0;
const ZOOM_STEP: f32 = 0.2;
const ZOOM_ANIMATION_SECS: f64 = 0.2;

/// 2D translate + scale applied to the whole scene:
/// `screen = viewport.min + translation + world * scale`. World coordinates
/// are container coordinates, so the identity transform shows the scene
/// unscaled with world (0, 0) at the viewport's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTransform {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl CameraTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
    };

    pub fn clamped(self) -> Self {
        Self {
            scale: self.scale.clamp(MIN_SCALE, MAX_SCALE),
            ..self
        }
    }

    pub fn translation(&self) -> Vec2 {
        vec2(self.x, self.y)
    }

    pub fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.min + self.translation() + world * self.scale
    }

    pub fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.min - self.translation()) / self.scale
    }

    /// Transform that places `world` at `screen_point` (measured from the
    /// viewport's top-left corner), at the given scale.
    pub fn framing(world: Vec2, screen_point: Vec2, scale: f32) -> Self {
        let scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        let translation = screen_point - world * scale;
        Self {
            x: translation.x,
            y: translation.y,
            scale,
        }
    }

    fn lerp(from: Self, to: Self, t: f32) -> Self {
        Self {
            x: from.x + (to.x - from.x) * t,
            y: from.y + (to.y - from.y) * t,
            scale: from.scale + (to.scale - from.scale) * t,
        }
    }
}

/// Why a transform changed. Passed as an explicit value so downstream state
/// never has to infer user intent from timing or event shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformOrigin {
    UserGesture,
    ProgrammaticAnimation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraEvent {
    Completed(AnimationId),
    Interrupted(AnimationId),
}

struct CameraAnimation {
    id: AnimationId,
    from: CameraTransform,
    to: CameraTransform,
    start: f64,
    duration: f64,
}

/// Owns the camera transform. Gestures apply immediately and are tagged
/// [`TransformOrigin::UserGesture`]; `animate_to` runs at most one eased
/// programmatic animation, cancelling any in-flight one first. Time is an
/// injected `now` in seconds so the controller runs headless in tests.
pub struct Viewport {
    transform: CameraTransform,
    animation: Option<CameraAnimation>,
    next_animation_id: u64,
    events: Vec<CameraEvent>,
    last_origin: Option<TransformOrigin>,
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - (u * u * u) / 2.0
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            transform: CameraTransform::IDENTITY,
            animation: None,
            next_animation_id: 0,
            events: Vec::new(),
            last_origin: None,
        }
    }

    pub fn transform(&self) -> CameraTransform {
        self.transform
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn cancel_animation(&mut self) {
        if let Some(animation) = self.animation.take() {
            self.events.push(CameraEvent::Interrupted(animation.id));
        }
    }

    /// Starts the single in-flight programmatic animation toward `to`,
    /// cancelling any previous one.
    pub fn animate_to(&mut self, to: CameraTransform, duration: f64, now: f64) -> AnimationId {
        self.cancel_animation();

        let id = AnimationId(self.next_animation_id);
        self.next_animation_id += 1;
        let to = to.clamped();

        if duration <= 0.0 {
            self.transform = to;
            self.events.push(CameraEvent::Completed(id));
            return id;
        }

        self.animation = Some(CameraAnimation {
            id,
            from: self.transform,
            to,
            start: now,
            duration,
        });
        id
    }

    fn step_zoom(&mut self, step: f32, viewport_center: Vec2, now: f64) -> Option<AnimationId> {
        let old_scale = self.transform.scale;
        let new_scale = (old_scale + step).clamp(MIN_SCALE, MAX_SCALE);
        if (new_scale - old_scale).abs() <= f32::EPSILON {
            return None;
        }

        // Keep the world point under the viewport center fixed across the
        // scale change.
        let world = (viewport_center - self.transform.translation()) / old_scale;
        let translation = viewport_center - world * new_scale;
        let target = CameraTransform {
            x: translation.x,
            y: translation.y,
            scale: new_scale,
        };
        Some(self.animate_to(target, ZOOM_ANIMATION_SECS, now))
    }

    /// `viewport_center` is half the viewport size, measured from its
    /// top-left corner.
    pub fn zoom_in(&mut self, viewport_center: Vec2, now: f64) -> Option<AnimationId> {
        self.step_zoom(ZOOM_STEP, viewport_center, now)
    }

    pub fn zoom_out(&mut self, viewport_center: Vec2, now: f64) -> Option<AnimationId> {
        self.step_zoom(-ZOOM_STEP, viewport_center, now)
    }

    /// Wheel/pinch zoom anchored at the pointer. `pointer` is the pointer
    /// position measured from the viewport's top-left corner.
    pub fn gesture_zoom(&mut self, pointer: Vec2, factor: f32) {
        self.cancel_animation();
        self.last_origin = Some(TransformOrigin::UserGesture);

        let old_scale = self.transform.scale;
        let new_scale = (old_scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let world = (pointer - self.transform.translation()) / old_scale;
        let translation = pointer - world * new_scale;

        self.transform = CameraTransform {
            x: translation.x,
            y: translation.y,
            scale: new_scale,
        };
    }

    pub fn gesture_pan(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        self.cancel_animation();
        self.last_origin = Some(TransformOrigin::UserGesture);
        self.transform.x += delta.x;
        self.transform.y += delta.y;
    }

    /// Origin of the most recent transform change since the last call.
    /// This tag, not timing, is what selection logic reads to tell a user
    /// gesture from a programmatic flight.
    pub fn take_transform_origin(&mut self) -> Option<TransformOrigin> {
        self.last_origin.take()
    }

    /// Advances the in-flight animation to `now` and drains camera events
    /// accumulated since the previous frame.
    pub fn advance(&mut self, now: f64) -> Vec<CameraEvent> {
        if let Some(animation) = &self.animation {
            let t = ((now - animation.start) / animation.duration).clamp(0.0, 1.0) as f32;
            self.last_origin = Some(TransformOrigin::ProgrammaticAnimation);
            if t >= 1.0 {
                if let Some(animation) = self.animation.take() {
                    self.transform = animation.to;
                    self.events.push(CameraEvent::Completed(animation.id));
                }
            } else {
                self.transform =
                    CameraTransform::lerp(animation.from, animation.to, ease_in_out_cubic(t));
            }
        }

        std::mem::take(&mut self.events)
    }
}
