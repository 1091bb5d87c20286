//! Rating range sliders in the control strip below the map.
//!
//! Handle positions are derived from the accepted [`FilterBounds`] values, so
//! a rejected slider value snaps back without any extra bookkeeping. Keyboard
//! nudges go through the same accept/reject path as handle drags.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::filter::{FilterBounds, RATING_DOMAIN_MAX, RATING_DOMAIN_MIN};
use crate::plugins::core::{AppState, EventLog, ExplorerConfig, ExplorerSet, InputBindings};

pub const SLIDER_TRACK_LEFT: f32 = 230.0;
pub const SLIDER_TRACK_RIGHT_MARGIN: f32 = 40.0;
/// Slider centerlines, offset from the top of the control strip.
pub const SLIDER_MIN_Y_OFFSET: f32 = 30.0;
pub const SLIDER_MAX_Y_OFFSET: f32 = 64.0;
pub const SLIDER_HANDLE_RADIUS: f32 = 8.0;

pub struct SlidersPlugin;

impl Plugin for SlidersPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SliderDrag>().add_systems(
            Update,
            (handle_slider_drag, handle_bounds_keys)
                .in_set(ExplorerSet::Input)
                .run_if(in_state(AppState::Exploring)),
        );
    }
}

// =============================================================================
// Geometry
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderKind {
    MinRating,
    MaxRating,
}

impl SliderKind {
    pub const ALL: [SliderKind; 2] = [SliderKind::MinRating, SliderKind::MaxRating];
}

/// Pixel layout of the two slider tracks, in map/window coordinates.
#[derive(Debug, Clone, Copy)]
pub struct SliderLayout {
    pub track_left: f32,
    pub track_right: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl SliderLayout {
    pub fn from_config(config: &ExplorerConfig) -> Self {
        let strip_top = config.map_height();
        Self {
            track_left: SLIDER_TRACK_LEFT,
            track_right: config.map_width - SLIDER_TRACK_RIGHT_MARGIN,
            min_y: strip_top + SLIDER_MIN_Y_OFFSET,
            max_y: strip_top + SLIDER_MAX_Y_OFFSET,
        }
    }

    pub fn value_to_x(&self, value: f64) -> f32 {
        let span = RATING_DOMAIN_MAX - RATING_DOMAIN_MIN;
        let fraction = ((value - RATING_DOMAIN_MIN) / span) as f32;
        self.track_left + fraction * (self.track_right - self.track_left)
    }

    /// Inverse of `value_to_x`, clamped to the rating domain and rounded to
    /// one decimal so labels stay tidy.
    pub fn x_to_value(&self, x: f32) -> f64 {
        let fraction = f64::from(
            ((x - self.track_left) / (self.track_right - self.track_left)).clamp(0.0, 1.0),
        );
        let raw = RATING_DOMAIN_MIN + fraction * (RATING_DOMAIN_MAX - RATING_DOMAIN_MIN);
        (raw * 10.0).round() / 10.0
    }

    pub fn handle_position(&self, kind: SliderKind, bounds: &FilterBounds) -> Vec2 {
        match kind {
            SliderKind::MinRating => Vec2::new(self.value_to_x(bounds.min_rating()), self.min_y),
            SliderKind::MaxRating => Vec2::new(self.value_to_x(bounds.max_rating()), self.max_y),
        }
    }

    /// Handle under the cursor, nearest first when both are in range.
    pub fn pick_handle(&self, cursor: Vec2, bounds: &FilterBounds) -> Option<SliderKind> {
        let mut best: Option<(SliderKind, f32)> = None;
        for kind in SliderKind::ALL {
            let distance = cursor.distance(self.handle_position(kind, bounds));
            if distance > SLIDER_HANDLE_RADIUS + 2.0 {
                continue;
            }
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((kind, distance));
            }
        }
        best.map(|(kind, _)| kind)
    }
}

// =============================================================================
// Input
// =============================================================================

/// Handle currently being dragged, if any.
#[derive(Resource, Debug, Default)]
pub struct SliderDrag(pub Option<SliderKind>);

/// Route a raw slider value through the bounds controller. Returns whether it
/// was accepted; rejection is silent.
pub fn apply_slider_value(kind: SliderKind, value: f64, bounds: &mut FilterBounds) -> bool {
    match kind {
        SliderKind::MinRating => bounds.set_min(value),
        SliderKind::MaxRating => bounds.set_max(value),
    }
}

fn handle_slider_drag(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<ExplorerConfig>,
    mut drag: ResMut<SliderDrag>,
    mut bounds: ResMut<FilterBounds>,
) {
    let cursor = windows
        .single()
        .ok()
        .and_then(|window| window.cursor_position());

    let cursor = match cursor {
        Some(cursor) => cursor,
        None => {
            drag.0 = None;
            return;
        }
    };

    let layout = SliderLayout::from_config(&config);

    if mouse_button.just_pressed(MouseButton::Left) && cursor.y > config.map_height() {
        drag.0 = layout.pick_handle(cursor, &bounds);
    } else if mouse_button.just_released(MouseButton::Left) {
        drag.0 = None;
    }

    if let Some(kind) = drag.0 {
        if mouse_button.pressed(MouseButton::Left) {
            let value = layout.x_to_value(cursor.x);
            apply_slider_value(kind, value, &mut bounds);
        }
    }
}

fn handle_bounds_keys(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    config: Res<ExplorerConfig>,
    mut bounds: ResMut<FilterBounds>,
    mut log: ResMut<EventLog>,
) {
    let step = config.slider_step;

    let nudge = if input.just_pressed(bindings.min_rating_down) {
        Some((
            SliderKind::MinRating,
            (bounds.min_rating() - step).max(RATING_DOMAIN_MIN),
        ))
    } else if input.just_pressed(bindings.min_rating_up) {
        Some((
            SliderKind::MinRating,
            (bounds.min_rating() + step).min(RATING_DOMAIN_MAX),
        ))
    } else if input.just_pressed(bindings.max_rating_down) {
        Some((
            SliderKind::MaxRating,
            (bounds.max_rating() - step).max(RATING_DOMAIN_MIN),
        ))
    } else if input.just_pressed(bindings.max_rating_up) {
        Some((
            SliderKind::MaxRating,
            (bounds.max_rating() + step).min(RATING_DOMAIN_MAX),
        ))
    } else {
        None
    };

    let Some((kind, value)) = nudge else {
        return;
    };

    if apply_slider_value(kind, value, &mut bounds) {
        let label = match kind {
            SliderKind::MinRating => format!("Minimum rating: {}", bounds.min_rating()),
            SliderKind::MaxRating => format!("Maximum rating: {}", bounds.max_rating()),
        };
        log.push(label);
    }
}

// =============================================================================
// Tests
// =============================================================================
