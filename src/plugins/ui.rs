//! HUD and panels: rating labels, filter count, event log, company tooltip,
//! and the F3 debug panel.

use bevy::prelude::*;
use bevy::ui::Node as UiNode;

use crate::catalog::Company;
use crate::compat::{SpriteBundle, Text2dBundle, TextBundle, TextStyle};
use crate::filter::{FilterBounds, FilterStats};
use crate::geo::ConicProjection;
use crate::plugins::core::{
    AppState, DebugWindow, EventLog, ExplorerConfig, ExplorerSet, CONTROL_STRIP_HEIGHT,
};
use crate::plugins::interaction::{HoveredCompany, RegionDrag};
use crate::plugins::render2d::window_to_world;
use crate::plugins::sliders::{SLIDER_MAX_Y_OFFSET, SLIDER_MIN_Y_OFFSET};
use crate::regions::{RegionId, Regions};

const HUD_TEXT_COLOR: Color = Color::srgb(0.9, 0.9, 0.95);
const HELP_TEXT_COLOR: Color = Color::srgb(0.35, 0.38, 0.42);
const TOOLTIP_BACKDROP: Color = Color::srgb(0.86, 0.86, 0.86);
const TOOLTIP_FONT_SIZE: f32 = 14.0;

pub struct UIPlugin;

impl Plugin for UIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::Exploring), setup_hud)
            .add_systems(
                Update,
                (
                    update_bounds_labels,
                    update_stats_text,
                    update_log_panel,
                    update_tooltip,
                    update_debug_panel,
                )
                    .in_set(ExplorerSet::Render)
                    .run_if(in_state(AppState::Exploring)),
            );
    }
}

// =============================================================================
// Components
// =============================================================================

#[derive(Component)]
struct MinRatingLabel;

#[derive(Component)]
struct MaxRatingLabel;

#[derive(Component)]
struct StatsText;

#[derive(Component)]
struct LogText;

#[derive(Component)]
struct DebugText;

#[derive(Component)]
struct Tooltip;

// =============================================================================
// Setup
// =============================================================================

fn setup_hud(mut commands: Commands, config: Res<ExplorerConfig>) {
    let strip_top = config.map_height();

    // Filter count (top-left, over the map).
    commands.spawn((
        StatsText,
        TextBundle::from_section(
            "In filter: --",
            TextStyle {
                font_size: 16.0,
                color: Color::srgb(0.1, 0.1, 0.12),
                ..Default::default()
            },
        )
        .with_node(UiNode {
            position_type: PositionType::Absolute,
            left: Val::Px(14.0),
            top: Val::Px(10.0),
            ..default()
        }),
    ));

    commands.spawn(
        TextBundle::from_section(
            "Drag a circle to move it, its border to resize | R reset | F3 debug",
            TextStyle {
                font_size: 12.0,
                color: HELP_TEXT_COLOR,
                ..Default::default()
            },
        )
        .with_node(UiNode {
            position_type: PositionType::Absolute,
            left: Val::Px(14.0),
            top: Val::Px(32.0),
            ..default()
        }),
    );

    // Slider labels in the control strip.
    commands.spawn((
        MinRatingLabel,
        TextBundle::from_section(
            "Minimum Rating: 0",
            TextStyle {
                font_size: 15.0,
                color: HUD_TEXT_COLOR,
                ..Default::default()
            },
        )
        .with_node(UiNode {
            position_type: PositionType::Absolute,
            left: Val::Px(14.0),
            top: Val::Px(strip_top + SLIDER_MIN_Y_OFFSET - 9.0),
            ..default()
        }),
    ));

    commands.spawn((
        MaxRatingLabel,
        TextBundle::from_section(
            "Maximum Rating: 5",
            TextStyle {
                font_size: 15.0,
                color: HUD_TEXT_COLOR,
                ..Default::default()
            },
        )
        .with_node(UiNode {
            position_type: PositionType::Absolute,
            left: Val::Px(14.0),
            top: Val::Px(strip_top + SLIDER_MAX_Y_OFFSET - 9.0),
            ..default()
        }),
    ));

    // Event log (bottom-left, over the map).
    commands.spawn((
        LogText,
        TextBundle::from_section(
            "",
            TextStyle {
                font_size: 12.0,
                color: HELP_TEXT_COLOR,
                ..Default::default()
            },
        )
        .with_node(UiNode {
            position_type: PositionType::Absolute,
            left: Val::Px(14.0),
            bottom: Val::Px(CONTROL_STRIP_HEIGHT + 14.0),
            ..default()
        }),
    ));

    // Debug panel (top-right, hidden until F3).
    let mut debug_text = TextBundle::from_section(
        "",
        TextStyle {
            font_size: 13.0,
            color: Color::srgb(0.2, 0.7, 0.3),
            ..Default::default()
        },
    )
    .with_node(UiNode {
        position_type: PositionType::Absolute,
        right: Val::Px(14.0),
        top: Val::Px(10.0),
        ..default()
    });
    debug_text.visibility = Visibility::Hidden;
    commands.spawn((DebugText, debug_text));
}

// =============================================================================
// Update systems
// =============================================================================

fn update_bounds_labels(
    bounds: Res<FilterBounds>,
    mut min_labels: Query<&mut Text, (With<MinRatingLabel>, Without<MaxRatingLabel>)>,
    mut max_labels: Query<&mut Text, (With<MaxRatingLabel>, Without<MinRatingLabel>)>,
) {
    if !bounds.is_changed() {
        return;
    }

    for mut text in min_labels.iter_mut() {
        *text = Text::from(format!("Minimum Rating: {}", bounds.min_rating()));
    }
    for mut text in max_labels.iter_mut() {
        *text = Text::from(format!("Maximum Rating: {}", bounds.max_rating()));
    }
}

fn update_stats_text(
    stats: Res<FilterStats>,
    mut texts: Query<&mut Text, With<StatsText>>,
) {
    if !stats.is_changed() {
        return;
    }

    for mut text in texts.iter_mut() {
        *text = Text::from(format!("In filter: {} / {}", stats.included, stats.total));
    }
}

fn update_log_panel(log: Res<EventLog>, mut texts: Query<&mut Text, With<LogText>>) {
    if !log.is_changed() {
        return;
    }

    let joined = log.entries().join("\n");
    for mut text in texts.iter_mut() {
        *text = Text::from(joined.clone());
    }
}

fn update_debug_panel(
    debug_window: Res<DebugWindow>,
    regions: Res<Regions>,
    bounds: Res<FilterBounds>,
    drag: Res<RegionDrag>,
    projection: Res<ConicProjection>,
    mut panels: Query<(&mut Text, &mut Visibility), With<DebugText>>,
) {
    for (mut text, mut visibility) in panels.iter_mut() {
        if !debug_window.open {
            *visibility = Visibility::Hidden;
            continue;
        }
        *visibility = Visibility::Visible;

        let mut lines = Vec::new();
        for id in RegionId::ALL {
            let region = regions.get(id);
            let pixel = region.center_pixel(&projection);
            lines.push(format!(
                "Region {}: ({:.4}, {:.4}) px ({:.0}, {:.0}) r {:.0} [{:?}]",
                id.label(),
                region.center.longitude,
                region.center.latitude,
                pixel.x,
                pixel.y,
                region.radius,
                drag.mode(id),
            ));
        }
        lines.push(format!(
            "Bounds: [{}, {}]",
            bounds.min_rating(),
            bounds.max_rating()
        ));
        *text = Text::from(lines.join("\n"));
    }
}

// =============================================================================
// Tooltip
// =============================================================================

/// Rebuild the tooltip whenever the hovered company changes. Two text lines
/// over a plain backdrop, offset from the company's projected position.
fn update_tooltip(
    mut commands: Commands,
    hovered: Res<HoveredCompany>,
    config: Res<ExplorerConfig>,
    projection: Res<ConicProjection>,
    companies: Query<&Company>,
    existing: Query<Entity, With<Tooltip>>,
) {
    if !hovered.is_changed() {
        return;
    }

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let Some(company) = hovered.0.and_then(|entity| companies.get(entity).ok()) else {
        return;
    };

    let name_line = company.name.clone();
    let rating_line = format!("Average Rating: {}", company.rating_label());
    let size = tooltip_size(&name_line, &rating_line);

    let window = config.window_size();
    let pixel = projection.forward(&company.position)
        + Vec2::new(config.tooltip_offset, -config.tooltip_offset);
    let anchor = window_to_world(pixel, window);
    // Grow up and to the right from the anchor point.
    let center = anchor + Vec2::new(size.x / 2.0, size.y / 2.0);

    commands.spawn((
        Tooltip,
        SpriteBundle {
            sprite: Sprite {
                color: TOOLTIP_BACKDROP,
                custom_size: Some(size),
                ..default()
            },
            transform: Transform::from_xyz(center.x, center.y, 9.0),
            ..default()
        },
    ));
    commands.spawn((
        Tooltip,
        Text2dBundle {
            transform: Transform::from_xyz(center.x, center.y, 10.0),
            ..Text2dBundle::from_section(
                format!("{}\n{}", name_line, rating_line),
                TextStyle {
                    font_size: TOOLTIP_FONT_SIZE,
                    color: Color::BLACK,
                    ..Default::default()
                },
            )
        },
    ));
}

/// Rough text box size; there is no layout pass to measure against.
fn tooltip_size(name_line: &str, rating_line: &str) -> Vec2 {
    let widest = name_line.chars().count().max(rating_line.chars().count()) as f32;
    Vec2::new(
        widest * TOOLTIP_FONT_SIZE * 0.55 + 12.0,
        TOOLTIP_FONT_SIZE * 2.0 + 14.0,
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tooltip_size_grows_with_the_longer_line() {
        let small = tooltip_size("Al's", "Average Rating: N/A");
        let large = tooltip_size("A Much Longer Company Name Incorporated", "Average Rating: 4.5");
        assert!(large.x > small.x);
        assert_eq!(small.y, large.y);
    }
}
