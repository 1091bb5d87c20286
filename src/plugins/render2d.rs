//! 2D rendering: camera, base map, company dots, and region visuals.
//!
//! World space puts the window center at the origin with y up; map-pixel
//! space has its origin at the window's top-left with y down. All domain
//! geometry stays in map pixels and converts at the edge.

use bevy::prelude::*;
use std::path::Path;

use crate::catalog::{Company, InFilter};
use crate::compat::{Camera2dBundle, SpriteBundle, Text2dBundle, TextStyle};
use crate::filter::FilterBounds;
use crate::geo::ConicProjection;
use crate::plugins::core::{AppState, ExplorerConfig, ExplorerSet};
use crate::plugins::interaction::{HoveredCompany, HoveredRegionBorder};
use crate::plugins::sliders::{SliderKind, SliderLayout, SLIDER_HANDLE_RADIUS};
use crate::regions::{RegionId, Regions};

// =============================================================================
// Constants
// =============================================================================

pub const COMPANY_DOT_SIZE: f32 = 4.0;
const REGION_CENTER_DOT_RADIUS: f32 = 3.0;

pub const COLOR_IN_FILTER: Color = Color::BLACK;
pub const COLOR_OUT_OF_FILTER: Color = Color::srgb(0.75, 0.75, 0.75);
pub const COLOR_HOVERED: Color = Color::srgb(0.9, 0.1, 0.1);
pub const COLOR_BORDER_RING: Color = Color::srgb(0.9, 0.1, 0.1);

const BACKDROP_COLOR: Color = Color::srgb(0.93, 0.93, 0.9);
const STRIP_COLOR: Color = Color::srgb(0.16, 0.17, 0.2);
const TRACK_COLOR: Color = Color::srgb(0.55, 0.57, 0.62);

const Z_MAP: f32 = 0.0;
const Z_REGION_DISC: f32 = 1.0;
const Z_COMPANY_DOT: f32 = 2.0;
const Z_REGION_CENTER: f32 = 3.0;
const Z_REGION_LABEL: f32 = 4.0;

pub struct Render2DPlugin;

impl Plugin for Render2DPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera)
            .add_systems(
                OnEnter(AppState::Exploring),
                (setup_map_backdrop, setup_region_visuals),
            )
            .add_systems(
                Update,
                (
                    attach_company_dots,
                    sync_company_colors,
                    sync_region_visuals,
                    draw_region_rings,
                    draw_slider_controls,
                )
                    .in_set(ExplorerSet::Render)
                    .run_if(in_state(AppState::Exploring)),
            );
    }
}

// =============================================================================
// Coordinate conversion
// =============================================================================

/// Window/map-pixel position (origin top-left, y down) to world position
/// (origin at window center, y up). The camera sits at the origin with
/// scale 1, so this is the whole transform.
pub fn window_to_world(pixel: Vec2, window_size: Vec2) -> Vec2 {
    Vec2::new(
        pixel.x - window_size.x / 2.0,
        window_size.y / 2.0 - pixel.y,
    )
}

// =============================================================================
// Components
// =============================================================================

#[derive(Component)]
pub struct RegionDisc(pub RegionId);

#[derive(Component)]
pub struct RegionCenterDot(pub RegionId);

#[derive(Component)]
pub struct RegionLabel(pub RegionId);

#[derive(Component)]
struct MapBackdrop;

// =============================================================================
// Setup systems
// =============================================================================

fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2dBundle::default(), Name::new("MainCamera")));
    info!("Camera spawned at window center");
}

fn setup_map_backdrop(
    mut commands: Commands,
    config: Res<ExplorerConfig>,
    asset_server: Res<AssetServer>,
) {
    let window = config.window_size();
    let map_size = Vec2::new(config.map_width, config.map_height());
    let map_center = window_to_world(map_size / 2.0, window);

    // Plain backdrop so the app still reads without the map image.
    commands.spawn((
        MapBackdrop,
        SpriteBundle {
            sprite: Sprite {
                color: BACKDROP_COLOR,
                custom_size: Some(map_size),
                ..default()
            },
            transform: Transform::from_xyz(map_center.x, map_center.y, Z_MAP),
            ..default()
        },
    ));

    // Control strip background under the map.
    let strip_size = Vec2::new(window.x, window.y - map_size.y);
    let strip_center = window_to_world(
        Vec2::new(window.x / 2.0, map_size.y + strip_size.y / 2.0),
        window,
    );
    commands.spawn(SpriteBundle {
        sprite: Sprite {
            color: STRIP_COLOR,
            custom_size: Some(strip_size),
            ..default()
        },
        transform: Transform::from_xyz(strip_center.x, strip_center.y, Z_MAP),
        ..default()
    });

    let image_on_disk = Path::new("assets").join(&config.map_image_path);
    if !image_on_disk.exists() {
        info!("Base map not found at {}", image_on_disk.display());
        return;
    }

    commands.spawn((
        MapBackdrop,
        SpriteBundle {
            sprite: Sprite {
                image: asset_server.load(config.map_image_path.clone()),
                custom_size: Some(map_size),
                ..default()
            },
            transform: Transform::from_xyz(map_center.x, map_center.y, Z_MAP + 0.1),
            ..default()
        },
    ));
    info!("Base map loaded from {}", image_on_disk.display());
}

fn setup_region_visuals(
    mut commands: Commands,
    config: Res<ExplorerConfig>,
    projection: Res<ConicProjection>,
    regions: Res<Regions>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let window = config.window_size();
    let disc_mesh = meshes.add(Circle::new(1.0));

    for region in regions.iter() {
        let center = window_to_world(region.center_pixel(&projection), window);

        // Translucent interior disc; resizing only rescales the transform.
        commands.spawn((
            RegionDisc(region.id),
            Mesh2d(disc_mesh.clone()),
            MeshMaterial2d(materials.add(region.color.with_alpha(0.25))),
            Transform::from_xyz(center.x, center.y, Z_REGION_DISC)
                .with_scale(Vec3::splat(region.radius.max(f32::EPSILON))),
        ));

        commands.spawn((
            RegionCenterDot(region.id),
            Mesh2d(disc_mesh.clone()),
            MeshMaterial2d(materials.add(region.color)),
            Transform::from_xyz(center.x, center.y, Z_REGION_CENTER)
                .with_scale(Vec3::splat(REGION_CENTER_DOT_RADIUS)),
        ));

        commands.spawn((
            RegionLabel(region.id),
            Text2dBundle::from_section(
                region.id.label(),
                TextStyle {
                    font_size: 20.0,
                    color: region.color,
                    ..Default::default()
                },
            ),
        ));
    }
}

// =============================================================================
// Sync systems
// =============================================================================

/// Give every freshly loaded company a dot sprite at its projected position.
fn attach_company_dots(
    mut commands: Commands,
    config: Res<ExplorerConfig>,
    projection: Res<ConicProjection>,
    companies: Query<(Entity, &Company), Without<Sprite>>,
) {
    let window = config.window_size();

    for (entity, company) in companies.iter() {
        let position = window_to_world(projection.forward(&company.position), window);
        commands.entity(entity).insert(SpriteBundle {
            sprite: Sprite {
                color: COLOR_OUT_OF_FILTER,
                custom_size: Some(Vec2::splat(COMPANY_DOT_SIZE)),
                ..default()
            },
            transform: Transform::from_xyz(position.x, position.y, Z_COMPANY_DOT),
            ..default()
        });
    }
}

/// Company fill reflects filter state, except while hovered (red highlight).
/// On hover end the filter-computed fill comes right back.
fn sync_company_colors(
    hovered: Res<HoveredCompany>,
    mut companies: Query<(Entity, &InFilter, &mut Sprite), With<Company>>,
) {
    for (entity, in_filter, mut sprite) in companies.iter_mut() {
        let color = if hovered.0 == Some(entity) {
            COLOR_HOVERED
        } else if in_filter.0 {
            COLOR_IN_FILTER
        } else {
            COLOR_OUT_OF_FILTER
        };
        if sprite.color != color {
            sprite.color = color;
        }
    }
}

fn sync_region_visuals(
    config: Res<ExplorerConfig>,
    projection: Res<ConicProjection>,
    regions: Res<Regions>,
    mut discs: Query<
        (&RegionDisc, &mut Transform),
        (Without<RegionCenterDot>, Without<RegionLabel>),
    >,
    mut centers: Query<
        (&RegionCenterDot, &mut Transform),
        (Without<RegionDisc>, Without<RegionLabel>),
    >,
    mut labels: Query<
        (&RegionLabel, &mut Transform),
        (Without<RegionDisc>, Without<RegionCenterDot>),
    >,
) {
    let window = config.window_size();

    for (disc, mut transform) in discs.iter_mut() {
        let region = regions.get(disc.0);
        let center = window_to_world(region.center_pixel(&projection), window);
        transform.translation.x = center.x;
        transform.translation.y = center.y;
        transform.scale = Vec3::splat(region.radius.max(f32::EPSILON));
    }

    for (dot, mut transform) in centers.iter_mut() {
        let region = regions.get(dot.0);
        let center = window_to_world(region.center_pixel(&projection), window);
        transform.translation.x = center.x;
        transform.translation.y = center.y;
    }

    for (label, mut transform) in labels.iter_mut() {
        let region = regions.get(label.0);
        let center = window_to_world(region.center_pixel(&projection), window);
        transform.translation.x = center.x + config.label_offset;
        transform.translation.y = center.y + config.label_offset;
        transform.translation.z = Z_REGION_LABEL;
    }
}

/// Border rings drawn fresh each frame; hover raises the stroke prominence.
fn draw_region_rings(
    mut gizmos: Gizmos,
    config: Res<ExplorerConfig>,
    projection: Res<ConicProjection>,
    regions: Res<Regions>,
    hovered: Res<HoveredRegionBorder>,
) {
    let window = config.window_size();
    let thickness = config.region_border_thickness;

    for region in regions.iter() {
        let center = window_to_world(region.center_pixel(&projection), window);
        let alpha = if hovered.0 == Some(region.id) {
            0.75
        } else {
            0.25
        };
        let color = COLOR_BORDER_RING.with_alpha(alpha);

        // A few concentric circles stand in for stroke width.
        let mut offset = 0.0;
        while offset <= thickness {
            gizmos.circle_2d(center, region.radius + offset, color);
            offset += 2.0;
        }
    }
}

fn draw_slider_controls(
    mut gizmos: Gizmos,
    config: Res<ExplorerConfig>,
    bounds: Res<FilterBounds>,
) {
    let window = config.window_size();
    let layout = SliderLayout::from_config(&config);

    for (y, kind) in [
        (layout.min_y, SliderKind::MinRating),
        (layout.max_y, SliderKind::MaxRating),
    ] {
        let start = window_to_world(Vec2::new(layout.track_left, y), window);
        let end = window_to_world(Vec2::new(layout.track_right, y), window);
        gizmos.line_2d(start, end, TRACK_COLOR);

        let handle = window_to_world(layout.handle_position(kind, &bounds), window);
        for radius in [SLIDER_HANDLE_RADIUS, SLIDER_HANDLE_RADIUS - 2.0] {
            gizmos.circle_2d(handle, radius, Color::WHITE);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_to_world_centers_and_flips_y() {
        let window = Vec2::new(1000.0, 1383.0);

        let top_left = window_to_world(Vec2::ZERO, window);
        assert_eq!(top_left, Vec2::new(-500.0, 691.5));

        let center = window_to_world(window / 2.0, window);
        assert_eq!(center, Vec2::ZERO);

        let bottom_right = window_to_world(window, window);
        assert_eq!(bottom_right, Vec2::new(500.0, -691.5));
    }

    #[test]
    fn window_to_world_preserves_distances() {
        let window = Vec2::new(1000.0, 1383.0);
        let a = Vec2::new(120.0, 300.0);
        let b = Vec2::new(420.0, 700.0);

        let distance_before = a.distance(b);
        let distance_after = window_to_world(a, window).distance(window_to_world(b, window));
        assert!((distance_before - distance_after).abs() < 1e-3);
    }
}
