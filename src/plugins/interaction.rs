//! Pointer interaction: region drag gestures and hover tracking.
//!
//! Each region runs its own little state machine (Idle / Resizing /
//! Translating). A press on a region's border ring starts a resize, a press
//! on its interior starts a translate, and release returns it to Idle. Region
//! B draws on top of A, so B is hit-tested first.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::catalog::Company;
use crate::filter::FilterBounds;
use crate::geo::ConicProjection;
use crate::plugins::core::{AppState, EventLog, ExplorerConfig, ExplorerSet, InputBindings};
use crate::regions::{RegionId, Regions};

/// Pick distance for company dots, in pixels.
pub const COMPANY_PICK_RADIUS: f32 = 5.0;

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RegionDrag>()
            .init_resource::<HoveredRegionBorder>()
            .init_resource::<HoveredCompany>()
            .add_systems(
                Update,
                (handle_region_drag, handle_hover, handle_region_reset)
                    .in_set(ExplorerSet::Input)
                    .run_if(in_state(AppState::Exploring)),
            );
    }
}

// =============================================================================
// Drag state machine
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    #[default]
    Idle,
    Resizing,
    Translating,
}

/// Drag state for both regions. The pointer is a single resource, so at most
/// one region is ever active.
#[derive(Resource, Debug, Default)]
pub struct RegionDrag {
    a: DragMode,
    b: DragMode,
}

impl RegionDrag {
    pub fn mode(&self, id: RegionId) -> DragMode {
        match id {
            RegionId::A => self.a,
            RegionId::B => self.b,
        }
    }

    fn set_mode(&mut self, id: RegionId, mode: DragMode) {
        match id {
            RegionId::A => self.a = mode,
            RegionId::B => self.b = mode,
        }
    }

    /// The region currently being dragged, if any.
    pub fn active(&self) -> Option<(RegionId, DragMode)> {
        for id in RegionId::ALL {
            let mode = self.mode(id);
            if mode != DragMode::Idle {
                return Some((id, mode));
            }
        }
        None
    }

    pub fn release_all(&mut self) {
        self.a = DragMode::Idle;
        self.b = DragMode::Idle;
    }
}

/// A single pointer event, already in map-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    Press(Vec2),
    Move(Vec2),
    Release,
}

/// Which part of a region a pointer position lands on. The interior is
/// strictly inside the radius; the border ring spans the border thickness
/// just outside it.
pub fn hit_zone(pointer: Vec2, center: Vec2, radius: f32, border_thickness: f32) -> Option<DragMode> {
    let distance = pointer.distance(center);
    if distance < radius {
        Some(DragMode::Translating)
    } else if distance <= radius + border_thickness {
        Some(DragMode::Resizing)
    } else {
        None
    }
}

/// Hit-test both regions, topmost (B) first.
pub fn pick_region(
    pointer: Vec2,
    regions: &Regions,
    projection: &ConicProjection,
    border_thickness: f32,
) -> Option<(RegionId, DragMode)> {
    for id in [RegionId::B, RegionId::A] {
        let region = regions.get(id);
        let center = region.center_pixel(projection);
        if let Some(mode) = hit_zone(pointer, center, region.radius, border_thickness) {
            return Some((id, mode));
        }
    }
    None
}

/// Advance the drag machines by one pointer event, mutating region state as
/// the gesture demands. Returns a log entry for gesture starts.
pub fn apply_drag_event(
    event: DragEvent,
    drag: &mut RegionDrag,
    regions: &mut Regions,
    projection: &ConicProjection,
    border_thickness: f32,
) -> Option<String> {
    match event {
        DragEvent::Press(pointer) => {
            if drag.active().is_some() {
                return None;
            }
            let (id, mode) = pick_region(pointer, regions, projection, border_thickness)?;
            drag.set_mode(id, mode);
            let verb = match mode {
                DragMode::Resizing => "resize",
                DragMode::Translating => "move",
                DragMode::Idle => return None,
            };
            Some(format!("Region {}: {} started", id.label(), verb))
        }
        DragEvent::Move(pointer) => {
            let (id, mode) = drag.active()?;
            match mode {
                DragMode::Resizing => regions.resize(id, pointer, projection),
                DragMode::Translating => regions.translate(id, pointer, projection),
                DragMode::Idle => {}
            }
            None
        }
        DragEvent::Release => {
            drag.release_all();
            None
        }
    }
}

fn handle_region_drag(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<ExplorerConfig>,
    projection: Res<ConicProjection>,
    mut drag: ResMut<RegionDrag>,
    mut regions: ResMut<Regions>,
    mut log: ResMut<EventLog>,
) {
    let window = match windows.single() {
        Ok(window) => window,
        Err(_) => return,
    };

    let cursor = match window.cursor_position() {
        Some(cursor) => cursor,
        None => {
            // Cursor left the window: end any gesture in place.
            if drag.active().is_some() {
                apply_drag_event(
                    DragEvent::Release,
                    &mut drag,
                    &mut regions,
                    &projection,
                    config.region_border_thickness,
                );
            }
            return;
        }
    };

    let event = if mouse_button.just_pressed(MouseButton::Left) {
        // Presses in the control strip belong to the sliders.
        if cursor.y > config.map_height() {
            return;
        }
        DragEvent::Press(cursor)
    } else if mouse_button.just_released(MouseButton::Left) {
        DragEvent::Release
    } else if mouse_button.pressed(MouseButton::Left) && drag.active().is_some() {
        DragEvent::Move(cursor)
    } else {
        return;
    };

    if let Some(entry) = apply_drag_event(
        event,
        &mut drag,
        &mut regions,
        &projection,
        config.region_border_thickness,
    ) {
        log.push(entry);
    }
}

// =============================================================================
// Hover state
// =============================================================================

/// Region whose border ring is under the pointer, for stroke emphasis.
#[derive(Resource, Debug, Default)]
pub struct HoveredRegionBorder(pub Option<RegionId>);

/// Company dot under the pointer, for highlight and tooltip.
#[derive(Resource, Debug, Default)]
pub struct HoveredCompany(pub Option<Entity>);

/// Nearest company within pick range of the pointer.
pub fn pick_company<'a>(
    pointer: Vec2,
    companies: impl Iterator<Item = (Entity, &'a Company)>,
    projection: &ConicProjection,
    pick_radius: f32,
) -> Option<Entity> {
    let mut best: Option<(Entity, f32)> = None;
    for (entity, company) in companies {
        let distance = pointer.distance(projection.forward(&company.position));
        if distance > pick_radius {
            continue;
        }
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((entity, distance));
        }
    }
    best.map(|(entity, _)| entity)
}

fn handle_hover(
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<ExplorerConfig>,
    projection: Res<ConicProjection>,
    regions: Res<Regions>,
    drag: Res<RegionDrag>,
    companies: Query<(Entity, &Company)>,
    mut hovered_border: ResMut<HoveredRegionBorder>,
    mut hovered_company: ResMut<HoveredCompany>,
) {
    let cursor = windows
        .single()
        .ok()
        .and_then(|window| window.cursor_position());

    let cursor = match cursor {
        Some(cursor) if drag.active().is_none() => cursor,
        // No pointer, or mid-gesture: clear hover state.
        _ => {
            set_hovered_border(&mut hovered_border, None);
            set_hovered_company(&mut hovered_company, None);
            return;
        }
    };

    let border = RegionId::ALL
        .into_iter()
        .rev() // B on top
        .find(|id| {
            let region = regions.get(*id);
            let center = region.center_pixel(&projection);
            hit_zone(cursor, center, region.radius, config.region_border_thickness)
                == Some(DragMode::Resizing)
        });
    set_hovered_border(&mut hovered_border, border);

    let company = pick_company(cursor, companies.iter(), &projection, COMPANY_PICK_RADIUS);
    set_hovered_company(&mut hovered_company, company);
}

fn set_hovered_border(hovered: &mut ResMut<HoveredRegionBorder>, value: Option<RegionId>) {
    if hovered.0 != value {
        hovered.0 = value;
    }
}

fn set_hovered_company(hovered: &mut ResMut<HoveredCompany>, value: Option<Entity>) {
    if hovered.0 != value {
        hovered.0 = value;
    }
}

// =============================================================================
// Reset
// =============================================================================

fn handle_region_reset(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut regions: ResMut<Regions>,
    mut bounds: ResMut<FilterBounds>,
    mut drag: ResMut<RegionDrag>,
    mut log: ResMut<EventLog>,
) {
    if !input.just_pressed(bindings.reset_regions) {
        return;
    }

    *regions = Regions::default();
    *bounds = FilterBounds::default();
    drag.release_all();
    log.push("Regions and bounds reset".to_string());
    info!("Regions and bounds reset to defaults");
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CompanyRecord;

    fn projection() -> ConicProjection {
        ConicProjection::bay_area(1000.0, 1293.0)
    }

    #[test]
    fn hit_zone_interior_border_and_outside() {
        let center = Vec2::ZERO;
        assert_eq!(
            hit_zone(Vec2::new(100.0, 0.0), center, 250.0, 6.0),
            Some(DragMode::Translating)
        );
        assert_eq!(
            hit_zone(Vec2::new(253.0, 0.0), center, 250.0, 6.0),
            Some(DragMode::Resizing)
        );
        assert_eq!(hit_zone(Vec2::new(257.0, 0.0), center, 250.0, 6.0), None);
        // Exactly on the radius is the ring, not the interior.
        assert_eq!(
            hit_zone(Vec2::new(250.0, 0.0), center, 250.0, 6.0),
            Some(DragMode::Resizing)
        );
    }

    #[test]
    fn pick_region_prefers_b_when_overlapping() {
        let projection = projection();
        let mut regions = Regions::default();

        // Grow both regions so the default centers overlap generously.
        regions.a.radius = 600.0;
        regions.b.radius = 600.0;

        let a_center = regions.a.center_pixel(&projection);
        let picked = pick_region(a_center, &regions, &projection, 6.0);
        assert_eq!(picked, Some((RegionId::B, DragMode::Translating)));
    }

    #[test]
    fn press_on_border_starts_resizing() {
        let projection = projection();
        let mut regions = Regions::default();
        let mut drag = RegionDrag::default();

        let center = regions.a.center_pixel(&projection);
        let on_ring = center + Vec2::new(regions.a.radius + 3.0, 0.0);

        let entry = apply_drag_event(
            DragEvent::Press(on_ring),
            &mut drag,
            &mut regions,
            &projection,
            6.0,
        );
        assert_eq!(drag.mode(RegionId::A), DragMode::Resizing);
        assert_eq!(drag.mode(RegionId::B), DragMode::Idle);
        assert!(entry.unwrap().contains("resize"));
    }

    #[test]
    fn resize_drag_follows_the_pointer_distance() {
        let projection = projection();
        let mut regions = Regions::default();
        let mut drag = RegionDrag::default();

        let center = regions.a.center_pixel(&projection);
        let on_ring = center + Vec2::new(regions.a.radius + 1.0, 0.0);
        apply_drag_event(
            DragEvent::Press(on_ring),
            &mut drag,
            &mut regions,
            &projection,
            6.0,
        );

        apply_drag_event(
            DragEvent::Move(center + Vec2::new(120.0, 0.0)),
            &mut drag,
            &mut regions,
            &projection,
            6.0,
        );
        assert!((regions.a.radius - 120.0).abs() < 1e-3);

        apply_drag_event(
            DragEvent::Release,
            &mut drag,
            &mut regions,
            &projection,
            6.0,
        );
        assert_eq!(drag.active(), None);
    }

    #[test]
    fn translate_drag_snaps_center_to_pointer() {
        let projection = projection();
        let mut regions = Regions::default();
        let mut drag = RegionDrag::default();

        // Press somewhere inside B's interior, off-center.
        let b_center = regions.b.center_pixel(&projection);
        let press = b_center + Vec2::new(50.0, 20.0);
        apply_drag_event(
            DragEvent::Press(press),
            &mut drag,
            &mut regions,
            &projection,
            6.0,
        );
        assert_eq!(drag.mode(RegionId::B), DragMode::Translating);

        let target = Vec2::new(700.0, 900.0);
        apply_drag_event(
            DragEvent::Move(target),
            &mut drag,
            &mut regions,
            &projection,
            6.0,
        );

        // Snap-to-pointer: the center lands exactly under the pointer, with
        // no offset from where the press happened.
        let new_center = regions.b.center_pixel(&projection);
        assert!(new_center.distance(target) < 0.1);
    }

    #[test]
    fn second_press_does_not_steal_an_active_drag() {
        let projection = projection();
        let mut regions = Regions::default();
        let mut drag = RegionDrag::default();

        let b_center = regions.b.center_pixel(&projection);
        apply_drag_event(
            DragEvent::Press(b_center),
            &mut drag,
            &mut regions,
            &projection,
            6.0,
        );

        let a_center = regions.a.center_pixel(&projection);
        let entry = apply_drag_event(
            DragEvent::Press(a_center),
            &mut drag,
            &mut regions,
            &projection,
            6.0,
        );
        assert!(entry.is_none());
        assert_eq!(drag.active(), Some((RegionId::B, DragMode::Translating)));
    }

    #[test]
    fn press_outside_both_regions_stays_idle() {
        let projection = projection();
        let mut regions = Regions::default();
        let mut drag = RegionDrag::default();

        let entry = apply_drag_event(
            DragEvent::Press(Vec2::new(5.0, 5.0)),
            &mut drag,
            &mut regions,
            &projection,
            6.0,
        );
        assert!(entry.is_none());
        assert_eq!(drag.active(), None);
    }

    #[test]
    fn pick_company_chooses_nearest_within_range() {
        let projection = projection();
        let mut world = World::default();

        let record = |id: u32, pixel: Vec2| {
            let position = projection.inverse(pixel);
            Company::from_record(CompanyRecord {
                id,
                name: format!("Company {}", id),
                longitude: position.longitude,
                latitude: position.latitude,
                average_rating: None,
            })
        };

        let near = world.spawn(record(0, Vec2::new(500.0, 500.0))).id();
        let nearer = world.spawn(record(1, Vec2::new(502.0, 500.0))).id();
        let far = world.spawn(record(2, Vec2::new(600.0, 500.0))).id();

        let mut companies = world.query::<(Entity, &Company)>();
        let picked = pick_company(
            Vec2::new(503.0, 500.0),
            companies.iter(&world),
            &projection,
            COMPANY_PICK_RADIUS,
        );

        assert_eq!(picked, Some(nearer));
        assert_ne!(picked, Some(near));
        assert_ne!(picked, Some(far));
    }
}
