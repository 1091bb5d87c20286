//! Filter engine: rating bounds plus the dual-containment recompute pass.

use bevy::prelude::*;

use crate::catalog::{Company, InFilter};
use crate::geo::{ConicProjection, GeoPoint};
use crate::regions::Regions;

// =============================================================================
// Rating bounds
// =============================================================================

pub const RATING_DOMAIN_MIN: f64 = 0.0;
pub const RATING_DOMAIN_MAX: f64 = 5.0;

/// The accepted rating range. Invariant: `min_rating <= max_rating`.
///
/// Out-of-order input is rejected silently; callers render slider handles from
/// the accepted values, so a rejected handle snaps back on its own.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct FilterBounds {
    min_rating: f64,
    max_rating: f64,
}

impl Default for FilterBounds {
    fn default() -> Self {
        Self {
            min_rating: RATING_DOMAIN_MIN,
            max_rating: RATING_DOMAIN_MAX,
        }
    }
}

impl FilterBounds {
    pub fn min_rating(&self) -> f64 {
        self.min_rating
    }

    pub fn max_rating(&self) -> f64 {
        self.max_rating
    }

    /// Accept a new minimum unless it would pass the maximum. Returns whether
    /// the value was accepted.
    pub fn set_min(&mut self, value: f64) -> bool {
        if value > self.max_rating {
            return false;
        }
        self.min_rating = value;
        true
    }

    /// Accept a new maximum unless it would pass the minimum.
    pub fn set_max(&mut self, value: f64) -> bool {
        if value < self.min_rating {
            return false;
        }
        self.max_rating = value;
        true
    }
}

// =============================================================================
// Membership predicates
// =============================================================================

/// Unrated companies always pass; rated ones need `min <= rating <= max`.
pub fn rating_match(rating: Option<f64>, bounds: &FilterBounds) -> bool {
    match rating {
        Some(rating) => bounds.min_rating <= rating && rating <= bounds.max_rating,
        None => true,
    }
}

/// Strictly inside: a point exactly on the boundary is out.
pub fn inside_circle(pixel: Vec2, center: Vec2, radius: f32) -> bool {
    pixel.distance(center) < radius
}

/// Strictly inside both circles.
pub fn geo_match(pixel: Vec2, regions: &Regions, projection: &ConicProjection) -> bool {
    regions
        .iter()
        .all(|region| inside_circle(pixel, region.center_pixel(projection), region.radius))
}

/// Full membership test for one company, a pure function of current state.
pub fn company_in_filter(
    position: &GeoPoint,
    rating: Option<f64>,
    regions: &Regions,
    bounds: &FilterBounds,
    projection: &ConicProjection,
) -> bool {
    let pixel = projection.forward(position);
    geo_match(pixel, regions, projection) && rating_match(rating, bounds)
}

// =============================================================================
// Recompute pass
// =============================================================================

/// Companies currently in filter, for the HUD.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct FilterStats {
    pub included: usize,
    pub total: usize,
}

/// Full O(N) pass updating every company's derived flag. Runs every frame so
/// the flags never drift from region or bounds state; flags are only written
/// when they change so render systems can rely on change detection.
pub fn refresh_filter(
    regions: Res<Regions>,
    bounds: Res<FilterBounds>,
    projection: Res<ConicProjection>,
    mut stats: ResMut<FilterStats>,
    mut companies: Query<(&Company, &mut InFilter)>,
) {
    let mut included = 0;
    let mut total = 0;

    for (company, mut in_filter) in companies.iter_mut() {
        let next = company_in_filter(
            &company.position,
            company.average_rating,
            &regions,
            &bounds,
            &projection,
        );
        if in_filter.0 != next {
            in_filter.0 = next;
        }

        total += 1;
        if next {
            included += 1;
        }
    }

    if stats.included != included || stats.total != total {
        stats.included = included;
        stats.total = total;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CompanyRecord;
    use crate::regions::RegionId;
    use bevy::ecs::system::SystemState;

    const MAP_WIDTH: f64 = 1000.0;
    const MAP_HEIGHT: f64 = 1293.0;

    fn projection() -> ConicProjection {
        ConicProjection::bay_area(MAP_WIDTH, MAP_HEIGHT)
    }

    fn company_at(projection: &ConicProjection, pixel: Vec2, rating: Option<f64>) -> Company {
        let position = projection.inverse(pixel);
        Company::from_record(CompanyRecord {
            id: 0,
            name: "Test Co".to_string(),
            longitude: position.longitude,
            latitude: position.latitude,
            average_rating: rating,
        })
    }

    /// Pixel position halfway between the two default region centers; the
    /// default circles (250 px and 300 px around centers ~400 px apart)
    /// both contain it comfortably.
    fn midpoint(projection: &ConicProjection, regions: &Regions) -> Vec2 {
        let a = regions.a.center_pixel(projection);
        let b = regions.b.center_pixel(projection);
        a.lerp(b, 0.5)
    }

    #[test]
    fn bounds_default_to_full_domain() {
        let bounds = FilterBounds::default();
        assert_eq!(bounds.min_rating(), 0.0);
        assert_eq!(bounds.max_rating(), 5.0);
    }

    #[test]
    fn set_min_above_max_is_rejected() {
        let mut bounds = FilterBounds::default();
        assert!(bounds.set_max(2.0));
        assert!(!bounds.set_min(3.0));
        assert_eq!(bounds.min_rating(), 0.0);
        assert_eq!(bounds.max_rating(), 2.0);
    }

    #[test]
    fn set_max_below_min_is_rejected() {
        let mut bounds = FilterBounds::default();
        assert!(bounds.set_min(3.0));
        assert!(!bounds.set_max(2.0));
        assert_eq!(bounds.min_rating(), 3.0);
        assert_eq!(bounds.max_rating(), 5.0);
    }

    #[test]
    fn equal_bounds_are_accepted() {
        let mut bounds = FilterBounds::default();
        assert!(bounds.set_min(4.0));
        assert!(bounds.set_max(4.0));
        assert_eq!(bounds.min_rating(), 4.0);
        assert_eq!(bounds.max_rating(), 4.0);
    }

    #[test]
    fn rating_match_bounds_are_inclusive() {
        let mut bounds = FilterBounds::default();
        bounds.set_min(2.0);
        bounds.set_max(4.0);

        assert!(rating_match(Some(2.0), &bounds));
        assert!(rating_match(Some(4.0), &bounds));
        assert!(!rating_match(Some(1.99), &bounds));
        assert!(!rating_match(Some(4.01), &bounds));
    }

    #[test]
    fn unrated_passes_any_bounds() {
        let mut bounds = FilterBounds::default();
        assert!(rating_match(None, &bounds));

        bounds.set_min(5.0);
        bounds.set_max(5.0);
        assert!(rating_match(None, &bounds));
    }

    #[test]
    fn geo_match_requires_both_circles() {
        let projection = projection();
        let regions = Regions::default();

        let mid = midpoint(&projection, &regions);
        assert!(geo_match(mid, &regions, &projection));

        // Right on top of A's center but far from B.
        let a_center = regions.a.center_pixel(&projection);
        let away_from_b = a_center
            + (a_center - regions.b.center_pixel(&projection)).normalize() * 100.0;
        assert!(!geo_match(away_from_b, &regions, &projection));
    }

    #[test]
    fn boundary_point_is_excluded() {
        // Exact arithmetic: distance == radius is out, strictly less is in.
        assert!(!inside_circle(Vec2::new(250.0, 0.0), Vec2::ZERO, 250.0));
        assert!(inside_circle(Vec2::new(249.9, 0.0), Vec2::ZERO, 250.0));
        assert!(!inside_circle(Vec2::new(250.1, 0.0), Vec2::ZERO, 250.0));
    }

    #[test]
    fn zero_radius_contains_nothing() {
        assert!(!inside_circle(Vec2::ZERO, Vec2::ZERO, 0.0));
    }

    fn world_with_company(pixel_offset: f32, rating: Option<f64>) -> (World, Entity) {
        let projection = projection();
        let regions = Regions::default();
        let mid = midpoint(&projection, &regions) + Vec2::new(pixel_offset, 0.0);
        let company = company_at(&projection, mid, rating);

        let mut world = World::default();
        world.insert_resource(regions);
        world.insert_resource(FilterBounds::default());
        world.insert_resource(projection);
        world.insert_resource(FilterStats::default());
        let entity = world.spawn((company, InFilter::default())).id();
        (world, entity)
    }

    fn run_refresh(world: &mut World) {
        let mut system_state: SystemState<(
            Res<Regions>,
            Res<FilterBounds>,
            Res<ConicProjection>,
            ResMut<FilterStats>,
            Query<(&Company, &mut InFilter)>,
        )> = SystemState::new(world);
        let (regions, bounds, projection, stats, companies) = system_state.get_mut(world);
        refresh_filter(regions, bounds, projection, stats, companies);
        system_state.apply(world);
    }

    #[test]
    fn company_between_default_centers_is_in_filter() {
        let (mut world, entity) = world_with_company(0.0, Some(4.2));
        run_refresh(&mut world);

        assert!(world.get::<InFilter>(entity).unwrap().0);
        let stats = world.resource::<FilterStats>();
        assert_eq!(stats.included, 1);
        assert_eq!(stats.total, 1);
    }

    #[test]
    fn translating_region_a_away_drops_the_company() {
        let (mut world, entity) = world_with_company(0.0, Some(4.2));
        run_refresh(&mut world);
        assert!(world.get::<InFilter>(entity).unwrap().0);

        {
            let projection = world.resource::<ConicProjection>().clone();
            let mut regions = world.resource_mut::<Regions>();
            let far = regions.a.center_pixel(&projection) + Vec2::new(1000.0, 0.0);
            regions.translate(RegionId::A, far, &projection);
        }
        run_refresh(&mut world);

        assert!(!world.get::<InFilter>(entity).unwrap().0);
    }

    #[test]
    fn tightened_bounds_drop_rated_but_not_unrated_companies() {
        let (mut world, rated) = world_with_company(0.0, Some(4.2));
        let unrated = {
            let projection = world.resource::<ConicProjection>().clone();
            let regions = world.resource::<Regions>().clone();
            let mid = midpoint(&projection, &regions) + Vec2::new(5.0, 5.0);
            let company = company_at(&projection, mid, None);
            world.spawn((company, InFilter::default())).id()
        };

        {
            let mut bounds = world.resource_mut::<FilterBounds>();
            assert!(bounds.set_min(4.5));
        }
        run_refresh(&mut world);

        assert!(!world.get::<InFilter>(rated).unwrap().0);
        assert!(world.get::<InFilter>(unrated).unwrap().0);
    }

    #[test]
    fn refresh_is_idempotent_and_matches_direct_recompute() {
        let (mut world, entity) = world_with_company(40.0, Some(3.3));
        run_refresh(&mut world);
        let first = world.get::<InFilter>(entity).unwrap().0;

        run_refresh(&mut world);
        let second = world.get::<InFilter>(entity).unwrap().0;
        assert_eq!(first, second);

        let company = world.get::<Company>(entity).unwrap().clone();
        let expected = company_in_filter(
            &company.position,
            company.average_rating,
            world.resource::<Regions>(),
            world.resource::<FilterBounds>(),
            world.resource::<ConicProjection>(),
        );
        assert_eq!(second, expected);
    }
}
