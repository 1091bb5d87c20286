//! Catchment regions: exactly two named, draggable, resizable circles.

use bevy::prelude::*;

use crate::geo::{ConicProjection, GeoPoint};

// =============================================================================
// Region identity
// =============================================================================

/// The two fixed region identifiers. No third region ever exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionId {
    A,
    B,
}

impl RegionId {
    pub fn label(self) -> &'static str {
        match self {
            RegionId::A => "A",
            RegionId::B => "B",
        }
    }

    pub const ALL: [RegionId; 2] = [RegionId::A, RegionId::B];
}

// =============================================================================
// Region state
// =============================================================================

#[derive(Debug, Clone)]
pub struct Region {
    pub id: RegionId,
    pub center: GeoPoint,
    /// Radius in map pixels, >= 0.
    pub radius: f32,
    pub color: Color,
}

impl Region {
    pub fn center_pixel(&self, projection: &ConicProjection) -> Vec2 {
        projection.forward(&self.center)
    }
}

/// The two regions, keyed by [`RegionId`] rather than by name lookup.
#[derive(Debug, Clone, Resource)]
pub struct Regions {
    pub a: Region,
    pub b: Region,
}

impl Default for Regions {
    fn default() -> Self {
        Self {
            a: Region {
                id: RegionId::A,
                // SFO
                center: GeoPoint::new(-122.389977, 37.615223),
                radius: 250.0,
                color: Color::srgb(0.56, 0.93, 0.56),
            },
            b: Region {
                id: RegionId::B,
                // Stanford
                center: GeoPoint::new(-122.166077, 37.424107),
                radius: 300.0,
                color: Color::srgb(0.53, 0.81, 0.92),
            },
        }
    }
}

impl Regions {
    pub fn get(&self, id: RegionId) -> &Region {
        match id {
            RegionId::A => &self.a,
            RegionId::B => &self.b,
        }
    }

    pub fn get_mut(&mut self, id: RegionId) -> &mut Region {
        match id {
            RegionId::A => &mut self.a,
            RegionId::B => &mut self.b,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        [&self.a, &self.b].into_iter()
    }

    /// Set the region's radius to the pixel distance between the pointer and
    /// the region's projected center.
    pub fn resize(&mut self, id: RegionId, pointer: Vec2, projection: &ConicProjection) {
        let center = self.get(id).center_pixel(projection);
        self.get_mut(id).radius = pointer.distance(center);
    }

    /// Move the region's center to the geographic position under the pointer.
    /// The center snaps to the pointer exactly; no grab offset is kept.
    pub fn translate(&mut self, id: RegionId, pointer: Vec2, projection: &ConicProjection) {
        self.get_mut(id).center = projection.inverse(pointer);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn projection() -> ConicProjection {
        ConicProjection::bay_area(1000.0, 1293.0)
    }

    #[test]
    fn defaults_are_sfo_and_stanford() {
        let regions = Regions::default();
        assert_eq!(regions.a.id, RegionId::A);
        assert_eq!(regions.b.id, RegionId::B);
        assert_eq!(regions.a.radius, 250.0);
        assert_eq!(regions.b.radius, 300.0);
        assert!(regions.a.center.latitude > regions.b.center.latitude);
    }

    #[test]
    fn get_and_get_mut_address_the_right_region() {
        let mut regions = Regions::default();
        assert_eq!(regions.get(RegionId::A).id, RegionId::A);
        assert_eq!(regions.get(RegionId::B).id, RegionId::B);

        regions.get_mut(RegionId::B).radius = 42.0;
        assert_eq!(regions.b.radius, 42.0);
        assert_eq!(regions.a.radius, 250.0);
    }

    #[test]
    fn resize_sets_radius_to_pointer_distance() {
        let projection = projection();
        let mut regions = Regions::default();

        let center = regions.a.center_pixel(&projection);
        regions.resize(RegionId::A, center + Vec2::new(30.0, 40.0), &projection);

        assert!((regions.a.radius - 50.0).abs() < 1e-3);
    }

    #[test]
    fn resize_onto_the_center_shrinks_to_zero() {
        let projection = projection();
        let mut regions = Regions::default();

        let center = regions.b.center_pixel(&projection);
        regions.resize(RegionId::B, center, &projection);

        assert_eq!(regions.b.radius, 0.0);
    }

    #[test]
    fn translate_moves_center_under_pointer() {
        let projection = projection();
        let mut regions = Regions::default();

        let target = Vec2::new(500.0, 600.0);
        regions.translate(RegionId::A, target, &projection);

        let center = regions.a.center_pixel(&projection);
        assert!(center.distance(target) < 0.1);
        // The other region is untouched.
        assert_eq!(
            regions.b.center.longitude,
            Regions::default().b.center.longitude
        );
    }

    #[test]
    fn region_labels() {
        assert_eq!(RegionId::A.label(), "A");
        assert_eq!(RegionId::B.label(), "B");
    }
}
