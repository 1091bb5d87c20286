//! Map projection between geographic coordinates and map-pixel space.
//!
//! The base map is a cropped Bay Area image rendered in a Lambert conformal
//! conic projection (standard parallels 37°04'N / 38°26'N, central meridian
//! 120°30'W). The projection here is the spherical form of the same conic,
//! fitted so the fixed geographic frame of the source image fills the map
//! rectangle. Pixel space follows image conventions: origin top-left,
//! y grows downward.

use bevy::prelude::*;

// =============================================================================
// Geographic types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// Geographic frame of the base-map image: north-west and south-east corners.
#[derive(Debug, Clone, Copy)]
pub struct MapFrame {
    pub north_west: GeoPoint,
    pub south_east: GeoPoint,
}

/// Frame of the cropped SF Bay Area base map.
pub const BAY_AREA_FRAME: MapFrame = MapFrame {
    north_west: GeoPoint {
        longitude: -122.54644297642132,
        latitude: 37.989209933976475,
    },
    south_east: GeoPoint {
        longitude: -121.74157680240731,
        latitude: 37.19360698897229,
    },
};

/// Standard parallels of the Bay Area conic, in degrees.
pub const STANDARD_PARALLELS: (f64, f64) = (37.0 + 4.0 / 60.0, 38.0 + 26.0 / 60.0);

/// Central meridian of the Bay Area conic, in degrees.
pub const CENTRAL_MERIDIAN: f64 = -(120.0 + 30.0 / 60.0);

/// Source map image is 1913 x 2475; the rendered map keeps that aspect.
pub const MAP_ASPECT: f64 = 2475.0 / 1913.0;

// =============================================================================
// Conic projection
// =============================================================================

/// Lambert conformal conic projection fitted to a pixel rectangle.
///
/// `forward` and `inverse` are exact inverses up to floating-point error and
/// are total: coordinates outside the fitted frame extrapolate rather than
/// fail.
#[derive(Debug, Clone, Resource)]
pub struct ConicProjection {
    n: f64,
    f: f64,
    rho0: f64,
    central_meridian: f64,
    scale: f64,
    translate_x: f64,
    translate_y: f64,
}

impl ConicProjection {
    /// Build the conic from its standard parallels and central meridian, then
    /// fit it so `frame` fills a `width` x `height` pixel rectangle (excess in
    /// the non-binding dimension is centered).
    pub fn fitted(
        parallels: (f64, f64),
        central_meridian: f64,
        frame: &MapFrame,
        width: f64,
        height: f64,
    ) -> Self {
        let phi1 = parallels.0.to_radians();
        let phi2 = parallels.1.to_radians();

        let n = (phi1.cos() / phi2.cos()).ln() / (half_tan(phi2) / half_tan(phi1)).ln();
        let f = phi1.cos() * half_tan(phi1).powf(n) / n;
        // Reference latitude 0 puts the cone apex on the y axis.
        let rho0 = f;

        let mut projection = Self {
            n,
            f,
            rho0,
            central_meridian,
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        };

        let (ax, ay) = projection.raw(&frame.north_west);
        let (bx, by) = projection.raw(&frame.south_east);
        let (min_x, max_x) = (ax.min(bx), ax.max(bx));
        let (min_y, max_y) = (ay.min(by), ay.max(by));

        let scale = (width / (max_x - min_x)).min(height / (max_y - min_y));
        projection.scale = scale;
        projection.translate_x = (width - scale * (min_x + max_x)) / 2.0;
        projection.translate_y = (height - scale * (min_y + max_y)) / 2.0;
        projection
    }

    /// Bay Area conic fitted to a map rectangle of the given size.
    pub fn bay_area(width: f64, height: f64) -> Self {
        Self::fitted(
            STANDARD_PARALLELS,
            CENTRAL_MERIDIAN,
            &BAY_AREA_FRAME,
            width,
            height,
        )
    }

    /// Unscaled conic coordinates, y already flipped to grow southward.
    fn raw(&self, point: &GeoPoint) -> (f64, f64) {
        let phi = point.latitude.to_radians();
        let theta = self.n * (point.longitude - self.central_meridian).to_radians();
        let rho = self.f / half_tan(phi).powf(self.n);

        let x = rho * theta.sin();
        let y_up = self.rho0 - rho * theta.cos();
        (x, -y_up)
    }

    /// Map (longitude, latitude) to map-pixel coordinates.
    pub fn forward(&self, point: &GeoPoint) -> Vec2 {
        let (x, y) = self.raw(point);
        Vec2::new(
            (self.translate_x + self.scale * x) as f32,
            (self.translate_y + self.scale * y) as f32,
        )
    }

    /// Map pixel coordinates back to (longitude, latitude).
    pub fn inverse(&self, pixel: Vec2) -> GeoPoint {
        let x = (f64::from(pixel.x) - self.translate_x) / self.scale;
        let y_up = -(f64::from(pixel.y) - self.translate_y) / self.scale;

        let dy = self.rho0 - y_up;
        let rho = self.n.signum() * (x * x + dy * dy).sqrt();
        let theta = x.atan2(dy);

        let longitude = self.central_meridian + (theta / self.n).to_degrees();
        let latitude = (2.0 * (self.f / rho).powf(1.0 / self.n).atan()
            - std::f64::consts::FRAC_PI_2)
            .to_degrees();
        GeoPoint::new(longitude, latitude)
    }
}

fn half_tan(phi: f64) -> f64 {
    (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan()
}

// =============================================================================
// Tests
// =============================================================================
