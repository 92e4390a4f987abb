//! Spherical Web-Mercator helpers (EPSG:3857), the projection slippy-map
//! renderers use for tile pyramids.
//!
//! Projected coordinates are normalized to the unit square: `x` grows east
//! from the antimeridian, `y` grows south from the top of the tile pyramid.
//! One unit spans `TILE_SIZE_PX * 2^zoom` pixels.

use crate::bounds::LonLat;

use super::Vec2;

/// Edge length of one tile in pixels.
pub const TILE_SIZE_PX: f64 = 256.0;

/// Latitude at which the Web-Mercator square is cut off.
pub const MAX_LATITUDE_DEG: f64 = 85.051_128_779_806_59;

/// Projects a geographic coordinate into the normalized Mercator square.
pub fn project(p: LonLat) -> Vec2 {
    let lat = p.lat_deg.clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG);
    let x = (p.lon_deg + 180.0) / 360.0;
    let sin_lat = lat.to_radians().sin();
    let y = 0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * std::f64::consts::PI);
    Vec2::new(x, y)
}

/// Inverse of [`project`].
pub fn unproject(v: Vec2) -> LonLat {
    let lon = v.x * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * v.y);
    let lat = n.sinh().atan().to_degrees();
    LonLat::new(lon, lat)
}
