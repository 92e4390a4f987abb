use crate::math::{Vec2, project};

/// WGS84 longitude/latitude in decimal degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    pub fn is_finite(&self) -> bool {
        self.lon_deg.is_finite() && self.lat_deg.is_finite()
    }
}

/// Geographic bounding box given by its south-west and north-east corners.
///
/// Does not handle antimeridian wrap: a box spanning it is simply very wide.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoExtent {
    pub south_west: LonLat,
    pub north_east: LonLat,
}

impl GeoExtent {
    /// Zero-area box on a single coordinate.
    pub fn from_point(p: LonLat) -> Self {
        Self {
            south_west: p,
            north_east: p,
        }
    }

    /// Smallest box covering every coordinate; `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LonLat>,
    {
        let mut iter = points.into_iter();
        let mut extent = Self::from_point(iter.next()?);
        for p in iter {
            extent.include(p);
        }
        Some(extent)
    }

    pub fn include(&mut self, p: LonLat) {
        self.south_west.lon_deg = self.south_west.lon_deg.min(p.lon_deg);
        self.south_west.lat_deg = self.south_west.lat_deg.min(p.lat_deg);
        self.north_east.lon_deg = self.north_east.lon_deg.max(p.lon_deg);
        self.north_east.lat_deg = self.north_east.lat_deg.max(p.lat_deg);
    }

    pub fn center(&self) -> LonLat {
        LonLat::new(
            (self.south_west.lon_deg + self.north_east.lon_deg) * 0.5,
            (self.south_west.lat_deg + self.north_east.lat_deg) * 0.5,
        )
    }

    pub fn width_deg(&self) -> f64 {
        self.north_east.lon_deg - self.south_west.lon_deg
    }

    pub fn height_deg(&self) -> f64 {
        self.north_east.lat_deg - self.south_west.lat_deg
    }

    pub fn is_zero_area(&self) -> bool {
        self.width_deg() == 0.0 && self.height_deg() == 0.0
    }

    pub fn contains(&self, p: LonLat) -> bool {
        p.lon_deg >= self.south_west.lon_deg
            && p.lon_deg <= self.north_east.lon_deg
            && p.lat_deg >= self.south_west.lat_deg
            && p.lat_deg <= self.north_east.lat_deg
    }

    /// Projected corners as `(top_left, bottom_right)` in the unit Mercator square.
    pub fn projected(&self) -> (Vec2, Vec2) {
        let nw = project(LonLat::new(self.south_west.lon_deg, self.north_east.lat_deg));
        let se = project(LonLat::new(self.north_east.lon_deg, self.south_west.lat_deg));
        (nw, se)
    }
}
