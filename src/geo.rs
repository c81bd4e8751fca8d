// src/geo.rs

//! Geohash encoding and great-circle geometry.
//!
//! Hashes use the standard base32 alphabet and the usual bit-interleaving,
//! so they are interchangeable with any other geohash implementation.
//! Distances are haversine kilometers on a spherical Earth; bounding boxes
//! are plain lat/lon rectangles with no antimeridian handling.

use serde::Serialize;

/// Geohash alphabet. Note the missing a, i, l and o.
const BASE32: &str = "0123456789bcdefghjkmnpqrstuvwxyz";

const MAX_PRECISION: usize = 12;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.008_771_4;

// Neighbor and border lookup strings, keyed by direction and by whether the
// hash length is odd. The four neighbor tables are shared pairwise: a cell's
// east table at even length is its north table at odd length, and so on.
const NEIGHBOR_EAST_EVEN: &str = "bc01fg45238967deuvhjyznpkmstqrwx";
const NEIGHBOR_NORTH_EVEN: &str = "p0r21436x8zb9dcf5h7kjnmqesgutwvy";
const NEIGHBOR_WEST_EVEN: &str = "238967debc01fg45kmstqrwxuvhjyznp";
const NEIGHBOR_SOUTH_EVEN: &str = "14365h7k9dcfesgujnmqp0r2twvyx8zb";

const BORDER_EAST_EVEN: &str = "bcfguvyz";
const BORDER_NORTH_EVEN: &str = "prxz";
const BORDER_WEST_EVEN: &str = "0145hjnp";
const BORDER_SOUTH_EVEN: &str = "028b";

/// Compass direction for cell adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    fn neighbors(self, odd: bool) -> &'static str {
        match (self, odd) {
            (Self::East, false) | (Self::North, true) => NEIGHBOR_EAST_EVEN,
            (Self::North, false) | (Self::East, true) => NEIGHBOR_NORTH_EVEN,
            (Self::West, false) | (Self::South, true) => NEIGHBOR_WEST_EVEN,
            (Self::South, false) | (Self::West, true) => NEIGHBOR_SOUTH_EVEN,
        }
    }

    fn borders(self, odd: bool) -> &'static str {
        match (self, odd) {
            (Self::East, false) | (Self::North, true) => BORDER_EAST_EVEN,
            (Self::North, false) | (Self::East, true) => BORDER_NORTH_EVEN,
            (Self::West, false) | (Self::South, true) => BORDER_WEST_EVEN,
            (Self::South, false) | (Self::West, true) => BORDER_SOUTH_EVEN,
        }
    }
}

/// A latitude/longitude rectangle. Produced by [`decode`] (the extent of a
/// geohash cell) and [`bounding_box`] (the surroundings of a point).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl GeoBox {
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_lat
            && latitude <= self.max_lat
            && longitude >= self.min_lon
            && longitude <= self.max_lon
    }
}

/// Encodes a position to `precision` characters. Zero or anything above 12
/// means full precision; more than 12 characters adds nothing measurable.
pub fn encode(latitude: f64, longitude: f64, precision: usize) -> String {
    let precision = match precision {
        0 => MAX_PRECISION,
        p => p.min(MAX_PRECISION),
    };
    let mut lat = (-90.0, 90.0);
    let mut lon = (-180.0, 180.0);
    let mut hash = String::with_capacity(precision);
    let mut index = 0usize;
    let mut bit = 0;
    let mut even = true;

    while hash.len() < precision {
        if even {
            let mid = (lon.0 + lon.1) / 2.0;
            if longitude >= mid {
                index = index * 2 + 1;
                lon.0 = mid;
            } else {
                index *= 2;
                lon.1 = mid;
            }
        } else {
            let mid = (lat.0 + lat.1) / 2.0;
            if latitude >= mid {
                index = index * 2 + 1;
                lat.0 = mid;
            } else {
                index *= 2;
                lat.1 = mid;
            }
        }
        even = !even;
        bit += 1;
        if bit == 5 {
            hash.push(BASE32.as_bytes()[index] as char);
            index = 0;
            bit = 0;
        }
    }
    hash
}

/// Decodes a geohash to the cell it names. Parsing stops at the first
/// character outside the alphabet, so a truncated or damaged hash yields
/// the larger cell of its valid prefix.
pub fn decode(hash: &str) -> GeoBox {
    let mut lat = (-90.0, 90.0);
    let mut lon = (-180.0, 180.0);
    let mut even = true;

    for c in hash.chars() {
        let Some(bits) = BASE32.find(c.to_ascii_lowercase()) else {
            break;
        };
        for mask in [16usize, 8, 4, 2, 1] {
            if even {
                let mid = (lon.0 + lon.1) / 2.0;
                if bits & mask != 0 {
                    lon.0 = mid;
                } else {
                    lon.1 = mid;
                }
            } else {
                let mid = (lat.0 + lat.1) / 2.0;
                if bits & mask != 0 {
                    lat.0 = mid;
                } else {
                    lat.1 = mid;
                }
            }
            even = !even;
        }
    }

    GeoBox {
        min_lat: lat.0,
        min_lon: lon.0,
        max_lat: lat.1,
        max_lon: lon.1,
    }
}

/// The neighboring cell of `hash` in `direction`, at the same precision.
/// Crossing a parent-cell border recurses up, so neighbors come out right
/// at every level. An empty or invalid hash yields an empty string.
pub fn adjacent(hash: &str, direction: Direction) -> String {
    if hash.is_empty() {
        return String::new();
    }
    let lower = hash.to_ascii_lowercase();
    let mut chars: Vec<char> = lower.chars().collect();
    let Some(last) = chars.pop() else {
        return String::new();
    };
    let odd = lower.chars().count() % 2 == 1;
    let Some(index) = direction.neighbors(odd).find(last) else {
        return String::new();
    };

    let mut parent: String = chars.into_iter().collect();
    if direction.borders(odd).contains(last) && !parent.is_empty() {
        parent = adjacent(&parent, direction);
    }
    parent.push(BASE32.as_bytes()[index] as char);
    parent
}

/// The square of cells around `base`, `steps` rings deep: a `(2 * steps + 1)`
/// sided grid in row-major order, north row first, each row west to east,
/// with `base` in the middle. Steps below one count as one.
pub fn grid(base: &str, steps: i32) -> Vec<Vec<String>> {
    let steps = steps.max(1);
    let side = (steps * 2 + 1) as usize;

    let mut corner = base.to_ascii_lowercase();
    for _ in 0..steps {
        corner = adjacent(&corner, Direction::North);
    }
    for _ in 0..steps {
        corner = adjacent(&corner, Direction::West);
    }

    let mut rows = Vec::with_capacity(side);
    let mut row_start = corner;
    for r in 0..side {
        let mut row = Vec::with_capacity(side);
        let mut cell = row_start.clone();
        for c in 0..side {
            row.push(cell.clone());
            if c + 1 < side {
                cell = adjacent(&cell, Direction::East);
            }
        }
        rows.push(row);
        if r + 1 < side {
            row_start = adjacent(&row_start, Direction::South);
        }
    }
    rows
}

/// One west-to-east strip of cells centered on `base`, `2 * steps + 1` long.
pub fn row(base: &str, steps: i32) -> Vec<String> {
    let steps = steps.max(1);
    let len = (steps * 2 + 1) as usize;

    let mut cell = base.to_ascii_lowercase();
    for _ in 0..steps {
        cell = adjacent(&cell, Direction::West);
    }

    let mut cells = Vec::with_capacity(len);
    for i in 0..len {
        cells.push(cell.clone());
        if i + 1 < len {
            cell = adjacent(&cell, Direction::East);
        }
    }
    cells
}

/// Great-circle distance in kilometers between two positions.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let half_dlat = (lat2 - lat1).to_radians() / 2.0;
    let half_dlon = (lon2 - lon1).to_radians() / 2.0;

    let a = half_dlat.sin().powi(2) + phi1.cos() * phi2.cos() * half_dlon.sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// A rectangle reaching `distance_km` from the given point in every
/// direction. Near the poles the longitude span saturates to the full range.
pub fn bounding_box(latitude: f64, longitude: f64, distance_km: f64) -> GeoBox {
    let lat_delta = (distance_km / EARTH_RADIUS_KM).to_degrees();
    let cos_lat = latitude.to_radians().cos();
    let lon_delta = if cos_lat.abs() < 1e-12 {
        180.0
    } else {
        (distance_km / (EARTH_RADIUS_KM * cos_lat)).to_degrees()
    };

    GeoBox {
        min_lat: latitude - lat_delta,
        min_lon: longitude - lon_delta,
        max_lat: latitude + lat_delta,
        max_lon: longitude + lon_delta,
    }
}
