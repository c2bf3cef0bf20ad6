//! Lat/long rectangle geometry on a spherical Earth.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Length of one degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// Returns `(north_south_m, east_west_m)` side lengths of the rectangle.
///
/// The east-west side is measured at the latitude closest to the equator,
/// where the rectangle is widest.
pub fn lat_long_to_meters(
    lat_north: f64,
    lat_south: f64,
    long_east: f64,
    long_west: f64,
) -> (f64, f64) {
    let north_south = (lat_north - lat_south) * METERS_PER_DEGREE;
    let widest_lat = if lat_south <= 0.0 && lat_north >= 0.0 {
        0.0
    } else if lat_south > 0.0 {
        lat_south
    } else {
        lat_north
    };
    let east_west = (long_east - long_west) * METERS_PER_DEGREE * widest_lat.to_radians().cos();
    (north_south, east_west)
}

/// Converts a north-south distance in meters into degrees of latitude.
pub fn meters_to_lat_dist(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}
