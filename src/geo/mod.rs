use serde::{Deserialize, Serialize};

use crate::models::route::TravelMode;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutePoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteLeg {
    pub points: Vec<RoutePoint>,
    pub distance: String,
    pub duration: String,
    pub polyline: String,
}

fn speed_kmh(mode: TravelMode) -> f64 {
    match mode {
        TravelMode::Driving => 30.0,
        TravelMode::Bicycling => 15.0,
        TravelMode::Walking => 5.0,
    }
}

/// Mock route: pickup, midpoint, dropoff on a straight line, distance from
/// the great-circle between the endpoints, duration from a fixed per-mode
/// speed. Not a mapping integration.
pub fn plan_route(pickup: &GeoPoint, dropoff: &GeoPoint, mode: TravelMode) -> RouteLeg {
    let distance_km = haversine_km(pickup, dropoff);
    let minutes = (distance_km / speed_kmh(mode) * 60.0).ceil().max(1.0);

    RouteLeg {
        points: vec![
            RoutePoint {
                latitude: pickup.lat,
                longitude: pickup.lng,
            },
            RoutePoint {
                latitude: (pickup.lat + dropoff.lat) / 2.0,
                longitude: (pickup.lng + dropoff.lng) / 2.0,
            },
            RoutePoint {
                latitude: dropoff.lat,
                longitude: dropoff.lng,
            },
        ],
        distance: format!("{distance_km:.1} km"),
        duration: format!("{minutes:.0} mins"),
        polyline: "mock_polyline_string".to_string(),
    }
}
