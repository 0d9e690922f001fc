use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance in kilometers (spec §4.4 impossible-travel /
    /// unusual-location anomalies).
    pub fn haversine_km(&self, other: &GeoPoint) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_KM * c
    }
}

/// A per-identity behavioral baseline, updated incrementally as the
/// identity is observed (spec §4.4 "Profile update").
#[derive(Debug, Clone)]
pub struct BehavioralProfile {
    pub identity_id: String,
    pub typical_hours: BTreeSet<u32>,
    pub typical_locations: Vec<GeoPoint>,
    pub known_devices: BTreeSet<String>,
    pub typical_ip_ranges: BTreeSet<String>,
    pub avg_session_duration_secs: f64,
    pub avg_actions_per_session: f64,
    pub data_point_count: u64,
    pub last_updated_at: DateTime<Utc>,
}

impl BehavioralProfile {
    pub fn new(identity_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            identity_id: identity_id.into(),
            typical_hours: BTreeSet::new(),
            typical_locations: Vec::new(),
            known_devices: BTreeSet::new(),
            typical_ip_ranges: BTreeSet::new(),
            avg_session_duration_secs: 0.0,
            avg_actions_per_session: 0.0,
            data_point_count: 0,
            last_updated_at: now,
        }
    }

    /// Incrementally absorb one observation: dedup into the typical sets,
    /// re-weight the running averages by `count / (count + 1)`, bump the
    /// data-point count, refresh `last_updated_at`.
    pub fn absorb(
        &mut self,
        hour: u32,
        location: Option<GeoPoint>,
        device_fingerprint: Option<&str>,
        ip_range: Option<&str>,
        session_duration_secs: f64,
        actions_in_session: f64,
        now: DateTime<Utc>,
    ) {
        self.typical_hours.insert(hour);
        if let Some(loc) = location {
            if !self
                .typical_locations
                .iter()
                .any(|l| (l.lat - loc.lat).abs() < 1e-6 && (l.lon - loc.lon).abs() < 1e-6)
            {
                self.typical_locations.push(loc);
            }
        }
        if let Some(fp) = device_fingerprint {
            self.known_devices.insert(fp.to_string());
        }
        if let Some(range) = ip_range {
            self.typical_ip_ranges.insert(range.to_string());
        }

        let weight = self.data_point_count as f64 / (self.data_point_count as f64 + 1.0);
        self.avg_session_duration_secs =
            self.avg_session_duration_secs * weight + session_duration_secs * (1.0 - weight);
        self.avg_actions_per_session =
            self.avg_actions_per_session * weight + actions_in_session * (1.0 - weight);

        self.data_point_count += 1;
        self.last_updated_at = now;
    }

    pub fn most_recent_location(&self) -> Option<&GeoPoint> {
        self.typical_locations.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_distance_new_york_to_tokyo_is_about_ten_thousand_km() {
        let ny = GeoPoint::new(40.7, -74.0);
        let tokyo = GeoPoint::new(35.7, 139.7);
        let distance = ny.haversine_km(&tokyo);
        assert!(distance > 10_000.0 && distance < 11_000.0, "distance was {distance}");
    }

    #[test]
    fn absorb_increments_data_point_count_and_dedups() {
        let now = Utc::now();
        let mut profile = BehavioralProfile::new("u1", now);
        profile.absorb(9, Some(GeoPoint::new(1.0, 1.0)), Some("fp1"), Some("10.0.0.0/24"), 300.0, 5.0, now);
        profile.absorb(9, Some(GeoPoint::new(1.0, 1.0)), Some("fp1"), Some("10.0.0.0/24"), 600.0, 9.0, now);

        assert_eq!(profile.data_point_count, 2);
        assert_eq!(profile.typical_locations.len(), 1);
        assert_eq!(profile.typical_hours.len(), 1);
        assert!((profile.avg_session_duration_secs - 450.0).abs() < 1e-9);
    }
}
