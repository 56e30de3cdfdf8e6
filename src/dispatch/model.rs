//! Hospital listings, patient profiles, and the mock data behind the search screen.

use serde::{Deserialize, Serialize};

/// Emergency-room status of a hospital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HospitalStatus {
    Available,
    Full,
    Closed,
}

impl HospitalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Available => "수용 가능",
            Self::Full => "병상 부족",
            Self::Closed => "진료 불가",
        }
    }
}

/// A hospital shown in the list sheet. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalListing {
    pub id: u32,
    pub name: String,
    /// Distance from the user, in kilometres.
    #[serde(rename = "distance")]
    pub distance_km: f32,
    pub address: String,
    pub emergency_bed_count: u32,
    pub available_bed_count: u32,
    pub total_bed_count: u32,
    pub status: HospitalStatus,
}

impl HospitalListing {
    /// Full and closed hospitals are inert to selection.
    pub fn is_selectable(&self) -> bool {
        self.status == HospitalStatus::Available
    }

    pub fn distance_label(&self) -> String {
        if self.distance_km < 1.0 {
            format!("{}m", (self.distance_km * 1000.0).round() as u32)
        } else {
            format!("{:.1}km", self.distance_km)
        }
    }
}

/// Who the search is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: u32,
    pub label: String,
}

fn listing(
    id: u32,
    name: &str,
    distance_km: f32,
    address: &str,
    beds: (u32, u32, u32),
    status: HospitalStatus,
) -> HospitalListing {
    HospitalListing {
        id,
        name: name.to_string(),
        distance_km,
        address: address.to_string(),
        emergency_bed_count: beds.0,
        available_bed_count: beds.1,
        total_bed_count: beds.2,
        status,
    }
}

/// Hospitals visible as soon as the search sheet opens.
pub fn first_wave() -> Vec<HospitalListing> {
    use HospitalStatus::*;
    vec![
        listing(1, "서울대학교병원", 1.2, "서울 종로구 대학로 101", (12, 4, 30), Available),
        listing(2, "강북삼성병원", 0.8, "서울 종로구 새문안로 29", (8, 0, 20), Full),
        listing(3, "서울적십자병원", 1.6, "서울 종로구 새문안로 9", (6, 2, 15), Available),
        listing(4, "국립중앙의료원", 2.4, "서울 중구 을지로 245", (10, 0, 25), Closed),
        listing(5, "세브란스병원", 3.1, "서울 서대문구 연세로 50-1", (20, 7, 40), Available),
    ]
}

/// Hospitals that respond during the simulated call and appear afterwards.
pub fn second_wave() -> Vec<HospitalListing> {
    use HospitalStatus::*;
    vec![
        listing(6, "고려대학교 안암병원", 4.0, "서울 성북구 고려대로 73", (14, 3, 28), Available),
        listing(7, "서울백병원", 0.6, "서울 중구 마른내로 9", (5, 1, 10), Available),
        listing(8, "중앙대학교병원", 5.2, "서울 동작구 흑석로 102", (9, 0, 18), Full),
    ]
}

/// Selectable patients.
pub fn default_patients() -> Vec<PatientProfile> {
    ["본인", "가족", "기타"]
        .iter()
        .zip(1..)
        .map(|(label, id)| PatientProfile {
            id,
            label: label.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waves_have_distinct_ids() {
        let mut ids: Vec<u32> = first_wave()
            .iter()
            .chain(second_wave().iter())
            .map(|h| h.id)
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn only_available_is_selectable() {
        for h in first_wave() {
            assert_eq!(h.is_selectable(), h.status == HospitalStatus::Available);
        }
    }

    #[test]
    fn listing_wire_names_match_stored_shape() {
        let json = serde_json::to_value(&first_wave()[0]).unwrap();
        assert_eq!(json["distance"], serde_json::json!(1.2f32));
        assert!(json.get("distanceKm").is_none());
        assert_eq!(json["emergencyBedCount"], 12);
        assert_eq!(json["status"], "available");
    }

    #[test]
    fn distance_labels() {
        let hospitals = second_wave();
        assert_eq!(hospitals[1].distance_label(), "600m");
        assert_eq!(hospitals[0].distance_label(), "4.0km");
    }
}
