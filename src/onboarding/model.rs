//! Medical-intake data models built during onboarding.
//!
//! Validated records are enums so that "yes, but nothing entered" cannot be
//! represented. On the wire they flatten to the camelCase JSON shape the web
//! client has always stored (`hasAllergy`, `medications`, ...).

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Answer to a top-level yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Yes => "있어요",
            Self::No => "없어요",
        }
    }
}

impl std::str::FromStr for YesNo {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "yes" | "y" | "있어요" => Ok(Self::Yes),
            "no" | "n" | "없어요" => Ok(Self::No),
            other => Err(format!("Unknown answer: {other}")),
        }
    }
}

/// Chronic-disease choice; `Unset` until the user picks an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseChoice {
    #[default]
    Unset,
    Yes,
    No,
}

impl From<YesNo> for DiseaseChoice {
    fn from(answer: YesNo) -> Self {
        match answer {
            YesNo::Yes => Self::Yes,
            YesNo::No => Self::No,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl std::str::FromStr for Gender {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "male" | "m" | "남성" | "남" => Ok(Self::Male),
            "female" | "f" | "여성" | "여" => Ok(Self::Female),
            other => Err(format!("Unknown gender: {other}")),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// Basic personal information (first onboarding step).
///
/// Height and weight keep the text as entered; validation guarantees they
/// parse as positive numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub height: String,
    pub weight: String,
}

/// Allergy category tags offered as chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllergyCategory {
    Drug,
    Food,
    Pollen,
    Animal,
    Other,
}

impl AllergyCategory {
    pub const ALL: [AllergyCategory; 5] =
        [Self::Drug, Self::Food, Self::Pollen, Self::Animal, Self::Other];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Drug => "약물",
            Self::Food => "음식",
            Self::Pollen => "꽃가루",
            Self::Animal => "동물",
            Self::Other => "기타",
        }
    }
}

impl std::str::FromStr for AllergyCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s.trim() || format!("{c:?}").eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown allergy category: {s}"))
    }
}

/// What the user reported after answering "yes" to allergies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllergyDetail {
    pub categories: BTreeSet<AllergyCategory>,
    /// Free text per category, only non-empty entries.
    pub details: BTreeMap<AllergyCategory, String>,
    pub other: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AllergyWire", into = "AllergyWire")]
pub enum AllergyRecord {
    None,
    Present(AllergyDetail),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllergyWire {
    has_allergy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allergies: Option<BTreeSet<AllergyCategory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allergy_details: Option<BTreeMap<AllergyCategory, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    other_allergy: Option<String>,
}

impl From<AllergyRecord> for AllergyWire {
    fn from(record: AllergyRecord) -> Self {
        match record {
            AllergyRecord::None => Self {
                has_allergy: false,
                allergies: None,
                allergy_details: None,
                other_allergy: None,
            },
            AllergyRecord::Present(detail) => Self {
                has_allergy: true,
                allergies: Some(detail.categories),
                allergy_details: Some(detail.details),
                other_allergy: detail.other,
            },
        }
    }
}

impl From<AllergyWire> for AllergyRecord {
    fn from(wire: AllergyWire) -> Self {
        if !wire.has_allergy {
            return Self::None;
        }
        Self::Present(AllergyDetail {
            categories: wire.allergies.unwrap_or_default(),
            details: wire.allergy_details.unwrap_or_default(),
            other: wire.other_allergy,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MedicationWire", into = "MedicationWire")]
pub enum MedicationRecord {
    None,
    /// Non-empty, every entry fully populated.
    Taking(Vec<Medication>),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MedicationWire {
    has_medication: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    medications: Option<Vec<Medication>>,
}

impl From<MedicationRecord> for MedicationWire {
    fn from(record: MedicationRecord) -> Self {
        match record {
            MedicationRecord::None => Self {
                has_medication: false,
                medications: None,
            },
            MedicationRecord::Taking(list) => Self {
                has_medication: true,
                medications: Some(list),
            },
        }
    }
}

impl From<MedicationWire> for MedicationRecord {
    fn from(wire: MedicationWire) -> Self {
        match wire.medications {
            Some(list) if wire.has_medication && !list.is_empty() => Self::Taking(list),
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disease {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DiseaseWire", into = "DiseaseWire")]
pub enum DiseaseRecord {
    None,
    /// At least one named entry.
    Present(Vec<Disease>),
}

impl DiseaseRecord {
    pub fn choice(&self) -> DiseaseChoice {
        match self {
            Self::None => DiseaseChoice::No,
            Self::Present(_) => DiseaseChoice::Yes,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiseaseWire {
    has_disease: bool,
    #[serde(default)]
    diseases: Vec<Disease>,
}

impl From<DiseaseRecord> for DiseaseWire {
    fn from(record: DiseaseRecord) -> Self {
        match record {
            DiseaseRecord::None => Self {
                has_disease: false,
                diseases: Vec::new(),
            },
            DiseaseRecord::Present(list) => Self {
                has_disease: true,
                diseases: list,
            },
        }
    }
}

impl From<DiseaseWire> for DiseaseRecord {
    fn from(wire: DiseaseWire) -> Self {
        if wire.has_disease && !wire.diseases.is_empty() {
            Self::Present(wire.diseases)
        } else {
            Self::None
        }
    }
}

/// Everything collected so far; each step fills its own disjoint slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateProfile {
    #[serde(flatten)]
    pub basic: Option<BasicInfo>,
    #[serde(flatten)]
    pub allergy: Option<AllergyRecord>,
    #[serde(flatten)]
    pub medication: Option<MedicationRecord>,
    #[serde(flatten)]
    pub disease: Option<DiseaseRecord>,
}

impl AggregateProfile {
    /// Every top-level key a profile can write. A stored record keeps
    /// none of these across a new completion.
    pub const FIELDS: [&'static str; 13] = [
        "name",
        "birthDate",
        "gender",
        "height",
        "weight",
        "hasAllergy",
        "allergies",
        "allergyDetails",
        "otherAllergy",
        "hasMedication",
        "medications",
        "hasDisease",
        "diseases",
    ];

    /// Whether every step has contributed its record.
    pub fn is_complete(&self) -> bool {
        self.basic.is_some()
            && self.allergy.is_some()
            && self.medication.is_some()
            && self.disease.is_some()
    }

    /// The flat JSON object written to storage.
    pub fn to_json_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

/// Storage keys of the local key/value store.
pub mod storage_keys {
    /// Current signed-in user: credential plus medical profile.
    pub const USER: &str = "user";
    /// `"true"` while a user is signed in.
    pub const IS_AUTHENTICATED: &str = "isAuthenticated";
    /// Copy of the completed registration.
    pub const REGISTERED_USER: &str = "registeredUser";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic() -> BasicInfo {
        BasicInfo {
            name: "홍길동".into(),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            gender: Gender::Male,
            height: "170".into(),
            weight: "65".into(),
        }
    }

    #[test]
    fn basic_info_uses_camel_case_and_iso_date() {
        let json = serde_json::to_value(basic()).unwrap();
        assert_eq!(json["birthDate"], "2000-01-01");
        assert_eq!(json["gender"], "male");
        assert_eq!(json["height"], "170");
    }

    #[test]
    fn negative_records_flatten_to_flags() {
        let profile = AggregateProfile {
            basic: Some(basic()),
            allergy: Some(AllergyRecord::None),
            medication: Some(MedicationRecord::None),
            disease: Some(DiseaseRecord::None),
        };
        let fields = profile.to_json_fields();
        let mut keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "birthDate",
                "diseases",
                "gender",
                "hasAllergy",
                "hasDisease",
                "hasMedication",
                "height",
                "name",
                "weight"
            ]
        );
        assert_eq!(fields["hasAllergy"], false);
        assert_eq!(fields["diseases"], serde_json::json!([]));
    }

    #[test]
    fn positive_records_carry_details() {
        let mut detail = AllergyDetail::default();
        detail.categories.insert(AllergyCategory::Drug);
        detail
            .details
            .insert(AllergyCategory::Drug, "페니실린".into());
        let profile = AggregateProfile {
            allergy: Some(AllergyRecord::Present(detail)),
            medication: Some(MedicationRecord::Taking(vec![Medication {
                name: "아스피린".into(),
                dosage: "100mg".into(),
                frequency: "하루 1회".into(),
            }])),
            ..Default::default()
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["hasAllergy"], true);
        assert_eq!(json["allergies"], serde_json::json!(["drug"]));
        assert_eq!(json["allergyDetails"]["drug"], "페니실린");
        assert!(json.get("otherAllergy").is_none());
        assert_eq!(json["medications"][0]["dosage"], "100mg");
        assert!(json.get("name").is_none());
    }

    #[test]
    fn field_list_covers_every_written_key() {
        let profile = AggregateProfile {
            basic: Some(basic()),
            allergy: Some(AllergyRecord::Present(AllergyDetail {
                categories: [AllergyCategory::Food].into_iter().collect(),
                details: [(AllergyCategory::Food, "땅콩".to_string())].into_iter().collect(),
                other: Some("먼지".into()),
            })),
            medication: Some(MedicationRecord::Taking(vec![Medication {
                name: "아스피린".into(),
                dosage: "100mg".into(),
                frequency: "하루 1회".into(),
            }])),
            disease: Some(DiseaseRecord::Present(vec![Disease {
                name: "고혈압".into(),
            }])),
        };
        let fields = profile.to_json_fields();
        assert_eq!(fields.len(), AggregateProfile::FIELDS.len());
        for key in fields.keys() {
            assert!(AggregateProfile::FIELDS.contains(&key.as_str()), "{key}");
        }
    }

    #[test]
    fn disease_record_reads_back_from_wire() {
        let record: DiseaseRecord = serde_json::from_value(serde_json::json!({
            "hasDisease": true,
            "diseases": [{"name": "고혈압"}]
        }))
        .unwrap();
        assert_eq!(record.choice(), DiseaseChoice::Yes);

        let empty: DiseaseRecord =
            serde_json::from_value(serde_json::json!({"hasDisease": true, "diseases": []}))
                .unwrap();
        assert_eq!(empty, DiseaseRecord::None);
    }

    #[test]
    fn answers_parse_from_labels() {
        assert_eq!("없어요".parse::<YesNo>().unwrap(), YesNo::No);
        assert_eq!("yes".parse::<YesNo>().unwrap(), YesNo::Yes);
        assert!("maybe".parse::<YesNo>().is_err());
        assert_eq!("여성".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("꽃가루".parse::<AllergyCategory>().unwrap(), AllergyCategory::Pollen);
        assert_eq!("food".parse::<AllergyCategory>().unwrap(), AllergyCategory::Food);
    }
}
