//! Per-step onboarding forms and their validation schemas.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{AllergyCategory, AllergyDetail, BasicInfo, Disease, Gender, Medication};
use crate::validation::{FieldErrors, Schema, required};

/// Anchor field for the "at least one allergy detail" rule.
pub const ALLERGY_ANCHOR: &str = "allergies";
/// Anchor field for the medication list rule.
pub const MEDICATION_ANCHOR: &str = "medications";
/// Anchor field for the disease list rule.
pub const DISEASE_ANCHOR: &str = "diseases";

/// Raw input of the basic-information step.
#[derive(Debug, Clone, Default)]
pub struct BasicInfoForm {
    pub name: String,
    /// `YYYY-MM-DD`.
    pub birth_date: String,
    pub gender: Option<Gender>,
    pub height: String,
    pub weight: String,
}

impl From<&BasicInfo> for BasicInfoForm {
    fn from(info: &BasicInfo) -> Self {
        Self {
            name: info.name.clone(),
            birth_date: info.birth_date.format("%Y-%m-%d").to_string(),
            gender: Some(info.gender),
            height: info.height.clone(),
            weight: info.weight.clone(),
        }
    }
}

fn positive_number(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    missing: &str,
    invalid: &str,
) -> String {
    let trimmed = required(errors, field, value, missing);
    if !trimmed.is_empty() && !trimmed.parse::<f64>().is_ok_and(|n| n.is_finite() && n > 0.0) {
        errors.add(field, invalid);
    }
    trimmed.to_string()
}

impl Schema for BasicInfoForm {
    type Output = BasicInfo;

    fn validate(&self) -> Result<BasicInfo, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required(&mut errors, "name", &self.name, "이름을 입력해주세요.");
        let raw_date = required(
            &mut errors,
            "birthDate",
            &self.birth_date,
            "생년월일을 입력해주세요.",
        );
        let birth_date = if raw_date.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("birthDate", "생년월일 형식이 올바르지 않습니다.");
                    None
                }
            }
        };
        if self.gender.is_none() {
            errors.add("gender", "성별을 선택해주세요.");
        }
        let height = positive_number(
            &mut errors,
            "height",
            &self.height,
            "키를 입력해주세요.",
            "키는 숫자로 입력해주세요.",
        );
        let weight = positive_number(
            &mut errors,
            "weight",
            &self.weight,
            "몸무게를 입력해주세요.",
            "몸무게는 숫자로 입력해주세요.",
        );

        match (birth_date, self.gender) {
            (Some(birth_date), Some(gender)) if errors.is_empty() => Ok(BasicInfo {
                name: name.to_string(),
                birth_date,
                gender,
                height,
                weight,
            }),
            _ => Err(errors),
        }
    }
}

/// Allergy detail form, shown after answering "yes".
#[derive(Debug, Clone, Default)]
pub struct AllergyForm {
    pub categories: BTreeSet<AllergyCategory>,
    pub details: BTreeMap<AllergyCategory, String>,
    pub other: String,
}

impl AllergyForm {
    /// Toggle a category chip. Returns whether it is now selected.
    pub fn toggle(&mut self, category: AllergyCategory) -> bool {
        if self.categories.remove(&category) {
            false
        } else {
            self.categories.insert(category);
            true
        }
    }

    pub fn set_detail(&mut self, category: AllergyCategory, text: impl Into<String>) {
        self.details.insert(category, text.into());
    }
}

impl From<&AllergyDetail> for AllergyForm {
    fn from(detail: &AllergyDetail) -> Self {
        Self {
            categories: detail.categories.clone(),
            details: detail.details.clone(),
            other: detail.other.clone().unwrap_or_default(),
        }
    }
}

impl Schema for AllergyForm {
    type Output = AllergyDetail;

    fn validate(&self) -> Result<AllergyDetail, FieldErrors> {
        let details: BTreeMap<AllergyCategory, String> = self
            .details
            .iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(cat, text)| (*cat, text.trim().to_string()))
            .collect();
        let other = Some(self.other.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let mut errors = FieldErrors::new();
        if self.categories.is_empty() && details.is_empty() && other.is_none() {
            errors.add(ALLERGY_ANCHOR, "알레르기 정보를 하나 이상 입력해주세요.");
        }

        errors.into_result(|| AllergyDetail {
            categories: self.categories.clone(),
            details,
            other,
        })
    }
}

/// One editable medication row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicationRow {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

impl MedicationRow {
    fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.dosage.trim().is_empty()
            && !self.frequency.trim().is_empty()
    }
}

/// Dynamic medication list editor. Always holds at least one row.
#[derive(Debug, Clone)]
pub struct MedicationForm {
    rows: Vec<MedicationRow>,
}

impl Default for MedicationForm {
    fn default() -> Self {
        Self {
            rows: vec![MedicationRow::default()],
        }
    }
}

impl MedicationForm {
    pub fn from_medications(list: &[Medication]) -> Self {
        let rows: Vec<MedicationRow> = list
            .iter()
            .map(|m| MedicationRow {
                name: m.name.clone(),
                dosage: m.dosage.clone(),
                frequency: m.frequency.clone(),
            })
            .collect();
        if rows.is_empty() { Self::default() } else { Self { rows } }
    }

    pub fn rows(&self) -> &[MedicationRow] {
        &self.rows
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut MedicationRow> {
        self.rows.get_mut(index)
    }

    pub fn add_row(&mut self) {
        self.rows.push(MedicationRow::default());
    }

    /// Whether the removal control is shown.
    pub fn can_remove_row(&self) -> bool {
        self.rows.len() > 1
    }

    /// Remove a row. Refused while only one row remains.
    pub fn remove_row(&mut self, index: usize) -> bool {
        if !self.can_remove_row() || index >= self.rows.len() {
            return false;
        }
        self.rows.remove(index);
        true
    }
}

impl Schema for MedicationForm {
    type Output = Vec<Medication>;

    fn validate(&self) -> Result<Vec<Medication>, FieldErrors> {
        let mut errors = FieldErrors::new();
        if !self.rows.iter().all(MedicationRow::is_complete) {
            errors.add(
                MEDICATION_ANCHOR,
                "약 이름, 용량, 복용 횟수를 모두 입력해주세요.",
            );
        }
        errors.into_result(|| {
            self.rows
                .iter()
                .map(|row| Medication {
                    name: row.name.trim().to_string(),
                    dosage: row.dosage.trim().to_string(),
                    frequency: row.frequency.trim().to_string(),
                })
                .collect()
        })
    }
}

/// Chronic-disease list editor, shown after answering "yes".
#[derive(Debug, Clone)]
pub struct DiseaseForm {
    rows: Vec<String>,
}

impl Default for DiseaseForm {
    fn default() -> Self {
        Self {
            rows: vec![String::new()],
        }
    }
}

impl DiseaseForm {
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn set_row(&mut self, index: usize, name: impl Into<String>) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                *row = name.into();
                true
            }
            None => false,
        }
    }

    pub fn add_row(&mut self) {
        self.rows.push(String::new());
    }

    pub fn remove_row(&mut self, index: usize) -> bool {
        if self.rows.len() <= 1 || index >= self.rows.len() {
            return false;
        }
        self.rows.remove(index);
        true
    }

    pub fn clear(&mut self) {
        self.rows = vec![String::new()];
    }
}

impl Schema for DiseaseForm {
    type Output = Vec<Disease>;

    /// Blank rows are ignored; at least one named entry is required.
    fn validate(&self) -> Result<Vec<Disease>, FieldErrors> {
        let diseases: Vec<Disease> = self
            .rows
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .map(|name| Disease {
                name: name.to_string(),
            })
            .collect();

        let mut errors = FieldErrors::new();
        if diseases.is_empty() {
            errors.add(DISEASE_ANCHOR, "질환명을 하나 이상 입력해주세요.");
        }
        errors.into_result(|| diseases)
    }
}
