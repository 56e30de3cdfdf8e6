//! Onboarding — the multi-step medical-intake flow after signup.
//!
//! The user walks basic info → allergies → medications → chronic diseases.
//! Each step validates its own form, contributes a disjoint slice of the
//! `AggregateProfile`, and the finished profile is written to the local
//! store exactly once, when the flow reaches `Complete`.

pub mod forms;
pub mod manager;
pub mod model;
pub mod state;

pub use forms::{AllergyForm, BasicInfoForm, DiseaseForm, MedicationForm, MedicationRow};
pub use manager::{OnboardingController, OnboardingStatus, StepOutcome};
pub use model::{
    AggregateProfile, AllergyCategory, AllergyRecord, BasicInfo, DiseaseChoice, DiseaseRecord,
    Gender, MedicationRecord, YesNo,
};
pub use state::{AllergyStage, DiseaseStage, MedicationStage, OnboardingStep, StepKind};
