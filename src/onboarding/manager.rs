//! OnboardingController — drives step transitions, merges each step's
//! validated record into the aggregate profile, and persists it once the
//! flow completes.

use tracing::{debug, info};

use super::forms::{AllergyForm, BasicInfoForm, DiseaseForm, MedicationForm};
use super::model::{
    AggregateProfile, AllergyRecord, DiseaseChoice, DiseaseRecord, MedicationRecord, YesNo,
};
use super::state::{AllergyStage, DiseaseStage, MedicationStage, OnboardingStep, StepKind};
use crate::navigation::Route;
use crate::store::{PersistOutcome, ProfileRepository};
use crate::validation::{FieldErrors, LiveForm};

/// Result of a single user action on the onboarding screen.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Nothing moved (action not applicable to the current step).
    Stayed,
    /// A detail form was revealed or collapsed inside the current step.
    Revealed,
    /// Moved to another top-level step.
    Moved(StepKind),
    /// Validation failed; the step is unchanged.
    Rejected(FieldErrors),
    /// Left the onboarding flow.
    Exited(Route),
}

/// Owns the onboarding state and the aggregate profile for one flow.
pub struct OnboardingController {
    repo: ProfileRepository,
    step: OnboardingStep,
    profile: AggregateProfile,
    persisted: Option<PersistOutcome>,
}

impl OnboardingController {
    pub fn new(repo: ProfileRepository) -> Self {
        Self {
            repo,
            step: OnboardingStep::default(),
            profile: AggregateProfile::default(),
            persisted: None,
        }
    }

    pub fn step(&self) -> &OnboardingStep {
        &self.step
    }

    pub fn kind(&self) -> StepKind {
        self.step.kind()
    }

    pub fn profile(&self) -> &AggregateProfile {
        &self.profile
    }

    /// How the terminal write went, once the flow reached `Complete`.
    pub fn persisted(&self) -> Option<PersistOutcome> {
        self.persisted
    }

    pub fn primary_action_enabled(&self) -> bool {
        self.step.primary_action_enabled()
    }

    // ── Basic ───────────────────────────────────────────────────────

    /// Edit the basic-information form. Returns false on any other step.
    pub fn edit_basic(&mut self, f: impl FnOnce(&mut BasicInfoForm)) -> bool {
        match &mut self.step {
            OnboardingStep::Basic(form) => {
                form.edit(f);
                true
            }
            _ => false,
        }
    }

    pub fn blur_basic(&mut self, field: &'static str) {
        if let OnboardingStep::Basic(form) = &mut self.step {
            form.blur(field);
        }
    }

    pub fn submit_basic(&mut self) -> StepOutcome {
        let OnboardingStep::Basic(form) = &mut self.step else {
            return self.not_applicable("submit_basic");
        };
        match form.submit() {
            Ok(info) => {
                self.profile.basic = Some(info);
                self.enter(OnboardingStep::Allergy(AllergyStage::Choosing))
            }
            Err(errors) => StepOutcome::Rejected(errors),
        }
    }

    // ── Allergy ─────────────────────────────────────────────────────

    /// "No" skips straight to medication; "yes" reveals the detail form.
    pub fn choose_allergy(&mut self, answer: YesNo) -> StepOutcome {
        if !matches!(self.step, OnboardingStep::Allergy(_)) {
            return self.not_applicable("choose_allergy");
        }
        match answer {
            YesNo::No => {
                self.profile.allergy = Some(AllergyRecord::None);
                self.enter(OnboardingStep::Medication(MedicationStage::Choosing))
            }
            YesNo::Yes => {
                let form = match &self.profile.allergy {
                    Some(AllergyRecord::Present(detail)) => AllergyForm::from(detail),
                    _ => AllergyForm::default(),
                };
                self.step = OnboardingStep::Allergy(AllergyStage::Detail(LiveForm::new(form)));
                StepOutcome::Revealed
            }
        }
    }

    pub fn edit_allergy<R>(&mut self, f: impl FnOnce(&mut AllergyForm) -> R) -> Option<R> {
        match &mut self.step {
            OnboardingStep::Allergy(AllergyStage::Detail(form)) => Some(form.edit(f)),
            _ => None,
        }
    }

    pub fn submit_allergy(&mut self) -> StepOutcome {
        let OnboardingStep::Allergy(AllergyStage::Detail(form)) = &mut self.step else {
            return self.not_applicable("submit_allergy");
        };
        match form.submit() {
            Ok(detail) => {
                self.profile.allergy = Some(AllergyRecord::Present(detail));
                self.enter(OnboardingStep::Medication(MedicationStage::Choosing))
            }
            Err(errors) => StepOutcome::Rejected(errors),
        }
    }

    // ── Medication ──────────────────────────────────────────────────

    /// "No" skips straight to disease; "yes" reveals the list editor.
    pub fn choose_medication(&mut self, answer: YesNo) -> StepOutcome {
        if !matches!(self.step, OnboardingStep::Medication(_)) {
            return self.not_applicable("choose_medication");
        }
        match answer {
            YesNo::No => self.skip_medication(),
            YesNo::Yes => {
                let form = match &self.profile.medication {
                    Some(MedicationRecord::Taking(list)) => MedicationForm::from_medications(list),
                    _ => MedicationForm::default(),
                };
                self.step =
                    OnboardingStep::Medication(MedicationStage::Detail(LiveForm::new(form)));
                StepOutcome::Revealed
            }
        }
    }

    pub fn edit_medication<R>(&mut self, f: impl FnOnce(&mut MedicationForm) -> R) -> Option<R> {
        match &mut self.step {
            OnboardingStep::Medication(MedicationStage::Detail(form)) => Some(form.edit(f)),
            _ => None,
        }
    }

    pub fn add_medication_row(&mut self) -> bool {
        self.edit_medication(MedicationForm::add_row).is_some()
    }

    /// Remove a medication row; refused while exactly one row remains.
    pub fn remove_medication_row(&mut self, index: usize) -> bool {
        self.edit_medication(|form| form.remove_row(index))
            .unwrap_or(false)
    }

    /// Primary action of the medication step.
    ///
    /// With the editor hidden the top-level answer is "no" and the step is
    /// skipped without consulting the schema.
    pub fn submit_medication(&mut self) -> StepOutcome {
        match &mut self.step {
            OnboardingStep::Medication(MedicationStage::Choosing) => self.skip_medication(),
            OnboardingStep::Medication(MedicationStage::Detail(form)) => match form.submit() {
                Ok(list) => {
                    self.profile.medication = Some(MedicationRecord::Taking(list));
                    self.enter(OnboardingStep::Disease(DiseaseStage::Unset))
                }
                Err(errors) => StepOutcome::Rejected(errors),
            },
            _ => self.not_applicable("submit_medication"),
        }
    }

    fn skip_medication(&mut self) -> StepOutcome {
        self.profile.medication = Some(MedicationRecord::None);
        self.enter(OnboardingStep::Disease(DiseaseStage::Unset))
    }

    // ── Disease ─────────────────────────────────────────────────────

    /// "No" clears any rows and completes the flow without a manual submit;
    /// "yes" reveals the list editor.
    pub async fn choose_disease(&mut self, answer: YesNo) -> StepOutcome {
        if !matches!(self.step, OnboardingStep::Disease(_)) {
            return self.not_applicable("choose_disease");
        }
        match answer {
            YesNo::No => {
                self.profile.disease = Some(DiseaseRecord::None);
                self.complete().await
            }
            YesNo::Yes => {
                if !matches!(self.step, OnboardingStep::Disease(DiseaseStage::Yes(_))) {
                    self.step = OnboardingStep::Disease(DiseaseStage::Yes(LiveForm::default()));
                }
                StepOutcome::Revealed
            }
        }
    }

    pub fn disease_choice(&self) -> DiseaseChoice {
        self.step.disease_choice()
    }

    pub fn edit_disease<R>(&mut self, f: impl FnOnce(&mut DiseaseForm) -> R) -> Option<R> {
        match &mut self.step {
            OnboardingStep::Disease(DiseaseStage::Yes(form)) => Some(form.edit(f)),
            _ => None,
        }
    }

    pub async fn submit_disease(&mut self) -> StepOutcome {
        let OnboardingStep::Disease(DiseaseStage::Yes(form)) = &mut self.step else {
            return self.not_applicable("submit_disease");
        };
        match form.submit() {
            Ok(list) => {
                self.profile.disease = Some(DiseaseRecord::Present(list));
                self.complete().await
            }
            Err(errors) => StepOutcome::Rejected(errors),
        }
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Context-sensitive back: collapse a revealed form, clear the disease
    /// answer, or fall back to the previous top-level step.
    pub fn back(&mut self) -> StepOutcome {
        let next = match &self.step {
            OnboardingStep::Basic(_) => {
                info!("Leaving onboarding");
                return StepOutcome::Exited(Route::Login);
            }
            OnboardingStep::Complete => return StepOutcome::Stayed,
            OnboardingStep::Allergy(AllergyStage::Detail(_)) => {
                self.step = OnboardingStep::Allergy(AllergyStage::Choosing);
                return StepOutcome::Revealed;
            }
            OnboardingStep::Medication(MedicationStage::Detail(_)) => {
                self.step = OnboardingStep::Medication(MedicationStage::Choosing);
                return StepOutcome::Revealed;
            }
            OnboardingStep::Disease(DiseaseStage::Yes(_)) => {
                self.step = OnboardingStep::Disease(DiseaseStage::Unset);
                return StepOutcome::Revealed;
            }
            OnboardingStep::Allergy(AllergyStage::Choosing) => {
                let form = self
                    .profile
                    .basic
                    .as_ref()
                    .map(BasicInfoForm::from)
                    .unwrap_or_default();
                OnboardingStep::Basic(LiveForm::new(form))
            }
            OnboardingStep::Medication(MedicationStage::Choosing) => {
                OnboardingStep::Allergy(AllergyStage::Choosing)
            }
            OnboardingStep::Disease(DiseaseStage::Unset) => {
                OnboardingStep::Medication(MedicationStage::Choosing)
            }
        };
        self.enter(next)
    }

    /// The only forward action of the terminal step.
    pub fn proceed(&self) -> Option<Route> {
        self.kind().is_terminal().then_some(Route::SearchMap)
    }

    /// Snapshot for a status endpoint or debug view.
    pub fn status(&self) -> OnboardingStatus {
        OnboardingStatus {
            step: self.kind(),
            detail_shown: self.step.detail_shown(),
            primary_action_enabled: self.primary_action_enabled(),
            profile: serde_json::Value::Object(self.profile.to_json_fields()),
            persisted: self.persisted,
        }
    }

    fn enter(&mut self, next: OnboardingStep) -> StepOutcome {
        let from = self.kind();
        let to = next.kind();
        self.step = next;
        info!(from = %from, to = %to, "Onboarding step changed");
        StepOutcome::Moved(to)
    }

    async fn complete(&mut self) -> StepOutcome {
        let outcome = self.enter(OnboardingStep::Complete);
        self.persisted = Some(self.repo.complete_registration(&self.profile).await);
        outcome
    }

    fn not_applicable(&self, action: &str) -> StepOutcome {
        debug!(action, step = %self.kind(), "Action not applicable to current step");
        StepOutcome::Stayed
    }
}

/// Onboarding status snapshot.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OnboardingStatus {
    pub step: StepKind,
    pub detail_shown: bool,
    pub primary_action_enabled: bool,
    pub profile: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<PersistOutcome>,
}
