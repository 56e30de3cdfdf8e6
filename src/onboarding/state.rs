//! Onboarding state machine — which step the user is on and what it holds.

use serde::{Deserialize, Serialize};

use super::forms::{AllergyForm, BasicInfoForm, DiseaseForm, MedicationForm};
use super::model::DiseaseChoice;
use crate::validation::LiveForm;

/// The top-level onboarding steps.
///
/// Progresses linearly: Basic → Allergy → Medication → Disease → Complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Basic,
    Allergy,
    Medication,
    Disease,
    Complete,
}

impl StepKind {
    /// Check if a forward transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: StepKind) -> bool {
        self.next() == Some(target)
    }

    /// Whether this step is terminal (onboarding is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<StepKind> {
        use StepKind::*;
        match self {
            Basic => Some(Allergy),
            Allergy => Some(Medication),
            Medication => Some(Disease),
            Disease => Some(Complete),
            Complete => None,
        }
    }

    /// Get the previous top-level step, if any. `Complete` has no way back.
    pub fn previous(&self) -> Option<StepKind> {
        use StepKind::*;
        match self {
            Basic | Complete => None,
            Allergy => Some(Basic),
            Medication => Some(Allergy),
            Disease => Some(Medication),
        }
    }

    /// 1-based position for a progress indicator; `None` once complete.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Basic => Some(1),
            Self::Allergy => Some(2),
            Self::Medication => Some(3),
            Self::Disease => Some(4),
            Self::Complete => None,
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Basic => "basic",
            Self::Allergy => "allergy",
            Self::Medication => "medication",
            Self::Disease => "disease",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Allergy step: the yes/no question, or the revealed detail form.
#[derive(Debug, Clone)]
pub enum AllergyStage {
    Choosing,
    Detail(LiveForm<AllergyForm>),
}

/// Medication step: the yes/no question, or the revealed list editor.
#[derive(Debug, Clone)]
pub enum MedicationStage {
    Choosing,
    Detail(LiveForm<MedicationForm>),
}

/// Disease step: no answer yet, or "yes" with the list editor.
///
/// "No" never rests here: it completes the flow immediately.
#[derive(Debug, Clone)]
pub enum DiseaseStage {
    Unset,
    Yes(LiveForm<DiseaseForm>),
}

/// The current step together with its step-specific payload.
#[derive(Debug, Clone)]
pub enum OnboardingStep {
    Basic(LiveForm<BasicInfoForm>),
    Allergy(AllergyStage),
    Medication(MedicationStage),
    Disease(DiseaseStage),
    Complete,
}

impl Default for OnboardingStep {
    fn default() -> Self {
        Self::Basic(LiveForm::default())
    }
}

impl OnboardingStep {
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Basic(_) => StepKind::Basic,
            Self::Allergy(_) => StepKind::Allergy,
            Self::Medication(_) => StepKind::Medication,
            Self::Disease(_) => StepKind::Disease,
            Self::Complete => StepKind::Complete,
        }
    }

    /// Whether a detail form is currently revealed inside a yes/no step.
    pub fn detail_shown(&self) -> bool {
        matches!(
            self,
            Self::Allergy(AllergyStage::Detail(_))
                | Self::Medication(MedicationStage::Detail(_))
                | Self::Disease(DiseaseStage::Yes(_))
        )
    }

    /// Disease answer as a three-way value (`Unset` outside the disease step).
    pub fn disease_choice(&self) -> DiseaseChoice {
        match self {
            Self::Disease(DiseaseStage::Yes(_)) => DiseaseChoice::Yes,
            _ => DiseaseChoice::Unset,
        }
    }

    /// Enabled state of the step's primary ("next") action.
    ///
    /// The medication action is disabled only while the list editor is shown
    /// and invalid: an unanswered or "no" top-level choice leaves it enabled.
    pub fn primary_action_enabled(&self) -> bool {
        match self {
            Self::Basic(form) => form.is_valid(),
            Self::Allergy(AllergyStage::Choosing) => false,
            Self::Allergy(AllergyStage::Detail(form)) => form.is_valid(),
            Self::Medication(MedicationStage::Choosing) => true,
            Self::Medication(MedicationStage::Detail(form)) => form.is_valid(),
            Self::Disease(DiseaseStage::Unset) => false,
            Self::Disease(DiseaseStage::Yes(form)) => form.is_valid(),
            Self::Complete => true,
        }
    }
}
