//! Search/dispatch screen state machine.
//!
//! Pre-search the user describes symptoms and picks a patient. Searching
//! opens the hospital sheet, where hospitals are selected (single or multi
//! mode) and "called". The call is simulated: the screen sits in
//! `Connecting` until [`SearchScreen::complete_dispatch`] is invoked, which
//! reveals the second wave of hospitals and keeps the selection.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::model::{HospitalListing, PatientProfile, default_patients, first_wave, second_wave};
use super::sheet::DraggableSheet;
use crate::config::AppConfig;

pub const EMPTY_SYMPTOM_TOAST: &str = "증상을 입력해주세요.";
pub const NO_PATIENT_TOAST: &str = "환자를 선택해주세요.";
pub const NO_HOSPITAL_TOAST: &str = "연락할 병원을 선택해주세요.";

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Single,
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPhase {
    /// Selecting hospitals, nothing called yet.
    Idle,
    /// Simulated call in progress.
    Connecting,
    /// Call finished; second-wave hospitals revealed.
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The hospital sheet is open.
    Opened,
    Rejected(Toast),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Now connecting to these hospitals.
    Connecting(Vec<u32>),
    Rejected(Toast),
    /// Not applicable in the current phase.
    Ignored,
}

/// Screen-level tunables.
#[derive(Debug, Clone, Copy)]
pub struct ScreenConfig {
    pub symptom_max_chars: usize,
    pub drag_threshold_px: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ScreenConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            symptom_max_chars: config.symptom_max_chars,
            drag_threshold_px: config.drag_threshold_px,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchScreen {
    config: ScreenConfig,
    symptom: String,
    patients: Vec<PatientProfile>,
    selected_patient: Option<u32>,
    sheet_open: bool,
    hospitals: Vec<HospitalListing>,
    pending_wave: Vec<HospitalListing>,
    mode: SelectionMode,
    selected: BTreeSet<u32>,
    phase: DispatchPhase,
    list_sheet: DraggableSheet,
    connecting_sheet: DraggableSheet,
    toast: Option<Toast>,
}

impl Default for SearchScreen {
    fn default() -> Self {
        Self::new(ScreenConfig::default())
    }
}

impl SearchScreen {
    /// A screen over the built-in mock hospitals and patients.
    pub fn new(config: ScreenConfig) -> Self {
        Self::with_data(config, default_patients(), first_wave(), second_wave())
    }

    pub fn with_data(
        config: ScreenConfig,
        patients: Vec<PatientProfile>,
        hospitals: Vec<HospitalListing>,
        pending_wave: Vec<HospitalListing>,
    ) -> Self {
        Self {
            config,
            symptom: String::new(),
            patients,
            selected_patient: None,
            sheet_open: false,
            hospitals,
            pending_wave,
            mode: SelectionMode::Single,
            selected: BTreeSet::new(),
            phase: DispatchPhase::Idle,
            list_sheet: DraggableSheet::new(config.drag_threshold_px),
            connecting_sheet: DraggableSheet::new(config.drag_threshold_px),
            toast: None,
        }
    }

    // ── Pre-search ──────────────────────────────────────────────────

    pub fn symptom(&self) -> &str {
        &self.symptom
    }

    /// Set the symptom text, truncated to the configured character limit.
    pub fn set_symptom(&mut self, text: &str) {
        self.symptom = text.chars().take(self.config.symptom_max_chars).collect();
    }

    pub fn patients(&self) -> &[PatientProfile] {
        &self.patients
    }

    pub fn selected_patient(&self) -> Option<&PatientProfile> {
        let id = self.selected_patient?;
        self.patients.iter().find(|p| p.id == id)
    }

    /// Tap a patient chip: selects it, or clears it when already selected.
    pub fn select_patient(&mut self, id: u32) -> bool {
        if !self.patients.iter().any(|p| p.id == id) {
            return false;
        }
        if self.selected_patient == Some(id) {
            self.selected_patient = None;
        } else {
            self.selected_patient = Some(id);
        }
        true
    }

    /// Open the hospital sheet, or reject with a toast and change nothing else.
    pub fn submit_search(&mut self) -> SearchOutcome {
        if self.symptom.trim().is_empty() {
            return SearchOutcome::Rejected(self.show_toast(EMPTY_SYMPTOM_TOAST));
        }
        if self.selected_patient.is_none() {
            return SearchOutcome::Rejected(self.show_toast(NO_PATIENT_TOAST));
        }
        self.sheet_open = true;
        info!(
            patient = ?self.selected_patient,
            symptom_chars = self.symptom.chars().count(),
            "Hospital search opened"
        );
        SearchOutcome::Opened
    }

    pub fn is_sheet_open(&self) -> bool {
        self.sheet_open
    }

    // ── Selection ───────────────────────────────────────────────────

    /// Visible hospitals; empty until the search sheet opens.
    pub fn hospitals(&self) -> &[HospitalListing] {
        if self.sheet_open { &self.hospitals } else { &[] }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn selected(&self) -> &BTreeSet<u32> {
        &self.selected
    }

    pub fn enter_multi_select(&mut self) {
        self.mode = SelectionMode::Multi;
    }

    /// Back to single-select. Clears the selection.
    pub fn exit_multi_select(&mut self) {
        if self.mode == SelectionMode::Multi {
            self.mode = SelectionMode::Single;
            self.selected.clear();
        }
    }

    /// Tap a hospital card. Returns whether the selection changed.
    pub fn tap_hospital(&mut self, id: u32) -> bool {
        if !self.sheet_open || self.phase == DispatchPhase::Connecting {
            return false;
        }
        let Some(hospital) = self.hospitals.iter().find(|h| h.id == id) else {
            return false;
        };
        if !hospital.is_selectable() {
            debug!(
                hospital = id,
                status = ?hospital.status,
                "Ignoring tap on unavailable hospital"
            );
            return false;
        }
        match self.mode {
            SelectionMode::Single => {
                let was_only = self.selected.len() == 1 && self.selected.contains(&id);
                self.selected.clear();
                if !was_only {
                    self.selected.insert(id);
                }
            }
            SelectionMode::Multi => {
                if !self.selected.remove(&id) {
                    self.selected.insert(id);
                }
            }
        }
        true
    }

    // ── Dispatch ────────────────────────────────────────────────────

    pub fn phase(&self) -> DispatchPhase {
        self.phase
    }

    /// Start the simulated call to the selected hospitals.
    pub fn dispatch(&mut self) -> DispatchOutcome {
        if !self.sheet_open || self.phase == DispatchPhase::Connecting {
            return DispatchOutcome::Ignored;
        }
        if self.selected.is_empty() {
            return DispatchOutcome::Rejected(self.show_toast(NO_HOSPITAL_TOAST));
        }
        self.phase = DispatchPhase::Connecting;
        self.connecting_sheet.expand();
        let ids: Vec<u32> = self.selected.iter().copied().collect();
        info!(hospitals = ?ids, "Connecting to hospitals");
        DispatchOutcome::Connecting(ids)
    }

    /// Resolve the call: reveal the second wave, keep the selection.
    /// Returns how many listings were revealed.
    pub fn complete_dispatch(&mut self) -> usize {
        if self.phase != DispatchPhase::Connecting {
            return 0;
        }
        self.phase = DispatchPhase::Completed;
        let revealed = self.pending_wave.len();
        self.hospitals.append(&mut self.pending_wave);
        info!(revealed, "Dispatch completed");
        revealed
    }

    // ── Sheets & toast ──────────────────────────────────────────────

    pub fn list_sheet(&self) -> &DraggableSheet {
        &self.list_sheet
    }

    pub fn list_sheet_mut(&mut self) -> &mut DraggableSheet {
        &mut self.list_sheet
    }

    pub fn connecting_sheet(&self) -> &DraggableSheet {
        &self.connecting_sheet
    }

    pub fn connecting_sheet_mut(&mut self) -> &mut DraggableSheet {
        &mut self.connecting_sheet
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// Replace any visible toast.
    pub fn show_toast(&mut self, message: &str) -> Toast {
        let toast = Toast {
            id: Uuid::new_v4(),
            message: message.to_string(),
        };
        debug!(message, "Toast shown");
        self.toast = Some(toast.clone());
        toast
    }

    /// Dismiss the toast, only if it is still the one identified by `id`.
    pub fn dismiss_toast(&mut self, id: Uuid) -> bool {
        if self.toast.as_ref().is_some_and(|t| t.id == id) {
            self.toast = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened() -> SearchScreen {
        let mut screen = SearchScreen::default();
        screen.set_symptom("가슴이 답답하고 숨이 차요");
        screen.select_patient(1);
        assert_eq!(screen.submit_search(), SearchOutcome::Opened);
        screen
    }

    #[test]
    fn empty_symptom_toasts_regardless_of_patient() {
        for patient in [None, Some(1)] {
            let mut screen = SearchScreen::default();
            screen.set_symptom("   ");
            if let Some(id) = patient {
                screen.select_patient(id);
            }
            let SearchOutcome::Rejected(toast) = screen.submit_search() else {
                panic!("expected rejection");
            };
            assert_eq!(toast.message, EMPTY_SYMPTOM_TOAST);
            assert!(!screen.is_sheet_open());
            assert!(screen.hospitals().is_empty());
            assert_eq!(screen.toast(), Some(&toast));
        }
    }

    #[test]
    fn missing_patient_toasts() {
        let mut screen = SearchScreen::default();
        screen.set_symptom("두통");
        let SearchOutcome::Rejected(toast) = screen.submit_search() else {
            panic!("expected rejection");
        };
        assert_eq!(toast.message, NO_PATIENT_TOAST);
        assert!(!screen.is_sheet_open());
    }

    #[test]
    fn symptom_is_bounded() {
        let mut screen = SearchScreen::new(ScreenConfig {
            symptom_max_chars: 5,
            drag_threshold_px: 150.0,
        });
        screen.set_symptom("머리가 아파요 많이");
        assert_eq!(screen.symptom(), "머리가 아");
    }

    #[test]
    fn patient_chip_toggles() {
        let mut screen = SearchScreen::default();
        assert!(screen.select_patient(2));
        assert_eq!(screen.selected_patient().unwrap().label, "가족");
        assert!(screen.select_patient(2));
        assert!(screen.selected_patient().is_none());
        assert!(!screen.select_patient(99));
    }

    #[test]
    fn single_select_keeps_one() {
        let mut screen = opened();
        assert!(screen.tap_hospital(1));
        assert!(screen.tap_hospital(3));
        assert_eq!(screen.selected().iter().copied().collect::<Vec<_>>(), vec![3]);
        assert!(screen.tap_hospital(3));
        assert!(screen.selected().is_empty());
    }

    #[test]
    fn multi_select_toggles_membership() {
        let mut screen = opened();
        screen.enter_multi_select();
        screen.tap_hospital(1);
        screen.tap_hospital(3);
        screen.tap_hospital(5);
        screen.tap_hospital(3);
        assert_eq!(screen.selected().iter().copied().collect::<Vec<_>>(), vec![1, 5]);

        screen.exit_multi_select();
        assert_eq!(screen.mode(), SelectionMode::Single);
        assert!(screen.selected().is_empty());
    }

    #[test]
    fn full_and_closed_are_inert() {
        let mut screen = opened();
        screen.enter_multi_select();
        assert!(!screen.tap_hospital(2));
        assert!(!screen.tap_hospital(4));
        assert!(screen.selected().is_empty());
    }

    #[test]
    fn taps_before_search_are_ignored() {
        let mut screen = SearchScreen::default();
        assert!(!screen.tap_hospital(1));
        assert_eq!(screen.dispatch(), DispatchOutcome::Ignored);
    }

    #[test]
    fn dispatch_requires_selection() {
        let mut screen = opened();
        let DispatchOutcome::Rejected(toast) = screen.dispatch() else {
            panic!("expected rejection");
        };
        assert_eq!(toast.message, NO_HOSPITAL_TOAST);
        assert_eq!(screen.phase(), DispatchPhase::Idle);
    }

    #[test]
    fn completed_dispatch_reveals_second_wave_and_keeps_selection() {
        let mut screen = opened();
        screen.enter_multi_select();
        screen.tap_hospital(1);
        screen.tap_hospital(5);
        assert_eq!(screen.dispatch(), DispatchOutcome::Connecting(vec![1, 5]));
        assert_eq!(screen.phase(), DispatchPhase::Connecting);

        // Selection is frozen while connecting.
        assert!(!screen.tap_hospital(3));
        assert_eq!(screen.dispatch(), DispatchOutcome::Ignored);

        let before = screen.hospitals().len();
        assert_eq!(screen.complete_dispatch(), 3);
        assert_eq!(screen.phase(), DispatchPhase::Completed);
        assert_eq!(screen.hospitals().len(), before + 3);
        assert_eq!(screen.selected().iter().copied().collect::<Vec<_>>(), vec![1, 5]);
        assert_eq!(screen.complete_dispatch(), 0);

        // Newly revealed hospitals can be selected.
        assert!(screen.tap_hospital(7));
    }

    #[test]
    fn stale_toast_dismissal_is_ignored() {
        let mut screen = SearchScreen::default();
        let first = screen.show_toast("one");
        let second = screen.show_toast("two");
        assert!(!screen.dismiss_toast(first.id));
        assert_eq!(screen.toast(), Some(&second));
        assert!(screen.dismiss_toast(second.id));
        assert!(screen.toast().is_none());
    }

    #[test]
    fn sheets_drag_independently() {
        let mut screen = opened();
        let sheet = screen.list_sheet_mut();
        sheet.drag_start(0.0);
        sheet.drag_move(200.0);
        sheet.drag_end();
        assert!(screen.list_sheet().is_minimized());
        assert!(!screen.connecting_sheet().is_minimized());
    }
}
