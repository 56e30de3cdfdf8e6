//! Emergency search and dispatch.
//!
//! Symptom entry and hospital selection, then a simulated call to the
//! selected hospitals.

pub mod model;
pub mod screen;
pub mod session;
pub mod sheet;

pub use model::{HospitalListing, HospitalStatus, PatientProfile};
pub use screen::{
    DispatchOutcome, DispatchPhase, ScreenConfig, SearchOutcome, SearchScreen, SelectionMode,
    Toast,
};
pub use session::{DispatchSession, ScreenEvent};
pub use sheet::DraggableSheet;
