pub mod patient;

pub use patient::{PatientReferences, PatientService};
