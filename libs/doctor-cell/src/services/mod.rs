pub mod doctor;

pub use doctor::{DoctorReferences, DoctorService};
