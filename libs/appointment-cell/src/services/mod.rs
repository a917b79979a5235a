pub mod appointment;
pub mod availability;
pub mod dashboard;
pub mod guard;

pub use appointment::AppointmentService;
pub use availability::{slots_overlap, AvailabilityService, SLOT_MINUTES};
pub use dashboard::DashboardService;
pub use guard::OpenAppointmentGuard;
