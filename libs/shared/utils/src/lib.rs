pub mod clock;
pub mod test_utils;
pub mod time_format;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use validation::Validator;
