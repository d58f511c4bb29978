pub mod types;
pub mod queries;
pub mod extract;
pub mod normalize;

pub use types::*;
pub use queries::*;
pub use extract::extract_submission;
pub use normalize::normalize_end_date;
