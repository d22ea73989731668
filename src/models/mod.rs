pub mod category;
pub mod email;
pub mod output_row;
pub mod speaker;

pub use category::Category;
pub use email::{EmailContent, EmailLimits};
pub use output_row::OutputRow;
pub use speaker::{normalize_whitespace, SpeakerLimits, SpeakerRecord};
