pub mod classifier;
pub mod csv_writer;
pub mod email_generator;
pub mod retry;
pub mod speaker_source;

pub use classifier::{Classification, ClassificationPolicy, ClassificationStage, ClassificationStrategy};
pub use csv_writer::CsvWriter;
pub use email_generator::EmailGenerator;
pub use retry::{with_retry, RetryPolicy};
pub use speaker_source::SpeakerSource;
