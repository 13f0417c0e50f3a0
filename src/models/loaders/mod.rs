pub mod payload_loader;

pub use payload_loader::{load_job, load_locator_profile, parse_job_document};
