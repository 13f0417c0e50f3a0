pub mod caption;
pub mod job;
pub mod loaders;
pub mod locator;

pub use caption::{CaptionEntry, CaptionTime, ScriptText};
pub use job::Job;
pub use loaders::{load_job, load_locator_profile};
pub use locator::{Locator, LocatorChain, LocatorProfile};
