pub mod asset_stager;
pub mod element_locator;
pub mod report_writer;

pub use asset_stager::AssetStager;
pub use element_locator::ElementLocator;
pub use report_writer::ReportWriter;
