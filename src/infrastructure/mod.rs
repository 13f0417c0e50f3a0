pub mod cdp_surface;
pub mod js_executor;
pub mod surface;

pub use cdp_surface::CdpSurface;
pub use js_executor::JsExecutor;
pub use surface::EditorSurface;
