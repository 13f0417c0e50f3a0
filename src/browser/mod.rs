pub mod connection;
pub mod headless;
pub mod launcher;

pub use connection::connect_to_browser_and_page;
pub use headless::launch_browser;
pub use launcher::{ChromiumLauncher, SessionLauncher};
