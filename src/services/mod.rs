pub mod auth_service;
pub mod external;
pub mod navigation;

pub use auth_service::AuthService;
pub use external::{ApiRequest, ApiTransport, HttpConfig};
pub use navigation::{LoggingNavigator, NavigationTarget, Navigator, RecordingNavigator, RedirectReason};
