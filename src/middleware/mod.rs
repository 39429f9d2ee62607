pub mod interceptor;
pub mod logging;

pub use interceptor::AuthInterceptor;
pub use logging::*;
