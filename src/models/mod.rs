pub mod auth;
pub mod envelope;
pub mod outcome;

pub use auth::{AuthEndpoint, LoginRequest, ResendOtpRequest, VerifyOtpRequest};
pub use envelope::ApiEnvelope;
pub use outcome::AuthOutcome;
