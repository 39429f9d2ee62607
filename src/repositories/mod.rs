pub mod session_repo;

pub use session_repo::{
    FileSessionRepository, InMemorySessionRepository, SessionRepository, StoredSession,
};
