pub mod manager;

pub use manager::{SessionContext, SessionManager};
