//! OpenSubsonic catalog backend.

pub mod models;
pub mod provider;

pub use provider::SubsonicSession;
