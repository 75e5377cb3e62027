//! OpenSubsonic track resolution.
//!
//! Given a [`SearchQuery`], [`TrackResolver`] searches an OpenSubsonic catalog
//! through a sticky [`SessionPool`], scores every result against the query,
//! and hands out the best match with a stream URL while scrobbling it.

pub mod config;
pub mod errors;
pub mod matching;
pub mod models;
pub mod playback_notifier;
pub mod providers;
pub mod resolver;
pub mod session_pool;
pub mod subsonic;

pub use config::ResolverConfig;
pub use errors::ResolveError;
pub use models::{Candidate, OrderBy, Quality, SearchQuery};
pub use resolver::TrackResolver;
pub use session_pool::SessionPool;
