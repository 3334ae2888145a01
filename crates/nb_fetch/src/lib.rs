use std::time::Duration;

use nb_core::http::{DEFAULT_API_URL, DEFAULT_TIMEOUT};

pub mod cli;
pub mod logging;
pub mod manager;
pub mod news;

pub use cli::{handle_command, BriefingArgs, BriefingCommands};
pub use manager::{BriefingManager, GeneratedBriefing};
pub use news::RemoteNewsSource;

/// Articles kept per topic when building a briefing.
pub const ARTICLES_PER_TOPIC: usize = 3;

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub articles_per_topic: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            articles_per_topic: ARTICLES_PER_TOPIC,
        }
    }
}

pub mod prelude {
    pub use super::manager::{BriefingManager, GeneratedBriefing};
    pub use super::news::RemoteNewsSource;
    pub use super::FetchConfig;
    pub use nb_core::{Article, BriefingConfig, Error, NewsSource, Result};
}
