// Application context
//
// Built once per run and handed to every component that needs configuration, the cache or a
// transport. Nothing here is process-global.

use crate::api::transport::{FeedbackTransport, HttpTransport};
use crate::api::triggerrule::TriggerRuleTransport;
use crate::cards::history::MemoryHistory;
use crate::feedback::cache::{JsonFileCache, LocalCache, MemoryCache};
use crate::feedback::wizard::WizardKind;
use crate::feedback::FeedbackForm;
use crate::models::settings::Settings;
use anyhow::{Context, Result};
use log::warn;
use std::sync::Arc;

pub struct AppContext {
    settings: Settings,
    http: Arc<HttpTransport>,
}

impl AppContext {
    pub fn new(settings: Settings) -> Result<Self> {
        let http = HttpTransport::from_settings(&settings).context("Failed to set up HTTP")?;
        Ok(Self {
            settings,
            http: Arc::new(http),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn feedback_transport(&self) -> Arc<dyn FeedbackTransport> {
        self.http.clone()
    }

    pub fn rule_transport(&self) -> Arc<dyn TriggerRuleTransport> {
        self.http.clone()
    }

    /// The on-disk cache, or an in-memory one if the file can't be opened.
    pub fn open_cache(&self) -> Box<dyn LocalCache> {
        let path = self.settings.cache_path();
        match JsonFileCache::open(&path) {
            Ok(cache) => Box::new(cache),
            Err(e) => {
                warn!(
                    "[PHASE: cache] [STEP: open] Falling back to memory cache ({:?}): {}",
                    path, e
                );
                Box::new(MemoryCache::new())
            }
        }
    }

    pub fn feedback_form(
        &self,
        kind: WizardKind,
        search: &str,
        fragment: &str,
    ) -> Result<FeedbackForm> {
        FeedbackForm::new(
            kind,
            &self.settings,
            self.open_cache(),
            search,
            MemoryHistory::new(fragment),
        )
        .context("Failed to build feedback wizard")
    }
}
