// Trigger-rule tester
//
// Collects a draft rule, asks the server which recent feedback it would have matched and turns
// each match into a display row with dashboard links.

use super::transport::{HttpTransport, TransportError};
use crate::models::requests::{TriggerRuleMatchRequest, UrlExists};
use crate::models::responses::{MatchRecord, TriggerRuleMatchResponse};
use crate::ui::widgets::format_template;
use crate::utils::logging::describe_text;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{error, info};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const FETCH_ERROR_MESSAGE: &str =
    "Unknown error when fetching matches. Sorry this is unhelpful.";

const DESCRIPTION_LIMIT: usize = 200;

/// Draft rule as entered in the tester. Text fields hold one entry per line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TriggerRuleForm {
    pub locales: String,
    pub products: Vec<String>,
    pub versions: String,
    pub keywords: String,
    pub url_exists: UrlExists,
}

impl TriggerRuleForm {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file {:?}", path))?;
        toml::from_str(&raw).with_context(|| format!("Failed to parse rule file {:?}", path))
    }

    /// Lines are split on `\n` as typed; an empty box yields `[""]`.
    pub fn to_request(&self) -> TriggerRuleMatchRequest {
        let lines = |s: &str| s.split('\n').map(str::to_string).collect::<Vec<_>>();
        TriggerRuleMatchRequest {
            locales: lines(&self.locales),
            products: self.products.clone(),
            versions: lines(&self.versions),
            keywords: lines(&self.keywords),
            url_exists: self.url_exists.as_filter(),
        }
    }
}

#[async_trait]
pub trait TriggerRuleTransport: Send + Sync {
    async fn match_rule(
        &self,
        request: &TriggerRuleMatchRequest,
    ) -> Result<TriggerRuleMatchResponse, TransportError>;
}

#[async_trait]
impl TriggerRuleTransport for HttpTransport {
    async fn match_rule(
        &self,
        request: &TriggerRuleMatchRequest,
    ) -> Result<TriggerRuleMatchResponse, TransportError> {
        self.post_json(&self.trigger_match_url, request).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchLinks {
    pub date: String,
    pub product: String,
    pub version: String,
    pub platform: String,
    pub locale: String,
    pub permalink: String,
}

/// One matched response, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchView {
    pub id: i64,
    pub sentiment: &'static str,
    pub created: String,
    pub description: String,
    pub product: String,
    pub version: String,
    pub platform: String,
    pub locale: String,
    pub links: MatchLinks,
}

impl MatchView {
    pub fn from_record(record: &MatchRecord) -> Self {
        let date: String = record.created.chars().take(10).collect();
        let description = if record.description.chars().count() > DESCRIPTION_LIMIT {
            let head: String = record.description.chars().take(DESCRIPTION_LIMIT).collect();
            format!("{}....", head)
        } else {
            record.description.clone()
        };

        let args: HashMap<&str, String> = HashMap::from([
            ("id", record.id.to_string()),
            ("date", date),
            ("product", record.product.clone()),
            ("version", record.version.clone()),
            ("platform", record.platform.clone()),
            ("locale", record.locale.clone()),
        ]);
        let links = MatchLinks {
            date: format_template("/?date_end={date}&date_start={date}", &args),
            product: format_template("/?product={product}", &args),
            version: format_template("/?product={product}&version={version}", &args),
            platform: format_template("/?platform={platform}", &args),
            locale: format_template("/?locale={locale}", &args),
            permalink: format_template("/dashboard/response/{id}", &args),
        };

        Self {
            id: record.id,
            sentiment: if record.happy { "happy" } else { "sad" },
            created: record.created.clone(),
            description,
            product: record.product.clone(),
            version: record.version.clone(),
            platform: record.platform.clone(),
            locale: record.locale.clone(),
            links,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("[{}] #{} {}", self.sentiment, self.id, self.description),
            format!("    {} ({})", self.created, self.links.date),
            format!(
                "    {} {} ({} | {})",
                self.product, self.version, self.links.product, self.links.version
            ),
            format!("    {} ({})", self.platform, self.links.platform),
            format!("    {} ({})", self.locale, self.links.locale),
            format!("    permalink {}", self.links.permalink),
        ]
    }
}

pub fn summary_line(count: u64) -> String {
    format!("There were {} matches.", count)
}

/// Result area of the tester: cleared before each run, filled or failed after.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchPanel {
    pub working: bool,
    pub summary: Option<String>,
    pub matches: Vec<MatchView>,
    pub error: Option<String>,
}

impl MatchPanel {
    pub fn reset(&mut self) {
        *self = MatchPanel::default();
    }

    pub async fn run(&mut self, form: &TriggerRuleForm, transport: &dyn TriggerRuleTransport) {
        self.reset();
        self.working = true;

        let request = form.to_request();
        info!(
            "[PHASE: triggerrule] [STEP: match] Testing rule: {} keyword line(s), {} product(s), keywords {}",
            request.keywords.len(),
            request.products.len(),
            describe_text(&form.keywords)
        );

        match transport.match_rule(&request).await {
            Ok(resp) => {
                info!(
                    "[PHASE: triggerrule] [STEP: match] {} match(es), {} returned",
                    resp.count,
                    resp.results.len()
                );
                self.summary = Some(summary_line(resp.count));
                self.matches = resp.results.iter().map(MatchView::from_record).collect();
            }
            Err(e) => {
                error!("[PHASE: triggerrule] [STEP: match] Match request failed: {}", e);
                self.error = Some(FETCH_ERROR_MESSAGE.to_string());
            }
        }
        self.working = false;
    }

    pub fn lines(&self) -> Vec<String> {
        if let Some(err) = &self.error {
            return vec![err.clone()];
        }
        let mut out: Vec<String> = self.summary.iter().cloned().collect();
        for m in &self.matches {
            out.extend(m.lines());
        }
        out
    }
}
