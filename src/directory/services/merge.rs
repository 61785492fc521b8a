//! Reconciliation of the primary and live agent listings.

use minijinja::Environment;
use mockable::Clock;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

use crate::directory::domain::{
    AgentId, AgentRecord, DirectoryDomainError, LiveAgentEntry, LiveAgentPayload,
};

/// Template used for the description of synthesized records.
pub const DEFAULT_LIVE_DESCRIPTION_TEMPLATE: &str = "Live agent reporting load {{ load }}";

/// Placeholder rendered when the live listing omits the load metric.
const UNKNOWN_LOAD: &str = "unknown";

/// Configuration for directory reconciliation.
///
/// # Examples
///
/// ```
/// use marshal::directory::services::DirectoryConfig;
///
/// let config = DirectoryConfig::default();
/// assert!(config.live_description_template().contains("{{ load }}"));
///
/// let custom = DirectoryConfig::with_live_description_template("{{ id }} at {{ load }}");
/// assert!(custom.is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    live_description_template: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            live_description_template: DEFAULT_LIVE_DESCRIPTION_TEMPLATE.to_owned(),
        }
    }
}

impl DirectoryConfig {
    /// Creates a configuration with a custom description template.
    ///
    /// The template is rendered with `id`, `status`, `type` and `load` in
    /// scope.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::InvalidDescriptionTemplate`] when the
    /// template does not compile.
    pub fn with_live_description_template(
        raw_template: impl Into<String>,
    ) -> Result<Self, DirectoryDomainError> {
        let live_description_template = raw_template.into();
        {
            let environment = Environment::new();
            environment
                .template_from_str(&live_description_template)
                .map_err(|err| {
                    DirectoryDomainError::InvalidDescriptionTemplate(err.to_string())
                })?;
        }
        Ok(Self {
            live_description_template,
        })
    }

    /// Returns the description template for synthesized records.
    #[must_use]
    pub fn live_description_template(&self) -> &str {
        &self.live_description_template
    }
}

/// Merges the authoritative listing with the live listing.
///
/// Primary records always come first, in their original order, and are
/// never modified. Live entries whose id is not already known are turned
/// into synthesized records and appended in their original order.
/// Malformed live entries are dropped; merging never fails.
#[derive(Clone)]
pub struct AgentDirectory<C>
where
    C: Clock + Send + Sync,
{
    config: DirectoryConfig,
    clock: Arc<C>,
}

impl<C> AgentDirectory<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a directory with the default configuration.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self::with_config(DirectoryConfig::default(), clock)
    }

    /// Creates a directory with an explicit configuration.
    #[must_use]
    pub const fn with_config(config: DirectoryConfig, clock: Arc<C>) -> Self {
        Self { config, clock }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Reconciles both listings into one deduplicated, ordered list.
    ///
    /// The clock is read once, so every record synthesized in a pass shares
    /// the same timestamp. Later duplicates of an id are dropped, whichever
    /// listing they come from.
    #[must_use]
    pub fn merge(&self, primary: Vec<AgentRecord>, live: Vec<LiveAgentEntry>) -> Vec<AgentRecord> {
        let reconciled_at = self.clock.utc();
        let environment = Environment::new();
        let mut known: HashSet<AgentId> = HashSet::with_capacity(primary.len() + live.len());
        let mut merged = Vec::with_capacity(primary.len() + live.len());
        let mut dropped = 0_usize;

        for record in primary {
            if known.insert(record.id().clone()) {
                merged.push(record);
            } else {
                tracing::warn!(
                    agent_id = %record.id(),
                    "duplicate id in primary listing, keeping first occurrence"
                );
            }
        }
        let primary_count = merged.len();

        for entry in live {
            let Some(payload) = entry.into_content() else {
                dropped += 1;
                continue;
            };
            let Ok(id) = AgentId::new(payload.id.clone()) else {
                tracing::debug!("live entry with blank id dropped");
                dropped += 1;
                continue;
            };
            if known.contains(&id) {
                tracing::debug!(agent_id = %id, "live entry shadowed by known agent");
                continue;
            }
            known.insert(id.clone());
            let description = self.describe(&environment, &payload);
            merged.push(AgentRecord::synthesize(
                id,
                payload,
                description,
                reconciled_at,
            ));
        }

        tracing::debug!(
            primary = primary_count,
            synthesized = merged.len() - primary_count,
            dropped,
            "reconciled agent directory"
        );
        merged
    }

    fn describe(&self, environment: &Environment<'_>, payload: &LiveAgentPayload) -> String {
        let context = build_description_context(payload);
        environment
            .render_str(&self.config.live_description_template, &context)
            .unwrap_or_else(|err| {
                tracing::warn!(
                    agent_id = %payload.id,
                    error = %err,
                    "live description template failed, using fallback"
                );
                fallback_description(payload)
            })
    }
}

fn build_description_context(payload: &LiveAgentPayload) -> Map<String, Value> {
    let load = payload
        .load
        .clone()
        .map_or_else(|| Value::String(UNKNOWN_LOAD.to_owned()), Value::Number);
    let mut context = Map::new();
    context.insert("id".to_owned(), Value::String(payload.id.clone()));
    context.insert("status".to_owned(), Value::String(payload.status.clone()));
    context.insert("type".to_owned(), Value::String(payload.agent_type.clone()));
    context.insert("load".to_owned(), load);
    context
}

fn fallback_description(payload: &LiveAgentPayload) -> String {
    DEFAULT_LIVE_DESCRIPTION_TEMPLATE.replace("{{ load }}", &load_text(payload))
}

fn load_text(payload: &LiveAgentPayload) -> String {
    payload
        .load
        .as_ref()
        .map_or_else(|| UNKNOWN_LOAD.to_owned(), ToString::to_string)
}
