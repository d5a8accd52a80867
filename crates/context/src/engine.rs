//! The synthesis engine: aggregate, derive, pack, render.
//!
//! One engine is built from config at startup and shared across calls.
//! It holds no per-user state: every call builds its own snapshot and
//! throws it away afterwards.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use kindred_config::AppConfig;
use kindred_core::error::{Result, SynthesisError};
use kindred_core::source::UserDataSource;
use kindred_core::user::AuthToken;
use std::sync::Arc;
use tracing::{debug, info};

use crate::aggregator::Aggregator;
use crate::briefing::{BriefingInput, build_fragments};
use crate::clock::{Clock, SystemClock};
use crate::fusion::{FusionLimits, fuse_facts};
use crate::packer::{BudgetPacker, PackReport};
use crate::persona::select_style;
use crate::renderer::{SynthesizedContext, display_name, opening_message};
use crate::snapshot::UserSnapshot;
use crate::temporal::{
    EventWindow, LastContact, RecencyBands, classify_last_contact, event_signals, last_session_mood,
};

/// Output of the pure half of a synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub context: SynthesizedContext,
    pub last_contact: LastContact,
    pub report: PackReport,
}

pub struct SynthesisEngine {
    source: Arc<dyn UserDataSource>,
    clock: Arc<dyn Clock>,
    aggregator: Aggregator,
    packer: BudgetPacker,
    limits: FusionLimits,
    bands: RecencyBands,
    window: EventWindow,
    offset: FixedOffset,
    companion: String,
    max_emotion_tags: usize,
    streak_min: u32,
}

impl SynthesisEngine {
    /// Build an engine, rejecting configs that fail validation.
    pub fn new(source: Arc<dyn UserDataSource>, config: &AppConfig) -> Result<Self> {
        config.validate().map_err(|e| SynthesisError::Config {
            message: e.to_string(),
        })?;
        let offset = FixedOffset::east_opt(config.companion.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix());
        Ok(Self {
            source,
            clock: Arc::new(SystemClock),
            aggregator: Aggregator::from_config(config),
            packer: BudgetPacker::new(config.synthesis.budget_chars),
            limits: FusionLimits {
                max_facts: config.synthesis.max_facts,
                session_summary_limit: config.synthesis.session_summary_limit,
            },
            bands: RecencyBands::from_config(&config.recency),
            window: EventWindow::from_config(&config.synthesis),
            offset,
            companion: config.companion.name.clone(),
            max_emotion_tags: config.synthesis.max_emotion_tags,
            streak_min: config.synthesis.streak_highlight_min,
        })
    }

    /// Replace the wall clock, e.g. with a [`FixedClock`](crate::clock::FixedClock).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn companion_name(&self) -> &str {
        &self.companion
    }

    /// Current instant according to the engine's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Build the briefing and greeting for the user behind `token`.
    ///
    /// Fails only with `Unauthorized`; every source problem degrades the
    /// context instead.
    pub async fn synthesize_context(&self, token: &AuthToken) -> Result<SynthesizedContext> {
        self.synthesize_at(token, self.clock.now()).await
    }

    /// Same as [`synthesize_context`](Self::synthesize_context) at an explicit instant.
    pub async fn synthesize_at(&self, token: &AuthToken, now: DateTime<Utc>) -> Result<SynthesizedContext> {
        Ok(self.synthesize_report(token, now).await?.context)
    }

    /// Full synthesis, keeping the pack report and contact band.
    pub async fn synthesize_report(&self, token: &AuthToken, now: DateTime<Utc>) -> Result<Composition> {
        let local = now.with_timezone(&self.offset);
        let snapshot = self
            .aggregator
            .collect(self.source.as_ref(), token, local.date_naive())
            .await?;
        let composition = self.compose(&snapshot, local);

        info!(
            user = %snapshot.user_id,
            contact = ?composition.last_contact,
            chars = composition.report.used,
            degraded = snapshot.is_degraded(),
            "Context synthesized"
        );
        Ok(composition)
    }

    /// The pure part: snapshot and local time in, briefing and greeting out.
    pub fn compose(&self, snapshot: &UserSnapshot, now: DateTime<FixedOffset>) -> Composition {
        let fused = fuse_facts(snapshot, &self.limits);
        let last_contact = classify_last_contact(&snapshot.recent_sessions, now, &self.bands);
        let events = event_signals(&snapshot.events, now, &self.window);
        let style = select_style(&snapshot.profile, &snapshot.interests);
        let name = display_name(snapshot);

        debug!(
            facts = fused.facts.len(),
            events = events.len(),
            contact = ?last_contact,
            "Signals derived"
        );

        let fragments = build_fragments(&BriefingInput {
            snapshot,
            now,
            display_name: name.as_deref(),
            last_contact,
            last_mood: last_session_mood(&snapshot.recent_sessions, self.max_emotion_tags),
            events: &events,
            style,
            facts: &fused,
            streak_min: self.streak_min,
        });
        let packed = self.packer.pack(fragments);
        let opening = opening_message(last_contact, name.as_deref(), &self.companion);

        Composition {
            context: SynthesizedContext {
                display_name: name,
                packed_context: packed.text,
                opening_message: opening,
            },
            last_contact,
            report: packed.report,
        }
    }
}
