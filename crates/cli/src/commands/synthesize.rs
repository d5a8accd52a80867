//! `kindred synthesize`: Build the briefing for a user in a fixture file.

use chrono::{DateTime, Utc};
use kindred_config::AppConfig;
use kindred_context::{FixedClock, PackReport, SynthesisEngine, SynthesizedContext};
use kindred_core::error::SynthesisError;
use kindred_core::user::AuthToken;
use kindred_sources::load_fixture;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

pub struct SynthesizeArgs {
    pub fixture: PathBuf,
    pub token: String,
    pub now: Option<String>,
    pub json: bool,
}

pub async fn run(args: SynthesizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let source = load_fixture(&args.fixture)?;

    let mut engine = SynthesisEngine::new(Arc::new(source), &config)?;
    if let Some(raw) = &args.now {
        let at = parse_now(raw).map_err(|e| format!("Invalid --now '{raw}': {e}"))?;
        engine = engine.with_clock(Arc::new(FixedClock(at)));
    }

    let token = AuthToken::new(args.token);
    let call = engine.synthesize_report(&token, engine.now());
    let (context, report) = match tokio::time::timeout(config.sources.call_timeout(), call).await {
        Ok(Ok(composition)) => (composition.context, Some(composition.report)),
        Ok(Err(SynthesisError::Unauthorized(reason))) => {
            warn!(%reason, "Unauthorized, using fallback context");
            (SynthesizedContext::fallback(engine.companion_name()), None)
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            warn!(
                after_ms = config.sources.call_timeout_ms,
                "Synthesis timed out, using fallback context"
            );
            (SynthesizedContext::fallback(engine.companion_name()), None)
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&context)?);
    } else {
        println!("{}", render_text(&context, report.as_ref()));
    }
    Ok(())
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(raw.trim())?.with_timezone(&Utc))
}

fn render_text(context: &SynthesizedContext, report: Option<&PackReport>) -> String {
    let mut out = String::new();
    out.push_str(&format!("💬 {}\n", context.opening_message));
    if let Some(name) = &context.display_name {
        out.push_str(&format!("   User: {name}\n"));
    }
    match report {
        Some(r) => {
            out.push_str(&format!(
                "\n── Context ({}/{} chars, {} kept, {} dropped{}) ──\n",
                r.used,
                r.budget,
                r.kept,
                r.dropped.len(),
                if r.truncated { ", truncated" } else { "" }
            ));
        }
        None => out.push_str("\n── Context (fallback) ──\n"),
    }
    out.push_str(&context.packed_context);
    out
}
