use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collect::snapshot_model::PageSnapshot;
use crate::fill::credential_model::{Credential, CredentialKind};
use crate::fill::error::{AutofillError, Result};
use crate::fill::generator::FillScriptGenerator;
use crate::fill::script_model::{FillScript, GenerateOptions};
use crate::trace::event::{RunSummary, TraceEvent};
use crate::trace::logger::TraceLogger;

/// Pause the replayer inserts between actions, in milliseconds.
pub const DELAY_BETWEEN_OPERATIONS_MS: u64 = 20;

// ============================================================================
// Request / outcome
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabContext {
    pub id: u64,
    pub url: String,
}

/// Snapshot collected in one frame of a tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePageDetails {
    #[serde(rename = "frameId")]
    pub frame_id: u64,
    pub tab: TabContext,
    pub details: PageSnapshot,
}

#[derive(Debug, Clone, Default)]
pub struct AutofillOptions {
    pub tab: Option<TabContext>,
    pub credential: Option<Credential>,
    pub page_details: Vec<FramePageDetails>,
    /// Generation flags; `tab_url` and `page_url` are set per frame
    pub generate: GenerateOptions,
    /// `Some(false)` withholds scripts flagged as untrusted iframes
    pub allow_untrusted_iframe: Option<bool>,
    /// Return the login's current one-time code after a fill
    pub auto_copy_totp: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutofillOutcome {
    /// `(frame id, script)` for every frame that should be filled
    pub scripts: Vec<(u64, FillScript)>,
    pub totp: Option<String>,
}

// ============================================================================
// Orchestration
// ============================================================================

/// Generate scripts for every frame of the tab. Frames from another tab or
/// address are ignored, as are empty scripts and, when the caller forbids
/// it, untrusted iframes.
pub fn do_autofill(
    generator: &FillScriptGenerator,
    options: &AutofillOptions,
    tracer: Option<&TraceLogger>,
) -> Result<AutofillOutcome> {
    let tab = options
        .tab
        .as_ref()
        .ok_or(AutofillError::NothingToAutofill("no tab"))?;
    let credential = options
        .credential
        .as_ref()
        .ok_or(AutofillError::NothingToAutofill("no credential"))?;
    if options.page_details.is_empty() {
        return Err(AutofillError::NothingToAutofill("no page details"));
    }

    let trace = |step: usize, event: TraceEvent| {
        if let Some(tracer) = tracer {
            tracer.log(&event.with_credential(credential));
        }
        debug!(step, "autofill step traced");
    };

    let mut outcome = AutofillOutcome::default();
    for (step, frame) in options.page_details.iter().enumerate() {
        let event = TraceEvent::now(step as u64).with_frame(&frame.details.url);

        if frame.tab.id != tab.id || frame.tab.url != tab.url {
            trace(step, event.with_skip("frame belongs to another tab"));
            continue;
        }

        let generate = GenerateOptions {
            tab_url: tab.url.clone(),
            page_url: Some(frame.details.url.clone()),
            ..options.generate.clone()
        };
        let Some(mut script) = generator
            .generate(Some(&frame.details), Some(credential), &generate)
            .filter(|s| !s.is_empty())
        else {
            trace(step, event.with_skip("empty script"));
            continue;
        };

        if script.untrusted_iframe && options.allow_untrusted_iframe == Some(false) {
            info!(frame = frame.frame_id, url = %frame.details.url, "autofill blocked due to an untrusted iframe");
            trace(step, event.with_script(&script).with_skip("untrusted iframe"));
            continue;
        }

        script.properties.delay_between_operations = Some(DELAY_BETWEEN_OPERATIONS_MS);
        trace(step, event.with_script(&script).with_decision("fill"));
        outcome.scripts.push((frame.frame_id, script));
    }

    if let Some(tracer) = tracer {
        let filled = outcome.scripts.iter().map(|(id, _)| *id).collect();
        tracer.log_summary(&RunSummary::now(tab.id, credential, options.page_details.len(), filled));
    }

    if outcome.scripts.is_empty() {
        return Err(AutofillError::DidNotAutofill);
    }

    if options.auto_copy_totp {
        if let CredentialKind::Login(login) = &credential.kind {
            outcome.totp = login
                .totp
                .as_deref()
                .filter(|secret| !secret.is_empty())
                .and_then(|secret| generator.totp().code(secret));
        }
    }

    info!(frames = outcome.scripts.len(), "autofill scripts ready");
    Ok(outcome)
}
