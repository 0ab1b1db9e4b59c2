use serde::Serialize;

use crate::fill::credential_model::Credential;
use crate::fill::script_model::FillScript;

/// One autofill decision, written as a single JSON line.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub timestamp: String,
    pub step: u64,

    pub credential_kind: Option<String>,
    pub frame_url: Option<String>,

    pub actions: usize,
    pub untrusted: bool,

    pub decision: Option<String>,
    pub skip_reason: Option<String>,
}

impl TraceEvent {
    pub fn now(step: u64) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            step,
            credential_kind: None,
            frame_url: None,
            actions: 0,
            untrusted: false,
            decision: None,
            skip_reason: None,
        }
    }

    pub fn with_credential(mut self, credential: &Credential) -> Self {
        self.credential_kind = Some(credential.kind.name().to_string());
        self
    }

    pub fn with_frame(mut self, url: impl ToString) -> Self {
        self.frame_url = Some(url.to_string());
        self
    }

    pub fn with_script(mut self, script: &FillScript) -> Self {
        self.actions = script.script.len();
        self.untrusted = script.untrusted_iframe;
        self
    }

    pub fn with_decision(mut self, decision: impl ToString) -> Self {
        self.decision = Some(decision.to_string());
        self
    }

    pub fn with_skip(mut self, reason: impl ToString) -> Self {
        self.skip_reason = Some(reason.to_string());
        self
    }
}

/// Closing line of one autofill run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub timestamp: String,
    pub tab_id: u64,
    pub credential_kind: String,
    pub frames: usize,
    pub filled_frames: Vec<u64>,
    pub skipped_frames: usize,
    pub outcome: &'static str,
}

impl RunSummary {
    pub fn now(tab_id: u64, credential: &Credential, frames: usize, filled_frames: Vec<u64>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            tab_id,
            credential_kind: credential.kind.name().to_string(),
            frames,
            skipped_frames: frames.saturating_sub(filled_frames.len()),
            outcome: if filled_frames.is_empty() { "did not autofill" } else { "filled" },
            filled_frames,
        }
    }
}
