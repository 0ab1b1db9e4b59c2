mod common;

use pretty_assertions::assert_eq;

use common::utils::{PAGE_URL, field, login, named_field, snapshot};
use page_autofill::collect::snapshot_model::PageSnapshot;
use page_autofill::fill::autofill::{
    AutofillOptions, DELAY_BETWEEN_OPERATIONS_MS, FramePageDetails, TabContext, do_autofill,
};
use page_autofill::fill::credential_model::{Credential, CredentialKind};
use page_autofill::fill::error::AutofillError;
use page_autofill::fill::generator::FillScriptGenerator;
use page_autofill::fill::totp::FixedCode;
use page_autofill::trace::logger::TraceLogger;

const FRAME_URL: &str = "https://ads.example.net/frame";

fn tab() -> TabContext {
    TabContext {
        id: 7,
        url: PAGE_URL.to_string(),
    }
}

fn login_snapshot(url: &str) -> PageSnapshot {
    let mut page = snapshot(vec![named_field(0, "text", "username"), field(1, "password")], &[]);
    page.url = url.to_string();
    page.document_url = url.to_string();
    page
}

fn frame(frame_id: u64, tab: TabContext, details: PageSnapshot) -> FramePageDetails {
    FramePageDetails {
        frame_id,
        tab,
        details,
    }
}

fn autofill_options(frames: Vec<FramePageDetails>) -> AutofillOptions {
    AutofillOptions {
        tab: Some(tab()),
        credential: Some(login("ada", "pw")),
        page_details: frames,
        ..AutofillOptions::default()
    }
}

fn with_secret(mut credential: Credential) -> Credential {
    if let CredentialKind::Login(data) = &mut credential.kind {
        data.totp = Some("JBSWY3DPEHPK3PXP".to_string());
    }
    credential
}

// ============================================================================
// Preconditions
// ============================================================================

#[test]
fn test_missing_inputs_are_nothing_to_autofill() {
    let generator = FillScriptGenerator::default();
    let full = autofill_options(vec![frame(0, tab(), login_snapshot(PAGE_URL))]);

    let no_tab = AutofillOptions { tab: None, ..full.clone() };
    let no_credential = AutofillOptions { credential: None, ..full.clone() };
    let no_details = AutofillOptions { page_details: vec![], ..full };

    for (options, reason) in [(no_tab, "no tab"), (no_credential, "no credential"), (no_details, "no page details")] {
        match do_autofill(&generator, &options, None) {
            Err(AutofillError::NothingToAutofill(r)) => assert_eq!(r, reason),
            other => panic!("expected NothingToAutofill({}), got {:?}", reason, other),
        }
    }
}

#[test]
fn test_frames_from_other_tabs_are_ignored() {
    let generator = FillScriptGenerator::default();
    let other_tab = TabContext { id: 8, ..tab() };
    let moved_tab = TabContext {
        url: "https://accounts.example.com/elsewhere".to_string(),
        ..tab()
    };
    let options = autofill_options(vec![
        frame(0, other_tab, login_snapshot(PAGE_URL)),
        frame(1, moved_tab, login_snapshot(PAGE_URL)),
    ]);

    let result = do_autofill(&generator, &options, None);
    assert!(matches!(result, Err(AutofillError::DidNotAutofill)), "got {:?}", result);
}

#[test]
fn test_frames_without_fillable_fields_did_not_autofill() {
    let generator = FillScriptGenerator::default();
    let page = snapshot(vec![named_field(0, "text", "coupon")], &[]);
    let options = autofill_options(vec![frame(0, tab(), page)]);

    assert!(matches!(
        do_autofill(&generator, &options, None),
        Err(AutofillError::DidNotAutofill)
    ));
}

// ============================================================================
// Scripts per frame
// ============================================================================

#[test]
fn test_each_frame_gets_script_with_operation_delay() {
    let generator = FillScriptGenerator::default();
    let options = autofill_options(vec![
        frame(0, tab(), login_snapshot(PAGE_URL)),
        frame(3, tab(), login_snapshot("https://static.example.com/embed")),
    ]);

    let outcome = do_autofill(&generator, &options, None).expect("autofilled");

    let frames: Vec<u64> = outcome.scripts.iter().map(|(id, _)| *id).collect();
    assert_eq!(frames, vec![0, 3]);
    for (_, script) in &outcome.scripts {
        assert_eq!(script.properties.delay_between_operations, Some(DELAY_BETWEEN_OPERATIONS_MS));
        assert_eq!(script.value_for("__1"), Some("pw"));
    }
    assert_eq!(DELAY_BETWEEN_OPERATIONS_MS, 20);
    assert_eq!(outcome.totp, None);
}

#[test]
fn test_untrusted_iframe_blocked_only_when_forbidden() {
    let generator = FillScriptGenerator::default();
    let frames = vec![
        frame(0, tab(), login_snapshot(PAGE_URL)),
        frame(4, tab(), login_snapshot(FRAME_URL)),
    ];

    let forbidden = AutofillOptions {
        allow_untrusted_iframe: Some(false),
        ..autofill_options(frames.clone())
    };
    let outcome = do_autofill(&generator, &forbidden, None).expect("top frame fills");
    let ids: Vec<u64> = outcome.scripts.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![0]);

    let unspecified = autofill_options(frames);
    let outcome = do_autofill(&generator, &unspecified, None).expect("both frames fill");
    let flagged: Vec<(u64, bool)> = outcome
        .scripts
        .iter()
        .map(|(id, s)| (*id, s.untrusted_iframe))
        .collect();
    assert_eq!(flagged, vec![(0, false), (4, true)], "caller decides what to do with the flag");
}

#[test]
fn test_only_untrusted_frame_forbidden_did_not_autofill() {
    let generator = FillScriptGenerator::default();
    let options = AutofillOptions {
        allow_untrusted_iframe: Some(false),
        ..autofill_options(vec![frame(4, tab(), login_snapshot(FRAME_URL))])
    };

    assert!(matches!(
        do_autofill(&generator, &options, None),
        Err(AutofillError::DidNotAutofill)
    ));
}

#[test]
fn test_auto_copy_totp_returns_current_code() {
    let generator = FillScriptGenerator::default().with_totp(Box::new(FixedCode("987654".into())));
    let options = AutofillOptions {
        credential: Some(with_secret(login("ada", "pw"))),
        auto_copy_totp: true,
        ..autofill_options(vec![frame(0, tab(), login_snapshot(PAGE_URL))])
    };

    let outcome = do_autofill(&generator, &options, None).expect("autofilled");
    assert_eq!(outcome.totp.as_deref(), Some("987654"));

    let without_copy = AutofillOptions {
        auto_copy_totp: false,
        ..options
    };
    let outcome = do_autofill(&generator, &without_copy, None).expect("autofilled");
    assert_eq!(outcome.totp, None);
}

// ============================================================================
// Tracing
// ============================================================================

#[test]
fn test_trace_records_one_line_per_frame_and_a_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("autofill.jsonl");
    let tracer = TraceLogger::new(&path);
    assert!(tracer.is_enabled());

    let generator = FillScriptGenerator::default();
    let options = AutofillOptions {
        allow_untrusted_iframe: Some(false),
        ..autofill_options(vec![
            frame(0, tab(), login_snapshot(PAGE_URL)),
            frame(1, TabContext { id: 99, ..tab() }, login_snapshot(PAGE_URL)),
            frame(2, tab(), login_snapshot(FRAME_URL)),
        ])
    };
    do_autofill(&generator, &options, Some(&tracer)).expect("autofilled");

    let content = std::fs::read_to_string(&path).expect("trace file");
    let events: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(events.len(), 4);

    let frames: Vec<(u64, &str, Option<&str>, Option<&str>)> = events[..3]
        .iter()
        .map(|e| {
            (
                e["step"].as_u64().unwrap_or_default(),
                e["credential_kind"].as_str().unwrap_or_default(),
                e["decision"].as_str(),
                e["skip_reason"].as_str(),
            )
        })
        .collect();
    assert_eq!(
        frames,
        vec![
            (0, "login", Some("fill"), None),
            (1, "login", None, Some("frame belongs to another tab")),
            (2, "login", None, Some("untrusted iframe")),
        ]
    );
    assert_eq!(events[2]["untrusted"], serde_json::json!(true));
    assert_eq!(events[2]["frame_url"], serde_json::json!(FRAME_URL));

    let summary = &events[3];
    assert_eq!(summary["tab_id"], serde_json::json!(7));
    assert_eq!(summary["frames"], serde_json::json!(3));
    assert_eq!(summary["filled_frames"], serde_json::json!([0]));
    assert_eq!(summary["skipped_frames"], serde_json::json!(2));
    assert_eq!(summary["outcome"], serde_json::json!("filled"));
}

#[test]
fn test_trace_summary_written_when_nothing_filled() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("autofill.jsonl");
    let tracer = TraceLogger::new(&path);

    let generator = FillScriptGenerator::default();
    let page = snapshot(vec![named_field(0, "text", "coupon")], &[]);
    let options = autofill_options(vec![frame(0, tab(), page)]);
    assert!(matches!(
        do_autofill(&generator, &options, Some(&tracer)),
        Err(AutofillError::DidNotAutofill)
    ));

    let content = std::fs::read_to_string(&path).expect("trace file");
    let last: serde_json::Value = content
        .lines()
        .last()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .expect("summary line");
    assert_eq!(content.lines().count(), 2);
    assert_eq!(last["outcome"], serde_json::json!("did not autofill"));
    assert_eq!(last["filled_frames"], serde_json::json!([]));
    assert_eq!(last["skipped_frames"], serde_json::json!(1));
}

#[test]
fn test_unopenable_trace_file_disables_tracer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tracer = TraceLogger::new(dir.path().join("missing").join("autofill.jsonl"));
    assert!(!tracer.is_enabled());
}

#[test]
fn test_disabled_tracer_writes_nothing() {
    let tracer = TraceLogger::disabled();
    assert!(!tracer.is_enabled());

    let generator = FillScriptGenerator::default();
    let options = autofill_options(vec![frame(0, tab(), login_snapshot(PAGE_URL))]);
    assert!(do_autofill(&generator, &options, Some(&tracer)).is_ok());
}
