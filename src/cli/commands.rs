use crate::cli::config::AppConfig;
use crate::collect::collector::{CollectorConfig, PageCollector};
use crate::collect::scheduler::SystemClock;
use crate::collect::snapshot_model::PageSnapshot;
use crate::dom::dom_model::Document;
use crate::dom::query::TreeWalkerQuery;
use crate::dom::visibility::StyleVisibility;
use crate::fill::autofill::{AutofillOptions, FramePageDetails, TabContext, do_autofill};
use crate::fill::credential_model::Credential;
use crate::fill::error::{AutofillError, Result as FillResult};
use crate::fill::generator::FillScriptGenerator;
use crate::fill::login::forms_with_password_fields;
use crate::fill::totp::FixedCode;
use crate::fill::trust::StaticDomainResolver;
use crate::trace::logger::TraceLogger;

// ============================================================================
// Shared loaders
// ============================================================================

/// Read a credential record from a YAML file.
pub fn load_credential(path: &str) -> FillResult<Credential> {
    let content = std::fs::read_to_string(path).map_err(|source| AutofillError::CredentialRead {
        path: path.to_string(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| AutofillError::CredentialParse {
        context: path.to_string(),
        source,
    })
}

/// Read a previously collected snapshot from a JSON file.
pub fn load_snapshot(path: &str) -> FillResult<PageSnapshot> {
    let content = std::fs::read_to_string(path).map_err(|e| AutofillError::Snapshot {
        context: path.to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| AutofillError::Snapshot {
        context: path.to_string(),
        message: e.to_string(),
    })
}

/// Run one collection over a document fixture.
pub fn collect_document(path: &str, config: &CollectorConfig) -> Result<PageSnapshot, Box<dyn std::error::Error>> {
    let doc = Document::load(path)?;
    let mut collector = PageCollector::new(
        config.clone(),
        Box::new(StyleVisibility),
        Box::new(TreeWalkerQuery::new()),
        Box::new(SystemClock),
    );
    Ok(collector.get_snapshot(&doc))
}

// ============================================================================
// collect subcommand
// ============================================================================

pub fn cmd_collect(
    document: &str,
    output: Option<&str>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = collect_document(document, &CollectorConfig::from(&config.collect))?;
    let json = serde_json::to_string_pretty(&snapshot)?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)?;
            eprintln!(
                "Snapshot written to {} ({} forms, {} fields)",
                path,
                snapshot.forms.len(),
                snapshot.fields.len()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

// ============================================================================
// fill subcommand
// ============================================================================

pub struct FillArgs<'a> {
    pub document: Option<&'a str>,
    pub snapshot: Option<&'a str>,
    pub credential: &'a str,
    pub tab_url: Option<&'a str>,
    pub totp_code: Option<&'a str>,
    pub trace: Option<&'a str>,
}

pub fn cmd_fill(args: &FillArgs<'_>, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = match (args.snapshot, args.document) {
        (Some(path), _) => load_snapshot(path)?,
        (None, Some(path)) => collect_document(path, &CollectorConfig::from(&config.collect))?,
        (None, None) => return Err(AutofillError::NothingToAutofill("no document or snapshot").into()),
    };
    let credential = load_credential(args.credential)?;

    let mut generator = FillScriptGenerator::default()
        .with_domains(Box::new(StaticDomainResolver::new(config.fill.equivalent_domains.clone())));
    if let Some(code) = args.totp_code {
        generator = generator.with_totp(Box::new(FixedCode(code.to_string())));
    }

    let tab_url = args.tab_url.unwrap_or(&snapshot.url).to_string();
    let tab = TabContext { id: 0, url: tab_url.clone() };
    let options = AutofillOptions {
        tab: Some(tab.clone()),
        credential: Some(credential),
        page_details: vec![FramePageDetails {
            frame_id: 0,
            tab,
            details: snapshot,
        }],
        generate: config.fill.generate_options(&tab_url),
        allow_untrusted_iframe: config.fill.allow_untrusted_iframe,
        auto_copy_totp: config.fill.auto_copy_totp,
    };

    let tracer = args.trace.map(TraceLogger::new);
    let outcome = do_autofill(&generator, &options, tracer.as_ref())?;

    for (frame, script) in &outcome.scripts {
        eprintln!("Frame {}: {} actions", frame, script.script.len());
        println!("{}", serde_json::to_string_pretty(script)?);
    }
    if let Some(code) = &outcome.totp {
        eprintln!("One-time code: {}", code);
    }
    Ok(())
}

// ============================================================================
// forms subcommand
// ============================================================================

pub fn cmd_forms(document: &str, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = collect_document(document, &CollectorConfig::from(&config.collect))?;
    let forms = forms_with_password_fields(&snapshot);

    if forms.is_empty() {
        println!("No forms with password fields");
        return Ok(());
    }

    println!("{} form(s) with password fields:", forms.len());
    for entry in &forms {
        println!(
            "  {} action={} username={} password={} ({} password fields)",
            entry.form.opid,
            entry.form.html_action,
            entry.username.as_ref().map(|u| u.opid.as_str()).unwrap_or("-"),
            entry.password.opid,
            entry.passwords.len()
        );
    }
    Ok(())
}
