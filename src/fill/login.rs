use serde::Serialize;
use tracing::debug;

use crate::collect::snapshot_model::{FieldDescriptor, FormDescriptor, PageSnapshot};
use crate::fill::credential_model::LoginData;
use crate::fill::generator::{FillScriptGenerator, ScriptBuilder};
use crate::fill::keywords::{
    EXCLUDED_AUTOFILL_LOGIN_TYPES, ONE_TIME_CODE_AUTOCOMPLETE, TOTP_FIELD_NAMES,
    USERNAME_FIELD_NAMES, totp_field_names,
};
use crate::fill::matching::{
    field_has_disqualifying_attribute_value, field_is_fuzzy_match, find_matching_field_index,
    has_value, is_excluded_field_type, value_is_like_password,
};
use crate::fill::script_model::GenerateOptions;
use crate::fill::trust::{UriMatchStrategy, in_untrusted_iframe};

// ============================================================================
// Field discovery
// ============================================================================

/// Which password fields [`load_password_fields`] accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordFieldFilter {
    pub can_be_hidden: bool,
    pub can_be_read_only: bool,
    pub must_be_empty: bool,
    pub fill_new_password: bool,
}

/// Where username and one-time-code candidates may come from.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateScope {
    /// Accept hidden and read-only fields
    pub include_hidden: bool,
    /// Ignore which form the password field belongs to
    pub without_form: bool,
}

/// Password inputs, plus text inputs whose id, name or placeholder reads
/// like a password.
pub fn load_password_fields<'a>(snapshot: &'a PageSnapshot, filter: PasswordFieldFilter) -> Vec<&'a FieldDescriptor> {
    snapshot
        .fields
        .iter()
        .filter(|f| {
            let is_password = f.is_type("password");
            if !is_password && is_excluded_field_type(f, EXCLUDED_AUTOFILL_LOGIN_TYPES) {
                return false;
            }
            if field_has_disqualifying_attribute_value(f) {
                return false;
            }
            if field_is_fuzzy_match(f, TOTP_FIELD_NAMES) {
                return false;
            }

            let is_like_password = || {
                f.is_type("text")
                    && [f.html_id.as_deref(), f.html_name.as_deref(), f.placeholder.as_deref()]
                        .into_iter()
                        .any(value_is_like_password)
            };

            !f.disabled
                && (filter.can_be_read_only || !f.readonly)
                && (is_password || is_like_password())
                && (filter.can_be_hidden || f.viewable)
                && (!filter.must_be_empty || f.value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true))
                && (filter.fill_new_password || f.auto_complete_type.as_deref() != Some("new-password"))
        })
        .collect()
}

fn is_candidate(field: &FieldDescriptor, password: &FieldDescriptor, scope: CandidateScope) -> bool {
    !field.disabled
        && (scope.include_hidden || !field.readonly)
        && (scope.without_form || field.form == password.form)
        && (scope.include_hidden || field.viewable)
}

/// Last plausible username field before `password`, or the first one whose
/// attributes name it a username outright.
pub fn find_username_field<'a>(
    snapshot: &'a PageSnapshot,
    password: &FieldDescriptor,
    scope: CandidateScope,
) -> Option<&'a FieldDescriptor> {
    let mut candidate = None;
    for field in snapshot.fields.iter().filter(|f| !f.is_span()) {
        if field.element_number >= password.element_number {
            break;
        }
        let plausible_type = field.is_type("text") || field.is_type("email") || field.is_type("tel");
        if plausible_type && is_candidate(field, password, scope) {
            candidate = Some(field);
            if find_matching_field_index(field, USERNAME_FIELD_NAMES).is_some() {
                break;
            }
        }
    }
    candidate
}

/// Same search as [`find_username_field`] for one-time-code inputs.
pub fn find_totp_field<'a>(
    snapshot: &'a PageSnapshot,
    password: &FieldDescriptor,
    scope: CandidateScope,
) -> Option<&'a FieldDescriptor> {
    let names = totp_field_names();
    let mut candidate = None;
    for field in snapshot.fields.iter().filter(|f| !f.is_span()) {
        if field.element_number >= password.element_number {
            break;
        }
        let plausible_type = field.is_type("text") || field.is_type("number");
        if plausible_type
            && !field_has_disqualifying_attribute_value(field)
            && is_candidate(field, password, scope)
            && field_is_fuzzy_match(field, &names)
        {
            candidate = Some(field);
            if find_matching_field_index(field, &names).is_some()
                || field.auto_complete_type.as_deref() == Some(ONE_TIME_CODE_AUTOCOMPLETE)
            {
                break;
            }
        }
    }
    candidate
}

/// Run `find` on visible fields first, then (unless restricted) again
/// accepting hidden and read-only ones.
fn find_with_fallback<'a>(
    find: impl Fn(CandidateScope) -> Option<&'a FieldDescriptor>,
    without_form: bool,
    only_visible: bool,
) -> Option<&'a FieldDescriptor> {
    find(CandidateScope { include_hidden: false, without_form }).or_else(|| {
        if only_visible {
            None
        } else {
            find(CandidateScope { include_hidden: true, without_form })
        }
    })
}

fn push_unique<'a>(list: &mut Vec<&'a FieldDescriptor>, field: &'a FieldDescriptor) {
    if !list.iter().any(|f| f.opid == field.opid) {
        list.push(field);
    }
}

// ============================================================================
// Login sub-generator
// ============================================================================

pub(crate) fn generate_login(
    generator: &FillScriptGenerator,
    builder: &mut ScriptBuilder,
    snapshot: &PageSnapshot,
    login: &LoginData,
    options: &GenerateOptions,
) {
    builder.script.saved_urls = login
        .uris
        .iter()
        .filter(|u| u.match_strategy != Some(UriMatchStrategy::Never))
        .map(|u| u.uri.clone())
        .collect();

    let page_url = options.page_url.as_deref().unwrap_or(&snapshot.url);
    builder.script.untrusted_iframe = in_untrusted_iframe(
        page_url,
        &options.tab_url,
        login,
        options.default_uri_match,
        generator.domains.as_ref(),
        generator.uri_matcher.as_ref(),
    );

    let mut filter = PasswordFieldFilter {
        must_be_empty: options.only_empty_fields,
        fill_new_password: options.fill_new_password,
        ..PasswordFieldFilter::default()
    };
    let mut password_fields = load_password_fields(snapshot, filter);
    if password_fields.is_empty() && !options.only_visible_fields {
        filter.can_be_hidden = true;
        filter.can_be_read_only = true;
        password_fields = load_password_fields(snapshot, filter);
    }

    let wants_username = has_value(login.username.as_deref());
    let wants_totp = options.allow_totp_autofill && has_value(login.totp.as_deref());

    let mut passwords: Vec<&FieldDescriptor> = Vec::new();
    let mut usernames: Vec<&FieldDescriptor> = Vec::new();
    let mut totps: Vec<&FieldDescriptor> = Vec::new();

    // Any form on the page puts every password field in play, inside a form or not.
    let form_passwords = if snapshot.forms.is_empty() { &[][..] } else { &password_fields[..] };

    for password in form_passwords.iter().copied() {
        push_unique(&mut passwords, password);
        if wants_username {
            let found = find_with_fallback(
                |scope| find_username_field(snapshot, password, scope),
                false,
                options.only_visible_fields,
            );
            if let Some(username) = found {
                usernames.push(username);
            }
        }
        if wants_totp {
            let found = find_with_fallback(
                |scope| find_totp_field(snapshot, password, scope),
                false,
                options.only_visible_fields,
            );
            if let Some(totp) = found {
                push_unique(&mut totps, totp);
            }
        }
    }

    if passwords.is_empty() {
        if let Some(password) = password_fields.first().copied() {
            // Formless page: pair the first password with anything before it.
            passwords.push(password);
            if wants_username && password.element_number > 0 {
                let found = find_with_fallback(
                    |scope| find_username_field(snapshot, password, scope),
                    true,
                    options.only_visible_fields,
                );
                if let Some(username) = found {
                    usernames.push(username);
                }
            }
            if wants_totp && password.element_number > 0 {
                let found = find_with_fallback(
                    |scope| find_totp_field(snapshot, password, scope),
                    true,
                    options.only_visible_fields,
                );
                if let Some(totp) = found {
                    push_unique(&mut totps, totp);
                }
            }
        }
    }

    if password_fields.is_empty() {
        let totp_names = totp_field_names();
        for field in snapshot.fields.iter().filter(|f| f.viewable) {
            let fillable_totp = options.allow_totp_autofill
                && (field.is_type("number") || field.is_type("tel") || field.is_type("text"))
                && (field_is_fuzzy_match(field, &totp_names)
                    || field.auto_complete_type.as_deref() == Some(ONE_TIME_CODE_AUTOCOMPLETE));
            let fillable_username = !options.skip_username_only_fill
                && (field.is_type("email") || field.is_type("tel") || field.is_type("text"))
                && field_is_fuzzy_match(field, USERNAME_FIELD_NAMES);

            if fillable_totp {
                push_unique(&mut totps, field);
            } else if fillable_username {
                usernames.push(field);
            }
        }
    }

    debug!(
        passwords = passwords.len(),
        usernames = usernames.len(),
        totps = totps.len(),
        "login fields classified"
    );

    let mut touched_forms: Vec<String> = Vec::new();
    let mut fill_role = |builder: &mut ScriptBuilder, fields: &[&FieldDescriptor], value: Option<&str>| {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return;
        };
        for field in fields {
            if builder.filled.contains(&field.opid) {
                continue;
            }
            builder.fill_field(field, value);
            if let Some(form) = &field.form {
                if !touched_forms.contains(form) {
                    touched_forms.push(form.clone());
                }
            }
        }
    };
    fill_role(builder, &usernames, login.username.as_deref());
    fill_role(builder, &passwords, login.password.as_deref());

    if options.auto_submit_login && !touched_forms.is_empty() {
        builder.script.autosubmit = Some(touched_forms);
    }

    if options.allow_totp_autofill {
        fill_totp_fields(generator, builder, &totps, login);
    }

    builder.set_focus();
}

/// One code per field; a code whose length equals the number of fields is
/// spread one character per field (segmented inputs).
fn fill_totp_fields(
    generator: &FillScriptGenerator,
    builder: &mut ScriptBuilder,
    totps: &[&FieldDescriptor],
    login: &LoginData,
) {
    let Some(code) = login.totp.as_deref().and_then(|secret| generator.totp().code(secret)) else {
        return;
    };
    let segmented = code.chars().count() == totps.len();

    for (i, field) in totps.iter().enumerate() {
        if builder.filled.contains(&field.opid) {
            continue;
        }
        let value = if segmented {
            code.chars().nth(i).map(String::from).unwrap_or_default()
        } else {
            code.clone()
        };
        builder.fill_field(field, &value);
    }
}

// ============================================================================
// Forms with password fields
// ============================================================================

/// A form that owns at least one password field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PasswordForm {
    pub form: FormDescriptor,
    pub password: FieldDescriptor,
    pub username: Option<FieldDescriptor>,
    pub passwords: Vec<FieldDescriptor>,
}

/// Forms that own password fields, with their best username candidate.
pub fn forms_with_password_fields(snapshot: &PageSnapshot) -> Vec<PasswordForm> {
    let filter = PasswordFieldFilter {
        can_be_hidden: true,
        can_be_read_only: true,
        must_be_empty: false,
        fill_new_password: true,
    };
    let mut password_fields: Vec<FieldDescriptor> =
        load_password_fields(snapshot, filter).into_iter().cloned().collect();
    if password_fields.is_empty() {
        return Vec::new();
    }

    // Three password fields and one form, some outside it: most likely a
    // change-password form with broken markup.
    let without_form = password_fields.iter().filter(|f| f.form.is_none()).count();
    if password_fields.len() == 3 && snapshot.forms.len() == 1 && without_form > 0 {
        if let Some(solo) = snapshot.forms.keys().next() {
            if password_fields.iter().any(|f| f.form.as_ref() == Some(solo)) {
                for field in password_fields.iter_mut().filter(|f| f.form.is_none()) {
                    field.form = Some(solo.clone());
                }
            }
        }
    }

    let mut result = Vec::new();
    for (key, form) in &snapshot.forms {
        let passwords: Vec<FieldDescriptor> = password_fields
            .iter()
            .filter(|f| f.form.as_ref() == Some(key))
            .cloned()
            .collect();
        let Some(first) = passwords.first().cloned() else {
            continue;
        };
        let username = find_username_field(snapshot, &first, CandidateScope::default())
            .or_else(|| {
                find_username_field(
                    snapshot,
                    &first,
                    CandidateScope {
                        include_hidden: true,
                        without_form: false,
                    },
                )
            })
            .cloned();
        result.push(PasswordForm {
            form: form.clone(),
            password: first,
            username,
            passwords,
        });
    }
    result
}
