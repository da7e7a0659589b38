//! Handlers for the passcode form.
//!
//! GET renders the empty form. POST checks the submitted passcode against the
//! configured store and renders the outcome beneath the form.

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use tracing::instrument;

use crate::config::{
    ErrorDisclosure, MSG_EMPTY_PASSCODE, MSG_INVALID_PASSCODE, MSG_SERVICE_UNAVAILABLE,
};
use crate::error::AppError;
use crate::observability::metrics::record_submission;
use crate::state::AppState;
use crate::store::{MessageStore, StoreError};
use crate::templates::{render_index, Notice};

/// Name of the form field holding the passcode
pub const PASSCODE_FIELD: &str = "passcode";

/// Raw submitted form fields, in submission order
pub type FormFields = Vec<(String, String)>;

/// First `passcode` value in `fields`, if any.
///
/// Repeated fields are allowed; later values are ignored.
pub fn first_passcode(fields: FormFields) -> Option<String> {
    fields
        .into_iter()
        .find(|(name, _)| name == PASSCODE_FIELD)
        .map(|(_, value)| value)
}

/// Result of checking one submission
#[derive(Debug)]
pub enum Outcome {
    /// No passcode was entered
    Empty,
    /// The passcode matched; carries the stored message
    Matched(String),
    /// Nothing matched
    Invalid,
    /// The store could not be reached or queried
    Failed(StoreError),
}

impl Outcome {
    /// Label used for the submissions counter
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Empty => "empty",
            Outcome::Matched(_) => "matched",
            Outcome::Invalid => "invalid",
            Outcome::Failed(_) => "error",
        }
    }

    /// Status code and notice shown for this outcome.
    ///
    /// With generic disclosure a storage failure is indistinguishable from a
    /// wrong passcode.
    pub fn present(self, disclosure: ErrorDisclosure) -> (StatusCode, Notice) {
        match self {
            Outcome::Empty => (StatusCode::OK, Notice::error(MSG_EMPTY_PASSCODE)),
            Outcome::Matched(message) => (StatusCode::OK, Notice::success(message)),
            Outcome::Invalid => (StatusCode::OK, Notice::error(MSG_INVALID_PASSCODE)),
            Outcome::Failed(_) => match disclosure {
                ErrorDisclosure::Generic => (StatusCode::OK, Notice::error(MSG_INVALID_PASSCODE)),
                ErrorDisclosure::Distinct => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Notice::error(MSG_SERVICE_UNAVAILABLE),
                ),
            },
        }
    }
}

/// Check a submitted passcode against `store`.
pub async fn check_passcode(store: &dyn MessageStore, passcode: Option<&str>) -> Outcome {
    let passcode = match passcode {
        Some(p) if !p.is_empty() => p,
        _ => return Outcome::Empty,
    };

    match store.lookup(passcode).await {
        Ok(Some(message)) => Outcome::Matched(message),
        Ok(None) => Outcome::Invalid,
        Err(e) => {
            tracing::error!(error = %e, "Passcode lookup failed");
            Outcome::Failed(e)
        }
    }
}

/// Form page handler.
#[instrument(name = "index::form", skip(state))]
pub async fn form(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let html = render_index(&state.tera, &state.config.ui, None)?;
    Ok(Html(html))
}

/// Form submission handler.
///
/// A body that is missing or not form-encoded counts as an empty submission.
#[instrument(name = "index::submit", skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    form: Result<Form<FormFields>, FormRejection>,
) -> Result<Response, AppError> {
    let passcode = match form {
        Ok(Form(fields)) => first_passcode(fields),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable form body");
            None
        }
    };

    let outcome = check_passcode(state.store.as_ref(), passcode.as_deref()).await;
    record_submission(outcome.label());
    tracing::debug!(outcome = outcome.label(), "Passcode checked");

    let (status, notice) = outcome.present(state.config.passcode.errors);
    let html = render_index(&state.tera, &state.config.ui, Some(&notice))?;
    Ok((status, Html(html)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StaticMessageStore;
    use crate::templates::NoticeKind;

    fn store() -> StaticMessageStore {
        StaticMessageStore::new("secret123", "Hello, world!")
    }

    #[tokio::test]
    async fn test_absent_and_empty_are_empty() {
        assert!(matches!(check_passcode(&store(), None).await, Outcome::Empty));
        assert!(matches!(check_passcode(&store(), Some("")).await, Outcome::Empty));
    }

    #[tokio::test]
    async fn test_whitespace_is_looked_up() {
        assert!(matches!(check_passcode(&store(), Some("  ")).await, Outcome::Invalid));
    }

    #[tokio::test]
    async fn test_match_and_miss() {
        match check_passcode(&store(), Some("secret123")).await {
            Outcome::Matched(message) => assert_eq!(message, "Hello, world!"),
            other => panic!("expected match, got {:?}", other),
        }
        assert!(matches!(check_passcode(&store(), Some("wrongcode")).await, Outcome::Invalid));
    }

    #[test]
    fn test_first_passcode_wins() {
        let fields = vec![
            ("other".to_string(), "x".to_string()),
            ("passcode".to_string(), "a".to_string()),
            ("passcode".to_string(), "b".to_string()),
        ];
        assert_eq!(first_passcode(fields).as_deref(), Some("a"));
        assert_eq!(first_passcode(vec![("other".to_string(), "x".to_string())]), None);
        assert_eq!(first_passcode(Vec::new()), None);
    }

    #[test]
    fn test_generic_disclosure_hides_failures() {
        let failed = Outcome::Failed(StoreError::Query(sqlx::Error::PoolTimedOut));
        let (status, notice) = failed.present(ErrorDisclosure::Generic);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(notice, Notice::error(MSG_INVALID_PASSCODE));
    }

    #[test]
    fn test_distinct_disclosure_reports_failures() {
        let failed = Outcome::Failed(StoreError::Query(sqlx::Error::PoolTimedOut));
        let (status, notice) = failed.present(ErrorDisclosure::Distinct);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(notice.text, MSG_SERVICE_UNAVAILABLE);
        assert_eq!(notice.kind, NoticeKind::Error);
    }

    #[test]
    fn test_empty_is_never_success() {
        for disclosure in [ErrorDisclosure::Generic, ErrorDisclosure::Distinct] {
            let (_, notice) = Outcome::Empty.present(disclosure);
            assert_eq!(notice.kind, NoticeKind::Error);
            assert_eq!(notice.text, MSG_EMPTY_PASSCODE);
        }
    }
}
