//! Field-level validation helpers shared by every payload type.

use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// Maximum length of short text columns (names, titles, URLs).
pub const MAX_SHORT_TEXT: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collected validation failures for one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// Ok when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

pub fn require_text(errors: &mut ValidationErrors, field: &str, value: &str, max: Option<usize>) {
    if value.trim().is_empty() {
        errors.push(field, "is required");
        return;
    }
    if let Some(max) = max {
        if value.chars().count() > max {
            errors.push(field, format!("may not be longer than {} characters", max));
        }
    }
}

/// Absolute http(s) URL no longer than [`MAX_SHORT_TEXT`].
pub fn check_url(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.chars().count() > MAX_SHORT_TEXT {
        errors.push(
            field,
            format!("may not be longer than {} characters", MAX_SHORT_TEXT),
        );
        return;
    }
    match reqwest::Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {}
        _ => errors.push(field, "must be a valid http(s) URL"),
    }
}

pub fn check_email(errors: &mut ValidationErrors, field: &str, value: &str) {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        errors.push(field, "must be a valid email address");
    }
}
