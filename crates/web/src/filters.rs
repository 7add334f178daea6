//! Custom Askama template filters.

use std::fmt::Display;

use chrono::Datelike;

/// The current year, for the footer.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
#[allow(clippy::unnecessary_wraps)]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    Ok(chrono::Utc::now().year())
}
