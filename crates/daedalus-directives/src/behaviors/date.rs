//! `@date(format)`: renders results as formatted dates.
//!
//! Named patterns are resolved at compile time, so an unknown `format` never
//! reaches a request. All output is rendered in UTC.

use crate::behavior::{Behavior, Next};
use crate::behaviors::observed;
use crate::params::DirectiveSite;
use crate::registry::names;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use daedalus_core::{
    Arguments, BoxFuture, CompileError, ExecutionContext, ResolveError, ResolveResult,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Write as _;

/// Built-in named patterns and their strftime expansions.
pub const NAMED_PATTERNS: &[(&str, &str)] = &[
    ("default", "%a %b %d %Y %H:%M:%S"),
    ("shortDate", "%-m/%-d/%y"),
    ("mediumDate", "%b %-d, %Y"),
    ("longDate", "%B %-d, %Y"),
    ("fullDate", "%A, %B %-d, %Y"),
    ("shortTime", "%-I:%M %p"),
    ("mediumTime", "%-I:%M:%S %p"),
    ("longTime", "%-I:%M:%S %p %Z"),
    ("isoDate", "%Y-%m-%d"),
    ("isoTime", "%H:%M:%S"),
    ("isoDateTime", "%Y-%m-%dT%H:%M:%S%z"),
    ("isoUtcDateTime", "%Y-%m-%dT%H:%M:%SZ"),
];

/// Pattern used when an annotation omits `format`.
pub const DEFAULT_FORMAT: &str = "isoDateTime";

/// What to do when the inner resolver yields null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Format the current time.
    #[default]
    FormatNow,
    /// Fail with a format error.
    Fail,
}

/// Date rendering settings shared by every `@date` annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSettings {
    /// Pattern name used when an annotation omits `format`.
    pub default_format: String,
    /// Policy for null inner results.
    pub missing_value: MissingValuePolicy,
    /// Custom `name -> strftime` patterns. These shadow built-ins of the same name.
    pub patterns: IndexMap<String, String>,
}

impl Default for DateSettings {
    fn default() -> Self {
        Self {
            default_format: DEFAULT_FORMAT.to_string(),
            missing_value: MissingValuePolicy::default(),
            patterns: IndexMap::new(),
        }
    }
}

impl DateSettings {
    /// Looks up a named pattern, custom patterns first.
    #[must_use]
    pub fn pattern(&self, name: &str) -> Option<&str> {
        self.patterns.get(name).map(String::as_str).or_else(|| {
            NAMED_PATTERNS
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, pattern)| *pattern)
        })
    }

    /// Returns every known pattern name.
    #[must_use]
    pub fn pattern_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = NAMED_PATTERNS.iter().map(|(n, _)| *n).collect();
        for custom in self.patterns.keys() {
            if !names.contains(&custom.as_str()) {
                names.push(custom);
            }
        }
        names
    }

    /// Checks that the default format is known and every custom pattern parses.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        for (name, pattern) in &self.patterns {
            check_pattern(pattern).map_err(|reason| format!("pattern `{name}`: {reason}"))?;
        }
        if self.pattern(&self.default_format).is_none() {
            return Err(format!("unknown default format `{}`", self.default_format));
        }
        Ok(())
    }
}

/// Checks that `pattern` is a valid strftime string.
///
/// # Errors
///
/// Returns a description if the pattern contains an invalid specifier.
pub fn check_pattern(pattern: &str) -> Result<(), String> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(format!("`{pattern}` is not a valid strftime pattern"));
    }
    Ok(())
}

/// Parses a JSON value as a point in time.
///
/// Accepts RFC 3339, RFC 2822, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD` and numbers of epoch milliseconds. Zone-less inputs are taken
/// as UTC.
#[must_use]
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            #[allow(clippy::cast_possible_truncation)]
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(millis)
        }
        Value::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(at) = DateTime::parse_from_rfc2822(s) {
        return Some(at.with_timezone(&Utc));
    }
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(at.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}

/// Formats results with a named pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBehavior {
    format_name: String,
    pattern: String,
    missing_value: MissingValuePolicy,
}

impl DateBehavior {
    /// Creates a formatter for the named pattern.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::InvalidParameter` if `format` is not a known
    /// pattern or names an invalid strftime string.
    pub fn new(
        site: &DirectiveSite<'_>,
        format: &str,
        settings: &DateSettings,
    ) -> Result<Self, CompileError> {
        let Some(pattern) = settings.pattern(format) else {
            return Err(site.invalid(
                "format",
                format!(
                    "unknown pattern `{format}`, expected one of: {}",
                    settings.pattern_names().join(", ")
                ),
            ));
        };
        check_pattern(pattern).map_err(|reason| site.invalid("format", reason))?;
        Ok(Self {
            format_name: format.to_string(),
            pattern: pattern.to_string(),
            missing_value: settings.missing_value,
        })
    }

    pub(crate) fn from_params(
        site: &DirectiveSite<'_>,
        params: &Map<String, Value>,
        settings: &DateSettings,
    ) -> Result<Self, CompileError> {
        let format = params
            .get("format")
            .and_then(Value::as_str)
            .unwrap_or(&settings.default_format);
        Self::new(site, format, settings)
    }

    /// Returns the pattern name this formatter was compiled with.
    #[must_use]
    pub fn format_name(&self) -> &str {
        &self.format_name
    }

    fn render(&self, value: &Value, at: DateTime<Utc>) -> ResolveResult {
        let mut out = String::new();
        write!(out, "{}", at.format(&self.pattern))
            .map_err(|_| ResolveError::format(value, format!("cannot render `{}`", self.format_name)))?;
        Ok(Value::String(out))
    }

    fn transform(&self, value: &Value) -> ResolveResult {
        if value.is_null() {
            return match self.missing_value {
                MissingValuePolicy::FormatNow => self.render(value, Utc::now()),
                MissingValuePolicy::Fail => Err(ResolveError::format(value, "no date value")),
            };
        }
        match parse_date(value) {
            Some(at) => self.render(value, at),
            None => Err(ResolveError::format(value, "not a recognizable date")),
        }
    }
}

impl Behavior for DateBehavior {
    fn name(&self) -> &str {
        names::DATE
    }

    fn process<'a>(
        &'a self,
        parent: &'a Value,
        args: Arguments,
        ctx: &'a mut ExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, ResolveResult> {
        Box::pin(async move {
            let result = next
                .run(parent, args, ctx)
                .await
                .and_then(|value| self.transform(&value));
            observed(self.name(), result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_core::fixtures::CallRecorder;
    use serde_json::json;

    const SAMPLE: &str = "2007-06-09T17:46:21Z";

    fn site() -> DirectiveSite<'static> {
        DirectiveSite::field(names::DATE, "Post", "published")
    }

    fn behavior(format: &str) -> DateBehavior {
        DateBehavior::new(&site(), format, &DateSettings::default()).unwrap()
    }

    async fn run(behavior: &DateBehavior, value: Value) -> ResolveResult {
        let base = CallRecorder::returning(value);
        let mut ctx = ExecutionContext::new();
        behavior
            .process(&Value::Null, Arguments::new(), &mut ctx, Next::resolver(&base))
            .await
    }

    #[test]
    fn test_named_patterns() {
        let at = parse_date(&json!(SAMPLE)).unwrap();
        let expected = [
            ("default", "Sat Jun 09 2007 17:46:21"),
            ("shortDate", "6/9/07"),
            ("mediumDate", "Jun 9, 2007"),
            ("longDate", "June 9, 2007"),
            ("fullDate", "Saturday, June 9, 2007"),
            ("shortTime", "5:46 PM"),
            ("mediumTime", "5:46:21 PM"),
            ("longTime", "5:46:21 PM UTC"),
            ("isoDate", "2007-06-09"),
            ("isoTime", "17:46:21"),
            ("isoDateTime", "2007-06-09T17:46:21+0000"),
            ("isoUtcDateTime", "2007-06-09T17:46:21Z"),
        ];
        for (name, rendered) in expected {
            let value = behavior(name).render(&Value::Null, at).unwrap();
            assert_eq!(value, json!(rendered), "pattern {name}");
        }
    }

    #[test]
    fn test_parse_inputs() {
        let at = parse_date(&json!(SAMPLE)).unwrap();
        for input in [
            json!("2007-06-09T19:46:21+02:00"),
            json!("Sat, 09 Jun 2007 17:46:21 +0000"),
            json!("2007-06-09 17:46:21"),
            json!("2007-06-09T17:46:21"),
            json!(1_181_411_181_000_i64),
        ] {
            assert_eq!(parse_date(&input), Some(at), "input {input}");
        }
        assert_eq!(parse_date(&json!("2007-06-09")).unwrap().to_rfc3339(), "2007-06-09T00:00:00+00:00");
        assert_eq!(parse_date(&json!("yesterday")), None);
        assert_eq!(parse_date(&json!(true)), None);
    }

    #[tokio::test]
    async fn test_formats_inner_value() {
        let value = run(&behavior("isoDate"), json!(SAMPLE)).await;
        assert_eq!(value, Ok(json!("2007-06-09")));
    }

    #[tokio::test]
    async fn test_null_formats_now() {
        let before = Utc::now() - chrono::Duration::seconds(1);
        let value = run(&behavior("isoDateTime"), Value::Null).await.unwrap();

        let rendered = value.as_str().unwrap();
        let at = DateTime::parse_from_str(rendered, "%Y-%m-%dT%H:%M:%S%z").unwrap();
        assert!(at >= before);
        assert!(at <= Utc::now() + chrono::Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_null_fails_when_configured() {
        let settings = DateSettings {
            missing_value: MissingValuePolicy::Fail,
            ..DateSettings::default()
        };
        let behavior = DateBehavior::new(&site(), "isoDate", &settings).unwrap();
        let err = run(&behavior, Value::Null).await.unwrap_err();
        assert!(matches!(err, ResolveError::Format { .. }));
    }

    #[tokio::test]
    async fn test_unparsable_value_fails() {
        let err = run(&behavior("isoDate"), json!("not a date")).await.unwrap_err();
        assert!(matches!(err, ResolveError::Format { value, .. } if value == "\"not a date\""));
    }

    #[test]
    fn test_unknown_format_fails_to_compile() {
        let err = DateBehavior::new(&site(), "fancy", &DateSettings::default()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidParameter { parameter, .. } if parameter == "format"));
    }

    #[test]
    fn test_default_and_custom_patterns() {
        let mut settings = DateSettings {
            default_format: "compact".to_string(),
            ..DateSettings::default()
        };
        settings.patterns.insert("compact".to_string(), "%Y%m%d".to_string());
        assert!(settings.validate().is_ok());

        let behavior = DateBehavior::from_params(&site(), &Map::new(), &settings).unwrap();
        assert_eq!(behavior.format_name(), "compact");
        let at = parse_date(&json!(SAMPLE)).unwrap();
        assert_eq!(behavior.render(&Value::Null, at), Ok(json!("20070609")));
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = DateSettings::default();
        settings.patterns.insert("broken".to_string(), "%Q".to_string());
        assert!(settings.validate().unwrap_err().contains("broken"));

        let settings = DateSettings {
            default_format: "missing".to_string(),
            ..DateSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
