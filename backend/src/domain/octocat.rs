//! Octocat entity and per-field validation.
//!
//! An octocat has an immutable, unique `name`, an immutable owner and
//! creation timestamp, and two mutable attributes: an informational URL and
//! a deadline. Field validators are explicit functions so inbound adapters
//! can compose them and report every violation in one response.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use super::identity::Email;

/// Maximum accepted length for an octocat name.
pub const NAME_MAX: usize = 100;

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_regex() -> &'static Regex {
    NAME_RE.get_or_init(|| {
        // Letters, digits, underscore and hyphen only.
        #[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
        let pattern = Regex::new(r"^[\w-]+$").expect("octocat name pattern is valid");
        pattern
    })
}

/// Validation failures for octocat fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OctocatValidationError {
    /// Name was empty.
    #[error("octocat name must not be empty")]
    EmptyName,
    /// Name exceeded [`NAME_MAX`] characters.
    #[error("octocat name must be at most {NAME_MAX} characters")]
    NameTooLong,
    /// Name contained characters outside `[A-Za-z0-9_-]`.
    #[error(
        "'{name}' contains one or more invalid characters. Octocat name must contain \
         only letters, numbers, hyphen and underscore characters."
    )]
    NameInvalidCharacters {
        /// The rejected name.
        name: String,
    },
    /// URL did not parse or used a scheme other than http/https.
    #[error("'{value}' is not a valid URL. The URL must be absolute and use http or https.")]
    InvalidUrl {
        /// The rejected value.
        value: String,
    },
    /// Deadline string did not parse as a date.
    #[error(
        "Failed to parse '{value}' as a valid date. Use an ISO-8601 date such as \
         '2026-05-13', or an RFC 3339 timestamp."
    )]
    UnparsableDeadline {
        /// The rejected value.
        value: String,
    },
    /// Deadline date was before today.
    #[error("'{value}' is in the past. The deadline must be today or a future date.")]
    DeadlineInPast {
        /// The rejected value.
        value: String,
    },
}

/// Unique, immutable octocat name restricted to `[A-Za-z0-9_-]+`.
///
/// # Examples
/// ```
/// use octocat_api::domain::OctocatName;
///
/// assert!(OctocatName::new("PENTA-widg-GON-et").is_ok());
/// assert!(OctocatName::new("no spaces").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OctocatName(String);

impl OctocatName {
    /// Validate and construct a name.
    ///
    /// # Errors
    /// Rejects empty names, names longer than [`NAME_MAX`] characters, and
    /// names with characters outside the allowed class.
    pub fn new(name: impl Into<String>) -> Result<Self, OctocatValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(OctocatValidationError::EmptyName);
        }
        if name.chars().count() > NAME_MAX {
            return Err(OctocatValidationError::NameTooLong);
        }
        if !name_regex().is_match(&name) {
            return Err(OctocatValidationError::NameInvalidCharacters { name });
        }
        Ok(Self(name))
    }

    /// Borrow the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for OctocatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for OctocatName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Absolute http/https URL attached to an octocat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InfoUrl(String);

impl InfoUrl {
    /// Validate and construct an informational URL.
    ///
    /// # Errors
    /// Rejects values that do not parse as absolute URLs, lack a host, or
    /// use a scheme other than `http`/`https`.
    ///
    /// # Examples
    /// ```
    /// use octocat_api::domain::InfoUrl;
    ///
    /// assert!(InfoUrl::parse("https://www.two.net").is_ok());
    /// assert!(InfoUrl::parse("ftp://files.example.com").is_err());
    /// assert!(InfoUrl::parse("/relative/path").is_err());
    /// ```
    pub fn parse(value: impl Into<String>) -> Result<Self, OctocatValidationError> {
        let value = value.into();
        let invalid = || OctocatValidationError::InvalidUrl {
            value: value.clone(),
        };
        let parsed = Url::parse(&value).map_err(|_| invalid())?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(invalid());
        }
        Ok(Self(value))
    }

    /// Borrow the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for InfoUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Octocat deadline, stored as an end-of-day UTC instant.
///
/// The original input is a calendar date; a deadline of "today" is accepted
/// because the stored instant is the final microsecond of that day, which is
/// still in the future at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Deadline(DateTime<Utc>);

impl Deadline {
    /// Parse a deadline from client input, validated against `today`.
    ///
    /// Accepts an ISO-8601 date (`2026-05-13`) or a full RFC 3339 timestamp,
    /// whose date component is used.
    ///
    /// # Errors
    /// Returns [`OctocatValidationError::UnparsableDeadline`] for malformed
    /// input and [`OctocatValidationError::DeadlineInPast`] for dates before
    /// `today`.
    pub fn parse(value: &str, today: NaiveDate) -> Result<Self, OctocatValidationError> {
        let date = parse_deadline_date(value).ok_or_else(|| {
            OctocatValidationError::UnparsableDeadline {
                value: value.to_owned(),
            }
        })?;
        if date < today {
            return Err(OctocatValidationError::DeadlineInPast {
                value: value.to_owned(),
            });
        }
        Ok(Self(end_of_day_utc(date)))
    }

    /// The stored UTC instant.
    #[must_use]
    pub const fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

fn parse_deadline_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

fn end_of_day_utc(date: NaiveDate) -> DateTime<Utc> {
    #[expect(
        clippy::expect_used,
        reason = "23:59:59.999999 is a valid time on every date"
    )]
    let end = date
        .and_hms_micro_opt(23, 59, 59, 999_999)
        .expect("end of day is a valid time");
    end.and_utc()
}

/// Reference to the identity that created an octocat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Owner {
    /// Owner's unique email address.
    pub email: Email,
    /// Owner's stable public identifier.
    pub public_id: Uuid,
}

/// A stored octocat.
///
/// `name`, `owner` and `created_at` are immutable for the lifetime of the
/// resource; `url` and `deadline` are replaceable by update operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Octocat {
    /// Unique name, the resource's stable key.
    pub name: OctocatName,
    /// Informational URL.
    pub url: InfoUrl,
    /// End-of-day UTC deadline.
    pub deadline: DateTime<Utc>,
    /// The identity that created the resource.
    pub owner: Owner,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Attributes required to create an octocat.
#[derive(Debug, Clone)]
pub struct NewOctocat {
    /// Validated unique name.
    pub name: OctocatName,
    /// Validated informational URL.
    pub url: InfoUrl,
    /// Validated deadline.
    pub deadline: Deadline,
    /// Public identifier of the creating identity.
    pub owner_id: Uuid,
}

/// Mutable attributes supplied to an update; absent fields are left as-is.
#[derive(Debug, Clone, Default)]
pub struct OctocatChanges {
    /// Replacement URL, when supplied.
    pub url: Option<InfoUrl>,
    /// Replacement deadline, when supplied.
    pub deadline: Option<Deadline>,
}

impl OctocatChanges {
    /// Whether the update carries no attributes at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.url.is_none() && self.deadline.is_none()
    }
}
