use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;
use ulid::Ulid;

use crate::error::ValidationError;

/// Opaque per-attempt `OAuth2` `state` token echoed back by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct OAuthState(pub String);

impl OAuthState {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One-time PKCE secret kept by the requester until the code exchange.
///
/// `Debug` is redacted; the verifier never reaches logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct CodeVerifier(pub String);

impl CodeVerifier {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for CodeVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CodeVerifier(..)")
    }
}

/// S256 challenge derived from a [`CodeVerifier`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct CodeChallenge(pub String);

impl CodeChallenge {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Ledger record identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct RecordId(pub Ulid);

impl RecordId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

/// Calendar month (`YYYY-MM`), the ledger partition key.
///
/// Valid by construction: use `"2024-05".parse::<Month>()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month(String);

impl Month {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Month {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for Month {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let format = format_description!("[year]-[month]-[day]");
        let well_formed = s.len() == 7
            && s.as_bytes()[0].is_ascii_digit()
            && Date::parse(&format!("{s}-01"), format).is_ok();
        if well_formed {
            Ok(Self(s))
        } else {
            Err(ValidationError::InvalidMonth(s))
        }
    }
}

impl From<Month> for String {
    fn from(m: Month) -> Self {
        m.0
    }
}

/// Calendar day (`YYYY-MM-DD`) of a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryDate(String);

impl EntryDate {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Month partition this day belongs to.
    #[must_use]
    pub fn month(&self) -> Month {
        Month(self.0[..7].to_owned())
    }
}

impl std::fmt::Display for EntryDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for EntryDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for EntryDate {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let format = format_description!("[year]-[month]-[day]");
        if s.len() == 10 && s.as_bytes()[0].is_ascii_digit() && Date::parse(&s, format).is_ok() {
            Ok(Self(s))
        } else {
            Err(ValidationError::InvalidDate(s))
        }
    }
}

impl From<EntryDate> for String {
    fn from(d: EntryDate) -> Self {
        d.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_month() {
        assert!("2024-01".parse::<Month>().is_ok());
        assert!("2024-12".parse::<Month>().is_ok());
    }

    #[test]
    fn invalid_month() {
        assert!("2024-13".parse::<Month>().is_err());
        assert!("2024-1".parse::<Month>().is_err());
        assert!("202401".parse::<Month>().is_err());
        assert!("".parse::<Month>().is_err());
        assert!("2024-01-01".parse::<Month>().is_err());
    }

    #[test]
    fn valid_entry_date() {
        let date: EntryDate = "2024-02-29".parse().unwrap();
        assert_eq!(date.month().as_str(), "2024-02");
    }

    #[test]
    fn invalid_entry_date() {
        assert!("2023-02-29".parse::<EntryDate>().is_err());
        assert!("2024-2-01".parse::<EntryDate>().is_err());
        assert!("tomorrow".parse::<EntryDate>().is_err());
    }

    #[test]
    fn month_serde_rejects_malformed() {
        let parsed: Result<Month, _> = serde_json::from_str("\"2024-99\"");
        assert!(parsed.is_err());
        let month: Month = serde_json::from_str("\"2024-05\"").unwrap();
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"2024-05\"");
    }

    #[test]
    fn verifier_debug_is_redacted() {
        let verifier = CodeVerifier::from("super-secret".to_string());
        assert!(!format!("{verifier:?}").contains("super-secret"));
    }

    #[test]
    fn record_ids_are_unique() {
        assert_ne!(RecordId::generate(), RecordId::generate());
    }
}
