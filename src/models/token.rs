use crate::core::codec::{self, Record};
use crate::core::error::{PoolError, PoolResult};
use crate::core::pools::TokenKind;
use crate::util::obfuscate::Obfuscator;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use zeroize::Zeroizing;

/// Decoded token record as served to the request authorizer.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct TokenEntry {
    pub token: String,
    pub tag: String,
    pub user: String,
    /// Obfuscated password exactly as stored.
    #[serde(skip_serializing)]
    pub password: String,
    pub host_name: String,
    pub dbname: String,
    /// Allowed request origins. Empty permits every origin.
    pub origins: Vec<String>,
    pub living: bool,
}

impl TokenEntry {
    /// Decode a token record that already has the token schema width.
    pub fn from_record(record: &Record) -> Self {
        let field = |i| record.field(i).unwrap_or("").to_string();
        let living_raw = record.field(TokenKind::LIVING).unwrap_or("");
        let living = parse_living(living_raw).unwrap_or_else(|| {
            tracing::warn!(
                token = record.key(),
                value = living_raw,
                "unparseable living flag, defaulting to false"
            );
            false
        });
        Self {
            token: field(TokenKind::TOKEN),
            tag: field(TokenKind::TAG),
            user: field(TokenKind::USERNAME),
            password: field(TokenKind::PASSWORD),
            host_name: field(TokenKind::HOST_NAME),
            dbname: field(TokenKind::DATABASE),
            origins: split_origins(record.field(TokenKind::ORIGINS).unwrap_or("")),
            living,
        }
    }

    /// Whether a request from `origin` may use this token.
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.origins.is_empty() || self.origins.iter().any(|o| o == origin)
    }

    /// Decrypt the stored password for the connection dialer.
    pub fn reveal_password(&self, obfuscator: &dyn Obfuscator) -> Result<Zeroizing<String>> {
        obfuscator.decrypt(&self.password)
    }
}

impl fmt::Debug for TokenEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenEntry")
            .field("token", &self.token)
            .field("tag", &self.tag)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host_name", &self.host_name)
            .field("dbname", &self.dbname)
            .field("origins", &self.origins)
            .field("living", &self.living)
            .finish()
    }
}

/// Operator input for issuing a token.
#[derive(Debug, Clone, Default)]
pub struct NewToken {
    pub tag: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub database: Option<String>,
    pub origins: Option<String>,
    pub living: bool,
}

/// [`NewToken`] after validation: required fields present and trimmed, origins normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFields {
    pub tag: String,
    pub user: String,
    pub host: String,
    pub database: String,
    pub origins: String,
    pub living: bool,
}

impl NewToken {
    /// Check the operator input. Reads and writes nothing.
    pub fn validate(&self) -> PoolResult<TokenFields> {
        let fields = TokenFields {
            user: required(self.user.as_deref(), "username [--user]")?,
            host: required(self.host.as_deref(), "host [--host]")?,
            database: required(self.database.as_deref(), "database [--database]")?,
            tag: self.tag.clone().unwrap_or_default(),
            origins: normalize_origins(self.origins.as_deref().unwrap_or("")),
            living: self.living,
        };

        for (name, value) in [
            ("tag", &fields.tag),
            ("user", &fields.user),
            ("host", &fields.host),
            ("database", &fields.database),
            ("origins", &fields.origins),
        ] {
            if !codec::validate_field(value) {
                return Err(PoolError::Validation(format!(
                    "{} must not contain ':' or line breaks",
                    name
                )));
            }
        }
        Ok(fields)
    }
}

fn required(value: Option<&str>, what: &'static str) -> PoolResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(PoolError::Usage(what)),
    }
}

/// Parse the stored living flag. `None` for anything that is not a boolean.
pub fn parse_living(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

/// Trim each comma-separated origin and drop the empty ones.
pub fn normalize_origins(raw: &str) -> String {
    split_origins(raw).join(",")
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(origins: &str, living: &str) -> Record {
        Record::from(["tok", "ci", "alice", "obf", "db1", "app", origins, living])
    }

    #[test]
    fn test_from_record_maps_fields() {
        let entry = TokenEntry::from_record(&record("a.com,b.com", "true"));
        assert_eq!(entry.token, "tok");
        assert_eq!(entry.tag, "ci");
        assert_eq!(entry.user, "alice");
        assert_eq!(entry.password, "obf");
        assert_eq!(entry.host_name, "db1");
        assert_eq!(entry.dbname, "app");
        assert_eq!(entry.origins, vec!["a.com", "b.com"]);
        assert!(entry.living);
    }

    #[test]
    fn test_unparseable_living_defaults_false() {
        assert!(!TokenEntry::from_record(&record("", "yes please")).living);
        assert!(!TokenEntry::from_record(&record("", "")).living);
    }

    #[test]
    fn test_parse_living_variants() {
        assert_eq!(parse_living("TRUE"), Some(true));
        assert_eq!(parse_living("1"), Some(true));
        assert_eq!(parse_living("f"), Some(false));
        assert_eq!(parse_living("nope"), None);
    }

    #[test]
    fn test_empty_origins_allow_everything() {
        let entry = TokenEntry::from_record(&record("", "false"));
        assert!(entry.origins.is_empty());
        assert!(entry.allows_origin("https://anything.example"));
    }

    #[test]
    fn test_origin_allow_list_is_exact() {
        let entry = TokenEntry::from_record(&record("a.com", "false"));
        assert!(entry.allows_origin("a.com"));
        assert!(!entry.allows_origin("A.com"));
        assert!(!entry.allows_origin("b.com"));
    }

    #[test]
    fn test_normalize_origins() {
        assert_eq!(normalize_origins("a.com, b.com,"), "a.com,b.com");
        assert_eq!(normalize_origins(" , ,"), "");
        assert_eq!(normalize_origins(""), "");
    }

    #[test]
    fn test_validate_trims_and_normalizes() {
        let input = NewToken {
            user: Some(" alice ".into()),
            host: Some("db1".into()),
            database: Some("app".into()),
            origins: Some("a.com, ,b.com".into()),
            ..Default::default()
        };
        let fields = input.validate().unwrap();
        assert_eq!(fields.user, "alice");
        assert_eq!(fields.tag, "");
        assert_eq!(fields.origins, "a.com,b.com");
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let input = NewToken {
            host: Some("db1".into()),
            ..Default::default()
        };
        assert!(matches!(
            input.validate(),
            Err(PoolError::Usage("username [--user]"))
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let entry = TokenEntry::from_record(&record("", "false"));
        let shown = format!("{:?}", entry);
        assert!(shown.contains("<redacted>"));
        assert!(!shown.contains("obf"));
    }
}
