use crate::core::codec::{self, Record};
use crate::core::error::{PoolError, PoolResult};
use crate::core::pools::HostKind;
use serde::Serialize;

/// A registered database host that tokens refer to by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostEntry {
    pub name: String,
    pub address: String,
    pub port: u16,
}

impl HostEntry {
    pub fn new(name: impl Into<String>, address: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            port,
        }
    }

    /// Check that the name and address can be stored in a host record.
    pub fn validate(&self) -> PoolResult<()> {
        if !codec::validate_field(&self.name) {
            return Err(PoolError::Validation(format!(
                "host name '{}' must not contain ':' or line breaks",
                self.name
            )));
        }
        if self.address.contains(':') {
            return Err(PoolError::Validation(format!(
                "address '{}' contains ':'; IPv6 literals cannot be stored, use a hostname that resolves to it",
                self.address
            )));
        }
        if !codec::validate_field(&self.address) {
            return Err(PoolError::Validation(format!(
                "address '{}' must not contain line breaks",
                self.address
            )));
        }
        Ok(())
    }

    /// Decode a host record. The pool guarantees the port parses; `0` otherwise.
    pub fn from_record(record: &Record) -> Self {
        Self {
            name: record.key().to_string(),
            address: record.field(HostKind::ADDRESS).unwrap_or("").to_string(),
            port: record
                .field(HostKind::PORT)
                .and_then(|p| p.parse().ok())
                .unwrap_or(0),
        }
    }

    pub fn to_record(&self) -> Record {
        Record::new(vec![
            self.name.clone(),
            self.address.clone(),
            self.port.to_string(),
        ])
    }
}
