//! Name and identifier normalization shared by every handler.

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("recordID must be 'name:type', got {0:?}")]
    MalformedRecordId(String),
    #[error("invalid recordID {0:?}")]
    InvalidRecordId(String),
    #[error("name is required (FQDN, include trailing dot or we'll add it)")]
    MissingZoneName,
    #[error("name, type and contents are required")]
    IncompleteRrset,
    #[error("name and at least one type are required")]
    MissingNameOrTypes,
    #[error("value is required")]
    MissingValue,
    #[error("invalid zone name {0:?}")]
    InvalidZoneName(String),
}

/// An rrset addressed by its `name:type` identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordId {
    /// Fully-qualified owner name, e.g. `www.example.com.`
    pub name: String,
    /// Upper-case record type, e.g. `AAAA`
    pub rrtype: String,
}

/// Append the trailing root dot when missing. Never fails.
pub fn ensure_fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Canonical zone name taken from a URL path segment.
///
/// Names made only of dots (`.`, `..`) are refused; everything else is
/// fully-qualified and sent upstream as a single escaped path segment.
pub fn zone_name(raw: &str) -> Result<String, ValidationError> {
    let name = ensure_fqdn(raw.trim());
    if name.chars().all(|c| c == '.') {
        return Err(ValidationError::InvalidZoneName(raw.to_string()));
    }
    Ok(name)
}

pub fn normalize_rrtype(rrtype: &str) -> String {
    rrtype.trim().to_ascii_uppercase()
}

/// Parse a `name:type` record identifier.
pub fn parse_record_id(id: &str) -> Result<RecordId, ValidationError> {
    let parts: Vec<&str> = id.split(':').collect();
    let [name, rrtype] = parts.as_slice() else {
        return Err(ValidationError::MalformedRecordId(id.to_string()));
    };

    let name = ensure_fqdn(name.trim());
    let rrtype = normalize_rrtype(rrtype);
    if name == "." || rrtype.is_empty() {
        return Err(ValidationError::InvalidRecordId(id.to_string()));
    }

    Ok(RecordId { name, rrtype })
}
