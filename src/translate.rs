//! Inbound request shapes and their translation into PowerDNS payloads.
//!
//! Nothing here talks to the network: each function validates its input and
//! returns the exact body the upstream call will carry.
use serde::{Deserialize, Serialize};

use crate::powerdns::types::{
    ChangeType, PdnsRecord, PdnsRrsetChange, PdnsZoneCreate, PdnsZonePatch,
};
use crate::validation::{RecordId, ValidationError, ensure_fqdn, normalize_rrtype};

pub const DEFAULT_ZONE_KIND: &str = "Native";

#[derive(Debug, Deserialize)]
pub struct CreateZoneRequest {
    #[serde(default)]
    pub name: String,
    /// Native, Master or Slave.
    #[serde(default)]
    pub kind: Option<String>,
    /// Only meaningful for Slave zones.
    #[serde(default)]
    pub masters: Vec<String>,
    #[serde(default)]
    pub dnssec: bool,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub nameservers: Vec<String>,
    #[serde(default)]
    pub rrsets: Vec<PdnsRrsetChange>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateZoneRequest {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub rrsets: Vec<PdnsRrsetChange>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RrsetRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub rrtype: String,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub contents: Vec<String>,
    /// Applied to every record of the set.
    #[serde(default)]
    pub disabled: bool,
}

/// Either one record type or several, as sent in the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RecordTypeSpec {
    Single(String),
    Multiple(Vec<String>),
}

impl Default for RecordTypeSpec {
    fn default() -> Self {
        RecordTypeSpec::Multiple(Vec::new())
    }
}

impl RecordTypeSpec {
    /// Upper-cased types with blanks dropped, in request order.
    pub fn normalized(&self) -> Vec<String> {
        let raw: &[String] = match self {
            RecordTypeSpec::Single(t) => std::slice::from_ref(t),
            RecordTypeSpec::Multiple(ts) => ts,
        };
        raw.iter()
            .map(|t| normalize_rrtype(t))
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SimpleRecordRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub types: RecordTypeSpec,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub ttl: u32,
}

/// What a simple request does to each of its rrsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleAction {
    Create,
    Update,
    Delete,
}

/// Result of fanning out a simple request.
#[derive(Debug)]
pub struct SimpleChangeSet {
    pub name: String,
    pub types: Vec<String>,
    pub patch: PdnsZonePatch,
}

pub fn zone_create(req: CreateZoneRequest) -> Result<PdnsZoneCreate, ValidationError> {
    if req.name.trim().is_empty() {
        return Err(ValidationError::MissingZoneName);
    }
    let kind = req
        .kind
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| DEFAULT_ZONE_KIND.to_string());

    Ok(PdnsZoneCreate {
        name: ensure_fqdn(req.name.trim()),
        kind,
        masters: req.masters,
        dnssec: req.dnssec,
        account: req.account,
        nameservers: req.nameservers,
        rrsets: req.rrsets,
    })
}

pub fn zone_update(req: UpdateZoneRequest) -> PdnsZonePatch {
    PdnsZonePatch {
        kind: req.kind.filter(|k| !k.is_empty()),
        account: req.account,
        rrsets: req.rrsets,
    }
}

/// REPLACE one rrset addressed by the body's own name and type.
pub fn rrset_create(req: RrsetRequest) -> Result<PdnsZonePatch, ValidationError> {
    let name = req.name.trim();
    let rrtype = normalize_rrtype(&req.rrtype);
    if name.is_empty() || rrtype.is_empty() || req.contents.is_empty() {
        return Err(ValidationError::IncompleteRrset);
    }
    let change = replace_change(ensure_fqdn(name), rrtype, req.ttl, &req.contents, req.disabled);
    Ok(single_change(change))
}

/// REPLACE the rrset named by `id`; the body's name and type are ignored.
pub fn rrset_update(id: RecordId, req: RrsetRequest) -> Result<PdnsZonePatch, ValidationError> {
    if req.contents.is_empty() {
        return Err(ValidationError::IncompleteRrset);
    }
    let change = replace_change(id.name, id.rrtype, req.ttl, &req.contents, req.disabled);
    Ok(single_change(change))
}

pub fn rrset_delete(id: RecordId) -> PdnsZonePatch {
    single_change(delete_change(id.name, id.rrtype))
}

/// Fan a simple request out into one change per record type.
pub fn simple_changes(
    action: SimpleAction,
    req: SimpleRecordRequest,
) -> Result<SimpleChangeSet, ValidationError> {
    let name = req.name.trim();
    let types = req.types.normalized();
    if name.is_empty() || types.is_empty() {
        return Err(ValidationError::MissingNameOrTypes);
    }
    if action != SimpleAction::Delete && req.value.is_empty() {
        return Err(ValidationError::MissingValue);
    }

    let name = ensure_fqdn(name);
    let contents = [req.value];
    let rrsets = types
        .iter()
        .map(|rrtype| match action {
            SimpleAction::Create | SimpleAction::Update => {
                replace_change(name.clone(), rrtype.clone(), req.ttl, &contents, false)
            }
            SimpleAction::Delete => delete_change(name.clone(), rrtype.clone()),
        })
        .collect();

    Ok(SimpleChangeSet {
        name,
        types,
        patch: PdnsZonePatch {
            rrsets,
            ..Default::default()
        },
    })
}

pub fn contents_to_records(contents: &[String], disabled: bool) -> Vec<PdnsRecord> {
    contents
        .iter()
        .map(|content| PdnsRecord {
            content: content.clone(),
            disabled,
        })
        .collect()
}

fn replace_change(
    name: String,
    rrtype: String,
    ttl: u32,
    contents: &[String],
    disabled: bool,
) -> PdnsRrsetChange {
    PdnsRrsetChange {
        name,
        rrtype,
        ttl,
        changetype: Some(ChangeType::Replace),
        records: contents_to_records(contents, disabled),
    }
}

fn delete_change(name: String, rrtype: String) -> PdnsRrsetChange {
    PdnsRrsetChange {
        name,
        rrtype,
        ttl: 0,
        changetype: Some(ChangeType::Delete),
        records: Vec::new(),
    }
}

fn single_change(change: PdnsRrsetChange) -> PdnsZonePatch {
    PdnsZonePatch {
        rrsets: vec![change],
        ..Default::default()
    }
}
