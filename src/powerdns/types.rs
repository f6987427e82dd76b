use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsRecord {
    pub content: String, // "192.0.2.1" or "ns1.example.net."
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Replace,
    Delete,
}

/// One entry of the `rrsets` array in a zone PATCH.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsRrsetChange {
    pub name: String, // FQDN with trailing dot
    #[serde(rename = "type")]
    pub rrtype: String,
    /// Zero means unspecified and is left out of the payload.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changetype: Option<ChangeType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<PdnsRecord>,
}

// Used when creating a zone
#[derive(Debug, Serialize, Deserialize)]
pub struct PdnsZoneCreate {
    pub name: String, // "example.com."
    pub kind: String, // "Native"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub masters: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dnssec: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<String>, // ["ns1.example.net.", "ns2.example.net."]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rrsets: Vec<PdnsRrsetChange>,
}

/// Body of `PATCH /servers/{id}/zones/{zone}`. Absent fields are left untouched upstream.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PdnsZonePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rrsets: Vec<PdnsRrsetChange>,
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

fn is_false(v: &bool) -> bool {
    !*v
}
