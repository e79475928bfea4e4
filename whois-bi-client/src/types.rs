//! Wire types for the whois-bi REST API.
//!
//! The server has emitted both snake_case (`finished_at`) and Go-default
//! PascalCase (`FinishedAt`) field names over its lifetime, so every field
//! accepts both spellings. Lists sent as `null` decode as empty.

use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::datetime;

// ============ Serde helpers ============

/// `null` → `T::default()`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Record types have been sent both as mnemonics (`"A"`) and as numeric codes.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(s)) => s,
        Some(Raw::Num(n)) => n.to_string(),
        None => String::new(),
    })
}

// ============ Domain ============

/// A monitored domain owned by the authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    #[serde(alias = "ID")]
    pub id: i64,
    /// Fully qualified domain name, unique per owner.
    #[serde(rename = "domain", alias = "Domain")]
    pub name: String,
    #[serde(default, alias = "OwnerID")]
    pub owner_id: i64,
    #[serde(default, alias = "AddedAt", deserialize_with = "datetime::deserialize")]
    pub added_at: String,
    #[serde(default, alias = "DeletedAt", deserialize_with = "datetime::deserialize")]
    pub deleted_at: String,
    #[serde(default, alias = "LastJobAt", deserialize_with = "datetime::deserialize")]
    pub last_job_at: String,
    #[serde(
        default,
        alias = "LastUpdatedAt",
        deserialize_with = "datetime::deserialize"
    )]
    pub last_updated_at: String,
}

// ============ Record ============

/// A DNS resource record observed for a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(alias = "ID")]
    pub id: i64,
    #[serde(default, alias = "DomainID")]
    pub domain_id: i64,
    /// How the record was discovered (any query, AXFR, manual entry, enumeration).
    #[serde(default, alias = "RecordSource")]
    pub record_source: u16,
    /// Zone-file text of the record.
    #[serde(default, alias = "Raw", deserialize_with = "null_as_default")]
    pub raw: String,
    /// Rdata portion of the record, e.g. `0 issue "digicert.com"`.
    #[serde(default, alias = "Fields", deserialize_with = "null_as_default")]
    pub fields: String,
    #[serde(default, alias = "Name", deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, alias = "RRType", deserialize_with = "string_or_number")]
    pub rr_type: String,
    #[serde(default, alias = "Class", alias = "RRClass")]
    pub rr_class: u16,
    #[serde(default, alias = "TTL")]
    pub ttl: u32,
    /// Hash of fields and TTL, used server-side for change detection.
    #[serde(default, alias = "Hash")]
    pub hash: u64,
    #[serde(default, alias = "AddedAt", deserialize_with = "datetime::deserialize")]
    pub added_at: String,
    /// Empty while the record is live; set once it disappeared from DNS.
    #[serde(default, alias = "RemovedAt", deserialize_with = "datetime::deserialize")]
    pub removed_at: String,
}

impl Record {
    /// A record is current (not historical) while `removed_at` is unset.
    pub fn is_current(&self) -> bool {
        datetime::is_unset(&self.removed_at)
    }
}

// ============ Whois ============

/// A point-in-time capture of a domain's WHOIS data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Whois {
    #[serde(alias = "ID")]
    pub id: i64,
    #[serde(alias = "DomainID")]
    pub domain_id: i64,
    #[serde(alias = "Raw", deserialize_with = "null_as_default")]
    pub raw: String,
    #[serde(alias = "Version", deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(alias = "CreatedDate", deserialize_with = "datetime::deserialize")]
    pub created_date: String,
    #[serde(alias = "UpdatedDate", deserialize_with = "datetime::deserialize")]
    pub updated_date: String,
    #[serde(alias = "ExpirationDate", deserialize_with = "datetime::deserialize")]
    pub expiration_date: String,
    /// Dates the server could not parse from the raw WHOIS text.
    #[serde(alias = "DateErrors", deserialize_with = "null_as_default")]
    pub date_errors: Vec<String>,
    #[serde(alias = "AddedAt", deserialize_with = "datetime::deserialize")]
    pub added_at: String,
    #[serde(alias = "DeletedAt", deserialize_with = "datetime::deserialize")]
    pub deleted_at: String,
}

// ============ Job ============

/// A server-side check of a domain's DNS records and WHOIS data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    #[serde(alias = "ID")]
    pub id: i64,
    #[serde(default, alias = "DomainID")]
    pub domain_id: i64,
    #[serde(default, alias = "Errors", deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
    /// Records added by this check.
    #[serde(default, alias = "Additions")]
    pub additions: u32,
    /// Records removed by this check.
    #[serde(default, alias = "Removals")]
    pub removals: u32,
    #[serde(default, alias = "WhoisUpdated")]
    pub whois_updated: bool,
    #[serde(default, alias = "CreatedAt", deserialize_with = "datetime::deserialize")]
    pub created_at: String,
    #[serde(default, alias = "StartedAt", deserialize_with = "datetime::deserialize")]
    pub started_at: String,
    #[serde(default, alias = "FinishedAt", deserialize_with = "datetime::deserialize")]
    pub finished_at: String,
}

impl Job {
    /// A job is unfinished while `finished_at` is unset.
    pub fn is_finished(&self) -> bool {
        !datetime::is_unset(&self.finished_at)
    }
}

// ============ Domain detail ============

/// Response of `GET /api/user/domain/{name}`.
///
/// Depending on the server build this is either the bare domain or an
/// envelope that also embeds the records and the active WHOIS snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "DomainDetailBody")]
pub struct DomainDetail {
    pub domain: Domain,
    /// Embedded records, `None` when the server sent only the domain.
    pub records: Option<Vec<Record>>,
    /// Embedded active WHOIS snapshot.
    pub whois: Option<Whois>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DomainDetailBody {
    Embedded {
        #[serde(alias = "Domain")]
        domain: Domain,
        #[serde(default, alias = "Records")]
        records: Option<Vec<Record>>,
        #[serde(default, alias = "Whois")]
        whois: Option<Whois>,
    },
    Bare(Domain),
}

impl From<DomainDetailBody> for DomainDetail {
    fn from(body: DomainDetailBody) -> Self {
        match body {
            DomainDetailBody::Embedded {
                domain,
                records,
                whois,
            } => Self {
                domain,
                records,
                // an empty `{}` placeholder means "no snapshot yet"
                whois: whois.filter(|w| w.id != 0),
            },
            DomainDetailBody::Bare(domain) => Self {
                domain,
                records: None,
                whois: None,
            },
        }
    }
}

// ============ Requests / responses ============

/// Login and registration payload.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Body of `POST /api/user/domain`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateDomainRequest<'a> {
    #[serde(rename = "Domain")]
    pub domain: &'a str,
}

/// Body of `POST /api/user/domain/{name}/record`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AddRecordRequest<'a> {
    #[serde(rename = "Raw")]
    pub raw: &'a str,
}

/// Result of submitting raw record text for server-side parsing.
///
/// Both lists may be non-empty: every accepted line shows up in `records`,
/// every rejected one in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddRecordResponse {
    #[serde(default, alias = "Records", deserialize_with = "null_as_default")]
    pub records: Vec<Record>,
    #[serde(default, alias = "Errors", deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
}

// ============ Batch ============

/// Outcome of one name in a batch domain creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Created(Domain),
    Failed { reason: String },
}

/// One entry of a batch result, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub name: String,
    pub outcome: BatchOutcome,
}

impl BatchItem {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Created(_))
    }

    /// The created domain, if this entry succeeded.
    pub fn domain(&self) -> Option<&Domain> {
        match &self.outcome {
            BatchOutcome::Created(d) => Some(d),
            BatchOutcome::Failed { .. } => None,
        }
    }
}
