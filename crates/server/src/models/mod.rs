//! Records exchanged between the services and the HTTP layer

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage format of `pass_requests.created_at`
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Storage format of the expiry and arrival dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The only status the system ever assigns
pub const STATUS_PROCESSING: &str = "Processing";

/// Age as submitted by a client: a JSON integer, free text, or anything else
/// (fractions, booleans, out-of-range numbers), which validation rejects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgeInput {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

/// Registration input before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAccount {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub age: Option<AgeInput>,
    pub address: Option<String>,
    #[serde(default)]
    pub phone: String,
}

/// Public account info (no credentials)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: Option<u32>,
    pub address: Option<String>,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Bearer session for authenticated requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub account_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Pass request input before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPassRequest {
    #[serde(default)]
    pub from_place: String,
    #[serde(default)]
    pub to_place: String,
    pub via1: Option<String>,
    pub via2: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassRequest {
    pub id: i64,
    pub account_id: i64,
    pub from_place: String,
    pub to_place: String,
    pub via1: Option<String>,
    pub via2: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub expiry_date: Option<NaiveDate>,
    pub estimated_arrival: Option<NaiveDate>,
}

/// Short projection used by the pass history view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassSummary {
    pub id: i64,
    pub from_place: String,
    pub to_place: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl From<PassRequest> for PassSummary {
    fn from(pass: PassRequest) -> Self {
        Self {
            id: pass.id,
            from_place: pass.from_place,
            to_place: pass.to_place,
            status: pass.status,
            created_at: pass.created_at,
        }
    }
}

/// Result of a successful submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReceipt {
    pub id: i64,
    pub pass: PassRequest,
    /// User-facing acknowledgements, in display order
    pub notices: Vec<String>,
}
