// Panel data models
//
// Client records live inside an inbound's `settings` field, which the panel
// stores as a JSON document encoded into a string. Reads decode that string;
// writes re-encode a single-client list. Fields use `#[serde(default)]`
// liberally because panel versions disagree on which keys they emit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

use crate::error::Error;

/// Flow assigned to clients that don't specify one.
pub const DEFAULT_FLOW: &str = "xtls-rprx-vision";

const GENERATED_EMAIL_LEN: usize = 10;

// ── Client record ────────────────────────────────────────────────────

/// One proxy account inside an inbound's settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Proxy identity (UUID).
    #[serde(default, deserialize_with = "de_string")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string")]
    pub flow: String,
    /// Display label; the panel requires it to be unique.
    #[serde(default, deserialize_with = "de_string")]
    pub email: String,
    #[serde(default, rename = "limitIp", deserialize_with = "de_i64")]
    pub limit_ip: i64,
    /// Traffic quota in bytes, 0 = unlimited.
    #[serde(default, rename = "totalGB", deserialize_with = "de_i64")]
    pub total_gb: i64,
    /// Epoch milliseconds, 0 = never expires.
    #[serde(default, rename = "expiryTime", deserialize_with = "de_i64")]
    pub expiry_time: i64,
    #[serde(default, deserialize_with = "de_bool")]
    pub enable: bool,
    /// External (Telegram) identifier used for lookups.
    #[serde(default, rename = "tgId", deserialize_with = "de_tg_id")]
    pub tg_id: Option<i64>,
    #[serde(default, rename = "subId", deserialize_with = "de_string")]
    pub sub_id: String,
    #[serde(default, deserialize_with = "de_i64")]
    pub reset: i64,
    /// Catch-all for fields this crate doesn't model (`comment`, timestamps, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Interpret a `tgId` value: panels emit numbers, numeric strings, or `""`.
pub(crate) fn tg_id_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn de_tg_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(tg_id_from_value(&value))
}

// Panels built from different versions (and hand-edited databases) send
// `null`, numeric strings or numbers where a string is expected. A record
// that matched by `tgId` must still decode, so these never fail.

fn de_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        Value::Bool(b) => i64::from(b),
        _ => 0,
    })
}

fn de_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    })
}

fn de_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

// ── Client patch ─────────────────────────────────────────────────────

/// Caller-side description of a client for add/update calls.
///
/// `None` means "not supplied": an update omits the key entirely, an add
/// fills in the default. `uuid` is always sent, as the record's `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientPatch {
    #[serde(rename = "id", alias = "uuid")]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, rename = "tgId", skip_serializing_if = "Option::is_none")]
    pub tg_id: Option<i64>,
    #[serde(default, rename = "limitIp", skip_serializing_if = "Option::is_none")]
    pub limit_ip: Option<i64>,
    #[serde(default, rename = "totalGB", skip_serializing_if = "Option::is_none")]
    pub total_gb: Option<i64>,
    #[serde(default, rename = "expiryTime", skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(default, rename = "subId", skip_serializing_if = "Option::is_none")]
    pub sub_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<i64>,
}

impl ClientPatch {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Self::default()
        }
    }

    /// Complete the patch into a full record, filling add-time defaults.
    ///
    /// Unset `email` becomes a random 10-character label and unset `subId`
    /// a random UUID, since the panel rejects duplicates of either.
    pub fn into_record(self) -> ClientRecord {
        ClientRecord {
            id: self.uuid,
            flow: self.flow.unwrap_or_else(|| DEFAULT_FLOW.to_owned()),
            email: self.email.unwrap_or_else(random_label),
            limit_ip: self.limit_ip.unwrap_or(1),
            total_gb: self.total_gb.unwrap_or(0),
            expiry_time: self.expiry_time.unwrap_or(0),
            enable: self.enable.unwrap_or(false),
            tg_id: self.tg_id,
            sub_id: self
                .sub_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            reset: self.reset.unwrap_or(0),
            extra: Map::new(),
        }
    }
}

fn random_label() -> String {
    let mut label = uuid::Uuid::new_v4().simple().to_string();
    label.truncate(GENERATED_EMAIL_LEN);
    label
}

// ── Settings envelope ────────────────────────────────────────────────

/// Decoded form of an inbound's `settings` string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundSettings<T = Value> {
    #[serde(default)]
    pub clients: Vec<T>,
}

impl InboundSettings {
    /// Decode a `settings` string, treating malformed JSON as "no clients".
    pub fn decode(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }
}

/// Build the `{ id, settings }` body shared by add and update calls.
///
/// `settings` is the JSON text of `{"clients":[client]}`.
pub fn settings_payload<T: Serialize>(inbound_id: i64, client: &T) -> Result<Value, Error> {
    let settings = InboundSettings {
        clients: vec![client],
    };
    let encoded = serde_json::to_string(&settings).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: String::new(),
    })?;
    Ok(json!({ "id": inbound_id, "settings": encoded }))
}

// ── Inbound ──────────────────────────────────────────────────────────

/// Inbound object returned as `obj` by `panel/api/inbounds/get/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inbound {
    pub id: i64,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub enable: bool,
    /// JSON-encoded [`InboundSettings`].
    #[serde(default)]
    pub settings: String,
    #[serde(default, rename = "clientStats")]
    pub client_stats: Option<Vec<ClientTraffic>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Inbound {
    /// Client records from the encoded settings; entries that don't look
    /// like clients are skipped.
    pub fn clients(&self) -> Vec<ClientRecord> {
        InboundSettings::decode(&self.settings)
            .clients
            .into_iter()
            .filter_map(|c| serde_json::from_value(c).ok())
            .collect()
    }
}

// ── Traffic ──────────────────────────────────────────────────────────

/// Per-client traffic counters (`getClientTrafficsById`, `clientStats`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientTraffic {
    #[serde(default)]
    pub id: i64,
    #[serde(default, rename = "inboundId")]
    pub inbound_id: i64,
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub email: String,
    /// Uploaded bytes.
    #[serde(default)]
    pub up: i64,
    /// Downloaded bytes.
    #[serde(default)]
    pub down: i64,
    #[serde(default, rename = "expiryTime")]
    pub expiry_time: i64,
    /// Quota in bytes, 0 = unlimited.
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub reset: i64,
}

// ── Source user ──────────────────────────────────────────────────────

/// Application-side user mirrored into the panel by
/// [`XuiClient::sync_user`](crate::XuiClient::sync_user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUser {
    pub uuid: String,
    pub email: String,
    pub telegram_id: i64,
    #[serde(default, alias = "limitIp")]
    pub limit_ip: Option<i64>,
    #[serde(default, alias = "totalGB")]
    pub total_gb: Option<i64>,
    #[serde(default)]
    pub reset: Option<i64>,
    /// Subscription end; `None` means no expiry.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_enabled: Option<bool>,
    pub subscription_link: String,
}

impl SourceUser {
    /// Map onto a fully-populated client patch.
    ///
    /// Unset limits default to one IP, unlimited traffic and no reset;
    /// an unset enable flag means enabled.
    pub fn to_patch(&self) -> ClientPatch {
        ClientPatch {
            uuid: self.uuid.clone(),
            flow: Some(DEFAULT_FLOW.to_owned()),
            email: Some(self.email.clone()),
            tg_id: Some(self.telegram_id),
            limit_ip: Some(self.limit_ip.unwrap_or(1)),
            total_gb: Some(self.total_gb.unwrap_or(0)),
            expiry_time: Some(self.ends_at.map_or(0, |t| t.timestamp_millis())),
            enable: Some(self.is_enabled.unwrap_or(true)),
            sub_id: Some(self.subscription_link.clone()),
            reset: Some(self.reset.unwrap_or(0)),
        }
    }
}
