use chrono::{DateTime, NaiveDate};
use serde::{de, Deserialize, Deserializer};

use super::{amount::Amount, error::ApiError};

/// Voucher as sent by clients on create, update and import.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherPayload {
    pub id: Option<i64>,
    pub name: String,
    pub initial_value: Amount,
    pub code: Option<String>,
    pub description: Option<String>,
    pub redemptions: Option<Vec<RedemptionPayload>>,
    pub is_redeemed: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RedemptionPayload {
    pub amount: Amount,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping its calendar date.
fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(&raw)
        .map(|timestamp| timestamp.date_naive())
        .map_err(|_| de::Error::custom(format!("Invalid date '{}'", raw)))
}

/// A voucher ready to be written, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVoucher {
    pub id: i64,
    pub name: String,
    pub initial_value: Amount,
    pub code: Option<String>,
    pub description: Option<String>,
    pub is_redeemed: bool,
    pub redemptions: Vec<RedemptionPayload>,
}

impl VoucherPayload {
    /// Uses the identifier carried in the body; create and import require one.
    pub fn into_new_voucher(self) -> Result<NewVoucher, ApiError> {
        let id = self.id.ok_or_else(ApiError::bad_input)?;
        Ok(self.into_new_voucher_with_id(id))
    }

    /// Uses an identifier taken from the route, ignoring any in the body.
    pub fn into_new_voucher_with_id(self, id: i64) -> NewVoucher {
        NewVoucher {
            id,
            name: self.name,
            initial_value: self.initial_value,
            code: self.code.filter(|c| !c.is_empty()),
            description: self.description.filter(|d| !d.is_empty()),
            is_redeemed: self.is_redeemed.unwrap_or(false),
            redemptions: self.redemptions.unwrap_or_default(),
        }
    }
}
