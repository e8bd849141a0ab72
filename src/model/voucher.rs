use std::collections::HashMap;

use chrono::NaiveDate;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::amount::Amount;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: i64,
    pub name: String,
    pub initial_value: Amount,
    pub code: String,
    pub description: String,
    pub redemptions: Vec<Redemption>,
    pub is_redeemed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Redemption {
    pub id: i64,
    pub amount: Amount,
    pub date: NaiveDate,
}

impl Redemption {
    pub fn new(id: i64, amount: Amount, date: NaiveDate) -> Redemption {
        Redemption { id, amount, date }
    }
}

/// A `vouchers` row as stored, before shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct VoucherRow {
    pub id: i64,
    pub name: String,
    pub initial_value: Amount,
    pub code: Option<String>,
    pub description: Option<String>,
    pub is_redeemed: bool,
}

/// Column order every voucher query and `RETURNING` clause selects.
pub const VOUCHER_COLUMNS: &str = "id, name, initial_value, code, description, is_redeemed";

impl VoucherRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<VoucherRow> {
        Ok(VoucherRow {
            id: row.get(0)?,
            name: row.get(1)?,
            initial_value: Amount::deserialize_from_db(row.get::<usize, i64>(2)?),
            code: row.get(3)?,
            description: row.get(4)?,
            is_redeemed: row.get(5)?,
        })
    }

    pub fn into_voucher(self, redemptions: Vec<Redemption>) -> Voucher {
        Voucher {
            id: self.id,
            name: self.name,
            initial_value: self.initial_value,
            code: self.code.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            redemptions,
            is_redeemed: self.is_redeemed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedemptionRow {
    pub id: i64,
    pub voucher_id: i64,
    pub amount: Amount,
    pub date: NaiveDate,
}

pub const REDEMPTION_COLUMNS: &str = "id, voucher_id, amount, date";

impl RedemptionRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<RedemptionRow> {
        Ok(RedemptionRow {
            id: row.get(0)?,
            voucher_id: row.get(1)?,
            amount: Amount::deserialize_from_db(row.get::<usize, i64>(2)?),
            date: row.get(3)?,
        })
    }

    pub fn into_redemption(self) -> Redemption {
        Redemption::new(self.id, self.amount, self.date)
    }
}

/// Nests redemptions under their vouchers. Voucher order and the order of
/// redemptions within each voucher are kept as given.
pub fn shape_vouchers(vouchers: Vec<VoucherRow>, redemptions: Vec<RedemptionRow>) -> Vec<Voucher> {
    let mut by_voucher: HashMap<i64, Vec<Redemption>> = HashMap::new();
    for redemption in redemptions {
        by_voucher
            .entry(redemption.voucher_id)
            .or_default()
            .push(redemption.into_redemption());
    }

    vouchers
        .into_iter()
        .map(|v| {
            let redemptions = by_voucher.remove(&v.id).unwrap_or_default();
            v.into_voucher(redemptions)
        })
        .collect()
}
