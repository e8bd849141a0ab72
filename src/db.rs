use std::sync::{Mutex, MutexGuard};

use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};

use crate::model::{
    error::StoreError,
    payload::{NewVoucher, RedemptionPayload},
    voucher::{
        shape_vouchers, Redemption, RedemptionRow, Voucher, VoucherRow, REDEMPTION_COLUMNS,
        VOUCHER_COLUMNS,
    },
};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS vouchers (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        initial_value INTEGER NOT NULL,
        code TEXT,
        description TEXT,
        is_redeemed INTEGER NOT NULL DEFAULT 0
    );
    CREATE TABLE IF NOT EXISTS redemptions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        voucher_id INTEGER NOT NULL REFERENCES vouchers(id) ON DELETE CASCADE,
        amount INTEGER NOT NULL,
        date TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS redemptions_voucher_id ON redemptions(voucher_id);
";

pub struct Db {
    connection: Mutex<Connection>,
}

impl Db {
    pub fn open(path: &str) -> Result<Db, StoreError> {
        if path == ":memory:" {
            return Self::open_in_memory();
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Db, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(connection: Connection) -> Result<Db, StoreError> {
        connection.pragma_update(None, "foreign_keys", true)?;
        connection.execute_batch(SCHEMA)?;

        Ok(Db {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::ConnectionPoisoned)
    }

    #[cfg(test)]
    pub(crate) fn poison_connection(&self) {
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _guard = self.connection.lock();
                    panic!("poisoning connection lock");
                })
                .join();
        });
    }

    pub fn ping(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |r| r.get::<usize, i64>(0))?;
        Ok(())
    }

    pub fn list_vouchers(&self) -> Result<Vec<Voucher>, StoreError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM vouchers ORDER BY name",
            VOUCHER_COLUMNS
        ))?;
        let vouchers = stmt
            .query_map([], VoucherRow::from_row)?
            .collect::<Result<Vec<VoucherRow>, rusqlite::Error>>()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM redemptions ORDER BY voucher_id, date DESC, id DESC",
            REDEMPTION_COLUMNS
        ))?;
        let redemptions = stmt
            .query_map([], RedemptionRow::from_row)?
            .collect::<Result<Vec<RedemptionRow>, rusqlite::Error>>()?;

        debug!(
            "loaded {} vouchers and {} redemptions",
            vouchers.len(),
            redemptions.len()
        );

        Ok(shape_vouchers(vouchers, redemptions))
    }

    pub fn get_redemptions_for_voucher(
        &self,
        voucher_id: i64,
    ) -> Result<Vec<Redemption>, StoreError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM redemptions WHERE voucher_id = ?1 ORDER BY date DESC, id DESC",
            REDEMPTION_COLUMNS
        ))?;
        let redemptions = stmt
            .query_map(params![voucher_id], RedemptionRow::from_row)?
            .map(|r| r.map(RedemptionRow::into_redemption))
            .collect::<Result<Vec<Redemption>, rusqlite::Error>>()?;

        Ok(redemptions)
    }

    /// Inserts the voucher and its redemptions atomically. The returned
    /// redemptions are the supplied ones, in supplied order, with their new ids.
    pub fn create_voucher(&self, voucher: &NewVoucher) -> Result<Voucher, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let row = insert_voucher(&tx, voucher)?;
        let redemptions = insert_redemptions(&tx, voucher.id, &voucher.redemptions)?;

        tx.commit()?;
        info!(
            "created voucher {} with {} redemptions",
            voucher.id,
            redemptions.len()
        );

        Ok(row.into_voucher(redemptions))
    }

    /// Updates the voucher's fields and replaces its redemptions with exactly
    /// the supplied list.
    pub fn update_voucher(&self, voucher: &NewVoucher) -> Result<Voucher, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let row = tx
            .query_row(
                &format!(
                    "UPDATE vouchers
                     SET name = ?1, initial_value = ?2, code = ?3, description = ?4, is_redeemed = ?5
                     WHERE id = ?6
                     RETURNING {}",
                    VOUCHER_COLUMNS
                ),
                params![
                    voucher.name,
                    voucher.initial_value.serialize_for_db(),
                    voucher.code,
                    voucher.description,
                    voucher.is_redeemed,
                    voucher.id
                ],
                VoucherRow::from_row,
            )
            .optional()?;

        let row = match row {
            Some(row) => row,
            None => {
                tx.rollback()?;
                return Err(StoreError::VoucherNotFound(voucher.id));
            }
        };

        let removed = tx.execute(
            "DELETE FROM redemptions WHERE voucher_id = ?1",
            params![voucher.id],
        )?;
        let redemptions = insert_redemptions(&tx, voucher.id, &voucher.redemptions)?;

        tx.commit()?;
        info!(
            "updated voucher {}, replaced {} redemptions with {}",
            voucher.id,
            removed,
            redemptions.len()
        );

        Ok(row.into_voucher(redemptions))
    }

    pub fn delete_voucher(&self, voucher_id: i64) -> Result<(), StoreError> {
        let conn = self.lock()?;

        let deleted = conn.execute("DELETE FROM vouchers WHERE id = ?1", params![voucher_id])?;
        if deleted == 0 {
            return Err(StoreError::VoucherNotFound(voucher_id));
        }

        info!("deleted voucher {}", voucher_id);
        Ok(())
    }

    pub fn delete_all_vouchers(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;

        let deleted = conn.execute("DELETE FROM vouchers", [])?;

        info!("deleted all {} vouchers", deleted);
        Ok(deleted)
    }

    /// Wipes the store and loads the supplied vouchers in one transaction.
    /// Any failing insert leaves the previous contents untouched.
    pub fn import_vouchers(&self, vouchers: &[NewVoucher]) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let replaced = tx.execute("DELETE FROM vouchers", [])?;
        for voucher in vouchers {
            insert_voucher(&tx, voucher)?;
            insert_redemptions(&tx, voucher.id, &voucher.redemptions)?;
        }

        tx.commit()?;
        info!(
            "imported {} vouchers, replacing {}",
            vouchers.len(),
            replaced
        );

        Ok(vouchers.len())
    }
}

fn insert_voucher(conn: &Connection, voucher: &NewVoucher) -> Result<VoucherRow, StoreError> {
    let row = conn.query_row(
        &format!(
            "INSERT INTO vouchers (id, name, initial_value, code, description, is_redeemed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {}",
            VOUCHER_COLUMNS
        ),
        params![
            voucher.id,
            voucher.name,
            voucher.initial_value.serialize_for_db(),
            voucher.code,
            voucher.description,
            voucher.is_redeemed
        ],
        VoucherRow::from_row,
    )?;

    Ok(row)
}

fn insert_redemptions(
    conn: &Connection,
    voucher_id: i64,
    redemptions: &[RedemptionPayload],
) -> Result<Vec<Redemption>, StoreError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO redemptions (voucher_id, amount, date) VALUES (?1, ?2, ?3) RETURNING id",
    )?;

    let mut inserted = Vec::with_capacity(redemptions.len());
    for redemption in redemptions {
        let id = stmt.query_row(
            params![
                voucher_id,
                redemption.amount.serialize_for_db(),
                redemption.date
            ],
            |r| r.get::<usize, i64>(0),
        )?;
        inserted.push(Redemption::new(id, redemption.amount, redemption.date));
    }

    Ok(inserted)
}
