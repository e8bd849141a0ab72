use std::sync::Arc;

use crate::db::Db;

pub struct AppState {
    db: Arc<Db>,
}

impl AppState {
    pub fn new(db: Arc<Db>) -> AppState {
        AppState { db }
    }

    pub fn get_db(&self) -> Arc<Db> {
        return self.db.clone();
    }
}
