//! Application state shared by every handler

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use crate::auth::AuthSettings;

#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    auth: AuthSettings,
}

impl AppState {
    pub fn new(db: DatabaseConnection, auth: AuthSettings) -> Self {
        Self { db, auth }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn auth(&self) -> &AuthSettings {
        &self.auth
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for AuthSettings {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
