mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::provision::seed::SeedCatalog;
use crate::types::*;

/// Row counts emitted for observability after a provisioning run.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionStats {
    /// User-defined tables, excluding SQLite internals.
    pub table_count: i64,
    pub app_info_rows: i64,
}

/// Store defines the database interface.
pub trait Store: Send + Sync {
    /// Creates the schema and applies the seed catalog in one transaction.
    /// Safe to call any number of times; only analytics events accumulate.
    fn provision(&self, catalog: &SeedCatalog) -> Result<ProvisionStats>;

    // Lookups by natural key
    fn get_app_info(&self, key: &str) -> Result<Option<AppInfo>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn get_game_by_code(&self, code: &str) -> Result<Option<Game>>;

    // Leaderboard queries
    fn top_scores(&self, game_id: i64, limit: i32) -> Result<Vec<GameScore>>;
    fn find_score(&self, game_code: &str, username: &str) -> Result<Option<GameScore>>;

    // Analytics queries
    fn recent_events(&self, limit: i32) -> Result<Vec<AnalyticsEvent>>;

    // Append operations for platform consumers
    fn record_score(
        &self,
        game_id: i64,
        user_id: i64,
        score: i64,
        metadata: Option<&str>,
    ) -> Result<i64>;
    fn record_event(
        &self,
        event_type: &str,
        user_id: Option<i64>,
        game_id: Option<i64>,
        props: Option<&str>,
    ) -> Result<i64>;

    // Counts
    fn count_users(&self) -> Result<i64>;
    fn count_games(&self) -> Result<i64>;
    fn count_scores(&self) -> Result<i64>;
    fn count_events(&self) -> Result<i64>;
    fn count_app_info(&self) -> Result<i64>;
    fn table_count(&self) -> Result<i64>;
}
