use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::schema::SCHEMA;
use super::{ProvisionStats, Store};
use crate::error::{Error, Result};
use crate::provision::seed::SeedCatalog;
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        // SQLite leaves foreign keys off unless asked
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn map_score(row: &Row<'_>) -> rusqlite::Result<GameScore> {
    Ok(GameScore {
        id: row.get(0)?,
        game_id: row.get(1)?,
        user_id: row.get(2)?,
        score: row.get(3)?,
        metadata: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn lookup_game_id(conn: &Connection, code: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row("SELECT id FROM games WHERE code = ?1", params![code], |row| {
        row.get(0)
    })
    .optional()
}

fn lookup_user_id(conn: &Connection, username: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )
    .optional()
}

impl Store for SqliteStore {
    fn provision(&self, catalog: &SeedCatalog) -> Result<ProvisionStats> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute_batch(SCHEMA)?;

        // Metadata is last-write-wins
        for (key, value) in catalog.app_info {
            tx.execute(
                "INSERT OR REPLACE INTO app_info (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }

        // A partial prior run may have claimed either unique column, so
        // guard on username and email independently
        for user in catalog.users {
            tx.execute(
                "INSERT INTO users (username, email, display_name, avatar_url, locale)
                 SELECT ?1, ?2, ?3, ?4, ?5
                 WHERE NOT EXISTS (SELECT 1 FROM users WHERE username = ?1 OR email = ?2)",
                params![
                    user.username,
                    user.email,
                    user.display_name,
                    user.avatar_url,
                    user.locale,
                ],
            )?;
        }

        for game in catalog.games {
            tx.execute(
                "INSERT INTO games (code, title, description, category, is_active)
                 SELECT ?1, ?2, ?3, ?4, ?5
                 WHERE NOT EXISTS (SELECT 1 FROM games WHERE code = ?1)",
                params![
                    game.code,
                    game.title,
                    game.description,
                    game.category,
                    game.is_active,
                ],
            )?;
        }

        for seed in catalog.scores {
            let game_id = lookup_game_id(&tx, seed.game_code)?;
            let user_id = lookup_user_id(&tx, seed.username)?;
            // Missing parents are a soft precondition, not an error
            let (Some(game_id), Some(user_id)) = (game_id, user_id) else {
                continue;
            };
            tx.execute(
                "INSERT INTO game_scores (game_id, user_id, score, metadata)
                 SELECT ?1, ?2, ?3, ?4
                 WHERE NOT EXISTS (
                     SELECT 1 FROM game_scores WHERE game_id = ?1 AND user_id = ?2 AND score = ?3
                 )",
                params![game_id, user_id, seed.score, seed.metadata],
            )?;
        }

        // Analytics accumulate; duplicates across runs are accepted
        for event in catalog.events {
            let user_id = match event.username {
                Some(username) => lookup_user_id(&tx, username)?,
                None => None,
            };
            let game_id = match event.game_code {
                Some(code) => lookup_game_id(&tx, code)?,
                None => None,
            };
            tx.execute(
                "INSERT INTO analytics_events (user_id, game_id, event_type, event_props)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, game_id, event.event_type, event.event_props],
            )?;
        }

        tx.commit()?;

        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |row| row.get(0),
        )?;
        let app_info_rows: i64 =
            conn.query_row("SELECT COUNT(*) FROM app_info", [], |row| row.get(0))?;

        Ok(ProvisionStats {
            table_count,
            app_info_rows,
        })
    }

    fn get_app_info(&self, key: &str) -> Result<Option<AppInfo>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, key, value, created_at FROM app_info WHERE key = ?1",
            params![key],
            |row| {
                Ok(AppInfo {
                    id: row.get(0)?,
                    key: row.get(1)?,
                    value: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, email, display_name, avatar_url, locale, created_at
             FROM users WHERE username = ?1",
            params![username],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    display_name: row.get(3)?,
                    avatar_url: row.get(4)?,
                    locale: row.get(5)?,
                    created_at: parse_datetime(&row.get::<_, String>(6)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_game_by_code(&self, code: &str) -> Result<Option<Game>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, code, title, description, category, is_active, created_at
             FROM games WHERE code = ?1",
            params![code],
            |row| {
                Ok(Game {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    title: row.get(2)?,
                    description: row.get(3)?,
                    category: row.get(4)?,
                    is_active: row.get(5)?,
                    created_at: parse_datetime(&row.get::<_, String>(6)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn top_scores(&self, game_id: i64, limit: i32) -> Result<Vec<GameScore>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, game_id, user_id, score, metadata, created_at
             FROM game_scores WHERE game_id = ?1 ORDER BY score DESC LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![game_id, limit], map_score)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn find_score(&self, game_code: &str, username: &str) -> Result<Option<GameScore>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT s.id, s.game_id, s.user_id, s.score, s.metadata, s.created_at
             FROM game_scores s
             JOIN games g ON g.id = s.game_id
             JOIN users u ON u.id = s.user_id
             WHERE g.code = ?1 AND u.username = ?2
             ORDER BY s.score DESC",
            params![game_code, username],
            map_score,
        )
        .optional()
        .map_err(Error::from)
    }

    fn recent_events(&self, limit: i32) -> Result<Vec<AnalyticsEvent>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, game_id, event_type, event_props, created_at
             FROM analytics_events ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            Ok(AnalyticsEvent {
                id: row.get(0)?,
                user_id: row.get(1)?,
                game_id: row.get(2)?,
                event_type: row.get(3)?,
                event_props: row.get(4)?,
                created_at: parse_datetime(&row.get::<_, String>(5)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn record_score(
        &self,
        game_id: i64,
        user_id: i64,
        score: i64,
        metadata: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO game_scores (game_id, user_id, score, metadata)
             VALUES (?1, ?2, ?3, ?4)",
            params![game_id, user_id, score, metadata],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn record_event(
        &self,
        event_type: &str,
        user_id: Option<i64>,
        game_id: Option<i64>,
        props: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO analytics_events (user_id, game_id, event_type, event_props)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, game_id, event_type, props],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn count_users(&self) -> Result<i64> {
        let conn = self.conn();
        conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(Error::from)
    }

    fn count_games(&self) -> Result<i64> {
        let conn = self.conn();
        conn.query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
            .map_err(Error::from)
    }

    fn count_scores(&self) -> Result<i64> {
        let conn = self.conn();
        conn.query_row("SELECT COUNT(*) FROM game_scores", [], |row| row.get(0))
            .map_err(Error::from)
    }

    fn count_events(&self) -> Result<i64> {
        let conn = self.conn();
        conn.query_row("SELECT COUNT(*) FROM analytics_events", [], |row| row.get(0))
            .map_err(Error::from)
    }

    fn count_app_info(&self) -> Result<i64> {
        let conn = self.conn();
        conn.query_row("SELECT COUNT(*) FROM app_info", [], |row| row.get(0))
            .map_err(Error::from)
    }

    fn table_count(&self) -> Result<i64> {
        let conn = self.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |row| row.get(0),
        )
        .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::seed::{SeedGame, SeedScore, SeedUser};
    use tempfile::TempDir;

    fn provisioned_store(temp: &TempDir) -> SqliteStore {
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.provision(&SeedCatalog::builtin()).unwrap();
        store
    }

    #[test]
    fn test_provision_creates_tables() {
        let temp = TempDir::new().unwrap();
        let store = provisioned_store(&temp);

        let conn = store.connection();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"app_info".to_string()));
        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"games".to_string()));
        assert!(tables.contains(&"game_scores".to_string()));
        assert!(tables.contains(&"analytics_events".to_string()));
    }

    #[test]
    fn test_provision_reports_counts() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        let stats = store.provision(&SeedCatalog::builtin()).unwrap();

        assert_eq!(stats.table_count, 5);
        assert_eq!(stats.app_info_rows, 4);
    }

    #[test]
    fn test_provision_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = provisioned_store(&temp);

        let users = store.count_users().unwrap();
        let games = store.count_games().unwrap();
        let scores = store.count_scores().unwrap();
        let events = store.count_events().unwrap();
        assert_eq!(users, 3);
        assert_eq!(games, 3);
        assert_eq!(scores, 5);
        assert_eq!(events, 3);

        store.provision(&SeedCatalog::builtin()).unwrap();
        store.provision(&SeedCatalog::builtin()).unwrap();

        assert_eq!(store.count_users().unwrap(), users);
        assert_eq!(store.count_games().unwrap(), games);
        assert_eq!(store.count_scores().unwrap(), scores);
        assert_eq!(store.count_app_info().unwrap(), 4);
        // Analytics grow by a fixed increment per run
        assert_eq!(store.count_events().unwrap(), events + 6);
    }

    #[test]
    fn test_app_info_upsert_is_last_write_wins() {
        let temp = TempDir::new().unwrap();
        let store = provisioned_store(&temp);

        static OVERRIDE: SeedCatalog = SeedCatalog {
            app_info: &[("version", "9.9.9")],
            users: &[],
            games: &[],
            scores: &[],
            events: &[],
        };
        store.provision(&OVERRIDE).unwrap();

        let info = store.get_app_info("version").unwrap().unwrap();
        assert_eq!(info.value.as_deref(), Some("9.9.9"));
        assert_eq!(store.count_app_info().unwrap(), 4);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let temp = TempDir::new().unwrap();
        let store = provisioned_store(&temp);

        let result = store.record_score(9999, 9999, 100, None);
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[test]
    fn test_score_skipped_when_parent_missing() {
        let temp = TempDir::new().unwrap();
        let store = provisioned_store(&temp);
        let before = store.count_scores().unwrap();

        static DANGLING: SeedCatalog = SeedCatalog {
            app_info: &[],
            users: &[],
            games: &[],
            scores: &[SeedScore {
                game_code: "no_such_game",
                username: "alice",
                score: 1,
                metadata: None,
            }],
            events: &[],
        };
        store.provision(&DANGLING).unwrap();

        assert_eq!(store.count_scores().unwrap(), before);
    }

    #[test]
    fn test_find_score_by_natural_keys() {
        let temp = TempDir::new().unwrap();
        let store = provisioned_store(&temp);

        let score = store.find_score("quiz_master", "bob").unwrap().unwrap();
        assert_eq!(score.score, 920);

        assert!(store.find_score("quiz_master", "nobody").unwrap().is_none());
    }

    #[test]
    fn test_top_scores_ordering() {
        let temp = TempDir::new().unwrap();
        let store = provisioned_store(&temp);

        let game = store.get_game_by_code("quiz_master").unwrap().unwrap();
        let top = store.top_scores(game.id, 10).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].score, 920);
        assert_eq!(top[1].score, 850);
    }

    #[test]
    fn test_leaderboard_query_uses_composite_index() {
        let temp = TempDir::new().unwrap();
        let store = provisioned_store(&temp);

        let game = store.get_game_by_code("quiz_master").unwrap().unwrap();
        let user = store.get_user_by_username("bob").unwrap().unwrap();

        let conn = store.connection();
        let plan: String = conn
            .prepare(
                "EXPLAIN QUERY PLAN
                 SELECT score FROM game_scores
                 WHERE game_id = ?1 AND user_id = ?2 ORDER BY score DESC",
            )
            .unwrap()
            .query_map(params![game.id, user.id], |row| row.get::<_, String>(3))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
            .join("\n");

        assert!(
            plan.contains("idx_game_scores_game_user_score_desc"),
            "expected composite index in plan, got: {plan}"
        );
    }

    #[test]
    fn test_provision_handles_partial_prior_state() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();

        // A prior partial run claimed bob's email under another username
        static PARTIAL: SeedCatalog = SeedCatalog {
            app_info: &[],
            users: &[SeedUser {
                username: "robert",
                email: "bob@example.com",
                display_name: "Robert",
                avatar_url: None,
                locale: "en",
            }],
            games: &[SeedGame {
                code: "quiz_master",
                title: "Quiz Master",
                description: "A general knowledge quiz game.",
                category: "quiz",
                is_active: true,
            }],
            scores: &[],
            events: &[],
        };
        store.provision(&PARTIAL).unwrap();
        store.provision(&SeedCatalog::builtin()).unwrap();

        // bob was not inserted (email collision), so his seed scores were skipped
        assert!(store.get_user_by_username("bob").unwrap().is_none());
        assert_eq!(store.count_users().unwrap(), 3);
        assert!(store.find_score("quiz_master", "bob").unwrap().is_none());
        assert!(store.find_score("quiz_master", "alice").unwrap().is_some());
    }

    #[test]
    fn test_record_event_allows_detached_rows() {
        let temp = TempDir::new().unwrap();
        let store = provisioned_store(&temp);

        let id = store
            .record_event("app_open", None, None, Some(r#"{"source":"test"}"#))
            .unwrap();
        assert!(id > 0);

        let events = store.recent_events(10).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].event_type, "app_open");
        assert!(events[0].user_id.is_none());
    }
}
