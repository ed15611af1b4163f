//! Built-in seed catalog applied by the initializer.
//!
//! Rows are keyed by natural keys (username/email, game code, score triple)
//! so the catalog can be re-applied without duplicating anything except
//! analytics events, which are append-only by design.

#[derive(Debug, Clone, Copy)]
pub struct SeedUser {
    pub username: &'static str,
    pub email: &'static str,
    pub display_name: &'static str,
    pub avatar_url: Option<&'static str>,
    pub locale: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct SeedGame {
    pub code: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct SeedScore {
    pub game_code: &'static str,
    pub username: &'static str,
    pub score: i64,
    pub metadata: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct SeedEvent {
    pub username: Option<&'static str>,
    pub game_code: Option<&'static str>,
    pub event_type: &'static str,
    pub event_props: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct SeedCatalog {
    pub app_info: &'static [(&'static str, &'static str)],
    pub users: &'static [SeedUser],
    pub games: &'static [SeedGame],
    pub scores: &'static [SeedScore],
    pub events: &'static [SeedEvent],
}

impl SeedCatalog {
    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            app_info: APP_INFO,
            users: USERS,
            games: GAMES,
            scores: SCORES,
            events: EVENTS,
        }
    }
}

const APP_INFO: &[(&str, &str)] = &[
    ("project_name", "playbase"),
    ("version", env!("CARGO_PKG_VERSION")),
    ("author", "Playbase Games Platform"),
    (
        "description",
        "SQLite store for users, games, leaderboards, analytics.",
    ),
];

const USERS: &[SeedUser] = &[
    SeedUser {
        username: "alice",
        email: "alice@example.com",
        display_name: "Alice",
        avatar_url: None,
        locale: "en",
    },
    SeedUser {
        username: "bob",
        email: "bob@example.com",
        display_name: "Bob",
        avatar_url: None,
        locale: "en",
    },
    SeedUser {
        username: "chitra",
        email: "chitra@example.in",
        display_name: "Chitra",
        avatar_url: None,
        locale: "hi",
    },
];

const GAMES: &[SeedGame] = &[
    SeedGame {
        code: "quiz_master",
        title: "Quiz Master",
        description: "A general knowledge quiz game.",
        category: "quiz",
        is_active: true,
    },
    SeedGame {
        code: "civic_challenge",
        title: "Civic Challenge",
        description: "Learn about governance through mini challenges.",
        category: "education",
        is_active: true,
    },
    SeedGame {
        code: "swachh_run",
        title: "Swachh Run",
        description: "Endless runner promoting cleanliness awareness.",
        category: "arcade",
        is_active: true,
    },
];

const SCORES: &[SeedScore] = &[
    SeedScore {
        game_code: "quiz_master",
        username: "alice",
        score: 850,
        metadata: None,
    },
    SeedScore {
        game_code: "quiz_master",
        username: "bob",
        score: 920,
        metadata: None,
    },
    SeedScore {
        game_code: "civic_challenge",
        username: "alice",
        score: 1200,
        metadata: None,
    },
    SeedScore {
        game_code: "civic_challenge",
        username: "chitra",
        score: 1100,
        metadata: None,
    },
    SeedScore {
        game_code: "swachh_run",
        username: "bob",
        score: 3000,
        metadata: None,
    },
];

const EVENTS: &[SeedEvent] = &[
    SeedEvent {
        username: Some("alice"),
        game_code: Some("quiz_master"),
        event_type: "game_start",
        event_props: Some(r#"{"difficulty":"medium"}"#),
    },
    SeedEvent {
        username: Some("bob"),
        game_code: Some("quiz_master"),
        event_type: "game_end",
        event_props: Some(r#"{"score":920}"#),
    },
    SeedEvent {
        username: Some("chitra"),
        game_code: Some("civic_challenge"),
        event_type: "level_complete",
        event_props: Some(r#"{"level":1}"#),
    },
];
