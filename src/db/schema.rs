pub const SCHEMA: &str = r#"
-- credentials table, one row per token kind
CREATE TABLE IF NOT EXISTS credentials (
    type TEXT PRIMARY KEY,
    token TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- insights table, one row per article guid
CREATE TABLE IF NOT EXISTS insights (
    id TEXT PRIMARY KEY,
    headline TEXT NOT NULL,
    publication_date TEXT NOT NULL,
    author TEXT NOT NULL,
    url TEXT NOT NULL,
    total_views INTEGER NOT NULL DEFAULT 0,
    average_view_duration INTEGER NOT NULL DEFAULT 0,
    average_scroll_depth INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
