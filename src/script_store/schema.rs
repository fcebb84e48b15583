//! SQLite schema for the script store.

use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

/// Cached song analyses, one row per exact (artist, title) pair.
pub const SONG_ANALYSES_TABLE_V_0: Table = Table {
    name: "song_analyses",
    columns: &[
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("analysis", &SqlType::Text, non_null = true), // JSON
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["artist", "title"]],
};

pub const CONTENT_SESSIONS_TABLE_V_0: Table = Table {
    name: "content_sessions",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("user_id", &SqlType::Text, non_null = true),
        sqlite_column!("content_source", &SqlType::Text, non_null = true),
        sqlite_column!("content_type", &SqlType::Text, non_null = true),
        sqlite_column!("content_analysis", &SqlType::Text, non_null = true), // JSON
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("song_title", &SqlType::Text, non_null = true),
        sqlite_column!("song_analysis", &SqlType::Text, non_null = true), // JSON
        sqlite_column!("selected_style", &SqlType::Text, non_null = true),
        sqlite_column!("short_script", &SqlType::Text, non_null = true),
        sqlite_column!("long_script", &SqlType::Text, non_null = true),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_content_sessions_user", "user_id, created_at DESC")],
    unique_constraints: &[],
};

pub const SCRIPT_STORE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[SONG_ANALYSES_TABLE_V_0, CONTENT_SESSIONS_TABLE_V_0],
    migration: None,
}];
