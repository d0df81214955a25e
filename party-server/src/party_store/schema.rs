//! SQLite schema of the party database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};
use anyhow::Result;
use rusqlite::Connection;

// =============================================================================
// Version 1 - Submissions, admin sessions, playback state
// =============================================================================

const SUBMISSIONS_TABLE_V1: Table = Table {
    name: "submissions",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("guest_name", &SqlType::Text),
        sqlite_column!("memory", &SqlType::Text, non_null = true),
        sqlite_column!("resolution", &SqlType::Text, non_null = true),
        sqlite_column!(
            "status",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'pending'")
        ),
        sqlite_column!("created_at", &SqlType::Text, non_null = true),
        sqlite_column!("reviewed_at", &SqlType::Text),
    ],
    indices: &[
        ("idx_submissions_status", "status"),
        ("idx_submissions_created_at", "created_at"),
    ],
};

const ADMIN_SESSIONS_TABLE_V1: Table = Table {
    name: "admin_sessions",
    columns: &[
        sqlite_column!("token", &SqlType::Text, is_primary_key = true),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
        sqlite_column!("expires_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_admin_sessions_expires_at", "expires_at")],
};

/// Single row, id 1.
const PLAYBACK_STATE_TABLE_V1: Table = Table {
    name: "playback_state",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "is_paused",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "current_slide",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "current_slide_index",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "slide_duration",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("30000")
        ),
        sqlite_column!("slide_started_at", &SqlType::Text),
        sqlite_column!("last_updated", &SqlType::Text, non_null = true),
        sqlite_column!(
            "request_video_switch",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "total_slides",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
    ],
    indices: &[],
};

// =============================================================================
// Version 2 - Hidden slides and mute flag on the playback state
// =============================================================================

const PLAYBACK_STATE_TABLE_V2: Table = Table {
    name: "playback_state",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "is_paused",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "current_slide",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
        sqlite_column!(
            "current_slide_index",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "slide_duration",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("30000")
        ),
        sqlite_column!("slide_started_at", &SqlType::Text),
        sqlite_column!("last_updated", &SqlType::Text, non_null = true),
        sqlite_column!(
            "request_video_switch",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "total_slides",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        // JSON array of slide ids
        sqlite_column!(
            "hidden_slides",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'[]'")
        ),
        sqlite_column!(
            "is_muted",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
    ],
    indices: &[],
};

fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
    conn.execute(
        "ALTER TABLE playback_state ADD COLUMN hidden_slides TEXT NOT NULL DEFAULT '[]'",
        [],
    )?;
    conn.execute(
        "ALTER TABLE playback_state ADD COLUMN is_muted INTEGER NOT NULL DEFAULT 1",
        [],
    )?;
    Ok(())
}

pub const PARTY_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        tables: &[
            SUBMISSIONS_TABLE_V1,
            ADMIN_SESSIONS_TABLE_V1,
            PLAYBACK_STATE_TABLE_V1,
        ],
        migration: None,
    },
    VersionedSchema {
        version: 2,
        tables: &[
            SUBMISSIONS_TABLE_V1,
            ADMIN_SESSIONS_TABLE_V1,
            PLAYBACK_STATE_TABLE_V2,
        ],
        migration: Some(migrate_v1_to_v2),
    },
];
