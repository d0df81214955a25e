use super::models::{
    AdminSession, Decision, DecisionOutcome, NewSubmission, PlaybackState, Submission,
    SubmissionCounts, SubmissionStatus,
};
use super::schema::PARTY_VERSIONED_SCHEMAS;
use super::{AdminSessionStore, PlaybackStateStore, SubmissionStore};
use crate::sqlite_persistence::open_versioned;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const PLAYBACK_STATE_ID: i64 = 1;

pub struct SqlitePartyStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePartyStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let mut conn = Connection::open(path).context("Failed to open party database")?;

        if is_new_db {
            info!("Creating new party database at {:?}", path);
            PARTY_VERSIONED_SCHEMAS
                .last()
                .context("No party schema defined")?
                .create(&conn)?;
        } else {
            open_versioned(&mut conn, PARTY_VERSIONED_SCHEMAS, "party")?;
        }

        conn.execute(
            "INSERT OR IGNORE INTO playback_state (id, last_updated) VALUES (?1, ?2)",
            params![PLAYBACK_STATE_ID, Self::format_datetime(&Self::now())],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Millisecond precision with a `Z` suffix, so text ordering matches time
    /// ordering.
    fn format_datetime(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Current time at the precision timestamps are stored with.
    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }

    fn row_to_submission(row: &rusqlite::Row) -> rusqlite::Result<Submission> {
        let status_str: String = row.get("status")?;
        let status = SubmissionStatus::parse(&status_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                row.as_ref().column_index("status").unwrap_or(0),
                rusqlite::types::Type::Text,
                format!("Unknown submission status: {}", status_str).into(),
            )
        })?;
        let created_at_str: String = row.get("created_at")?;
        let reviewed_at_str: Option<String> = row.get("reviewed_at")?;

        Ok(Submission {
            id: row.get("id")?,
            guest_name: row.get("guest_name")?,
            memory: row.get("memory")?,
            resolution: row.get("resolution")?,
            status,
            created_at: Self::parse_datetime(&created_at_str).unwrap_or_else(Utc::now),
            reviewed_at: reviewed_at_str.and_then(|s| Self::parse_datetime(&s)),
        })
    }

    fn row_to_admin_session(row: &rusqlite::Row) -> rusqlite::Result<AdminSession> {
        Ok(AdminSession {
            token: row.get("token")?,
            created_at: row.get("created_at")?,
            expires_at: row.get("expires_at")?,
        })
    }

    fn row_to_playback_state(row: &rusqlite::Row) -> rusqlite::Result<PlaybackState> {
        let last_updated_str: String = row.get("last_updated")?;
        let hidden_slides_str: String = row.get("hidden_slides")?;

        Ok(PlaybackState {
            is_paused: row.get::<_, i64>("is_paused")? != 0,
            current_slide: row.get("current_slide")?,
            current_slide_index: row.get("current_slide_index")?,
            slide_duration: row.get("slide_duration")?,
            slide_started_at: row.get("slide_started_at")?,
            last_updated: Self::parse_datetime(&last_updated_str).unwrap_or_else(Utc::now),
            request_video_switch: row.get::<_, i64>("request_video_switch")? != 0,
            total_slides: row.get("total_slides")?,
            hidden_slides: serde_json::from_str(&hidden_slides_str).unwrap_or_default(),
            is_muted: row.get::<_, i64>("is_muted")? != 0,
        })
    }

    fn query_submission(conn: &Connection, id: i64) -> Result<Option<Submission>> {
        Ok(conn
            .query_row(
                "SELECT * FROM submissions WHERE id = ?1",
                params![id],
                Self::row_to_submission,
            )
            .optional()?)
    }

    fn query_playback_state(conn: &Connection) -> Result<PlaybackState> {
        conn.query_row(
            "SELECT * FROM playback_state WHERE id = ?1",
            params![PLAYBACK_STATE_ID],
            Self::row_to_playback_state,
        )
        .context("Playback state row is missing")
    }
}

impl SubmissionStore for SqlitePartyStore {
    fn create_submission(&self, submission: &NewSubmission) -> Result<Submission> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO submissions (guest_name, memory, resolution, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                submission.guest_name(),
                submission.memory(),
                submission.resolution(),
                SubmissionStatus::Pending.as_str(),
                Self::format_datetime(&Self::now()),
            ],
        )?;
        let id = conn.last_insert_rowid();
        Self::query_submission(&conn, id)?.context("Inserted submission not found")
    }

    fn get_submission(&self, id: i64) -> Result<Option<Submission>> {
        let conn = self.conn.lock().unwrap();
        Self::query_submission(&conn, id)
    }

    fn list_submissions(&self, status: Option<SubmissionStatus>) -> Result<Vec<Submission>> {
        let conn = self.conn.lock().unwrap();
        let submissions = match status {
            Some(status) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM submissions WHERE status = ?1
                     ORDER BY created_at DESC, id DESC",
                )?;
                let rows = stmt.query_map(params![status.as_str()], Self::row_to_submission)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt =
                    conn.prepare("SELECT * FROM submissions ORDER BY created_at DESC, id DESC")?;
                let rows = stmt.query_map([], Self::row_to_submission)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(submissions)
    }

    fn list_approved_submissions(&self) -> Result<Vec<Submission>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM submissions WHERE status = ?1 ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt.query_map(
            params![SubmissionStatus::Approved.as_str()],
            Self::row_to_submission,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get_submission_counts(&self) -> Result<SubmissionCounts> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM submissions GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = SubmissionCounts::default();
        for row in rows {
            let (status, count) = row?;
            match SubmissionStatus::parse(&status) {
                Some(SubmissionStatus::Pending) => counts.pending = count as usize,
                Some(SubmissionStatus::Approved) => counts.approved = count as usize,
                Some(SubmissionStatus::Rejected) => counts.rejected = count as usize,
                None => {}
            }
        }
        Ok(counts)
    }

    fn decide_submission(&self, id: i64, decision: Decision) -> Result<DecisionOutcome> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE submissions SET status = ?1, reviewed_at = ?2
             WHERE id = ?3 AND status = ?4",
            params![
                decision.target_status().as_str(),
                Self::format_datetime(&Self::now()),
                id,
                SubmissionStatus::Pending.as_str(),
            ],
        )?;

        match Self::query_submission(&conn, id)? {
            None => Ok(DecisionOutcome::NotFound),
            Some(submission) if changed > 0 => Ok(DecisionOutcome::Decided(submission)),
            Some(submission) => Ok(DecisionOutcome::AlreadyDecided(submission.status)),
        }
    }

    fn delete_submission(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM submissions WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

impl AdminSessionStore for SqlitePartyStore {
    fn insert_admin_session(&self, session: &AdminSession) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO admin_sessions (token, created_at, expires_at) VALUES (?1, ?2, ?3)",
            params![session.token, session.created_at, session.expires_at],
        )?;
        Ok(())
    }

    fn get_admin_session(&self, token: &str) -> Result<Option<AdminSession>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT * FROM admin_sessions WHERE token = ?1",
                params![token],
                Self::row_to_admin_session,
            )
            .optional()?)
    }

    fn delete_admin_session(&self, token: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM admin_sessions WHERE token = ?1",
            params![token],
        )?;
        Ok(deleted > 0)
    }

    fn purge_expired_admin_sessions(&self, now: i64) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let purged = conn.execute(
            "DELETE FROM admin_sessions WHERE expires_at <= ?1",
            params![now],
        )?;
        if purged > 0 {
            debug!("Purged {} expired admin sessions", purged);
        }
        Ok(purged)
    }
}

impl PlaybackStateStore for SqlitePartyStore {
    fn get_playback_state(&self) -> Result<PlaybackState> {
        let conn = self.conn.lock().unwrap();
        Self::query_playback_state(&conn)
    }

    fn update_playback_state(
        &self,
        apply: &mut dyn FnMut(&mut PlaybackState) -> bool,
    ) -> Result<PlaybackState> {
        let conn = self.conn.lock().unwrap();
        let mut state = Self::query_playback_state(&conn)?;
        if !apply(&mut state) {
            return Ok(state);
        }

        state.last_updated = Self::now();
        conn.execute(
            "UPDATE playback_state SET
                is_paused = ?1,
                current_slide = ?2,
                current_slide_index = ?3,
                slide_duration = ?4,
                slide_started_at = ?5,
                last_updated = ?6,
                request_video_switch = ?7,
                total_slides = ?8,
                hidden_slides = ?9,
                is_muted = ?10
             WHERE id = ?11",
            params![
                state.is_paused as i64,
                state.current_slide,
                state.current_slide_index,
                state.slide_duration,
                state.slide_started_at,
                Self::format_datetime(&state.last_updated),
                state.request_video_switch as i64,
                state.total_slides,
                serde_json::to_string(&state.hidden_slides)?,
                state.is_muted as i64,
                PLAYBACK_STATE_ID,
            ],
        )?;
        Ok(state)
    }
}
