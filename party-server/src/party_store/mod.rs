mod models;
mod schema;
mod sqlite_party_store;

pub use models::*;
pub use schema::PARTY_VERSIONED_SCHEMAS;
pub use sqlite_party_store::SqlitePartyStore;

use anyhow::Result;

pub trait SubmissionStore: Send + Sync {
    fn create_submission(&self, submission: &NewSubmission) -> Result<Submission>;
    fn get_submission(&self, id: i64) -> Result<Option<Submission>>;
    /// Newest first, optionally restricted to one status.
    fn list_submissions(&self, status: Option<SubmissionStatus>) -> Result<Vec<Submission>>;
    /// Approved submissions in creation order.
    fn list_approved_submissions(&self) -> Result<Vec<Submission>>;
    fn get_submission_counts(&self) -> Result<SubmissionCounts>;
    /// Moves a pending submission to its terminal state. Decided submissions
    /// are left untouched.
    fn decide_submission(&self, id: i64, decision: Decision) -> Result<DecisionOutcome>;
    /// Returns false if there was nothing to delete.
    fn delete_submission(&self, id: i64) -> Result<bool>;
}

pub trait AdminSessionStore: Send + Sync {
    fn insert_admin_session(&self, session: &AdminSession) -> Result<()>;
    fn get_admin_session(&self, token: &str) -> Result<Option<AdminSession>>;
    fn delete_admin_session(&self, token: &str) -> Result<bool>;
    /// Deletes every session that is no longer valid at `now`.
    fn purge_expired_admin_sessions(&self, now: i64) -> Result<usize>;
}

pub trait PlaybackStateStore: Send + Sync {
    fn get_playback_state(&self) -> Result<PlaybackState>;
    /// Read-modify-write of the singleton row. `apply` returns whether it
    /// changed anything; `last_updated` is only bumped when it did.
    fn update_playback_state(
        &self,
        apply: &mut dyn FnMut(&mut PlaybackState) -> bool,
    ) -> Result<PlaybackState>;
}

/// Everything the HTTP layer needs from the party database.
pub trait PartyStore: SubmissionStore + AdminSessionStore + PlaybackStateStore {}

impl<T: SubmissionStore + AdminSessionStore + PlaybackStateStore> PartyStore for T {}
