use super::error::{ApiError, ApiResult};
use super::json_body::JsonBody;
use super::metrics::record_submission_event;
use super::session::AdminAuth;
use super::state::{GuardedPartyStore, ServerState};
use crate::party_store::{
    Decision, DecisionOutcome, NewSubmission, Submission, SubmissionCounts, SubmissionStatus,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

#[derive(Deserialize, Debug)]
struct SubmissionBody {
    #[serde(default)]
    memory: String,
    #[serde(default)]
    resolution: String,
    guest_name: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ListQuery {
    status: Option<String>,
}

#[derive(Serialize)]
struct SubmissionListResponse {
    submissions: Vec<Submission>,
    counts: SubmissionCounts,
}

#[derive(Serialize)]
struct DecisionResponse {
    message: &'static str,
    slides_created: usize,
    submission: Submission,
}

async fn create_submission(
    State(store): State<GuardedPartyStore>,
    JsonBody(body): JsonBody<SubmissionBody>,
) -> ApiResult<impl IntoResponse> {
    let new_submission =
        NewSubmission::new(body.guest_name.as_deref(), &body.memory, &body.resolution)?;
    let submission = store.create_submission(&new_submission)?;
    record_submission_event("created");
    info!(
        "New submission #{} from {}",
        submission.id,
        submission.guest_name.as_deref().unwrap_or("Anonymous")
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": submission.id, "message": "Submission received!" })),
    ))
}

async fn list_submissions(
    _admin: AdminAuth,
    State(store): State<GuardedPartyStore>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<SubmissionListResponse>> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => Some(
            SubmissionStatus::parse(raw)
                .ok_or_else(|| ApiError::Validation(format!("Unknown status: {}", raw)))?,
        ),
    };

    Ok(Json(SubmissionListResponse {
        submissions: store.list_submissions(status)?,
        counts: store.get_submission_counts()?,
    }))
}

async fn list_approved_submissions(
    State(store): State<GuardedPartyStore>,
) -> ApiResult<impl IntoResponse> {
    let submissions = store.list_approved_submissions()?;
    Ok(Json(json!({ "submissions": submissions })))
}

fn decide(store: &GuardedPartyStore, id: i64, decision: Decision) -> ApiResult<Submission> {
    match store.decide_submission(id, decision)? {
        DecisionOutcome::Decided(submission) => Ok(submission),
        DecisionOutcome::NotFound => Err(ApiError::NotFound("Submission not found".to_string())),
        DecisionOutcome::AlreadyDecided(status) => Err(ApiError::Conflict(status)),
    }
}

async fn approve_submission(
    _admin: AdminAuth,
    State(store): State<GuardedPartyStore>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DecisionResponse>> {
    let submission = decide(&store, id, Decision::Approve)?;
    record_submission_event("approved");
    info!(
        "Submission #{} approved - created 2 slides for {}",
        id,
        submission.guest_name.as_deref().unwrap_or("Anonymous")
    );
    Ok(Json(DecisionResponse {
        message: "Approved",
        slides_created: 2,
        submission,
    }))
}

async fn reject_submission(
    _admin: AdminAuth,
    State(store): State<GuardedPartyStore>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DecisionResponse>> {
    let submission = decide(&store, id, Decision::Reject)?;
    record_submission_event("rejected");
    info!("Submission #{} rejected", id);
    Ok(Json(DecisionResponse {
        message: "Rejected",
        slides_created: 0,
        submission,
    }))
}

async fn delete_submission(
    _admin: AdminAuth,
    State(store): State<GuardedPartyStore>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let submission = store
        .get_submission(id)?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;
    if !store.delete_submission(id)? {
        return Err(ApiError::NotFound("Submission not found".to_string()));
    }

    let slides_removed = if submission.status == SubmissionStatus::Approved {
        2
    } else {
        0
    };
    record_submission_event("deleted");
    info!("Submission #{} deleted permanently", id);
    Ok(Json(
        json!({ "message": "Deleted", "slides_removed": slides_removed }),
    ))
}

pub fn make_submission_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", post(create_submission).get(list_submissions))
        .route("/approved", get(list_approved_submissions))
        .route("/{id}/approve", put(approve_submission))
        .route("/{id}/reject", put(reject_submission))
        .route("/{id}", delete(delete_submission))
        .with_state(state)
}
