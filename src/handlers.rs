use crate::errors::AppError;
use crate::models::{UploadQuery, ViewSnapshot};
use crate::progress::spawn_progress;
use crate::state::AppState;
use crate::transfer::FILE_FIELD;
use crate::ui::render_index;
use crate::upload::{select_file, CandidateFile, UploadSource};
use axum::{
    extract::{Multipart, Query, State},
    response::{Html, Redirect},
    Json,
};
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let session = state.session.lock().await;
    Html(render_index(&session.snapshot()))
}

pub async fn get_session(State(state): State<AppState>) -> Json<ViewSnapshot> {
    let session = state.session.lock().await;
    Json(session.snapshot())
}

pub async fn upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Json<ViewSnapshot>, AppError> {
    let source = UploadSource::parse(query.source.as_deref());
    let files = read_files(multipart).await?;
    let snapshot = process_upload(&state, source, files).await?;
    Ok(Json(snapshot))
}

pub async fn reset(State(state): State<AppState>) -> Json<ViewSnapshot> {
    let mut session = state.session.lock().await;
    session.upload_another();
    Json(session.snapshot())
}

pub async fn reset_form(State(state): State<AppState>) -> Redirect {
    state.session.lock().await.upload_another();
    Redirect::to("/")
}

/// Runs one user-initiated upload to completion and reports where the view ended up.
///
/// The transfer runs on its own task so that a client hanging up mid-request
/// still leaves the session in a settled state.
pub async fn process_upload(
    state: &AppState,
    source: UploadSource,
    files: Vec<CandidateFile>,
) -> Result<ViewSnapshot, AppError> {
    let file = match select_file(source, files) {
        Ok(file) => file,
        Err(rejection) => {
            let mut session = state.session.lock().await;
            session.reject_input(&rejection)?;
            return Ok(session.snapshot());
        }
    };

    let (token, cancelled) = state.session.lock().await.begin_upload(&file.file_name)?;
    spawn_progress(state.clone(), token);

    let task_state = state.clone();
    let transfer = tokio::spawn(async move {
        let outcome = tokio::select! {
            outcome = task_state.analyzer.analyze(file) => Some(outcome),
            _ = cancelled => None,
        };
        let mut session = task_state.session.lock().await;
        match outcome {
            Some(outcome) => {
                session.complete(token, outcome);
            }
            None => info!(token = token.0, "transfer cancelled"),
        }
        session.snapshot()
    });

    transfer.await.map_err(AppError::internal)
}

async fn read_files(mut multipart: Multipart) -> Result<Vec<CandidateFile>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A `file` part without a filename is a plain form value, not a chosen file.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?.to_vec();
        files.push(CandidateFile {
            file_name,
            content_type,
            bytes,
        });
    }
    Ok(files)
}
