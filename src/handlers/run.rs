use actix_web::{web, HttpResponse};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::data::{normalize_any, read_table};
use crate::error::{validate_window, AppError};
use crate::experiment::run_experiment;
use crate::handlers::AppState;
use crate::models::{RunRequest, RunResponse};

/// Run the full pipeline on a dataset file
///
/// One synchronous pass: read → normalize → validate → experiment → persist.
/// Any stage failure aborts the run and maps to an error response; no
/// partial results are returned.
pub async fn run_dataset(
    state: web::Data<Arc<AppState>>,
    req: web::Json<RunRequest>,
) -> Result<HttpResponse, AppError> {
    // Window validation happens before any file processing
    let window = validate_window(&req.window)?;

    info!(dataset = %req.dataset, lottery = %req.lottery, "starting run");

    let df = read_table(Path::new(&req.dataset))?;
    let records = normalize_any(&df, &req.lottery, &req.file_format)?;
    let results = run_experiment(&records, &req.lottery, window)?;

    state.storage.save_normalized(&records)?;
    state.storage.save_results(&results)?;
    state.storage.append_history(&results, &req.lottery, window)?;

    Ok(HttpResponse::Ok().json(RunResponse {
        lottery: req.lottery.clone(),
        results,
    }))
}
