use crate::{AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use notify_rust::Notification;
use tracing::{debug, instrument, warn};

const APP_NAME: &str = "Screen Recorder";

/// Show a desktop notification without blocking the runtime.
#[instrument]
pub async fn notify(summary: String, body: String) {
    let result = tokio::task::spawn_blocking(move || show(&summary, &body)).await;

    match result {
        Ok(Ok(())) => debug!("Notification shown"),
        Ok(Err(e)) => warn!(error = ?e, "Failed to show notification"),
        Err(e) => warn!(error = ?e, "Notification task panicked"),
    }
}

#[track_caller]
fn show(summary: &str, body: &str) -> AppResult<()> {
    Notification::new()
        .appname(APP_NAME)
        .summary(summary)
        .body(body)
        .show()
        .map(|_| ())
        .map_err(|e| AppError::UiError {
            reason: format!("Notification failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
}
