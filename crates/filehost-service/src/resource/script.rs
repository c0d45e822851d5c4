//! HTTP script invocation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use filehost_core::error::{AppError, ErrorKind};
use filehost_core::result::AppResult;
use filehost_plugin::{HttpScript, ScriptRequest, ScriptResponse};

/// Runs a script in its own task, bounded by `timeout`.
///
/// Handler errors, panics and timeouts all come back as `Script` errors;
/// none of them reach the caller's task.
pub async fn run_script(
    script: Arc<dyn HttpScript>,
    request: ScriptRequest,
    timeout: Duration,
) -> AppResult<Option<ScriptResponse>> {
    let handle = tokio::spawn(async move { script.call(request).await });
    let abort = handle.abort_handle();

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(Ok(response))) => Ok(response),
        Ok(Ok(Err(e))) => {
            warn!(error = %e, "Script returned an error");
            Err(AppError::with_source(ErrorKind::Script, e.message.clone(), e))
        }
        Ok(Err(join_error)) if join_error.is_panic() => {
            error!("Script panicked");
            Err(AppError::script("Script panicked"))
        }
        Ok(Err(join_error)) => Err(AppError::with_source(
            ErrorKind::Script,
            "Script was cancelled",
            join_error,
        )),
        Err(_) => {
            abort.abort();
            warn!(timeout_secs = timeout.as_secs(), "Script timed out");
            Err(AppError::script(format!(
                "Script timed out after {}s",
                timeout.as_secs()
            )))
        }
    }
}
