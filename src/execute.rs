//! The linear submit pipeline shared by all three tools.
//!
//! ```text
//! OperationRequest ─► guard::check_each ─► request::build ─► service.invoke ─► response::decode
//! ```
//!
//! Each stage's failure ends the run with that stage's error.

use crate::error::LegalDocError;
use crate::output::OperationResult;
use crate::pipeline::guard::{self, MAX_INPUT_CHARS};
use crate::pipeline::request::{self, OperationRequest};
use crate::pipeline::response;
use crate::pipeline::transport::GenerationService;
use crate::progress::{self, ProgressCallback, Stage};
use std::time::Instant;
use tracing::{debug, info};

/// Run one operation end to end against `service`.
pub async fn execute(
    request: &OperationRequest,
    service: &dyn GenerationService,
    progress: Option<&ProgressCallback>,
) -> Result<OperationResult, LegalDocError> {
    let start = Instant::now();
    info!("Running {} pipeline", request.mode_name());

    progress::track(progress, Stage::SizeCheck, || {
        guard::check_each(request.texts(), MAX_INPUT_CHARS)
    })?;

    let model_request =
        progress::track(progress, Stage::BuildRequest, || -> Result<_, LegalDocError> {
            Ok(request::build(request))
        })?;

    if let Some(cb) = progress {
        cb.on_stage_start(Stage::Invoke);
    }
    let raw = service.invoke(&model_request).await;
    progress::report(progress, Stage::Invoke, &raw);
    let raw = raw?;
    debug!("Raw model output: {} chars", raw.chars().count());

    let result = progress::track(progress, Stage::DecodeResponse, || {
        response::decode(request, &raw)
    })?;

    info!(
        "{} pipeline finished in {}ms",
        request.mode_name(),
        start.elapsed().as_millis()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::request::ModelRequest;
    use crate::progress::PipelineProgressCallback;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct Canned {
        reply: Result<String, LegalDocError>,
        calls: AtomicUsize,
        last: Mutex<Option<ModelRequest>>,
    }

    impl Canned {
        fn new(reply: Result<&str, LegalDocError>) -> Self {
            Self {
                reply: reply.map(str::to_string),
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl GenerationService for Canned {
        async fn invoke(&self, request: &ModelRequest) -> Result<String, LegalDocError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            self.reply.clone()
        }
    }

    #[derive(Default)]
    struct Stages(Mutex<Vec<(Stage, bool)>>);

    impl PipelineProgressCallback for Stages {
        fn on_stage_complete(&self, stage: Stage) {
            self.0.lock().unwrap().push((stage, true));
        }

        fn on_stage_error(&self, stage: Stage, _error: &str) {
            self.0.lock().unwrap().push((stage, false));
        }
    }

    #[tokio::test]
    async fn extraction_runs_every_stage() {
        let service = Canned::new(Ok(r#"{"clauses":[]}"#));
        let stages = Arc::new(Stages::default());
        let cb: ProgressCallback = stages.clone();
        let req = OperationRequest::Extract {
            source: "No contract here.".into(),
        };

        let result = execute(&req, &service, Some(&cb)).await.unwrap();
        assert!(result.is_nothing_found());
        assert!(service.last.lock().unwrap().as_ref().unwrap().response_shape.is_some());
        assert_eq!(
            *stages.0.lock().unwrap(),
            vec![
                (Stage::SizeCheck, true),
                (Stage::BuildRequest, true),
                (Stage::Invoke, true),
                (Stage::DecodeResponse, true),
            ]
        );
    }

    #[tokio::test]
    async fn oversized_side_never_reaches_service() {
        let service = Canned::new(Ok("unused"));
        let req = OperationRequest::Compare {
            before: "short".into(),
            after: "x".repeat(MAX_INPUT_CHARS + 1).into(),
        };

        let err = execute(&req, &service, None).await.unwrap_err();
        assert_eq!(
            err,
            LegalDocError::TooLarge {
                length: MAX_INPUT_CHARS + 1,
                limit: MAX_INPUT_CHARS
            }
        );
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_reported_at_invoke() {
        let service = Canned::new(Err(LegalDocError::TransportError {
            status: 500,
            message: "internal".into(),
        }));
        let stages = Arc::new(Stages::default());
        let cb: ProgressCallback = stages.clone();
        let req = OperationRequest::Generate {
            template: Default::default(),
            details: "Parties: A and B".into(),
        };

        let err = execute(&req, &service, Some(&cb)).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(stages.0.lock().unwrap().last(), Some(&(Stage::Invoke, false)));
    }

    #[tokio::test]
    async fn malformed_output_fails_at_decode() {
        let service = Canned::new(Ok(r#"{"clauses":[{"clauseType":"A"}]}"#));
        let req = OperationRequest::Extract {
            source: "Some contract".into(),
        };
        assert!(matches!(
            execute(&req, &service, None).await,
            Err(LegalDocError::MalformedResponse(_))
        ));
    }
}
