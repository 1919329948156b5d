//! Logging and observability infrastructure for learnsphere
//!
//! Structured logging with `tracing`: one subscriber for the process, spans per
//! generation stage, and redacted error logging.

use tracing::{Level, debug, error, info, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::redaction::redact_secrets;
use crate::types::StageId;

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise verbose mode logs this workspace at
/// debug level and everything else at info.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("learnsphere=debug,info")
            } else {
                EnvFilter::try_new("learnsphere=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span covering one stage of one content run
pub fn stage_span(generation: u64, stage: StageId) -> tracing::Span {
    span!(
        Level::INFO,
        "content_stage",
        generation = generation,
        stage = %stage,
    )
}

pub fn log_stage_start(generation: u64, stage: StageId) {
    info!(generation, stage = %stage, "Starting generation stage");
}

pub fn log_stage_complete(generation: u64, stage: StageId, duration_ms: u128) {
    info!(
        generation,
        stage = %stage,
        duration_ms = %duration_ms,
        "Generation stage completed"
    );
}

/// Log a stage failure. The message is redacted before it reaches the sink.
pub fn log_stage_error(generation: u64, stage: StageId, error: &str, duration_ms: u128) {
    let sanitized_error = redact_secrets(error);
    error!(
        generation,
        stage = %stage,
        duration_ms = %duration_ms,
        error = %sanitized_error,
        "Generation stage failed"
    );
}

/// A result arrived for a session that is no longer current.
pub fn log_stale_result(generation: u64, current: u64, stage: StageId) {
    debug!(
        generation,
        current,
        stage = %stage,
        "Discarding result from superseded content session"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn captured(f: impl FnOnce()) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        capture.text()
    }

    #[test]
    fn test_second_install_is_rejected() {
        let _ = init_tracing(false);
        assert!(init_tracing(false).is_err());
    }

    #[test]
    fn test_stage_span_creation() {
        let span = stage_span(3, StageId::SpecFromBasis);
        if let Some(metadata) = span.metadata() {
            assert_eq!(metadata.name(), "content_stage");
        }
    }

    #[test]
    fn test_stage_error_is_redacted() {
        let output = captured(|| {
            log_stage_error(
                1,
                StageId::CodeFromSpec,
                "request to https://host/x?key=secret failed",
                1500,
            );
        });

        assert!(output.contains("ERROR"));
        assert!(output.contains("Generation stage failed"));
        assert!(output.contains("?key=[REDACTED]"));
        assert!(!output.contains("secret"));
    }

    #[test]
    fn test_stage_lifecycle_fields() {
        let output = captured(|| {
            log_stage_start(4, StageId::SpecFromBasis);
            log_stage_complete(4, StageId::SpecFromBasis, 1200);
            log_stale_result(4, 5, StageId::SpecFromBasis);
        });

        assert!(output.contains("Starting generation stage"));
        assert!(output.contains("duration_ms=1200"));
        assert!(output.contains("DEBUG"));
        assert!(output.contains("current=5"));
    }
}
