use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::redaction::redact_secrets;
use crate::types::StageId;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `LearnSphereError` is the error returned by the CLI-facing operations of the
/// workspace. It provides:
/// - Detailed error information for programmatic handling
/// - User-friendly messages with context and suggestions
/// - Mapping to CLI exit codes for consistent error reporting
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration/CLI argument errors |
/// | 8 | Content blocked by upstream policy |
/// | 10 | Generation request timed out |
/// | 65 | Model response could not be parsed |
/// | 70 | Generation client failure |
/// | 1 | Other errors |
///
/// Library code returns errors and never calls `std::process::exit()`.
#[derive(Error, Debug)]
pub enum LearnSphereError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    /// A content run finished in the `error` state.
    #[error("Content generation for {basis} failed during {stage}: {detail}")]
    RunFailed {
        basis: String,
        stage: StageId,
        category: ErrorCategory,
        detail: String,
    },
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Generation,
    ContentPolicy,
    ResponseParsing,
    Orchestration,
    Transport,
    ResourceLimits,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Generation => write!(f, "Generation"),
            Self::ContentPolicy => write!(f, "Content Policy"),
            Self::ResponseParsing => write!(f, "Response Parsing"),
            Self::Orchestration => write!(f, "Orchestration"),
            Self::Transport => write!(f, "Transport"),
            Self::ResourceLimits => write!(f, "Resource Limits"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },
}

/// Why the model stopped producing a candidate before normal completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Response withheld by the provider's safety settings
    Safety,
    /// Any other abnormal finish reason, as reported by the provider
    Other(String),
}

fn describe_stop(reason: &StopReason) -> String {
    match reason {
        StopReason::Safety => {
            "Content generation failed: Response blocked due to safety settings.".to_string()
        }
        StopReason::Other(reason) => format!("Content generation failed: Stopped due to {reason}."),
    }
}

/// Classified failures of the generation client.
///
/// The first four variants are the contract-level failures every client must
/// distinguish; the rest describe transport-level problems of HTTP adapters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// No API credential is configured
    #[error(
        "API key is missing or empty. Make sure to set the {env_var} environment variable."
    )]
    MissingCredential { env_var: String },

    /// The prompt was rejected by upstream content policy
    #[error("Content generation failed: Prompt blocked (reason: {reason})")]
    BlockedPrompt { reason: String },

    /// The provider returned zero candidates
    #[error("Content generation failed: No candidates returned.")]
    NoCandidates,

    /// The first candidate finished for a reason other than normal completion
    #[error("{}", describe_stop(.reason))]
    AbnormalStop { reason: StopReason },

    /// Transport-level failure (HTTP connectivity, undecodable body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    /// Request timed out
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// Invalid client configuration
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Unsupported provider or feature
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl GenerationError {
    /// True when the failure came from upstream content policy
    #[must_use]
    pub fn is_content_policy(&self) -> bool {
        matches!(
            self,
            Self::BlockedPrompt { .. }
                | Self::AbnormalStop {
                    reason: StopReason::Safety
                }
        )
    }
}

impl UserFriendlyError for GenerationError {
    fn user_message(&self) -> String {
        match self {
            Self::Transport(msg) => format!("Model transport error: {msg}"),
            Self::ProviderAuth(msg) => format!("Model provider authentication failed: {msg}"),
            Self::ProviderQuota(msg) => format!("Model provider quota exceeded: {msg}"),
            Self::ProviderOutage(msg) => format!("Model provider service outage: {msg}"),
            Self::Timeout { duration } => format!("Generation request timed out after {duration:?}"),
            Self::Misconfiguration(msg) => format!("Generation client configuration error: {msg}"),
            Self::Unsupported(msg) => format!("Generation feature not supported: {msg}"),
            other => other.to_string(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::MissingCredential { .. } => Some(
                "The generation client reads its API key from the environment at request time."
                    .to_string(),
            ),
            Self::BlockedPrompt { .. } | Self::AbnormalStop { .. } => Some(
                "The model provider refused to produce content for this request.".to_string(),
            ),
            Self::NoCandidates => {
                Some("The provider answered but returned no usable candidate.".to_string())
            }
            Self::Transport(_) | Self::ProviderOutage(_) => Some(
                "Transport errors occur when the model provider cannot be reached.".to_string(),
            ),
            Self::ProviderAuth(_) => Some(
                "Authentication errors indicate missing or invalid API keys.".to_string(),
            ),
            Self::ProviderQuota(_) => {
                Some("Quota errors occur when rate limits or usage limits are exceeded.".to_string())
            }
            Self::Timeout { .. } => Some(
                "Video-based requests can take a long time for long source videos.".to_string(),
            ),
            Self::Misconfiguration(_) | Self::Unsupported(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingCredential { env_var } => vec![
                format!("Set the {env_var} environment variable"),
                "Or point [llm.gemini] api_key_env at the variable that holds your key".to_string(),
            ],
            Self::ProviderAuth(_) => vec![
                "Check that the configured API key is valid and has access to the model"
                    .to_string(),
            ],
            Self::BlockedPrompt { .. } | Self::AbnormalStop { .. } | Self::NoCandidates => vec![
                "Try a different source video".to_string(),
                "Edit the spec and regenerate".to_string(),
            ],
            Self::ProviderQuota(_) | Self::ProviderOutage(_) => vec![
                "Wait a few minutes and try again".to_string(),
                "Check the provider's status page for known issues".to_string(),
            ],
            Self::Timeout { .. } => vec![
                "Increase the request timeout with --timeout or [defaults] request_timeout"
                    .to_string(),
            ],
            Self::Transport(_) => vec!["Verify network connectivity".to_string()],
            Self::Misconfiguration(_) | Self::Unsupported(_) => vec![
                "Check the [llm] section of .learnsphere/config.toml".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCredential { .. }
            | Self::ProviderAuth(_)
            | Self::Misconfiguration(_)
            | Self::Unsupported(_) => ErrorCategory::Configuration,
            Self::BlockedPrompt { .. } => ErrorCategory::ContentPolicy,
            Self::AbnormalStop { .. } if self.is_content_policy() => ErrorCategory::ContentPolicy,
            Self::AbnormalStop { .. } | Self::NoCandidates => ErrorCategory::Generation,
            Self::Transport(_) | Self::ProviderOutage(_) => ErrorCategory::Transport,
            Self::ProviderQuota(_) | Self::Timeout { .. } => ErrorCategory::ResourceLimits,
        }
    }
}

/// Coarse classification of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    MalformedJson,
    DelimiterNotFound,
    OrderViolation,
}

/// Failures turning raw model text into a strict artifact
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed JSON in model response: {reason}")]
    MalformedJson { reason: String },

    /// The JSON object parsed but lacks the expected string field
    #[error("Malformed JSON in model response: missing string field '{field}'")]
    MissingField { field: String },

    #[error("Delimiter not found in model response: '{marker}'")]
    DelimiterNotFound { marker: String },

    #[error("Delimiter order violation: '{closer}' appears only before '{opener}'")]
    OrderViolation { opener: String, closer: String },
}

impl ParseError {
    #[must_use]
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::MalformedJson { .. } | Self::MissingField { .. } => ParseErrorKind::MalformedJson,
            Self::DelimiterNotFound { .. } => ParseErrorKind::DelimiterNotFound,
            Self::OrderViolation { .. } => ParseErrorKind::OrderViolation,
        }
    }
}

/// Any failure inside a generation stage.
///
/// Display is transparent so the stage's message reaches the user verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl PipelineError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Generation(err) => err.category(),
            Self::Parse(_) => ErrorCategory::ResponseParsing,
        }
    }
}

/// Rejected orchestrator operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// A user edit arrived while a generation stage is running
    #[error("Cannot apply an edit while {state} is in progress")]
    Busy { state: String },

    /// The session was replaced by a newer activation
    #[error("Content session {token} was superseded by activation {current}")]
    Superseded { token: u64, current: u64 },

    /// The edit is not valid in the current state
    #[error("Cannot apply {operation} while in state {state}")]
    InvalidTransition { operation: String, state: String },

    /// No activation has happened yet
    #[error("No content session is active")]
    NoActiveSession,
}

impl UserFriendlyError for LearnSphereError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Generation(err) => err.user_message(),
            Self::Pipeline(PipelineError::Generation(err)) => err.user_message(),
            Self::Pipeline(err) => err.to_string(),
            Self::Orchestrator(err) => err.to_string(),
            Self::RunFailed { detail, .. } => detail.clone(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Generation(err) | Self::Pipeline(PipelineError::Generation(err)) => err.context(),
            Self::Pipeline(PipelineError::Parse(_)) => Some(
                "The model answered, but not in the format the pipeline expects.".to_string(),
            ),
            Self::RunFailed { basis, stage, .. } => {
                Some(format!("Source video: {basis} (failed during {stage})"))
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(_) => vec![
                "Check .learnsphere/config.toml or the --config path".to_string(),
                "Run 'learnsphere config' to see effective values and their sources".to_string(),
            ],
            Self::Generation(err) | Self::Pipeline(PipelineError::Generation(err)) => {
                err.suggestions()
            }
            Self::Pipeline(PipelineError::Parse(_)) => {
                vec!["Run the generation again; model output varies between attempts".to_string()]
            }
            Self::RunFailed {
                basis, category, ..
            } => {
                let mut out = Vec::new();
                if !basis.starts_with("http://") && !basis.starts_with("https://") {
                    out.push("URL must begin with http:// or https://".to_string());
                }
                match category {
                    ErrorCategory::ResponseParsing => out.push(
                        "Run the generation again; model output varies between attempts"
                            .to_string(),
                    ),
                    ErrorCategory::ContentPolicy => {
                        out.push("Try a different source video".to_string());
                    }
                    ErrorCategory::Configuration => out.push(
                        "Run 'learnsphere config' to check the provider settings".to_string(),
                    ),
                    _ => {}
                }
                out.push("Edit the spec with --edit-spec to retry code generation".to_string());
                out
            }
            Self::Orchestrator(_) => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Generation(err) => err.category(),
            Self::Pipeline(err) => err.category(),
            Self::Orchestrator(_) => ErrorCategory::Orchestration,
            Self::RunFailed { category, .. } => *category,
        }
    }
}

impl LearnSphereError {
    /// Get a user-friendly error message with context and actionable suggestions.
    ///
    /// ```text
    /// Error: <user message>
    ///
    /// Context: <context if available>
    ///
    /// Suggestions:
    ///   • <suggestion 1>
    /// ```
    ///
    /// Credentials are redacted from the message and context.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", redact_secrets(&self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {}\n", redact_secrets(&ctx)));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Orchestrator(_) => ExitCode::INTERNAL,
            Self::Generation(GenerationError::Timeout { .. })
            | Self::Pipeline(PipelineError::Generation(GenerationError::Timeout { .. })) => {
                ExitCode::GENERATION_TIMEOUT
            }
            Self::Generation(err) | Self::Pipeline(PipelineError::Generation(err)) => {
                ExitCode::from_category(err.category())
            }
            Self::Pipeline(PipelineError::Parse(_)) => ExitCode::PARSE_FAILURE,
            Self::RunFailed { category, .. } => ExitCode::from_category(*category),
        }
    }
}
