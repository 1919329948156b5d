//! Exit code constants for the learnsphere CLI.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 8 | `CONTENT_BLOCKED` | Provider refused the request on policy grounds |
//! | 10 | `GENERATION_TIMEOUT` | Generation request timed out |
//! | 65 | `PARSE_FAILURE` | Model response did not match the expected format |
//! | 70 | `GENERATION_FAILURE` | Generation client failed |

use crate::error::ErrorCategory;

/// Exit codes matching the documented exit code table.
///
/// ```rust
/// use learnsphere_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::PARSE_FAILURE, ExitCode::from_i32(65));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// The provider blocked the prompt or the response
    pub const CONTENT_BLOCKED: ExitCode = ExitCode(8);

    /// A generation request exceeded its timeout
    pub const GENERATION_TIMEOUT: ExitCode = ExitCode(10);

    /// The model response could not be parsed into a spec or code
    pub const PARSE_FAILURE: ExitCode = ExitCode(65);

    /// The generation client failed
    pub const GENERATION_FAILURE: ExitCode = ExitCode(70);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    /// Exit code for a failure of the given category
    #[must_use]
    pub const fn from_category(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::Configuration => Self::CLI_ARGS,
            ErrorCategory::ContentPolicy => Self::CONTENT_BLOCKED,
            ErrorCategory::ResponseParsing => Self::PARSE_FAILURE,
            ErrorCategory::Generation
            | ErrorCategory::Transport
            | ErrorCategory::ResourceLimits => Self::GENERATION_FAILURE,
            ErrorCategory::Orchestration => Self::INTERNAL,
        }
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
