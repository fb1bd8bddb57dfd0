// scenescribe-cli/src/error.rs
//
// The CLI reports errors through the core error type; no separate error enum
// is needed at this layer.

use scenescribe_core::CoreResult;

/// Type alias for CLI results using the core error type.
pub type CliResult<T> = CoreResult<T>;
