//! Execution result types

use gamequeer_types::GamePtr;

/// Result of instruction execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecutionResult {
    /// Continue to next instruction
    Continue,
    /// Continue at another address
    Jump(GamePtr),
    /// End of script
    Done,
    /// A new stage was loaded; the script ends
    StageChanged,
}
