//! Tuning parameters for transfer execution.

use std::time::Duration;

/// Tuning parameters. The defaults mirror the limits the engine was tuned
/// against; none of them is load-bearing for correctness.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Rows submitted to the destination per insert call. Kept well under
    /// typical external API payload and row-count limits.
    pub batch_size: usize,
    /// How many detected images a dry run probes for accessibility.
    pub dry_run_image_sample: usize,
    /// How many images a live preview probes.
    pub preview_image_sample: usize,
    /// Retries for the single-row recovery path.
    pub row_retries: u32,
    /// Base delay for exponential backoff between row retries.
    pub retry_backoff: Duration,
    /// Longest cell text the destination accepts; longer values are
    /// truncated with a warning.
    pub max_cell_text_len: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        TransferConfig {
            batch_size: 50,
            dry_run_image_sample: 50,
            preview_image_sample: 20,
            row_retries: 2,
            retry_backoff: Duration::from_secs(1),
            max_cell_text_len: 4000,
        }
    }
}
