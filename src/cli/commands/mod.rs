//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a specific CLI command.

pub mod completions;
pub mod config;
pub mod embed;
pub mod ingest;

// Re-export argument types for use in mod.rs
pub use completions::CompletionsArgs;
pub use config::ConfigArgs;
pub use embed::EmbedArgs;
pub use ingest::IngestArgs;

use crate::core::cancel::CancelFlag;

/// Exit status after a forced quit (128 + SIGINT)
const FORCED_EXIT_CODE: i32 = 130;

/// What the nth Ctrl-C (1-based) does to a running pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InterruptAction {
    /// Ask the pipeline to stop at its next boundary
    Cancel,
    /// Quit immediately without waiting for the current item
    Exit,
}

pub(crate) fn interrupt_action(count: usize) -> InterruptAction {
    if count <= 1 {
        InterruptAction::Cancel
    } else {
        InterruptAction::Exit
    }
}

/// Run a pipeline on the blocking pool, cancelling it on Ctrl-C.
///
/// The pipeline stops at its next file or batch boundary; whatever it
/// finished is reported normally with `cancelled` set. A second Ctrl-C
/// exits the process at once, for items that never finish (a network
/// call with no timeout, a stuck PDF).
pub(crate) async fn run_blocking<T, F>(
    cancel: CancelFlag,
    job: F,
) -> Result<T, Box<dyn std::error::Error>>
where
    F: FnOnce() -> crate::core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let interrupt_flag = cancel.clone();
    let interrupt = tokio::spawn(async move {
        let mut count = 0;
        while tokio::signal::ctrl_c().await.is_ok() {
            count += 1;
            match interrupt_action(count) {
                InterruptAction::Cancel => {
                    tracing::warn!(
                        "Interrupt received, stopping after the current item (press Ctrl-C again to quit)"
                    );
                    interrupt_flag.cancel();
                }
                InterruptAction::Exit => {
                    tracing::warn!("Second interrupt received, exiting without finishing");
                    std::process::exit(FORCED_EXIT_CODE);
                }
            }
        }
    });

    let result = tokio::task::spawn_blocking(job).await;
    interrupt.abort();

    Ok(result??)
}

/// Current UTC time for run reports
pub(crate) fn completed_at() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
