//! Interactive prompt loop.
//!
//! `AwaitingQuery -> Processing -> Presenting -> AwaitingQuery` until the user
//! types `exit`, input ends, or the shutdown signal fires.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{error, info};

use crate::error::ResearchError;
use crate::session::{Orchestrator, ResultRecord};

const BANNER: &str = "\n🤖 Research Assistant AI
------------------------
I can help you research any topic, analyze websites, or answer complex questions.
Examples:
- What are the latest developments in quantum computing?
- Analyze https://example.com and tell me about its main points
- Compare different approaches to transformer architecture

Type 'exit' to quit.
";
const PROMPT: &str = "\n🔍 What would you like to research? ";
const INVALID_QUERY: &str = "Please enter a valid query.";
const FAREWELL: &str = "\nThank you for using Research Assistant AI!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    AwaitingQuery,
    Processing,
    Presenting,
    Terminated,
}

/// Why the driver stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverExit {
    /// The user typed `exit`.
    Exit,
    EndOfInput,
    Interrupted,
    Fault(String),
}

impl DriverExit {
    pub fn code(&self) -> i32 {
        match self {
            Self::Fault(_) => 1,
            _ => 0,
        }
    }
}

pub struct Driver<R, W> {
    lines: Lines<R>,
    output: W,
    state: DriverState,
}

impl<R, W> Driver<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            lines: input.lines(),
            output,
            state: DriverState::AwaitingQuery,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until exit, end of input, a fault, or `shutdown` completes.
    ///
    /// A request in flight when `shutdown` fires is dropped without output.
    pub async fn run_until(
        &mut self,
        orchestrator: &Orchestrator,
        shutdown: impl Future<Output = ()>,
    ) -> DriverExit {
        tokio::pin!(shutdown);
        let outcome = tokio::select! {
            biased;
            _ = &mut shutdown => Ok(DriverExit::Interrupted),
            outcome = self.drive(orchestrator) => outcome,
        };
        self.state = DriverState::Terminated;

        let exit = match outcome {
            Ok(DriverExit::Interrupted) => {
                // best effort; the process is leaving anyway
                let _ = self.line(FAREWELL).await;
                DriverExit::Interrupted
            }
            Ok(exit) => exit,
            Err(e) => {
                error!(error = %e, "research assistant stopped");
                let _ = self.line(&format!("\n❌ Error: {e}")).await;
                DriverExit::Fault(e.to_string())
            }
        };
        info!(?exit, "driver terminated");
        exit
    }

    async fn drive(&mut self, orchestrator: &Orchestrator) -> Result<DriverExit, ResearchError> {
        self.output.write_all(BANNER.as_bytes()).await?;

        loop {
            self.state = DriverState::AwaitingQuery;
            self.output.write_all(PROMPT.as_bytes()).await?;
            self.output.flush().await?;

            let Some(line) = self.lines.next_line().await? else {
                return Ok(DriverExit::EndOfInput);
            };
            let query = line.trim();
            if query.eq_ignore_ascii_case("exit") {
                return Ok(DriverExit::Exit);
            }
            if query.is_empty() {
                self.line(INVALID_QUERY).await?;
                continue;
            }

            self.state = DriverState::Processing;
            let record = match orchestrator.research(query).await {
                Ok(record) => record,
                // e.g. input that was nothing but a URL
                Err(ResearchError::Validation(_)) => {
                    self.line(INVALID_QUERY).await?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            self.state = DriverState::Presenting;
            self.present(&record).await?;
        }
    }

    async fn present(&mut self, record: &ResultRecord) -> std::io::Result<()> {
        match record {
            ResultRecord::Success { summary } => {
                self.line("\n📊 Research Results:").await?;
                self.line("-------------------").await?;
                self.line(summary).await?;
            }
            ResultRecord::Failure {
                error_kind,
                details,
            } => {
                self.line("\n❌ Error:").await?;
                self.line(error_kind).await?;
                self.line("\nDetails:").await?;
                self.line(details).await?;
            }
        }
        self.line("\n------------------------").await?;
        self.line("Ready for another query!").await
    }

    async fn line(&mut self, text: &str) -> std::io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }
}

/// Resolves on Ctrl-C (or SIGTERM on unix). Never resolves if the handlers
/// cannot be installed.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
