//! Research Assistant binary entry point.

use research_assistant::config::OrchestratorConfig;
use research_assistant::driver::{shutdown_signal, Driver};
use research_assistant::error::ResearchError;
use research_assistant::session::Orchestrator;
use research_assistant::util::logging::init_tracing;
use tokio::io::BufReader;

#[tokio::main]
async fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("{e}");
    }

    let orchestrator = match OrchestratorConfig::from_env().and_then(Orchestrator::new) {
        Ok(orchestrator) => orchestrator,
        Err(e) => exit_with(&e),
    };

    let mut driver = Driver::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    let exit = driver.run_until(&orchestrator, shutdown_signal()).await;
    drop(orchestrator);
    std::process::exit(exit.code());
}

fn exit_with(error: &ResearchError) -> ! {
    eprintln!("Error: {error}");
    if let Some(hint) = error.recovery_suggestion().hint() {
        eprintln!("Hint: {hint}");
    }
    std::process::exit(1);
}
