//! Tests for the interactive driver.

mod common;

use std::sync::Arc;

use common::{profile, MockProvider};
use research_assistant::crew::ExecutionGuards;
use research_assistant::driver::{Driver, DriverExit, DriverState};
use research_assistant::session::Orchestrator;

async fn run_driver(input: &str, provider: Arc<MockProvider>) -> (DriverExit, String) {
    let orchestrator = Orchestrator::from_parts(profile(provider), ExecutionGuards::default());
    let mut driver = Driver::new(input.as_bytes(), Vec::new());
    let exit = driver
        .run_until(&orchestrator, std::future::pending::<()>())
        .await;
    assert_eq!(driver.state(), DriverState::Terminated);
    let output = String::from_utf8(driver.into_output()).unwrap();
    (exit, output)
}

#[tokio::test]
async fn exit_command_terminates_cleanly() {
    let provider = Arc::new(MockProvider::new());
    let (exit, output) = run_driver("EXIT\nWhat is Rust?\n", provider.clone()).await;

    assert_eq!(exit, DriverExit::Exit);
    assert_eq!(exit.code(), 0);
    assert!(output.contains("Research Assistant AI"));
    assert_eq!(output.matches("What would you like to research?").count(), 1);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn empty_input_reprompts() {
    let provider = Arc::new(MockProvider::new());
    let (exit, output) = run_driver("\n   \nexit\n", provider.clone()).await;

    assert_eq!(exit, DriverExit::Exit);
    assert_eq!(output.matches("Please enter a valid query.").count(), 2);
    assert_eq!(output.matches("What would you like to research?").count(), 3);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn url_only_input_reprompts_without_backend_call() {
    let provider = Arc::new(MockProvider::new());
    let (_, output) = run_driver("https://example.com\nexit\n", provider.clone()).await;

    assert_eq!(output.matches("Please enter a valid query.").count(), 1);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn success_and_failure_are_presented() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_response("Rust is a systems language.");
    provider.queue_error("backend unavailable");
    let (exit, output) = run_driver("What is Rust?\nWhat is Go?\n", provider).await;

    assert_eq!(exit, DriverExit::EndOfInput);
    assert_eq!(exit.code(), 0);

    let results = output.find("Research Results:").unwrap();
    let summary = output.find("Rust is a systems language.").unwrap();
    let error = output.find("Error:").unwrap();
    let kind = output.find("Service error").unwrap();
    let details = output.find("Details:").unwrap();
    assert!(results < summary && summary < error && error < kind && kind < details);
    assert!(output[details..].contains("backend unavailable"));
    assert_eq!(output.matches("Ready for another query!").count(), 2);
}

#[tokio::test]
async fn shutdown_signal_says_goodbye() {
    let orchestrator = Orchestrator::from_parts(
        profile(Arc::new(MockProvider::new())),
        ExecutionGuards::default(),
    );
    let mut driver = Driver::new(&b"What is Rust?\n"[..], Vec::new());

    let exit = driver.run_until(&orchestrator, std::future::ready(())).await;

    assert_eq!(exit, DriverExit::Interrupted);
    assert_eq!(exit.code(), 0);
    let output = String::from_utf8(driver.into_output()).unwrap();
    assert!(output.ends_with("Thank you for using Research Assistant AI!\n"));
    assert!(!output.contains("Research Results"));
}

#[test]
fn faults_exit_with_failure_code() {
    assert_eq!(DriverExit::Fault("broken pipe".into()).code(), 1);
}
