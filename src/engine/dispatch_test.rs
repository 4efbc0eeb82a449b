use crate::cli::interactive::testing::{Answer, ScriptedPrompter};
use crate::cli::ParsedArgv;
use crate::config::Config;
use crate::engine::Fire;
use crate::error::FireError;
use crate::models::{Branch, DispatchOutcome, Leaf};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

// Helper to build the calculator tree used across these tests
fn calculator() -> Branch {
    let mut root = Branch::new().describe("I am a math machine");
    root.insert(
        "half",
        Leaf::new(|args| Ok(args.parse::<f64>("number")? / 2.0)).param("number"),
    )
    .unwrap();
    root.insert(
        "double",
        Leaf::new(|args| Ok(args.parse::<f64>("number")? * 2.0)).param("number"),
    )
    .unwrap();
    root.insert(
        "add",
        Leaf::new(|args| Ok(args.parse::<f64>("n1")? + args.parse::<f64>("n2")?))
            .signature("(n1 = 3.5, n2)"),
    )
    .unwrap();
    root.insert_path(
        "misc.year",
        Leaf::new(|_| Ok("1999")).describe("the year I was made"),
    )
    .unwrap();
    root.insert_path("misc.brand", Leaf::new(|_| Ok("casio")))
        .unwrap();
    root.insert_path(
        "misc.hello",
        Leaf::new(|args| Ok(format!("hi {}", args.str("name")?)))
            .param("name")
            .describe("prints your name"),
    )
    .unwrap();
    root.insert_path(
        "misc.info.greeting",
        Leaf::new(|args| Ok(format!("greetings {}!", args.str("name")?)))
            .signature("(name=\"hobochild\")"),
    )
    .unwrap();
    root
}

fn subtract(signature: &str) -> Leaf {
    Leaf::new(|args| Ok(args.parse::<i64>("a")? - args.parse::<i64>("b")?)).signature(signature)
}

fn fire(root: impl Into<crate::models::CommandNode>) -> Fire {
    colored::control::set_override(false);
    Fire::with_config(root, Config::default().with_program_name("calc")).unwrap()
}

fn argv(tokens: &[&str]) -> ParsedArgv {
    ParsedArgv::parse(tokens.iter().copied())
}

async fn outcome(fire: &Fire, tokens: &[&str]) -> DispatchOutcome {
    fire.dispatch(&argv(tokens)).await.unwrap()
}

fn text(outcome: DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::Help(t)
        | DispatchOutcome::CommandNotFound(t)
        | DispatchOutcome::FlagNotFound(t)
        | DispatchOutcome::ExtraArgument(t) => t,
        other => panic!("Expected a text outcome, got {:?}", other),
    }
}

// --- Binding ---

#[tokio::test]
async fn positionals_bind_in_order() {
    let fire = fire(subtract("(a, b=5)"));
    assert_eq!(
        outcome(&fire, &["30", "20"]).await,
        DispatchOutcome::Result(json!(10))
    );
}

#[tokio::test]
async fn flags_bind_by_name() {
    let fire = fire(subtract("(a, b=5)"));
    assert_eq!(
        outcome(&fire, &["--b", "30", "--a", "20"]).await,
        DispatchOutcome::Result(json!(-10))
    );
}

#[tokio::test]
async fn defaults_fill_missing_values() {
    let fire = fire(subtract("(a = 100, b = 5)"));
    assert_eq!(
        outcome(&fire, &["--b=1"]).await,
        DispatchOutcome::Result(json!(99))
    );
    assert_eq!(outcome(&fire, &[]).await, DispatchOutcome::Result(json!(95)));
}

#[tokio::test]
async fn leaf_help_lists_flags() {
    let fire = fire(subtract("(a, b=5)"));
    let result = outcome(&fire, &["--help"]).await;
    assert_eq!(result.exit_code(), 0);
    let help = text(result);
    assert!(help.contains("--a=<a>"));
    assert!(help.contains("--b=5"));
}

#[tokio::test]
async fn nested_command_with_and_without_flag() {
    let fire = fire(calculator());
    let expected = DispatchOutcome::Result(json!("greetings hobochild!"));
    assert_eq!(
        outcome(&fire, &["misc", "info", "greeting", "--name", "hobochild"]).await,
        expected
    );
    assert_eq!(outcome(&fire, &["misc", "info", "greeting"]).await, expected);
}

#[tokio::test]
async fn positionals_after_command_path_are_arguments() {
    let fire = fire(calculator());
    let result = outcome(&fire, &["double", "20"]).await;
    assert_eq!(result.render().as_deref(), Some("40"));
    assert_eq!(
        outcome(&fire, &["half", "--number", "20"]).await.render().as_deref(),
        Some("10")
    );
    assert_eq!(
        outcome(&fire, &["misc", "hello", "--name", "hobochild"]).await,
        DispatchOutcome::Result(json!("hi hobochild"))
    );
}

#[tokio::test]
async fn unknown_flag_reports_suggestion_and_help() {
    let fire = fire(calculator());
    let result = outcome(&fire, &["half", "--numbr", "20"]).await;
    assert_eq!(result.exit_code(), 1);
    let message = text(result);
    assert!(message.contains("Flag numbr not found"));
    assert!(message.contains("Did you mean: number ?"));
    assert!(message.contains("USAGE:\n\tcalc half --number=<number>"));
}

#[tokio::test]
async fn surplus_positionals_are_reported() {
    let fire = fire(calculator());
    let result = outcome(&fire, &["double", "1", "2"]).await;
    assert!(matches!(result, DispatchOutcome::ExtraArgument(_)));
    assert!(text(result).contains("Unexpected argument 2"));
}

// --- Resolution failures ---

#[tokio::test]
async fn typo_suggests_closest_command() {
    let fire = fire(calculator());
    let result = outcome(&fire, &["mis"]).await;
    assert!(matches!(result, DispatchOutcome::CommandNotFound(_)));
    let message = text(result);
    assert!(message.starts_with("Error: Command mis not found\nDid you mean: misc ?"));
    assert!(message.contains("COMMANDS:"));
}

#[tokio::test]
async fn unrelated_token_gets_no_suggestion() {
    let fire = fire(calculator());
    let message = text(outcome(&fire, &["zzz999"]).await);
    assert!(message.starts_with("Error: Command zzz999 not found\n\nUSAGE:"));
    assert!(!message.contains("Did you mean"));
}

#[tokio::test]
async fn nested_typo_is_matched_against_the_stalled_group() {
    let fire = fire(calculator());
    let message = text(outcome(&fire, &["misc", "helo"]).await);
    assert!(message.contains("Did you mean: hello ?"));
    assert!(message.contains("USAGE:\n\tcalc misc <command>"));
}

#[tokio::test]
async fn group_without_command_is_not_found() {
    let fire = fire(calculator());
    let result = outcome(&fire, &[]).await;
    assert_eq!(result.exit_code(), 1);
    assert!(text(result).starts_with("Error: Command not found\n"));
}

#[tokio::test]
async fn group_without_leaves_is_not_found_rather_than_a_crash() {
    let fire = fire(Branch::new().command("hollow", Branch::new()).unwrap());
    assert!(matches!(
        outcome(&fire, &[]).await,
        DispatchOutcome::CommandNotFound(_)
    ));
    assert!(matches!(
        outcome(&fire, &["hollow"]).await,
        DispatchOutcome::CommandNotFound(_)
    ));
}

#[tokio::test]
async fn group_help_is_idempotent() {
    let fire = fire(calculator());
    let first = outcome(&fire, &["misc", "--help"]).await;
    let second = outcome(&fire, &["misc", "--help"]).await;
    assert_eq!(first, second);
    let help = text(first);
    assert!(help.contains("\thello --name=<name>\n"));
    assert!(help.contains("\tinfo\n\t\tgreeting --name=hobochild\n"));
}

#[tokio::test]
async fn help_wins_over_unknown_flags() {
    let fire = fire(calculator());
    assert!(matches!(
        outcome(&fire, &["half", "--nope", "1", "-h"]).await,
        DispatchOutcome::Help(_)
    ));
}

// --- Invocation ---

#[tokio::test]
async fn async_commands_are_awaited() {
    let leaf = Leaf::new_async(|args| async move {
        let ms = args.parse_or::<u64>("ms", 5)?;
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok::<_, anyhow::Error>(format!("slept {}", ms))
    })
    .param_deferred("ms");
    let fire = fire(leaf);
    assert_eq!(
        outcome(&fire, &[]).await,
        DispatchOutcome::Result(json!("slept 5"))
    );
}

#[tokio::test]
async fn command_errors_propagate_unchanged() {
    let fire = fire(Leaf::new(|_| -> anyhow::Result<()> { anyhow::bail!("boom") }));
    match fire.dispatch(&argv(&[])).await {
        Err(FireError::Callable(err)) => assert_eq!(err.to_string(), "boom"),
        other => panic!("Expected Callable error, got {:?}", other),
    }
}

#[tokio::test]
async fn commands_returning_nothing_print_nothing() {
    let fire = fire(Leaf::new(|_| Ok(())));
    let result = outcome(&fire, &[]).await;
    assert_eq!(result, DispatchOutcome::Result(json!(null)));
    assert_eq!(result.render(), None);
}

#[tokio::test]
async fn non_finite_results_are_printed() {
    let calc = fire(calculator());
    let result = outcome(&calc, &["double", "inf"]).await;
    assert_eq!(result.render().as_deref(), Some("inf"));
    assert_eq!(result.exit_code(), 0);

    let nan = fire(Leaf::new(|_| Ok(f64::NAN)));
    assert_eq!(outcome(&nan, &[]).await.render().as_deref(), Some("NaN"));
}

// --- Exit codes ---

#[tokio::test]
async fn run_maps_outcomes_to_exit_codes() {
    let fire = fire(calculator());
    assert_eq!(fire.run(["double", "4"]).await, ExitCode::SUCCESS);
    assert_eq!(fire.run(["misc", "--help"]).await, ExitCode::SUCCESS);
    assert_eq!(fire.run(["zzz999"]).await, ExitCode::FAILURE);
    assert_eq!(fire.run(["double", "--nmber=2"]).await, ExitCode::FAILURE);
}

#[tokio::test]
async fn run_fails_when_the_command_fails() {
    let fire = fire(Leaf::new(|_| -> anyhow::Result<()> { anyhow::bail!("boom") }));
    assert_eq!(fire.run(Vec::<String>::new()).await, ExitCode::FAILURE);
}

// --- Interactive mode ---

#[tokio::test]
async fn interactive_walks_groups_then_prompts_for_arguments() {
    // root: add, double, half, misc -> misc: brand, hello, info, year
    let prompter = ScriptedPrompter::new(vec![
        Answer::Pick(3),
        Answer::Pick(1),
        Answer::Text("bob".into()),
    ]);
    let fire = fire(calculator()).with_prompter(prompter.clone());

    assert_eq!(
        outcome(&fire, &["-i"]).await,
        DispatchOutcome::Result(json!("hi bob"))
    );
    let asked = prompter.asked();
    assert_eq!(asked.len(), 3);
    assert!(asked[1].contains("hello - prints your name"));
    assert_eq!(asked[2], "--name=<name> ()");
}

#[tokio::test]
async fn interactive_leaf_uses_prefilled_defaults() {
    let prompter = ScriptedPrompter::new(vec![Answer::Text(String::new())]);
    let fire = fire(calculator()).with_prompter(prompter.clone());
    assert_eq!(
        outcome(&fire, &["misc", "info", "greeting", "--interactive"]).await,
        DispatchOutcome::Result(json!("greetings hobochild!"))
    );
    assert_eq!(prompter.asked(), vec!["--name=hobochild (hobochild)"]);
}

#[tokio::test]
async fn interactive_cancel_never_invokes_the_command() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let leaf = Leaf::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .param("a")
    .param("b");

    let prompter = ScriptedPrompter::new(vec![Answer::Text("1".into()), Answer::Abort]);
    let fire = fire(Branch::new().command("run", leaf).unwrap()).with_prompter(prompter);

    let result = outcome(&fire, &["run", "-i"]).await;
    assert_eq!(result, DispatchOutcome::Cancelled);
    assert_eq!(result.exit_code(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn interactive_cancel_at_group_selection() {
    let prompter = ScriptedPrompter::new(vec![Answer::Abort]);
    let fire = fire(calculator()).with_prompter(prompter);
    assert_eq!(outcome(&fire, &["-i"]).await, DispatchOutcome::Cancelled);
}

// --- Construction and introspection ---

#[test]
fn reserved_parameter_names_are_rejected_at_construction() {
    let leaf = Leaf::new(|_| Ok(())).param("interactive");
    assert!(matches!(
        Fire::new(Branch::new().command("x", leaf).unwrap()),
        Err(FireError::InvariantViolation(_))
    ));
}

#[test]
fn signature_lookup_by_path() {
    let fire = fire(calculator());

    let params = fire.signature(&["misc", "info", "greeting"]).unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].known_default(), Some(&json!("hobochild")));

    let again = fire.signature(&["misc", "info", "greeting"]).unwrap();
    assert!(Arc::ptr_eq(&params, &again));

    assert!(matches!(
        fire.signature(&["misc"]),
        Err(FireError::NotFunction(_))
    ));
    assert!(matches!(
        fire.signature(&["nope"]),
        Err(FireError::CommandNotFound { .. })
    ));
}
