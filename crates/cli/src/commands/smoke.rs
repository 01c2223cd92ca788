use std::sync::Arc;
use std::time::Instant;

use crate::commands::CommandResult;
use dialogbridge_agent::{
    ChatCompletionsClient, FulfillmentRuntime, HttpDownstreamClient, ReplyOutcome, RuntimeOptions,
};
use dialogbridge_core::config::{AppConfig, LoadOptions};
use dialogbridge_core::{IntentRegistry, NormalizedRequest, SessionId, SlotSet, TagRouter};
use dialogbridge_session::InMemorySessionStore;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

/// One scripted conversation turn and the outcome it must produce.
pub struct SmokeCase {
    pub name: &'static str,
    pub intent_tag: &'static str,
    pub user_text: &'static str,
    pub expected_outcome: &'static str,
}

pub const SMOKE_CASES: &[SmokeCase] = &[
    SmokeCase {
        name: "loan_balance",
        intent_tag: "loan_balance",
        user_text: "How much do I still owe on my car loan?",
        expected_outcome: "needs_input",
    },
    SmokeCase {
        name: "balance_enquiry",
        intent_tag: "balance_enquiry",
        user_text: "What's in my checking account right now?",
        expected_outcome: "needs_input",
    },
    SmokeCase {
        name: "loan_status",
        intent_tag: "loan_status",
        user_text: "Is my home loan approved yet?",
        expected_outcome: "fulfilled",
    },
    SmokeCase {
        name: "unsupported_intent",
        intent_tag: "unsupported_intent",
        user_text: "Tell me a joke.",
        expected_outcome: "unsupported",
    },
];

pub fn run() -> CommandResult {
    let started = Instant::now();
    let mut checks = Vec::new();

    let config = match timed_check(|| AppConfig::load(LoadOptions::default())) {
        Ok((elapsed_ms, config)) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Pass,
                elapsed_ms,
                message: "configuration loaded and validated".to_string(),
            });
            config
        }
        Err((elapsed_ms, error)) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Fail,
                elapsed_ms,
                message: error.to_string(),
            });
            checks.extend(SMOKE_CASES.iter().map(|case| skipped(case.name)));
            return finalize_report(checks, elapsed(started));
        }
    };

    let wiring = timed_check(|| -> Result<_, String> {
        let registry = Arc::new(
            IntentRegistry::with_overrides(&config.intents).map_err(|error| error.to_string())?,
        );
        let llm = ChatCompletionsClient::from_config(&config.llm).map_err(|error| error.to_string())?;
        let downstream = HttpDownstreamClient::new(config.downstream.timeout_secs)
            .map_err(|error| error.to_string())?;
        let router = TagRouter::new(&config.webhook.tag_aliases, &registry);
        let runtime = FulfillmentRuntime::new(
            registry,
            Arc::new(llm),
            Arc::new(downstream),
            Arc::new(InMemorySessionStore::new()),
            RuntimeOptions::from(&config),
        );
        Ok((runtime, router))
    });

    let (runtime, router) = match wiring {
        Ok((elapsed_ms, wired)) => {
            checks.push(SmokeCheck {
                name: "runtime_wiring",
                status: SmokeStatus::Pass,
                elapsed_ms,
                message: format!("generation via `{}` model", config.llm.model),
            });
            wired
        }
        Err((elapsed_ms, error)) => {
            checks.push(SmokeCheck {
                name: "runtime_wiring",
                status: SmokeStatus::Fail,
                elapsed_ms,
                message: error,
            });
            checks.extend(SMOKE_CASES.iter().map(|case| skipped(case.name)));
            return finalize_report(checks, elapsed(started));
        }
    };

    let async_runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(async_runtime) => async_runtime,
        Err(error) => {
            checks.push(SmokeCheck {
                name: "async_runtime",
                status: SmokeStatus::Fail,
                elapsed_ms: 0,
                message: format!("failed to initialize async runtime: {error}"),
            });
            return finalize_report(checks, elapsed(started));
        }
    };

    checks.extend(async_runtime.block_on(run_cases(&runtime, &router)));
    finalize_report(checks, elapsed(started))
}

/// Runs [`SMOKE_CASES`] through `runtime`, each in its own session.
pub async fn run_scripted(runtime: &FulfillmentRuntime, router: &TagRouter) -> CommandResult {
    let started = Instant::now();
    let checks = run_cases(runtime, router).await;
    finalize_report(checks, elapsed(started))
}

async fn run_cases(runtime: &FulfillmentRuntime, router: &TagRouter) -> Vec<SmokeCheck> {
    let mut checks = Vec::with_capacity(SMOKE_CASES.len());

    for (index, case) in SMOKE_CASES.iter().enumerate() {
        let case_started = Instant::now();
        let request = NormalizedRequest {
            session_id: SessionId::new(format!("smoke-{}", index + 1)),
            user_text: case.user_text.to_string(),
            intent_tag: case.intent_tag.to_string(),
            intent_id: router.route(case.intent_tag),
            parameters: SlotSet::new(),
            sentiment: Some("neutral".to_string()),
        };

        let reply = runtime.handle(&request).await;
        let outcome = reply.outcome.label();
        let passed = outcome == case.expected_outcome
            && !matches!(reply.outcome, ReplyOutcome::GenerationFailed { .. });

        checks.push(SmokeCheck {
            name: case.name,
            status: if passed { SmokeStatus::Pass } else { SmokeStatus::Fail },
            elapsed_ms: elapsed(case_started),
            message: if passed {
                reply.text
            } else {
                format!("expected {}, got {outcome}: {}", case.expected_outcome, reply.text)
            },
        });
    }

    checks
}

fn elapsed(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn timed_check<T, E>(check: impl FnOnce() -> Result<T, E>) -> Result<(u64, T), (u64, E)> {
    let started = Instant::now();
    match check() {
        Ok(value) => Ok((elapsed(started), value)),
        Err(error) => Err((elapsed(started), error)),
    }
}

fn skipped(name: &'static str) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped due previous failure".to_string(),
    }
}

fn finalize_report(checks: Vec<SmokeCheck>, total_elapsed_ms: u64) -> CommandResult {
    let passed = checks.iter().filter(|check| check.status == SmokeStatus::Pass).count();
    let total = checks.len();
    let failed = checks.iter().any(|check| check.status == SmokeStatus::Fail);

    let report = SmokeReport {
        command: "smoke",
        status: if failed { SmokeStatus::Fail } else { SmokeStatus::Pass },
        summary: format!("smoke: {passed}/{total} checks passed in {total_elapsed_ms}ms"),
        total_elapsed_ms,
        checks,
    };

    let human = report.summary.clone();
    let machine = serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"smoke\",\"status\":\"fail\",\"summary\":\"serialization failed\",\"error\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    });

    CommandResult { exit_code: if failed { 6 } else { 0 }, output: format!("{human}\n{machine}") }
}
