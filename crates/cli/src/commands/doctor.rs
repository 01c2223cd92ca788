use dialogbridge_agent::ChatCompletionsClient;
use dialogbridge_core::config::{AppConfig, LlmProvider, LoadOptions};
use dialogbridge_core::IntentRegistry;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool, probe: bool) -> CommandResult {
    let report = build_report(probe);
    let exit_code = if report.overall_status == CheckStatus::Fail { 3 } else { 0 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report(probe: bool) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_intent_registry(&config));
            checks.push(check_llm_credentials(&config));
            checks.push(if probe {
                check_llm_probe(&config)
            } else {
                skipped("llm_probe", "pass --probe to send a live completion")
            });
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["intent_registry", "llm_credentials", "llm_probe"] {
                checks.push(skipped(name, "skipped because configuration did not load"));
            }
        }
    }

    let any_fail = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_fail { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_fail {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_intent_registry(config: &AppConfig) -> DoctorCheck {
    match IntentRegistry::with_overrides(&config.intents) {
        Ok(registry) => {
            let ids = registry.ids().map(|id| id.to_string()).collect::<Vec<_>>();
            let without_endpoint = registry
                .ids()
                .filter_map(|id| registry.lookup(id).ok())
                .filter(|spec| spec.downstream_endpoint.is_none())
                .count();
            DoctorCheck {
                name: "intent_registry",
                status: CheckStatus::Pass,
                details: format!(
                    "{} intents registered ({}); {without_endpoint} without a downstream endpoint",
                    ids.len(),
                    ids.join(", ")
                ),
            }
        }
        Err(error) => DoctorCheck {
            name: "intent_registry",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_llm_credentials(config: &AppConfig) -> DoctorCheck {
    let key_present = config
        .llm
        .api_key
        .as_ref()
        .is_some_and(|key| !key.expose_secret().trim().is_empty());

    match (config.llm.provider, key_present) {
        (LlmProvider::OpenAi, true) => DoctorCheck {
            name: "llm_credentials",
            status: CheckStatus::Pass,
            details: format!("openai api key present for model `{}`", config.llm.model),
        },
        (LlmProvider::OpenAi, false) => DoctorCheck {
            name: "llm_credentials",
            status: CheckStatus::Fail,
            details: "openai provider needs DIALOGBRIDGE_LLM_API_KEY or OPENAI_API_KEY".to_string(),
        },
        (LlmProvider::Ollama, _) => DoctorCheck {
            name: "llm_credentials",
            status: CheckStatus::Pass,
            details: format!("ollama needs no api key; using `{}`", config.llm.effective_base_url()),
        },
    }
}

fn check_llm_probe(config: &AppConfig) -> DoctorCheck {
    let client = match ChatCompletionsClient::from_config(&config.llm) {
        Ok(client) => client,
        Err(error) => {
            return DoctorCheck {
                name: "llm_probe",
                status: CheckStatus::Fail,
                details: format!("failed to build generation client: {error}"),
            };
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "llm_probe",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    match runtime.block_on(client.probe()) {
        Ok(reply) => DoctorCheck {
            name: "llm_probe",
            status: CheckStatus::Pass,
            details: format!("`{}` replied: {reply}", client.endpoint()),
        },
        Err(error) => DoctorCheck {
            name: "llm_probe",
            status: CheckStatus::Fail,
            details: format!("`{}` failed: {error}", client.endpoint()),
        },
    }
}

fn skipped(name: &'static str, details: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: details.to_string() }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
