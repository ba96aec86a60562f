use expoquote_core::config::{AppConfig, LoadOptions};
use reqwest::Url;
use serde::Serialize;

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

const DEPENDENT_CHECKS: [&str; 3] = ["catalog_integrity", "postal_endpoint", "contact_links"];

pub fn run(options: &LoadOptions, json_output: bool) -> String {
    let report = build_report(options);

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_catalog(&config));
            checks.push(check_postal_endpoint(&config));
            checks.push(check_contact_links(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in DEPENDENT_CHECKS {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog(config: &AppConfig) -> DoctorCheck {
    let source = config
        .catalog
        .path
        .as_ref()
        .map(|path| format!("`{}`", path.display()))
        .unwrap_or_else(|| "built-in catalog".to_string());

    match config.load_catalog() {
        Ok(catalog) if catalog.is_empty() => DoctorCheck {
            name: "catalog_integrity",
            status: CheckStatus::Fail,
            details: format!("{source} has no items"),
        },
        Ok(catalog) => DoctorCheck {
            name: "catalog_integrity",
            status: CheckStatus::Pass,
            details: format!(
                "{source}: {} categories, {} items",
                catalog.categories().len(),
                catalog.len()
            ),
        },
        Err(error) => DoctorCheck {
            name: "catalog_integrity",
            status: CheckStatus::Fail,
            details: format!("{source}: {error}"),
        },
    }
}

fn check_postal_endpoint(config: &AppConfig) -> DoctorCheck {
    match Url::parse(&config.postal.base_url) {
        Ok(url) if url.host_str().is_some() => DoctorCheck {
            name: "postal_endpoint",
            status: CheckStatus::Pass,
            details: format!(
                "lookups go to `{}` with a {}s timeout",
                config.postal.base_url, config.postal.timeout_secs
            ),
        },
        Ok(_) => DoctorCheck {
            name: "postal_endpoint",
            status: CheckStatus::Fail,
            details: format!("`{}` has no host", config.postal.base_url),
        },
        Err(error) => DoctorCheck {
            name: "postal_endpoint",
            status: CheckStatus::Fail,
            details: format!("`{}` is not a valid URL: {error}", config.postal.base_url),
        },
    }
}

fn check_contact_links(config: &AppConfig) -> DoctorCheck {
    let mut available = Vec::new();
    if config.documents.sales_whatsapp.is_some() {
        available.push("chat");
    }
    if config.documents.sales_email.is_some() {
        available.push("email");
    }

    let details = if available.is_empty() {
        "no sales contacts configured; documents render without send links".to_string()
    } else {
        format!("send links available for: {}", available.join(", "))
    };
    DoctorCheck { name: "contact_links", status: CheckStatus::Pass, details }
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
