//! Train command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{apply_overrides, load_config, validate_config, TrainArgs};
use crate::primal_dual::{train_from_spec, ClassOutcome, DriverReport};

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Primal-dual training from {}", args.config.display()),
    );

    let mut spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    apply_overrides(&mut spec, &args);
    validate_config(&spec).map_err(|e| format!("Config error: {e}"))?;

    if args.dry_run {
        log(level, LogLevel::Normal, "Dry run - config validated successfully");
        log(
            level,
            LogLevel::Verbose,
            &format!("  Model: {}", spec.model),
        );
        log(
            level,
            LogLevel::Verbose,
            &format!(
                "  Outer iterations: {} x {} inner steps",
                spec.n_outer, spec.n_inner
            ),
        );
        log(
            level,
            LogLevel::Verbose,
            &format!("  Classes: {}", spec.dataset.n_classes),
        );
        return Ok(());
    }

    let report = train_from_spec(&spec).map_err(|e| format!("Training error: {e}"))?;
    print_report(&report, level);

    if report.failed() > 0 {
        return Err(format!(
            "{} of {} classes failed",
            report.failed(),
            report.results.len()
        ));
    }

    log(level, LogLevel::Normal, "Training complete!");
    Ok(())
}

/// One line per class, plus per-outer detail at verbose level
pub fn format_report(report: &DriverReport, level: LogLevel) -> Vec<String> {
    let mut lines = Vec::new();
    for result in &report.results {
        match &result.outcome {
            ClassOutcome::Completed {
                start_outer,
                summaries,
                evaluation,
            } => {
                let f1 = evaluation.map_or_else(|| "n/a".to_string(), |e| format!("{:.4}", e.f1));
                lines.push(format!(
                    "  class {:>3}: outer {}..{} test F1 {f1}",
                    result.class,
                    start_outer,
                    start_outer + summaries.len()
                ));
                if level == LogLevel::Verbose {
                    for s in summaries {
                        lines.push(format!(
                            "    outer {:>4}: loss {:.5} t1 {:.5} t2 {:.5} mu {:.5} eps {:.5} w {:.5}",
                            s.outer, s.mean_loss, s.mean_t1, s.mean_t2, s.mu, s.eps, s.w
                        ));
                    }
                }
            }
            ClassOutcome::Failed { error } => {
                lines.push(format!("  class {:>3}: failed: {error}", result.class));
            }
        }
    }
    if let Some(f1) = report.macro_f1() {
        lines.push(format!("Macro F1: {f1:.4}"));
    }
    lines
}

fn print_report(report: &DriverReport, level: LogLevel) {
    for line in format_report(report, level) {
        log(level, LogLevel::Normal, &line);
    }
}
