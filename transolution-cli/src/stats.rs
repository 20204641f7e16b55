use serde_json::json;
use transolution::{CancellationToken, SolutionStats, TargetCoverage, coverage, default_registry};

use crate::edit::open;

pub fn run_stats_command(
    solution_path: &str,
    with_coverage: bool,
    json_output: bool,
) -> Result<(), String> {
    let solution = open(solution_path)?;
    let stats = SolutionStats::collect(&solution);
    let reports = if with_coverage {
        coverage(&solution, default_registry(), &CancellationToken::new())
            .map_err(|e| format!("Error computing coverage: {}", e))?
    } else {
        Vec::new()
    };

    if json_output {
        let per_target: Vec<_> = reports
            .iter()
            .map(|r| {
                json!({
                    "project": r.project,
                    "path": r.path,
                    "culture": r.culture,
                    "total": r.total,
                    "translated": r.translated,
                    "completion_percent": round2(r.percent()),
                    "missing": r.missing,
                    "obsolete": r.obsolete,
                })
            })
            .collect();
        let mut body = json!({ "summary": stats });
        if with_coverage {
            body["coverage"] = json!(per_target);
        }
        let body = serde_json::to_string_pretty(&body).map_err(|e| e.to_string())?;
        println!("{}", body);
        return Ok(());
    }

    println!("=== Stats ===");
    println!("Projects: {}", stats.projects);
    println!("Source files: {}", stats.source_files);
    println!("Target files: {}", stats.target_files);
    println!("By format:");
    for (format, count) in &stats.formats {
        println!("  {}: {}", format, count);
    }
    if !stats.cultures.is_empty() {
        let cultures: Vec<_> = stats.cultures.iter().map(String::as_str).collect();
        println!("Cultures: {}", cultures.join(", "));
    }
    for report in &reports {
        print_coverage(report);
    }
    Ok(())
}

fn print_coverage(report: &TargetCoverage) {
    println!("\nTarget: {} ({})", report.path, report.project);
    if let Some(culture) = &report.culture {
        println!("  Culture: {}", culture);
    }
    println!("  Translated: {}/{}", report.translated, report.total);
    println!("  Completion: {:.2}%", report.percent());
    if !report.missing.is_empty() {
        println!("  Missing: {}", report.missing.join(", "));
    }
    if !report.obsolete.is_empty() {
        println!("  Obsolete: {}", report.obsolete.join(", "));
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
