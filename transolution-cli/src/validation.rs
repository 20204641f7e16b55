use serde_json::json;
use transolution::{Severity, Validator, default_registry};

use crate::edit::open;

/// Validate a solution file. Fails when any error-level issue is found, or
/// with `strict`, when any issue at all is found.
pub fn run_validate_command(
    solution_path: &str,
    check_files: bool,
    strict: bool,
    json_output: bool,
) -> Result<(), String> {
    let solution = open(solution_path)?;
    let issues = Validator::new(default_registry())
        .with_file_checks(check_files)
        .validate(&solution);

    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    let warnings = issues.len() - errors;

    if json_output {
        let items: Vec<_> = issues
            .iter()
            .map(|i| {
                json!({
                    "severity": i.severity.to_string(),
                    "location": i.location,
                    "message": i.message,
                })
            })
            .collect();
        let body = json!({
            "errors": errors,
            "warnings": warnings,
            "issues": items,
        });
        let body = serde_json::to_string_pretty(&body).map_err(|e| e.to_string())?;
        println!("{}", body);
    } else if issues.is_empty() {
        println!("✅ {} is valid", solution_path);
    } else {
        for issue in &issues {
            println!("{}", issue);
        }
        println!("\n{} error(s), {} warning(s)", errors, warnings);
    }

    if errors > 0 || (strict && warnings > 0) {
        return Err(format!(
            "Validation failed: {} error(s), {} warning(s)",
            errors, warnings
        ));
    }
    Ok(())
}
