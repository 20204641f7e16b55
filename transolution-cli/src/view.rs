use std::path::Path;

use transolution::{CancellationToken, ResourceCodec, ResourceEntry, Solution, default_registry};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::edit::open;

/// Display columns a value may take before it is cut, unless `--full`.
const MAX_VALUE_WIDTH: usize = 50;

/// Print the solution tree, or its JSON dump.
pub fn run_show_command(solution_path: &str, json: bool) -> Result<(), String> {
    let solution = open(solution_path)?;
    if json {
        let body = solution.to_json().map_err(|e| e.to_string())?;
        println!("{}", body);
    } else {
        print_solution(&solution);
    }
    Ok(())
}

fn print_solution(solution: &Solution) {
    println!("Solution: {}", solution.name());
    if !solution.comment().is_empty() {
        println!("Comment: {}", solution.comment());
    }
    println!("Projects: {}", solution.projects().len());

    for project in solution.projects() {
        println!("\n=== Project {} ===", project.name());
        match project.source() {
            Some(source) => println!("  Source: {} [{}]", source.path, source.format),
            None => println!("  Source: (none)"),
        }
        for target in project.targets() {
            let culture = target
                .culture()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "?".to_string());
            println!("  Target: {} [{}] ({})", target.path, target.format, culture);
            if !target.comment.is_empty() {
                println!("    Comment: {}", target.comment);
            }
        }
    }
}

/// Print all entries of a resource file.
pub fn run_view_command(input: &str, format: Option<&str>, full: bool) -> Result<(), String> {
    let codec = select_codec(input, format)?;
    let entries = load_entries(codec.as_ref(), input)?;

    println!("=== {} ===", input);
    println!("Format: {}", codec.format_tag());
    println!("Entries: {}", entries.len());
    for (i, entry) in entries.iter().enumerate() {
        println!("\n  Entry {}: {}", i + 1, entry.key);
        if full {
            println!("    Value: {}", entry.value);
        } else {
            println!("    Value: {}", truncate(&entry.value, MAX_VALUE_WIDTH));
        }
        if !entry.comment.is_empty() {
            println!("    Comment: {}", entry.comment);
        }
    }
    Ok(())
}

pub(crate) fn select_codec(
    path: &str,
    format: Option<&str>,
) -> Result<std::sync::Arc<dyn ResourceCodec>, String> {
    match format {
        Some(tag) => default_registry()
            .select(tag)
            .ok_or_else(|| format!("Unknown format: {}", tag)),
        None => default_registry()
            .select_for_path(path)
            .ok_or_else(|| format!("Cannot infer format from path: {} (use --format)", path)),
    }
}

pub(crate) fn load_entries(
    codec: &dyn ResourceCodec,
    path: &str,
) -> Result<Vec<ResourceEntry>, String> {
    codec
        .load(Path::new(path), &CancellationToken::new())
        .and_then(|stream| stream.collect())
        .map_err(|e| format!("Error reading {}: {}", path, e))
}

/// Cuts `value` to at most `width` display columns, marking the cut with `...`.
fn truncate(value: &str, width: usize) -> String {
    if value.width() <= width {
        return value.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in value.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}
