use std::path::Path;

use tracing::warn;
use transolution::{CancellationToken, Finalize};

use crate::view::{load_entries, select_codec};

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub input_format: Option<String>,
    pub output_format: Option<String>,
}

/// Convert a resource file into another format (or rewrite it in place).
pub fn run_convert_command(
    input: &str,
    output: &str,
    options: &ConvertOptions,
) -> Result<(), String> {
    let reader = select_codec(input, options.input_format.as_deref())?;
    let writer = select_codec(output, options.output_format.as_deref())?;
    println!(
        "Converting {} ({}) to {} ({})...",
        input,
        reader.format_tag(),
        output,
        writer.format_tag()
    );

    let entries = load_entries(reader.as_ref(), input)?;
    let summary = writer
        .save(
            Path::new(output),
            &mut entries.into_iter(),
            &CancellationToken::new(),
        )
        .map_err(|e| format!("Error writing {}: {}", output, e))?;

    if let Finalize::Failed(message) = &summary.finalize {
        warn!(output, message = message.as_str(), "output may be incomplete");
        eprintln!("⚠️  {} may be incomplete: {}", output, message);
    }
    println!("✅ Converted {} entries to {}", summary.written, output);
    Ok(())
}
