//! `jobprobe list`

use crate::commands::{ListArgs, ListFormat};
use crate::error::CliResult;
use jobprobe::scenario::catalog;

/// Render the scenario catalog in the requested format
pub fn render(format: ListFormat) -> CliResult<String> {
    let scenarios = catalog();
    match format {
        ListFormat::Text => Ok(scenarios
            .iter()
            .map(|s| format!("{:<28} {}", s.id(), s.title()))
            .collect::<Vec<_>>()
            .join("\n")),
        ListFormat::Json => {
            let entries: Vec<_> = scenarios
                .iter()
                .map(|s| serde_json::json!({ "id": s.id(), "title": s.title() }))
                .collect();
            Ok(serde_json::to_string_pretty(&entries)?)
        }
    }
}

/// Print the scenario catalog
pub fn execute(args: &ListArgs) -> CliResult<()> {
    println!("{}", render(args.format)?);
    Ok(())
}
