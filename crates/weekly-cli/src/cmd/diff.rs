use crate::output::print_json;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use weekly_core::diff::{compute_diff, DiffSegment, SegmentKind};

pub fn run(old: &Path, new: &Path, json: bool) -> Result<()> {
    let old_text =
        std::fs::read_to_string(old).with_context(|| format!("reading {}", old.display()))?;
    let new_text =
        std::fs::read_to_string(new).with_context(|| format!("reading {}", new.display()))?;

    let segments = compute_diff(&old_text, &new_text);
    if json {
        return print_json(&segments);
    }

    for segment in &segments {
        println!("{}", format_segment(segment));
    }
    Ok(())
}

/// One line per segment: `  ` unchanged, `- ` removed, `+ ` added.
///
/// Changes are colored unless stdout is not a terminal or `NO_COLOR` is set.
pub fn format_segment(segment: &DiffSegment) -> String {
    match segment.kind {
        SegmentKind::Unchanged => format!("  {}", segment.text),
        SegmentKind::Removed => format!("- {}", segment.text).red().to_string(),
        SegmentKind::Added => format!("+ {}", segment.text).green().to_string(),
    }
}
