//! Terminal rendering of a phase's results

use std::fmt::Write;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use zqlz_bench::{PhaseResults, ResultRecord};

/// Width of the longest bar, in characters
pub const DEFAULT_BAR_WIDTH: usize = 40;

/// Characters of a label shown next to its bar
const CHART_LABEL_CHARS: usize = 40;

const BAR: char = '█';

/// Table of every record, degraded rows included with their raw text
pub fn results_table(results: &PhaseResults) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(vec!["#", "Query", "Min (ms)", "Max (ms)", "Avg (ms)", "Runs"]);

    for (i, record) in results.records.iter().enumerate() {
        let mut row = vec![Cell::new(i + 1), Cell::new(record.label())];
        if record.is_degraded() {
            row = row.into_iter().map(|cell| cell.fg(Color::Yellow)).collect();
        }
        match record {
            ResultRecord::Summary(summary) => row.extend([
                Cell::new(format!("{:.2}", summary.min_ms)),
                Cell::new(format!("{:.2}", summary.max_ms)),
                Cell::new(format!("{:.2}", summary.avg_ms)).fg(Color::Green),
                Cell::new(summary.run_count),
            ]),
            ResultRecord::Degraded(raw) => row.extend([
                Cell::new(&raw.min_time_ms),
                Cell::new(&raw.max_time_ms),
                Cell::new(&raw.avg_time_ms),
                Cell::new(&raw.runs),
            ]),
        }
        table.add_row(row);
    }

    table
}

/// Horizontal bar chart of the average time per row.
///
/// Bars are scaled against the slowest average. Degraded rows have no
/// timing and are left out.
pub fn bar_chart(results: &PhaseResults, width: usize) -> String {
    let summaries: Vec<_> = results.summaries().collect();
    let slowest = summaries.iter().map(|s| s.avg_ms).fold(0.0_f64, f64::max);

    let mut chart = format!("Average execution time - {}\n", results.phase);
    for summary in summaries {
        let bar_len = if slowest > 0.0 {
            let len = (summary.avg_ms / slowest * width as f64).round() as usize;
            if summary.avg_ms > 0.0 { len.max(1) } else { 0 }
        } else {
            0
        };
        let label: String = summary.label.chars().take(CHART_LABEL_CHARS).collect();
        let bar: String = std::iter::repeat_n(BAR, bar_len).collect();

        let _ = writeln!(
            chart,
            "{label:<width$} │{bar} {avg:.2} ms",
            width = CHART_LABEL_CHARS,
            avg = summary.avg_ms,
        );
    }
    chart
}

/// Lines describing the rows that could not be read
pub fn parse_errors(results: &PhaseResults) -> Option<String> {
    if !results.has_errors() {
        return None;
    }

    let mut out = format!(
        "{} row(s) of {} could not be read:\n",
        results.errors.len(),
        results.path.display()
    );
    for error in &results.errors {
        let _ = writeln!(out, "  {}", error);
    }
    Some(out)
}

/// Full `show` output for a phase
pub fn render(results: &PhaseResults, width: usize) -> String {
    let mut out = format!("Results for phase {} ({})\n", results.phase, results.path.display());
    if results.is_empty() {
        out.push_str("The result file has no rows.\n");
        return out;
    }

    let _ = writeln!(out, "{}", results_table(results));
    out.push('\n');
    out.push_str(&bar_chart(results, width));
    if let Some(errors) = parse_errors(results) {
        out.push('\n');
        out.push_str(&errors);
    }
    out
}
