use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use linkage_batch::{BatchSummary, JobStatus};
use linkage_match::{FallbackSearch, MatchOutcome};
use linkage_model::{ConfidenceBand, DuplicateGroup, MatchCandidateResult};

pub fn print_search(search: &FallbackSearch) {
    println!("Algorithm: {:?}", search.primary_algorithm);
    print_outcome(&search.primary);
    if let Some(fallback) = &search.fallback {
        println!();
        println!("Deterministic fallback:");
        print_outcome(fallback);
    }
}

fn print_outcome(outcome: &MatchOutcome) {
    match outcome {
        MatchOutcome::EmptyPool => {
            println!("Candidate pool is empty; nothing to compare against.");
        }
        MatchOutcome::NoneAboveThreshold {
            evaluated,
            best_score,
        } => {
            let best = best_score.map_or_else(|| "-".to_string(), |score| format!("{score:.1}"));
            println!("No candidates above threshold ({evaluated} evaluated, best {best}).");
        }
        MatchOutcome::Ranked(candidates) => println!("{}", candidate_table(candidates)),
    }
}

fn candidate_table(candidates: &[MatchCandidateResult]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Candidate"),
        header_cell("Score"),
        header_cell("Band"),
        header_cell("Matched on"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for (rank, candidate) in candidates.iter().enumerate() {
        let fields: Vec<&str> = candidate.matched_on.iter().map(|field| field.key()).collect();
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&candidate.candidate_record_id),
            Cell::new(format!("{:.1}", candidate.score)).add_attribute(Attribute::Bold),
            band_cell(candidate.band),
            Cell::new(fields.join(", ")),
        ]);
    }
    table
}

pub fn print_batch_summary(summary: &BatchSummary) {
    println!("Job: {} ({})", summary.job_id, summary.status);
    if let Some(reason) = &summary.failure {
        eprintln!("Job failed: {reason}");
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let average = summary
        .average_confidence
        .map_or_else(|| "-".to_string(), |score| format!("{score:.1}"));
    let rows = [
        ("Processed", format!("{} / {}", summary.processed_records, summary.total_records)),
        ("Auto-matched", summary.auto_matched.to_string()),
        ("Manual review", summary.manual_review.to_string()),
        ("No match", summary.no_match.to_string()),
        ("Errors", summary.errors.to_string()),
        ("Average confidence", average),
        ("High (>= 80)", summary.distribution.high.to_string()),
        ("Medium (60-79)", summary.distribution.medium.to_string()),
        ("Low (< 60)", summary.distribution.low.to_string()),
        ("Records / second", format!("{:.1}", summary.records_per_second)),
    ];
    for (label, value) in rows {
        let value_cell = match label {
            "Errors" if summary.errors > 0 => Cell::new(value).fg(Color::Red),
            _ => Cell::new(value),
        };
        table.add_row(vec![Cell::new(label), value_cell]);
    }
    println!("{table}");
    if !summary.needs_review.is_empty() {
        println!("Needs review: {}", summary.needs_review.join(", "));
    }
    if summary.status == JobStatus::Cancelled {
        println!("Job was cancelled; results above cover the processed records only.");
    }
}

pub fn print_duplicate_groups(groups: &[DuplicateGroup]) {
    if groups.is_empty() {
        println!("No likely duplicates found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("Records"),
        header_cell("Max score"),
        header_cell("Matching fields"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for group in groups {
        let fields: Vec<&str> = group.matching_fields.iter().map(|field| field.key()).collect();
        table.add_row(vec![
            Cell::new(&group.id).fg(Color::Blue).add_attribute(Attribute::Bold),
            Cell::new(group.record_ids().join(", ")),
            Cell::new(format!("{:.1}", group.similarity_score)),
            Cell::new(fields.join(", ")),
        ]);
    }
    println!("{table}");
}

fn band_cell(band: ConfidenceBand) -> Cell {
    let cell = Cell::new(band.as_str());
    match band {
        ConfidenceBand::High => cell.fg(Color::Green).add_attribute(Attribute::Bold),
        ConfidenceBand::Medium => cell.fg(Color::Yellow),
        ConfidenceBand::Low => cell.fg(Color::DarkYellow),
        ConfidenceBand::None => cell.fg(Color::DarkGrey),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
