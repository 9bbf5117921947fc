use std::path::Path;

use colored::Colorize;
use kbsync_domain::{RecordParseError, Reporter, RunTally, TransferResult};
use kbsync_services::{
    DatasetExport, ExportError, ExportReport, HealthReport, InstructionReport, MdlExport,
    VerificationReport,
};

/// Prints per-row progress and summaries to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn started(&self, kind: &str, path: &Path) {
        println!("{} {}s from {}", "Importing".green().bold(), kind, path.display().to_string().bold());
    }

    fn dispatched(&self, position: usize, label: &str, result: &TransferResult) {
        println!("{}", dispatch_line(position, label, result));
    }

    fn skipped(&self, error: &RecordParseError) {
        println!("{} {}", "skipped".yellow().bold(), error);
    }

    fn finished(&self, kind: &str, tally: &RunTally) {
        println!();
        println!("{}", summary_line(kind, tally));
    }
}

pub fn dispatch_line(position: usize, label: &str, result: &TransferResult) -> String {
    if result.is_success() {
        format!("{} [{}] {} (id {})", "ok".green().bold(), position, label, result.detail())
    } else {
        format!(
            "{} [{}] {} ({}: {})",
            "failed".red().bold(),
            position,
            label,
            result.outcome(),
            result.detail()
        )
    }
}

pub fn summary_line(kind: &str, tally: &RunTally) -> String {
    let rate = tally
        .success_rate()
        .map_or_else(|| "n/a".to_string(), |rate| format!("{:.1}%", rate * 100.0));
    let head = if tally.is_clean() { "Done".green().bold() } else { "Done".yellow().bold() };
    format!(
        "{} {} {}s: {} succeeded, {} failed, success rate {}",
        head,
        tally.total(),
        kind,
        tally.succeeded(),
        tally.failed(),
        rate
    )
}

fn dataset_line(name: &str, result: &Result<DatasetExport, ExportError>) -> String {
    match result {
        Ok(export) => format!(
            "{} {} {} to {}",
            "wrote".green().bold(),
            export.count,
            name,
            export.path.display()
        ),
        Err(error) => format!("{} {}: {}", "failed".red().bold(), name, error),
    }
}

pub fn print_export(report: &ExportReport) {
    println!("{}", dataset_line("instructions", &report.instructions));
    println!("{}", dataset_line("SQL pairs", &report.sql_pairs));
}

pub fn print_mdl(export: &MdlExport) {
    let summary = &export.summary;
    let unknown = || "Unknown".to_string();
    println!("{} {}", "wrote".green().bold(), export.path.display().to_string().bold());
    println!("  hash:          {}", export.hash);
    println!("  models:        {}", summary.models);
    println!("  relationships: {}", summary.relationships);
    println!("  views:         {}", summary.views);
    println!("  data source:   {}", summary.data_source.clone().unwrap_or_else(unknown));
    println!("  catalog:       {}", summary.catalog.clone().unwrap_or_else(unknown));
    println!("  schema:        {}", summary.schema.clone().unwrap_or_else(unknown));
}

pub fn print_verification(report: &VerificationReport) {
    let probe = |name: &str, count: usize, error: &Option<String>| match error {
        None => println!("  {name}: {count}"),
        Some(error) => println!("  {name}: {} ({})", count, error.red()),
    };

    println!("{}", "Import verification".bold());
    probe("Instructions (Qdrant)", report.qdrant_instructions.count, &report.qdrant_instructions.error);
    probe("SQL pairs (Qdrant)", report.qdrant_sql_pairs.count, &report.qdrant_sql_pairs.error);
    probe("SQL pairs (API)", report.api_sql_pairs.count, &report.api_sql_pairs.error);

    println!("{}", "Collections".bold());
    match &report.collections {
        Ok(collections) => {
            for collection in collections {
                println!("  {}: {} points", collection.name, collection.points);
            }
        }
        Err(error) => println!("  {}", error.red()),
    }

    if report.passed() {
        println!("{}", "Instructions and SQL pairs are loaded".green().bold());
    } else {
        println!("{}", "Some data is missing, check the errors above".yellow().bold());
    }
}

pub fn print_instructions(report: &InstructionReport) {
    println!("{} {} instruction points", "Found".bold(), report.total_points);

    for project in &report.projects {
        println!();
        println!("{} {} ({} points)", "Project".bold(), project.project_id, project.points);
        if !project.defaults.is_empty() {
            println!("  {}", "Default instructions".cyan());
            for (index, default) in project.defaults.iter().enumerate() {
                println!("    {}. {}: {}", index + 1, default.instruction_id, default.instruction);
            }
        }
        if !project.question_groups.is_empty() {
            println!("  {}", "Question instructions".cyan());
            for group in &project.question_groups {
                println!(
                    "    {} ({} questions): {}",
                    group.instruction_id,
                    group.questions.len(),
                    group.instruction
                );
                for (index, question) in group.questions.iter().enumerate() {
                    println!("      {}. {}", index + 1, question);
                }
            }
        }
    }

    let stats = &report.stats;
    println!();
    println!("{}", "Statistics".bold());
    println!("  default points:         {}", stats.default_points);
    println!("  question points:        {}", stats.question_points);
    println!("  unique instruction ids: {}", stats.unique_instruction_ids);
    println!("  projects:               {}", stats.projects);

    if !report.expected.is_empty() {
        println!();
        println!("{}", "Expected instructions".bold());
        for expected in &report.expected {
            if expected.found() {
                println!("  {} {} ({} points)", "found".green(), expected.instruction_id, expected.points);
            } else {
                println!("  {} {}", "missing".red(), expected.instruction_id);
            }
        }
    }
}

pub fn print_health(report: &HealthReport) {
    match &report.status {
        Ok(status) => println!("{} {} answered {}", "ok".green().bold(), report.url, status),
        Err(error) => println!("{} {} is unreachable: {}", "failed".red().bold(), report.url, error),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_dispatch_lines() {
        plain();
        assert_eq!(dispatch_line(1, "How many?", &TransferResult::success("12")), "ok [1] How many? (id 12)");
        assert_eq!(
            dispatch_line(2, "Top five", &TransferResult::http_error(500, "boom")),
            "failed [2] Top five (http_error: HTTP Error: 500 - boom)"
        );
    }

    #[test]
    fn test_summary_line() {
        plain();
        let mut tally = RunTally::new();
        tally.record(&TransferResult::success("1"));
        tally.record(&TransferResult::success("2"));
        tally.record_skipped();

        assert_eq!(
            summary_line("SQL pair", &tally),
            "Done 3 SQL pairs: 2 succeeded, 1 failed, success rate 66.7%"
        );
        assert_eq!(
            summary_line("instruction", &RunTally::new()),
            "Done 0 instructions: 0 succeeded, 0 failed, success rate n/a"
        );
    }
}
