use anyhow::Context;
use colored::Colorize;
use nbdiff_sdk::{sink_for, BrowserViewer, GitCli, NbDiff, RunOutcome, RunReport};
use tracing::debug;

use crate::cli::Cli;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let source = GitCli::discover().context("not inside a git repository")?;
    debug!(root = %source.root().display(), from = %cli.rev_a, to = %cli.rev_b, "starting diff");
    let driver = NbDiff::new(source, cli.config());
    let mut sink = sink_for(driver.config());
    let report = driver.run(&cli.rev_a, &cli.rev_b, sink.as_mut(), &mut BrowserViewer)?;
    print_report(&report, driver.config().open_viewer);
    Ok(())
}

fn print_report(report: &RunReport, opening: bool) {
    for failure in &report.failures {
        eprintln!(
            "{} {}: {}",
            "skipped".yellow().bold(),
            failure.path.bold(),
            failure.error
        );
    }
    match &report.outcome {
        RunOutcome::NothingToDo => println!("No notebook diffs found."),
        RunOutcome::Unchanged => {
            println!("Only unchanged cells and outputs across changed notebooks.")
        }
        RunOutcome::Written { pages } => {
            let dir = pages
                .first()
                .and_then(|p| p.parent())
                .map(|d| d.display().to_string())
                .unwrap_or_default();
            let verb = if opening { "Opening" } else { "Wrote" };
            println!(
                "{} {verb} {} diff page(s) in {}",
                "✓".green().bold(),
                pages.len(),
                dir.cyan()
            );
        }
    }
}
