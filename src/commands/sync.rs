use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;

use super::load_syncer;
use crate::render::{PlanPreview, Render};
use crate::utils::tui::create_spinner;

pub async fn run(config: Option<&Path>, file: Option<&Path>, dry_run: bool) -> Result<()> {
    let syncer = load_syncer(config, file)?;

    let spinner = create_spinner(syncer.remote().render());
    let result = syncer.plan_with_index().await;
    spinner.finish_and_clear();

    println!("{}", syncer.remote().render());
    let (existing, plan) = result?;
    println!(
        "{}",
        PlanPreview {
            plan: &plan,
            existing: &existing,
        }
        .render()
    );

    if plan.is_empty() {
        return Ok(());
    }

    if dry_run {
        println!("\n{}", "Dry run, nothing applied".dimmed());
        return Ok(());
    }

    let spinner = create_spinner("Applying".to_string());
    let result = syncer.apply(&plan).await;
    spinner.finish_and_clear();

    match result {
        Ok(stats) => {
            println!("\n{}", stats.render());
            Ok(())
        }
        Err(e) => {
            println!(
                "\n   {}",
                "The calendar may be partially updated. Run `confsync sync` again to finish."
                    .dimmed()
            );
            Err(e.into())
        }
    }
}
