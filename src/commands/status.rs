use std::path::Path;

use anyhow::Result;

use super::load_syncer;
use crate::render::{PlanPreview, Render};
use crate::utils::tui::create_spinner;

pub async fn run(config: Option<&Path>, file: Option<&Path>) -> Result<()> {
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

    Ok(())
}
