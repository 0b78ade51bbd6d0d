use anyhow::Context;

use leasecheck_common::config::EngineConfig;

use crate::commands::CatalogArgs;
use crate::terminal::{format, print};

pub fn list(args: &CatalogArgs, cfg: &EngineConfig) -> anyhow::Result<()> {
    let catalog = args.load(cfg).context("loading scenario catalog")?;
    for (idx, scenario) in catalog.scenarios().iter().enumerate() {
        print::tree_head(idx, &scenario.name);
        print::as_tree_one_level(format::model_to_details(&scenario.model));
    }
    Ok(())
}
