use anyhow::Context;

use leasecheck_common::config::EngineConfig;
use leasecheck_core::observer::StateObserver;
use leasecheck_core::system::Capabilities;

use crate::terminal::{format, print};

pub async fn observe(interface: &str, cfg: &EngineConfig) -> anyhow::Result<()> {
    let capabilities = Capabilities::host(cfg);
    let observer = StateObserver::new(capabilities.introspection, capabilities.resolver);
    let state = observer
        .observe(interface)
        .await
        .with_context(|| format!("observing {interface}"))?;

    print::tree_head(0, &state.interface);
    print::as_tree_one_level(format::state_to_details(&state));
    Ok(())
}
