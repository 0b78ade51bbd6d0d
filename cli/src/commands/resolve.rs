use leasecheck_common::config::EngineConfig;
use leasecheck_core::observer::StateObserver;
use leasecheck_core::system::Capabilities;

use crate::terminal::print;

pub async fn resolve(hostname: &str, cfg: &EngineConfig) -> anyhow::Result<()> {
    let capabilities = Capabilities::host(cfg);
    let observer = StateObserver::new(capabilities.introspection, capabilities.resolver);
    let address = observer.resolve_hostname(hostname).await?;
    print::aligned_line(hostname, address.to_string());
    Ok(())
}
