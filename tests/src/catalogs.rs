#![cfg(test)]

use std::io::Write;
use std::net::Ipv4Addr;

use leasecheck_core::catalog::Catalog;

use crate::fakes::{fast_config, runner, Allocation, FakeHost};

#[tokio::test]
async fn basic_catalog_passes_against_matching_server() -> anyhow::Result<()> {
    let cfg = fast_config(3);
    let catalog = Catalog::builtin("basic", &cfg)?;
    let embedded_gw = Ipv4Addr::new(10, 2, 0, 1);
    let host = FakeHost::new();
    host.bind("00:00:77:44:bb:bb", Allocation::new(Ipv4Addr::new(10, 2, 4, 200), 16, embedded_gw))
        .bind("00:00:77:44:aa:99", Allocation::new(Ipv4Addr::new(10, 2, 0, 13), 16, embedded_gw))
        .bind(
            "00:00:44:77:00:bb",
            Allocation::new(Ipv4Addr::new(10, 3, 0, 50), 16, Ipv4Addr::new(10, 3, 0, 1)),
        );

    let summary = runner(&host, &cfg).run(catalog.scenarios()).await;

    let names: Vec<_> = summary.results().iter().map(|r| r.name()).collect();
    assert_eq!(names, ["e1", "e2", "v1"]);
    for result in summary.results() {
        assert!(result.passed(), "{}: {:?}", result.name(), result.diagnostics());
    }
    Ok(())
}

#[tokio::test]
async fn little_catalog_passes_against_matching_server() -> anyhow::Result<()> {
    let cfg = fast_config(3);
    let catalog = Catalog::builtin("little", &cfg)?;
    let gateway = Ipv4Addr::new(10, 0, 0, 1);
    let host = FakeHost::new();
    host.bind("00:00:11:11:00:01", Allocation::new(Ipv4Addr::new(10, 0, 0, 10), 24, gateway))
        .bind("00:00:33:33:00:01", Allocation::new(Ipv4Addr::new(10, 0, 0, 12), 24, gateway))
        .add_host("whiskey.mini.net", Ipv4Addr::new(10, 0, 0, 10))
        .add_default_route(Ipv4Addr::new(192, 168, 1, 1));

    let summary = runner(&host, &cfg).run(catalog.scenarios()).await;

    assert!(summary.all_passed(), "{:?}", summary.results());
    assert_eq!(summary.passed(), 2);
    Ok(())
}

#[tokio::test]
async fn misconfigured_server_fails_only_affected_scenarios() -> anyhow::Result<()> {
    let cfg = fast_config(2);
    let catalog = Catalog::builtin("little", &cfg)?;
    let gateway = Ipv4Addr::new(10, 0, 0, 1);
    let host = FakeHost::new();
    // c0 lands on the wrong static binding
    host.bind("00:00:11:11:00:01", Allocation::new(Ipv4Addr::new(10, 0, 0, 11), 24, gateway))
        .bind("00:00:33:33:00:01", Allocation::new(Ipv4Addr::new(10, 0, 0, 12), 24, gateway))
        .add_host("whiskey.mini.net", Ipv4Addr::new(10, 0, 0, 10));

    let summary = runner(&host, &cfg).run(catalog.scenarios()).await;

    assert!(!summary.results()[0].passed());
    assert!(summary.results()[1].passed(), "{:?}", summary.results()[1].diagnostics());
    assert_eq!(summary.failed(), 1);
    Ok(())
}

#[tokio::test]
async fn catalog_file_settings_drive_the_run() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        r#"
[settings]
interface = "eth7"
attempts = 2
backoff_ms = 1

[[network]]
name = "lab"
subnet4 = "172.16.0.0/24"
gateways = ["172.16.0.1"]
nameservers = ["172.16.0.1"]

[[scenario]]
name = "lab1"
network = "lab"
mac = "02:00:00:00:00:01"
address_prefix = "172.16.0."
"#
    )?;

    let mut cfg = fast_config(5);
    let catalog = Catalog::load(file.path(), &cfg)?;
    cfg.apply(catalog.settings());
    cfg.validate()?;
    assert_eq!(cfg.retry.attempts, 2);

    let scenario = &catalog.scenarios()[0];
    assert_eq!(scenario.model.interface().name, "eth7");

    let host = FakeHost::new();
    host.bind(
        "02:00:00:00:00:01",
        Allocation::new(Ipv4Addr::new(172, 16, 0, 77), 24, Ipv4Addr::new(172, 16, 0, 1)),
    )
    .set_convergence_lag(5);

    let summary = runner(&host, &cfg).run(catalog.scenarios()).await;

    assert_eq!(
        summary.results()[0].diagnostics(),
        vec!["interface state unavailable after 2 attempts".to_string()]
    );
    assert!(host.log().contains(&"request eth7".to_string()));
    Ok(())
}
