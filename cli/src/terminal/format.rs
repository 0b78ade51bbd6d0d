use std::fmt::Display;
use std::net::IpAddr;

use colored::*;

use leasecheck_common::expectation::{ExpectationModel, MatchMode};
use leasecheck_common::network::state::ObservedNetworkState;
use leasecheck_common::report::ScenarioResult;

use crate::terminal::{colors, print};

type Detail = (String, ColoredString);

fn ip_color(ip: &IpAddr) -> Color {
    match ip {
        IpAddr::V4(_) => colors::IPV4_ADDR,
        IpAddr::V6(_) => colors::IPV6_ADDR,
    }
}

fn joined<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    let items: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
    if items.is_empty() {
        String::from("none")
    } else {
        items.join(", ")
    }
}

pub fn state_to_details(state: &ObservedNetworkState) -> Vec<Detail> {
    let address: String = format!("{}/{}", state.address, state.netmask);
    let mut details: Vec<Detail> = vec![
        ("IPv4".to_string(), address.color(colors::IPV4_ADDR)),
        ("Gateway".to_string(), joined(&state.gateways).color(colors::IPV4_ADDR)),
    ];
    let resolver_color = state.resolvers.first().map(ip_color).unwrap_or(colors::IPV4_ADDR);
    details.push(("DNS".to_string(), joined(&state.resolvers).color(resolver_color)));
    details
}

pub fn model_to_details(model: &ExpectationModel) -> Vec<Detail> {
    let interface = model.interface();
    let mut details: Vec<Detail> = vec![
        ("Iface".to_string(), interface.name.normal()),
        ("MAC".to_string(), interface.mac.to_string().color(colors::MAC_ADDR)),
        ("IPv4".to_string(), model.address().to_string().color(colors::IPV4_ADDR)),
        ("Netmask".to_string(), model.netmask().to_string().color(colors::IPV4_ADDR)),
    ];
    if !model.gateways().is_empty() {
        details.push(("Gateway".to_string(), joined(model.gateways()).normal()));
    }
    if !model.resolvers().is_empty() {
        details.push(("DNS".to_string(), joined(model.resolvers()).normal()));
    }
    for hostname in model.hostnames() {
        let expected = match hostname.match_mode {
            MatchMode::Exact => hostname.expected.clone(),
            MatchMode::Prefix => format!("{}*", hostname.expected),
        };
        details.push((
            "Host".to_string(),
            format!("{} -> {}", hostname.hostname, expected).normal(),
        ));
    }
    if model.reset_default_route() {
        details.push(("Route".to_string(), "reset before lease".yellow()));
    }
    details
}

pub fn print_result(idx: usize, result: &ScenarioResult) {
    let status: ColoredString = if result.passed() {
        "PASS".color(colors::PASS).bold()
    } else {
        "FAIL".color(colors::FAIL).bold()
    };
    let elapsed: ColoredString = format!("{:.2}s", result.elapsed().as_secs_f64()).bright_black();
    print::tree_head(idx, &format!("{} {} {}", result.name(), status, elapsed));

    let mut details: Vec<Detail> = result.observed().map(state_to_details).unwrap_or_default();
    details.extend(
        result
            .diagnostics()
            .into_iter()
            .map(|diagnostic| ("Failure".to_string(), diagnostic.color(colors::FAIL))),
    );
    print::as_tree_one_level(details);
}
