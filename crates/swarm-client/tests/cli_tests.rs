use clap::Parser;
use swarm_client::cli::Cli;
use swarm_common::{ConfigError, ProtocolMode};

#[test]
fn test_positional_servers_only() {
    let cli = Cli::try_parse_from(["swarm-client", "100", "10.0.0.1,10.0.0.2"]).unwrap();
    let cfg = cli.into_config().unwrap();
    assert_eq!(cfg.max_concurrent, 100);
    assert_eq!(cfg.server_addresses, vec!["10.0.0.1", "10.0.0.2"]);
    assert!(cfg.client_addresses.is_empty());
    assert_eq!(cfg.load.new_flows_per_sec, 800);
}

#[test]
fn test_client_addresses_are_parsed() {
    let cli =
        Cli::try_parse_from(["swarm-client", "10", "10.0.0.1", "192.168.1.5,192.168.1.6"]).unwrap();
    let cfg = cli.into_config().unwrap();
    assert_eq!(
        cfg.client_addresses,
        vec![
            "192.168.1.5".parse::<std::net::IpAddr>().unwrap(),
            "192.168.1.6".parse().unwrap()
        ]
    );
}

#[test]
fn test_bad_client_address_rejected() {
    let cli = Cli::try_parse_from(["swarm-client", "10", "10.0.0.1", "not-an-ip"]).unwrap();
    assert!(matches!(cli.into_config(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_flags_override_defaults() {
    let cli = Cli::try_parse_from([
        "swarm-client",
        "10",
        "10.0.0.1",
        "--rate",
        "50",
        "--protocol",
        "http",
        "--requests-per-flow",
        "3",
        "--interval-ms",
        "250",
        "--min-port",
        "30000",
        "--max-port",
        "30010",
    ])
    .unwrap();
    let cfg = cli.into_config().unwrap();
    assert_eq!(cfg.load.new_flows_per_sec, 50);
    assert_eq!(cfg.flow.protocol, ProtocolMode::Http);
    assert_eq!(cfg.flow.requests_per_flow, 3);
    assert_eq!(cfg.flow.request_interval_ms, 250);
    assert_eq!((cfg.load.min_port, cfg.load.max_port), (30000, 30010));
}

#[test]
fn test_wrong_argument_count_is_usage_error() {
    assert!(Cli::try_parse_from(["swarm-client"]).is_err());
    assert!(Cli::try_parse_from(["swarm-client", "10"]).is_err());
    assert!(Cli::try_parse_from(["swarm-client", "10", "a", "127.0.0.1", "extra"]).is_err());
}

#[test]
fn test_non_numeric_ceiling_is_rejected() {
    assert!(Cli::try_parse_from(["swarm-client", "lots", "10.0.0.1"]).is_err());
    let cli = Cli::try_parse_from(["swarm-client", "0", "10.0.0.1"]).unwrap();
    assert!(cli.into_config().is_err());
}
