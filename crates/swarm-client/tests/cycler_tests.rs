use std::net::IpAddr;

use swarm_client::engine::cycler::EndpointCycler;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn servers(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_two_clients_sweep_ports_before_rotating() {
    let a = ip("10.1.0.1");
    let b = ip("10.1.0.2");
    let mut cycler = EndpointCycler::new(servers(&["S1", "S2"]), vec![a, b], 20000, 20002);

    let produced: Vec<_> = (0..6)
        .map(|_| {
            let adv = cycler.next();
            assert_eq!(adv.target.endpoint.ip, "S1");
            (adv.target.local, adv.target.endpoint.port)
        })
        .collect();

    assert_eq!(
        produced,
        vec![
            (Some(a), 20000),
            (Some(a), 20001),
            (Some(a), 20002),
            (Some(b), 20000),
            (Some(b), 20001),
            (Some(b), 20002),
        ]
    );

    // Seventh call wraps the clients back to A and moves to the next server.
    let adv = cycler.next();
    assert!(adv.client_rotated);
    assert!(adv.server_rotated);
    assert_eq!(adv.target.local, Some(a));
    assert_eq!(adv.target.endpoint.ip, "S2");
    assert_eq!(adv.target.endpoint.port, 20000);
}

#[test]
fn test_rotation_flags_only_on_wrap() {
    let mut cycler =
        EndpointCycler::new(servers(&["S1"]), vec![ip("10.1.0.1"), ip("10.1.0.2")], 100, 101);

    let flags: Vec<_> = (0..5)
        .map(|_| {
            let adv = cycler.next();
            (adv.client_rotated, adv.server_rotated)
        })
        .collect();

    assert_eq!(
        flags,
        vec![
            (false, false),
            (false, false),
            (true, false),
            (false, false),
            (true, true),
        ]
    );
}

#[test]
fn test_server_index_changes_every_m_times_p_calls() {
    let n = 3;
    let m = 2;
    let p = 4u16;
    let server_list = servers(&["S0", "S1", "S2"]);
    let clients = vec![ip("10.1.0.1"), ip("10.1.0.2")];
    let mut cycler = EndpointCycler::new(server_list.clone(), clients.clone(), 1000, 1000 + p - 1);

    let total = n * m * usize::from(p) * 2;
    for call in 0..total {
        let adv = cycler.next();
        let sweep = call / usize::from(p);
        let expected_port = 1000 + (call % usize::from(p)) as u16;
        assert_eq!(adv.target.endpoint.port, expected_port, "call {}", call);
        assert_eq!(adv.target.local, Some(clients[sweep % m]), "call {}", call);
        assert_eq!(
            adv.target.endpoint.ip,
            server_list[(sweep / m) % n],
            "call {}",
            call
        );
    }
}

#[test]
fn test_no_clients_rotates_server_every_sweep() {
    let mut cycler = EndpointCycler::new(servers(&["S0", "S1"]), Vec::new(), 20000, 20001);

    let produced: Vec<_> = (0..6)
        .map(|_| {
            let adv = cycler.next();
            assert_eq!(adv.target.local, None);
            assert!(!adv.client_rotated);
            (adv.target.endpoint.ip, adv.target.endpoint.port)
        })
        .collect();

    assert_eq!(
        produced,
        vec![
            ("S0".to_string(), 20000),
            ("S0".to_string(), 20001),
            ("S1".to_string(), 20000),
            ("S1".to_string(), 20001),
            ("S0".to_string(), 20000),
            ("S0".to_string(), 20001),
        ]
    );
}

#[test]
fn test_single_port_range_at_top_of_u16() {
    let mut cycler = EndpointCycler::new(servers(&["S0"]), Vec::new(), u16::MAX, u16::MAX);
    for _ in 0..3 {
        assert_eq!(cycler.next().target.endpoint.port, u16::MAX);
    }
}

#[test]
fn test_client_address_tracks_rotation() {
    let a = ip("10.1.0.1");
    let b = ip("10.1.0.2");
    let mut cycler = EndpointCycler::new(servers(&["S0"]), vec![a, b], 1, 1);
    assert_eq!(cycler.client_address(), Some(a));
    cycler.next();
    assert_eq!(cycler.client_address(), Some(a));
    cycler.next();
    assert_eq!(cycler.client_address(), Some(b));
    assert_eq!(cycler.server_address(), "S0");
}
