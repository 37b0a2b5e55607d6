use std::{collections::HashSet, net::Ipv4Addr, sync::Arc};

use ovnet::{Driver, InterfaceList, MacAddr, NetError};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn driver_with(nid: &str, cidr: &str) -> Driver {
    let driver = Driver::new();
    driver.create_network(nid, cidr.parse().unwrap()).unwrap();
    driver
}

/// N concurrent creates on one network end up with N distinct addresses
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_create_endpoint() {
    const N: usize = 200;

    let driver = Arc::new(driver_with("net1", "10.0.0.0/16"));

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let driver = Arc::clone(&driver);
            tokio::task::spawn_blocking(move || {
                let mut info = InterfaceList::new();
                driver
                    .create_endpoint("net1", &format!("ep{i}"), Some(&mut info))
                    .unwrap();
                info.interfaces[0].address
            })
        })
        .collect();

    let mut reported = HashSet::new();
    for handle in handles {
        assert!(reported.insert(handle.await.unwrap()));
    }

    let endpoints = driver.endpoints("net1").unwrap();
    assert_eq!(endpoints.len(), N);

    let stored: HashSet<_> = endpoints.iter().map(|ep| ep.address).collect();
    assert_eq!(stored, reported);
    assert_eq!(driver.network("net1").unwrap().pool().in_use(), N);
}

/// Concurrent creates and deletes never hand one address to two live endpoints
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_create_delete_churn() {
    let driver = Arc::new(driver_with("net1", "10.0.0.0/24"));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let driver = Arc::clone(&driver);
            tokio::task::spawn_blocking(move || {
                for round in 0..50 {
                    let eid = format!("w{worker}-r{round}");
                    driver.create_endpoint("net1", &eid, None).unwrap();
                    if round % 2 == 0 {
                        driver.delete_endpoint("net1", &eid).unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    let endpoints = driver.endpoints("net1").unwrap();
    assert_eq!(endpoints.len(), 8 * 25);

    let addrs: HashSet<_> = endpoints.iter().map(|ep| ep.address.addr()).collect();
    assert_eq!(addrs.len(), endpoints.len());
    assert_eq!(driver.network("net1").unwrap().pool().in_use(), endpoints.len());
}

#[test]
fn test_allocate_decode_round_trip() {
    let driver = driver_with("net1", "172.21.0.0/16");
    let network = driver.network("net1").unwrap();

    for i in 0..300 {
        driver.create_endpoint("net1", &format!("ep{i}"), None).unwrap();
    }

    for ep in driver.endpoints("net1").unwrap() {
        let offset = network.subnet().offset_of(ep.address.addr());
        assert!(network.pool().is_allocated(offset));
        assert_eq!(network.subnet().address_at(offset), ep.address);
    }

    for i in 0..300 {
        driver.delete_endpoint("net1", &format!("ep{i}")).unwrap();
    }
    assert_eq!(network.pool().in_use(), 0);
    assert!(network.is_empty());
}

#[test]
fn test_scenario_offset_reuse() {
    let driver = driver_with("net1", "10.0.0.0/24");

    driver.create_endpoint("net1", "ep1", None).unwrap();
    driver.create_endpoint("net1", "ep2", None).unwrap();
    driver.delete_endpoint("net1", "ep1").unwrap();
    driver.create_endpoint("net1", "ep3", None).unwrap();

    let addr = |eid: &str| driver.endpoint("net1", eid).unwrap().address.addr();
    assert_eq!(addr("ep2"), Ipv4Addr::new(10, 0, 0, 2));
    assert_eq!(addr("ep3"), Ipv4Addr::new(10, 0, 0, 1));
    assert!(matches!(
        driver.endpoint("net1", "ep1"),
        Err(NetError::EndpointNotFound { .. })
    ));
}

#[test]
fn test_pre_assigned_is_stored_verbatim() {
    let driver = driver_with("net1", "10.0.0.0/24");
    let mac: MacAddr = "02:42:ac:11:00:02".parse().unwrap();

    let mut info = InterfaceList::with_interface("10.0.0.77/24".parse().unwrap(), mac);
    driver
        .create_endpoint("net1", "ep1", Some(&mut info))
        .unwrap();

    let ep = driver.endpoint("net1", "ep1").unwrap();
    assert_eq!(ep.mac, mac);
    assert_eq!(ep.address.to_string(), "10.0.0.77/24");
    assert_eq!(info.interfaces.len(), 1);

    // A delete leaves the pool untouched too.
    driver.delete_endpoint("net1", "ep1").unwrap();
    assert_eq!(driver.network("net1").unwrap().pool().in_use(), 0);
}

#[rstest]
#[case("10.0.0.0/30", 2)]
#[case("10.0.0.0/29", 6)]
#[case("10.0.0.0/31", 0)]
fn test_pool_exhaustion(#[case] cidr: &str, #[case] capacity: usize) {
    let driver = driver_with("net1", cidr);

    for i in 0..capacity {
        driver.create_endpoint("net1", &format!("ep{i}"), None).unwrap();
    }

    assert!(matches!(
        driver.create_endpoint("net1", "one-too-many", None),
        Err(NetError::AllocationExhausted { .. })
    ));
    assert_eq!(driver.endpoints("net1").unwrap().len(), capacity);
}

#[test]
fn test_independent_drivers() {
    let a = driver_with("net1", "10.0.0.0/24");
    let b = driver_with("net1", "10.0.0.0/24");

    a.create_endpoint("net1", "ep1", None).unwrap();
    b.create_endpoint("net1", "ep1", None).unwrap();

    assert_eq!(
        a.endpoint("net1", "ep1").unwrap().address,
        b.endpoint("net1", "ep1").unwrap().address
    );
}
