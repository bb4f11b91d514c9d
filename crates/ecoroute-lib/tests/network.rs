mod common;

use ecoroute_lib::{DrivingTime, Error, Metric, SegmentKey};

use common::fixture_network;

#[test]
fn fixture_loads_every_record() {
    let network = fixture_network();
    assert_eq!(network.location_count(), 8);
    assert_eq!(network.arc_count(), 20);

    let parking: Vec<_> = network
        .locations()
        .filter(|location| location.has_parking)
        .map(|location| location.name.as_str())
        .collect();
    assert_eq!(parking, vec!["Bolhao", "Ribeira", "Foz"]);
}

#[test]
fn segment_lookup_is_symmetric() {
    let network = fixture_network();
    let forward = network.find_segment("Campanha", "Bolhao").expect("forward");
    let backward = network.find_segment("Bolhao", "Campanha").expect("backward");

    assert_eq!(forward.key(), SegmentKey::new(1, 2));
    assert_eq!(backward.key(), SegmentKey::new(2, 1));
    assert_eq!(forward.driving, backward.driving);
    assert_eq!(forward.walking, backward.walking);
}

#[test]
fn impassable_marker_survives_loading() {
    let network = fixture_network();
    let closed = network.find_segment("Paranhos", "Bolhao").expect("road exists");
    assert_eq!(closed.driving, DrivingTime::Impassable);
    assert_eq!(closed.weight(Metric::Driving), None);
    assert_eq!(closed.weight(Metric::Walking), Some(9));
}

#[test]
fn lookup_by_code_and_name_agree() {
    let network = fixture_network();
    let by_code = network.location_by_code("RI").expect("code");
    let by_name = network.location_by_name("Ribeira").expect("name");
    assert_eq!(by_code, by_name);
    assert_eq!(network.location(4), Some(by_name));
}

#[test]
fn unknown_reference_suggests_close_names() {
    let network = fixture_network();
    let err = network.resolve("Ribiera").expect_err("typo");
    let message = err.to_string();
    assert!(matches!(err, Error::UnknownLocation { .. }));
    assert!(message.contains("Did you mean"), "{message}");
    assert!(message.contains("Ribeira"), "{message}");
}

#[test]
fn removing_a_location_keeps_indices_consistent() {
    let mut network = fixture_network();
    network.remove_location(2).expect("Bolhao exists");

    assert!(network.location_by_name("Bolhao").is_none());
    assert!(network.location_by_code("BO").is_none());
    assert!(network.find_segment("Campanha", "Bolhao").is_none());
    assert!(network.segments().all(|s| s.origin != 2 && s.destination != 2));
    assert_eq!(network.arc_count(), 14);

    network
        .add_location(2, "BO", "Bolhao", true)
        .expect("id is free again");
    network
        .add_segment("Bolhao", "Aliados", 4, 10)
        .expect("road is free again");
}
