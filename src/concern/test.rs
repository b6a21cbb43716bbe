use std::time::Duration;

use pretty_assertions::assert_eq;

use crate::{
    bson::{doc, Bson},
    error::ErrorKind,
    options::{Acknowledgment, WriteConcern},
};

#[test]
fn write_concern_is_acknowledged() {
    let w_1 = WriteConcern::builder()
        .w(Acknowledgment::Nodes(1))
        .journal(false)
        .build();
    assert!(w_1.is_acknowledged());

    let w_majority = WriteConcern::builder()
        .w(Acknowledgment::Majority)
        .journal(false)
        .build();
    assert!(w_majority.is_acknowledged());

    let w_0 = WriteConcern::builder()
        .w(Acknowledgment::Nodes(0))
        .journal(false)
        .build();
    assert!(!w_0.is_acknowledged());

    assert!(!WriteConcern::unacknowledged().is_acknowledged());
    assert!(WriteConcern::acknowledged().is_acknowledged());

    let empty = WriteConcern::builder().journal(true).build();
    assert!(empty.is_acknowledged());
}

#[test]
fn write_concern_deserialize() {
    let w_1 = doc! { "w": 1 };
    let wc: WriteConcern = crate::bson::from_bson(Bson::Document(w_1)).unwrap();
    assert_eq!(wc, WriteConcern::nodes(1));

    let w_timeout = doc! { "w": "majority", "wtimeout": 100 };
    let wc: WriteConcern = crate::bson::from_bson(Bson::Document(w_timeout)).unwrap();
    assert_eq!(
        wc,
        WriteConcern::builder()
            .w(Acknowledgment::Majority)
            .w_timeout(Duration::from_millis(100))
            .build()
    );

    let journal = doc! { "w": "tagged", "j": true };
    let wc: WriteConcern = crate::bson::from_bson(Bson::Document(journal)).unwrap();
    assert_eq!(
        wc,
        WriteConcern::builder()
            .w(Acknowledgment::Custom("tagged".to_string()))
            .journal(true)
            .build()
    );
}

#[test]
fn get_last_error_default() {
    let command = WriteConcern::acknowledged().to_get_last_error().unwrap();
    assert_eq!(command, doc! { "getLastError": 1 });
}

#[test]
fn get_last_error_with_durability_options() {
    let wc = WriteConcern::builder()
        .w(Acknowledgment::Majority)
        .w_timeout(Duration::from_millis(2500))
        .journal(true)
        .fsync(false)
        .build();

    let command = wc.to_get_last_error().unwrap();
    assert_eq!(
        command,
        doc! {
            "getLastError": 1,
            "w": "majority",
            "wtimeout": 2500,
            "j": true,
            "fsync": false,
        }
    );
}

#[test]
fn inconsistent_write_concern_rejected() {
    let wc = WriteConcern::builder()
        .w(Acknowledgment::Nodes(0))
        .journal(true)
        .build();
    let error = wc.validate().expect_err("w=0 with j=true should be rejected");
    assert!(matches!(*error.kind, ErrorKind::InvalidArgument { .. }));

    assert!(WriteConcern::unacknowledged().validate().is_ok());
}
