//! End-to-end pipeline tests: CDC feed through classification, validation,
//! gated reconciliation, versioned appends and command publication.

mod support;

use geo_types::{LineString, Point};
use routenet_cdc::{
    CdcConsumer, EditKind, EditProcessor, ProcessorPorts, RouteNetworkEditOperation,
};
use routenet_core::{Mrid, ReconciliationConfig, RouteNetworkChange, ROUTE_NETWORK_TOPIC};
use routenet_eventstore::{EventStore, MemoryEventStore, StreamId};
use routenet_geometry::wkb;
use routenet_topology::MemoryGeoDatabase;
use std::sync::Arc;
use std::time::Duration;
use support::{NoEquipment, NoWorkTasks, RecordingAck, RecordingNotifier, RecordingPublisher};
use tokio::sync::mpsc;
use uuid::Uuid;

struct Rig {
    processor: Arc<EditProcessor>,
    geo_db: Arc<MemoryGeoDatabase>,
    event_store: Arc<MemoryEventStore>,
    publisher: Arc<RecordingPublisher>,
    notifier: Arc<RecordingNotifier>,
}

fn rig(config: ReconciliationConfig) -> Rig {
    support::init_tracing();
    let geo_db = Arc::new(MemoryGeoDatabase::new());
    let event_store = Arc::new(MemoryEventStore::new());
    let publisher = Arc::new(RecordingPublisher::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let processor = Arc::new(
        EditProcessor::new(
            config,
            ProcessorPorts {
                geo_db: geo_db.clone(),
                event_store: event_store.clone(),
                shadow: Arc::new(routenet_cdc::MemoryShadowTable::new()),
                equipment: Arc::new(NoEquipment),
                work_tasks: Arc::new(NoWorkTasks),
                publisher: publisher.clone(),
                notifier: notifier.clone(),
            },
        )
        .unwrap(),
    );
    Rig {
        processor,
        geo_db,
        event_store,
        publisher,
        notifier,
    }
}

fn insert(seq_no: i64, mrid: Mrid, coord: bytes::Bytes) -> RouteNetworkEditOperation {
    RouteNetworkEditOperation {
        seq_no,
        event_id: Uuid::new_v4(),
        before: None,
        before_coord: None,
        after: Some(format!(
            "{{\"mrid\":\"{mrid}\",\"username\":\"operator\",\"application_name\":\"GeoEditor\"}}"
        )),
        after_coord: Some(coord),
        kind: EditKind::Insert,
    }
}

#[tokio::test]
async fn segment_then_interior_node_splits_through_the_whole_pipeline() {
    let r = rig(
        ReconciliationConfig::builder()
            .tolerance(0.1)
            .build()
            .unwrap(),
    );
    let ack = Arc::new(RecordingAck::default());
    let consumer = CdcConsumer::new(r.processor.clone(), ack.clone(), 1);

    let seg_mrid = Mrid::new();
    let node_mrid = Mrid::new();
    let (tx, rx) = mpsc::channel(8);
    tx.send(insert(
        1,
        seg_mrid,
        wkb::encode_line(&LineString::from(vec![(0.0, 0.0), (10.0, 10.0)])),
    ))
    .await
    .unwrap();
    tx.send(insert(2, node_mrid, wkb::encode_point(&Point::new(5.0, 5.0))))
        .await
        .unwrap();
    drop(tx);

    consumer.run(rx).await;

    assert_eq!(*ack.acked.lock(), vec![1, 2]);
    assert!(r.geo_db.segment_is_deleted(seg_mrid));
    assert_eq!(r.geo_db.live_segment_count(), 2);
    assert_eq!(r.geo_db.live_node_count(), 3);

    // the node's stream carries the add and the split
    let stream = StreamId::for_entity(node_mrid);
    let events = r.event_store.read_stream(&stream).await.unwrap();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[0].event.change,
        RouteNetworkChange::NodeAdded { node_id } if node_id == node_mrid
    ));
    assert!(matches!(
        events[1].event.change,
        RouteNetworkChange::SegmentSplit { retired_segment_id, .. }
            if retired_segment_id == seg_mrid
    ));

    // every publication went to the route network topic
    let published = r.publisher.published.lock();
    assert!(published.iter().all(|(topic, _)| topic == ROUTE_NETWORK_TOPIC));
    // second edit published the node plus two replacement segments
    assert_eq!(published[1].1.len(), 3);
}

#[tokio::test]
async fn racing_interior_nodes_are_linearized_by_the_gate() {
    let r = rig(
        ReconciliationConfig::builder()
            .tolerance(0.1)
            .gate_permits(1)
            .build()
            .unwrap(),
    );

    // seed one segment with its endpoint nodes
    r.processor
        .process(&insert(
            1,
            Mrid::new(),
            wkb::encode_line(&LineString::from(vec![(0.0, 0.0), (10.0, 10.0)])),
        ))
        .await
        .unwrap();

    // two nodes land on the segment concurrently; without admission
    // ordering both reconciliations would plan against the same original
    // segment and double-split it
    let a = {
        let processor = r.processor.clone();
        tokio::spawn(async move {
            processor
                .process(&insert(
                    2,
                    Mrid::new(),
                    wkb::encode_point(&Point::new(3.0, 3.0)),
                ))
                .await
        })
    };
    let b = {
        let processor = r.processor.clone();
        tokio::spawn(async move {
            processor
                .process(&insert(
                    3,
                    Mrid::new(),
                    wkb::encode_point(&Point::new(7.0, 7.0)),
                ))
                .await
        })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    // a consistent chain: (0,0)-(3,3)-(7,7)-(10,10) in some order of
    // splitting, never a duplicated split of the original
    assert_eq!(r.geo_db.live_segment_count(), 3);
    assert_eq!(r.geo_db.live_node_count(), 4);
}

#[tokio::test]
async fn duplicate_node_edit_reuses_the_existing_node() {
    let r = rig(
        ReconciliationConfig::builder()
            .tolerance(0.1)
            .build()
            .unwrap(),
    );

    r.processor
        .process(&insert(
            1,
            Mrid::new(),
            wkb::encode_point(&Point::new(5.0, 5.0)),
        ))
        .await
        .unwrap();

    // a second operator drops a node within tolerance of the first
    r.processor
        .process(&insert(
            2,
            Mrid::new(),
            wkb::encode_point(&Point::new(5.05, 5.0)),
        ))
        .await
        .unwrap();

    assert_eq!(r.geo_db.live_node_count(), 1);
}

#[tokio::test]
async fn area_notifications_follow_the_config_flag() {
    let r = rig(
        ReconciliationConfig::builder()
            .tolerance(0.1)
            .send_area_updated_notification(true)
            .build()
            .unwrap(),
    );

    let mrid = Mrid::new();
    r.processor
        .process(&insert(1, mrid, wkb::encode_point(&Point::new(1.0, 1.0))))
        .await
        .unwrap();

    let notified = r.notifier.notified.lock();
    assert_eq!(notified.len(), 1);
    assert_eq!(notified[0], vec![mrid]);
}

#[tokio::test]
async fn shutdown_mid_stream_never_leaves_partial_appends() {
    let r = rig(
        ReconciliationConfig::builder()
            .tolerance(0.1)
            .build()
            .unwrap(),
    );
    let ack = Arc::new(RecordingAck::default());
    let consumer = Arc::new(CdcConsumer::new(r.processor.clone(), ack.clone(), 2));

    let (tx, rx) = mpsc::channel(64);
    for seq in 0..20 {
        let x = (seq * 10) as f64;
        tx.send(insert(
            seq,
            Mrid::new(),
            wkb::encode_line(&LineString::from(vec![(x, 0.0), (x + 5.0, 5.0)])),
        ))
        .await
        .unwrap();
    }

    let handle = consumer.shutdown_handle();
    let runner = {
        let consumer = consumer.clone();
        tokio::spawn(async move { consumer.run(rx).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.shutdown();
    tokio::time::timeout(Duration::from_secs(2), runner)
        .await
        .expect("consumer did not stop")
        .unwrap();
    drop(tx);

    // whatever was processed is complete: every applied segment edit
    // appended all three of its events (two nodes + the segment)
    let acked = ack.acked.lock().clone();
    for seq in &acked {
        assert!(*seq >= 0 && *seq < 20);
    }
    assert_eq!(r.geo_db.live_segment_count(), acked.len());
    assert_eq!(r.geo_db.live_node_count(), acked.len() * 2);
}
