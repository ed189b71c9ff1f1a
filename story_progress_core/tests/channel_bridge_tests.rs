use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use story_progress_core::event::{SAVE_RESULT, SAVE_SAVING, UPLOAD_FAILED, UPLOAD_UPLOADING};
use story_progress_core::{
    ChannelBridge, EventBridge, EventFamily, MediaItem, MediaList, ProgressError, ProgressEvent,
    StoryUpdateProgress, Transition, TransitionHooks, UiState, UploadKind,
};

fn story(ids: &[&str]) -> MediaList {
    MediaList::new(ids.iter().map(|id| MediaItem::new(*id)).collect())
}

// ---------------------------------------------------------------
// Pump delivery
// ---------------------------------------------------------------

#[tokio::test]
async fn test_pump_delivers_in_order_to_matching_family() {
    let (bridge, sender, pump) = ChannelBridge::builder().with_capacity(4).build();

    let uploads = Arc::new(Mutex::new(Vec::new()));
    let saves = Arc::new(Mutex::new(Vec::new()));
    let u = Arc::clone(&uploads);
    let s = Arc::clone(&saves);
    let up_sub = bridge.subscribe_upload(Arc::new(move |ev: &ProgressEvent| {
        u.lock().unwrap().push(ev.progress);
    }));
    let save_sub = bridge.subscribe_save(Arc::new(move |ev: &ProgressEvent| {
        s.lock().unwrap().push(ev.state);
    }));

    let handle = tokio::spawn(pump.run());
    for i in 0..10 {
        let p = i as f64 / 10.0;
        sender
            .send(EventFamily::Upload, ProgressEvent::new("m1", UPLOAD_UPLOADING).with_progress(p))
            .await
            .unwrap();
    }
    sender
        .send(EventFamily::Save, ProgressEvent::new("m1", SAVE_SAVING))
        .await
        .unwrap();
    drop(sender);

    let delivered = handle.await.unwrap();
    assert_eq!(delivered, 11);

    let uploads = uploads.lock().unwrap();
    let expected: Vec<Option<f64>> = (0..10).map(|i| Some(i as f64 / 10.0)).collect();
    assert_eq!(*uploads, expected);
    assert_eq!(*saves.lock().unwrap(), vec![SAVE_SAVING]);

    up_sub.release();
    save_sub.release();
}

#[tokio::test]
async fn test_released_handler_receives_nothing() {
    let (bridge, sender, pump) = ChannelBridge::builder().build();
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let sub = bridge.subscribe_upload(Arc::new(move |_: &ProgressEvent| {
        c.fetch_add(1, Ordering::SeqCst);
    }));
    assert_eq!(bridge.handler_count(EventFamily::Upload), 1);
    sub.release();
    assert_eq!(bridge.handler_count(EventFamily::Upload), 0);

    let handle = tokio::spawn(pump.run());
    sender
        .send(EventFamily::Upload, ProgressEvent::new("m1", UPLOAD_UPLOADING))
        .await
        .unwrap();
    drop(sender);
    handle.await.unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancel_stops_pump() {
    let (_bridge, sender, pump) = ChannelBridge::builder().build();
    let token = pump.cancel_token();
    let handle = tokio::spawn(pump.run());

    token.cancel();
    let delivered = handle.await.unwrap();
    assert_eq!(delivered, 0);

    let err = sender
        .send(EventFamily::Save, ProgressEvent::new("m1", SAVE_SAVING))
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressError::BridgeClosed));
}

#[tokio::test]
async fn test_send_json_decodes_wire_payload() {
    let (bridge, sender, pump) = ChannelBridge::builder().build();
    let received = Arc::new(Mutex::new(Vec::new()));
    let r = Arc::clone(&received);
    let _sub = bridge.subscribe_save(Arc::new(move |ev: &ProgressEvent| {
        r.lock().unwrap().push(ev.clone());
    }));

    let handle = tokio::spawn(pump.run());
    sender
        .send_json(
            EventFamily::Save,
            r#"{"mediaId":"m1","state":9,"progress":1,"success":true}"#,
        )
        .await
        .unwrap();

    let err = sender
        .send_json(EventFamily::Save, r#"{"mediaId":"m1""#)
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressError::Decode(_)));

    drop(sender);
    assert_eq!(handle.await.unwrap(), 1);

    let received = received.lock().unwrap();
    assert_eq!(
        received[0],
        ProgressEvent::new("m1", SAVE_RESULT).with_progress(1.0).with_success(true)
    );
}

// ---------------------------------------------------------------
// Tracker behind the pump
// ---------------------------------------------------------------

#[tokio::test]
async fn test_tracker_follows_pumped_events() {
    let (bridge, sender, pump) = ChannelBridge::builder().build();
    let tracker = StoryUpdateProgress::builder(story(&["m1", "m2"])).build();
    tracker.mount(&bridge);

    let handle = tokio::spawn(pump.run());
    sender
        .send(EventFamily::Upload, ProgressEvent::new("m1", UPLOAD_UPLOADING).with_progress(0.4))
        .await
        .unwrap();
    sender
        .send(EventFamily::Upload, ProgressEvent::new("zz", UPLOAD_FAILED))
        .await
        .unwrap();
    sender
        .send(EventFamily::Upload, ProgressEvent::new("m2", UPLOAD_FAILED))
        .await
        .unwrap();
    drop(sender);
    handle.await.unwrap();

    assert_eq!(
        tracker.state(),
        UiState {
            progress: 0.4,
            is_upload_in_progress: false,
            is_upload_failed: true,
            is_save_in_progress: false,
            is_save_failed: false,
        }
    );
}

#[tokio::test]
async fn test_double_mount_delivers_once() {
    let (bridge, sender, pump) = ChannelBridge::builder().build();
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let hooks = TransitionHooks::new().on(Transition::Upload(UploadKind::Uploading), move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });
    let tracker = StoryUpdateProgress::builder(story(&["m1"]))
        .with_hooks(hooks)
        .build();
    tracker.mount(&bridge);
    tracker.mount(&bridge);
    assert_eq!(bridge.handler_count(EventFamily::Upload), 1);
    assert_eq!(bridge.handler_count(EventFamily::Save), 1);

    let handle = tokio::spawn(pump.run());
    sender
        .send(EventFamily::Upload, ProgressEvent::new("m1", UPLOAD_UPLOADING).with_progress(0.2))
        .await
        .unwrap();
    drop(sender);
    handle.await.unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unmount_detaches_from_bridge() {
    let (bridge, sender, pump) = ChannelBridge::builder().build();
    let tracker = StoryUpdateProgress::builder(story(&["m1"])).build();
    tracker.mount(&bridge);
    tracker.unmount();

    assert_eq!(bridge.handler_count(EventFamily::Upload), 0);
    assert_eq!(bridge.handler_count(EventFamily::Save), 0);

    let handle = tokio::spawn(pump.run());
    sender
        .send(EventFamily::Save, ProgressEvent::new("m1", SAVE_SAVING).with_progress(0.5))
        .await
        .unwrap();
    drop(sender);
    handle.await.unwrap();

    assert_eq!(tracker.state(), UiState::initial());
}

#[tokio::test]
async fn test_producers_on_many_tasks_are_serialized() {
    let (bridge, sender, pump) = ChannelBridge::builder().with_capacity(8).build();
    let in_handler = Arc::new(AtomicUsize::new(0));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let (busy, clash) = (Arc::clone(&in_handler), Arc::clone(&overlaps));
    let _sub = bridge.subscribe_upload(Arc::new(move |_: &ProgressEvent| {
        if busy.fetch_add(1, Ordering::SeqCst) != 0 {
            clash.fetch_add(1, Ordering::SeqCst);
        }
        busy.fetch_sub(1, Ordering::SeqCst);
    }));

    let handle = tokio::spawn(pump.run());
    let mut producers = Vec::new();
    for _ in 0..4 {
        let tx = sender.clone();
        producers.push(tokio::spawn(async move {
            for _ in 0..25 {
                tx.send(EventFamily::Upload, ProgressEvent::new("m1", UPLOAD_UPLOADING))
                    .await
                    .unwrap();
            }
        }));
    }
    drop(sender);
    for p in producers {
        p.await.unwrap();
    }

    assert_eq!(handle.await.unwrap(), 100);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
}
