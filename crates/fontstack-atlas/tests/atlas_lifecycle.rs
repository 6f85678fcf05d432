// this_file: crates/fontstack-atlas/tests/atlas_lifecycle.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use fontstack_atlas::{AtlasConfig, BuildReport, FontSpec, ManagedAtlas};
use fontstack_core::{FontAtlas, FontLoadError, ResolutionState, UiThread};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn new_atlas(config: AtlasConfig) -> Arc<ManagedAtlas<u32>> {
    init_logging();
    ManagedAtlas::new(config, UiThread::current())
}

#[test]
fn test_rebuild_keeps_handle_available_and_identity() {
    let atlas = new_atlas(AtlasConfig::default());
    let handle = atlas
        .add_font(FontSpec::new("NotoSans-Regular.ttf", 16.0))
        .expect("room in atlas");
    let key = handle.key();

    atlas.build(|_| Ok(1));
    assert!(handle.available());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    atlas.on_font_changed(move |key, state| sink.lock().push((key, state)));

    let report = atlas.rebuild(|_| Ok(2));
    assert_eq!(report, BuildReport { ready: 1, failed: 0, shared: 0 });
    assert!(handle.available());
    assert_eq!(handle.key(), key);
    assert_eq!(*seen.lock(), vec![(key, ResolutionState::Ready)]);
}

#[test]
fn test_failed_rebuild_keeps_ready_font() {
    let atlas = new_atlas(AtlasConfig::default());
    let handle = atlas.add_font(FontSpec::new("Inter.ttf", 15.0)).expect("room");
    let key = handle.key();
    atlas.build(|_| Ok(1));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    atlas.on_font_changed(move |key, state| sink.lock().push((key, state)));

    let report = atlas.rebuild(|_| Err(FontLoadError::InvalidData));
    assert_eq!(report, BuildReport { ready: 0, failed: 1, shared: 0 });
    assert!(handle.available());
    assert_eq!(handle.state(), ResolutionState::Ready);
    assert_eq!(handle.load_error(), None);
    assert_eq!(atlas.current_font(key), Some(1));
    assert!(seen.lock().is_empty());

    // A later good rebuild still swaps the font
    atlas.rebuild(|_| Ok(2));
    assert_eq!(atlas.current_font(key), Some(2));
}

#[test]
fn test_failed_resolve_keeps_ready_font() {
    let atlas = new_atlas(AtlasConfig::default());
    let handle = atlas.add_font(FontSpec::new("Inter.ttf", 15.0)).expect("room");
    let key = handle.key();
    atlas.resolve(key, Ok(3)).expect("known key");

    atlas
        .resolve(key, Err(FontLoadError::FileNotFound("Inter.ttf".to_string())))
        .expect("known key");
    assert!(handle.available());
    assert_eq!(handle.load_error(), None);
    assert_eq!(atlas.current_font(key), Some(3));
    assert_eq!(atlas.stats().failed, 0);
}

#[test]
fn test_wait_on_reclaimed_key_returns_at_once() {
    let atlas = new_atlas(AtlasConfig::default());
    let handle = atlas.add_font(FontSpec::new("a.ttf", 12.0)).expect("room");
    let key = handle.key();
    drop(handle);
    assert_eq!(atlas.reclaim(), 1);

    // Would block forever if a missing entry counted as still loading
    assert_eq!(
        atlas.wait_resolved(key, Duration::MAX),
        ResolutionState::Pending
    );
}

#[test]
fn test_failed_build_then_retry() {
    let atlas = new_atlas(AtlasConfig::default());
    let handle = atlas
        .add_font(FontSpec::new("NotoSansJP.otf", 14.0).with_glyph_range(0x3040, 0x309F))
        .expect("room in atlas");
    let missing = FontLoadError::MissingGlyphRange("missing glyph range".to_string());

    let failing = missing.clone();
    let report = atlas.build(move |_| Err(failing.clone()));
    assert_eq!(report.failed, 1);
    assert_eq!(handle.state(), ResolutionState::Failed);
    assert_eq!(handle.load_error(), Some(missing));

    // Rebuilds leave failed entries alone until retried
    atlas.rebuild(|_| Ok(5));
    assert_eq!(handle.state(), ResolutionState::Failed);

    assert!(atlas.retry(handle.key()).expect("known key"));
    atlas.build(|_| Ok(5));
    assert!(handle.available());
    assert_eq!(handle.load_error(), None);
}

#[test]
fn test_rebuild_reclaims_released_entries() {
    let atlas = new_atlas(AtlasConfig::default());
    let kept = atlas.add_font(FontSpec::new("a.ttf", 12.0)).expect("room");
    let dropped = atlas.add_font(FontSpec::new("b.ttf", 12.0)).expect("room");
    let dropped_key = dropped.key();
    let loads = AtomicUsize::new(0);

    atlas.build(|_| Ok(loads.fetch_add(1, Ordering::SeqCst) as u32));
    assert_eq!(loads.load(Ordering::SeqCst), 2);

    let extra = dropped.acquire().expect("live handle");
    dropped.dispose();
    assert_eq!(atlas.stats().reclaimable, 0);
    drop(extra);
    assert_eq!(atlas.stats().reclaimable, 1);

    atlas.rebuild(|_| Ok(loads.fetch_add(1, Ordering::SeqCst) as u32));
    assert_eq!(loads.load(Ordering::SeqCst), 3);
    assert_eq!(atlas.stats().entries, 1);
    assert!(atlas.spec(dropped_key).is_none());
    assert!(kept.available());
}

#[test]
fn test_rebuild_without_reclaim_keeps_entries() {
    let atlas = new_atlas(AtlasConfig::default().with_reclaim_on_rebuild(false));
    let handle = atlas.add_font(FontSpec::new("a.ttf", 12.0)).expect("room");
    drop(handle);

    let report = atlas.rebuild(|_| Ok(1));
    assert_eq!(report.ready, 0);
    assert_eq!(atlas.stats().entries, 1);
    assert_eq!(atlas.stats().reclaimable, 1);
}

#[test]
fn test_background_resolve_wakes_waiter() {
    let atlas = new_atlas(AtlasConfig::default());
    let handle = atlas.add_font(FontSpec::new("a.ttf", 12.0)).expect("room");
    let key = handle.key();

    let loader = {
        let atlas = Arc::clone(&atlas);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            atlas.resolve(key, Ok(42)).expect("known key");
        })
    };

    let waiter = {
        let handle = handle.clone();
        thread::spawn(move || handle.wait(Duration::from_secs(5)).expect("live handle"))
    };

    assert_eq!(waiter.join().expect("waiter"), ResolutionState::Ready);
    loader.join().expect("loader");
    assert!(handle.available());
}

#[test]
fn test_wait_times_out_while_pending() {
    let atlas = new_atlas(AtlasConfig::default());
    let handle = atlas.add_font(FontSpec::new("slow.ttf", 12.0)).expect("room");

    assert_eq!(
        handle.wait(Duration::from_millis(10)).expect("live handle"),
        ResolutionState::Pending
    );
}

#[test]
fn test_invalidate_returns_to_pending() {
    let atlas = new_atlas(AtlasConfig::default());
    let handle = atlas.add_font(FontSpec::new("a.ttf", 12.0)).expect("room");
    atlas.build(|_| Ok(1));

    assert!(atlas.invalidate(handle.key()).expect("known key"));
    assert!(!handle.available());
    assert!(!atlas.invalidate(handle.key()).expect("known key"));

    atlas.build(|_| Ok(2));
    assert!(handle.available());
    assert_eq!(atlas.generation(), 2);
}

#[test]
fn test_handles_shared_across_threads() {
    let atlas = new_atlas(AtlasConfig::default());
    let handle = atlas.add_font(FontSpec::new("a.ttf", 12.0)).expect("room");
    atlas.build(|_| Ok(1));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let owner = handle.clone();
            thread::spawn(move || {
                assert!(owner.available());
                owner.dispose();
                owner.dispose();
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker");
    }

    assert_eq!(handle.ref_count(), 1);
    assert_eq!(atlas.stats().reclaimable, 0);
    drop(handle);
    assert_eq!(atlas.stats().reclaimable, 1);
}
