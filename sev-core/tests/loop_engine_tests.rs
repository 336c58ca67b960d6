//! Dual-buffer loop engine integration tests
//!
//! Drives the engine with fake surfaces and a paused clock: threshold
//! detection, the single-transition latch, settle-delay hand-over, opacity
//! ramps and unmount teardown.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{drain_event_types, FakeMedia};
use sev_common::config::LoopSettings;
use sev_common::events::{BufferSlot, EventBus};
use sev_core::playback::{LoopConfig, LoopEngine, MediaElement, TimeAdvance};

async fn mount(config: LoopConfig) -> (Arc<FakeMedia>, Arc<FakeMedia>, LoopEngine) {
    let a = FakeMedia::with_duration(10.0);
    let b = FakeMedia::with_duration(10.0);
    let engine = LoopEngine::mount(config, a.clone(), b.clone(), None).await;
    (a, b, engine)
}

#[tokio::test(start_paused = true)]
async fn test_mount_shows_a_and_hides_b() {
    let (a, b, engine) = mount(LoopConfig::default()).await;

    assert!(!a.is_paused());
    assert!(b.is_paused());
    assert_eq!(a.opacity(), 1.0);
    assert_eq!(b.opacity(), 0.0);
    assert_eq!(engine.active_slot().await, BufferSlot::A);
    assert!(engine.is_buffer_active(BufferSlot::A).await);
    assert!(!engine.is_buffer_active(BufferSlot::B).await);
}

#[tokio::test(start_paused = true)]
async fn test_single_transition_inside_threshold() {
    let bus = EventBus::new(16);
    let mut rx = bus.subscribe();
    let a = FakeMedia::with_duration(10.0);
    let b = FakeMedia::with_duration(10.0);
    let engine = LoopEngine::mount(LoopConfig::default(), a.clone(), b.clone(), Some(bus)).await;

    a.set_position(8.5);
    assert_eq!(
        engine.on_time_advance(BufferSlot::A).await,
        TimeAdvance::TransitionStarted {
            from: BufferSlot::A,
            to: BufferSlot::B
        }
    );

    // Second update before the settle delay expires
    a.set_position(8.7);
    assert_eq!(
        engine.on_time_advance(BufferSlot::A).await,
        TimeAdvance::TransitionInFlight
    );

    assert_eq!(engine.transition_count().await, 1);
    assert_eq!(b.seeks(), vec![0.1]);
    assert_eq!(b.play_calls(), 1);
    assert!(!b.is_paused());
    assert_eq!(drain_event_types(&mut rx), vec!["LoopTransition"]);
}

#[tokio::test(start_paused = true)]
async fn test_threshold_boundary_is_inclusive() {
    let (a, b, engine) = mount(LoopConfig::default()).await;

    // Just outside: 2.01s left with a 2s threshold
    a.set_position(7.99);
    assert!(matches!(
        engine.on_time_advance(BufferSlot::A).await,
        TimeAdvance::Playing { .. }
    ));
    assert_eq!(b.play_calls(), 0);

    // Exactly at the threshold
    a.set_position(8.0);
    assert_eq!(
        engine.on_time_advance(BufferSlot::A).await,
        TimeAdvance::TransitionStarted {
            from: BufferSlot::A,
            to: BufferSlot::B
        }
    );

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(engine.active_slot().await, BufferSlot::B);
    assert_eq!(engine.transition_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_settle_delay_hands_over_to_incoming() {
    let (a, b, engine) = mount(LoopConfig::default()).await;

    a.set_position(8.5);
    engine.on_time_advance(BufferSlot::A).await;
    assert!(engine.is_transitioning().await);
    assert_eq!(engine.active_slot().await, BufferSlot::A);

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(!engine.is_transitioning().await);
    assert_eq!(engine.active_slot().await, BufferSlot::B);
    assert!(engine.is_buffer_active(BufferSlot::B).await);
    assert!(!engine.is_buffer_active(BufferSlot::A).await);

    // Updates from the now idle surface are ignored
    a.set_position(9.9);
    assert_eq!(engine.on_time_advance(BufferSlot::A).await, TimeAdvance::Ignored);

    // Next cycle runs the other way round
    b.set_position(8.2);
    assert_eq!(
        engine.on_time_advance(BufferSlot::B).await,
        TimeAdvance::TransitionStarted {
            from: BufferSlot::B,
            to: BufferSlot::A
        }
    );
    assert_eq!(a.seeks(), vec![0.1]);
    assert_eq!(engine.transition_count().await, 2);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_duration_is_a_silent_noop() {
    let (a, b, engine) = mount(LoopConfig::default()).await;

    a.set_duration(None);
    a.set_position(9.5);
    assert_eq!(
        engine.on_time_advance(BufferSlot::A).await,
        TimeAdvance::MetadataPending
    );

    a.set_duration(Some(f64::NAN));
    assert_eq!(
        engine.on_time_advance(BufferSlot::A).await,
        TimeAdvance::MetadataPending
    );

    assert!(!engine.is_transitioning().await);
    assert_eq!(engine.transition_count().await, 0);
    assert!(b.seeks().is_empty());
    assert_eq!(b.play_calls(), 0);
    assert_eq!(a.opacity(), 1.0);
}

#[tokio::test(start_paused = true)]
async fn test_before_threshold_reports_remaining() {
    let (a, _b, engine) = mount(LoopConfig::default()).await;

    a.set_position(5.0);
    assert_eq!(
        engine.on_time_advance(BufferSlot::A).await,
        TimeAdvance::Playing { remaining: 5.0 }
    );
    assert_eq!(
        engine.on_time_advance(BufferSlot::B).await,
        TimeAdvance::Ignored
    );
}

#[tokio::test(start_paused = true)]
async fn test_crossfade_ramps_over_fade_duration() {
    let (a, b, engine) = mount(LoopConfig::default()).await;

    a.set_position(8.5);
    engine.on_time_advance(BufferSlot::A).await;
    assert_eq!(engine.target_opacity(BufferSlot::A).await, 0.0);
    assert_eq!(engine.target_opacity(BufferSlot::B).await, 1.0);

    tokio::time::sleep(Duration::from_secs(1)).await;
    let (out, incoming) = engine.render().await;
    assert!((out - 0.5).abs() < 1e-2, "outgoing at {}", out);
    assert!((incoming - 0.5).abs() < 1e-2, "incoming at {}", incoming);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(engine.render().await, (0.0, 1.0));
    assert_eq!(a.opacity(), 0.0);
    assert_eq!(b.opacity(), 1.0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_fade_swaps_instantly() {
    let config = LoopConfig {
        fade: Duration::ZERO,
        ..LoopConfig::default()
    };
    let (a, b, engine) = mount(config).await;

    a.set_position(9.0);
    engine.on_time_advance(BufferSlot::A).await;

    assert_eq!(engine.opacity(BufferSlot::A).await, 0.0);
    assert_eq!(engine.opacity(BufferSlot::B).await, 1.0);
    assert_eq!(b.opacity(), 1.0);
}

#[tokio::test(start_paused = true)]
async fn test_story_background_stays_dimmed() {
    let (a, b, engine) = mount(LoopConfig::from(&LoopSettings::story_default())).await;
    assert_eq!(a.opacity(), 0.3);

    a.set_position(8.5);
    engine.on_time_advance(BufferSlot::A).await;
    assert_eq!(engine.target_opacity(BufferSlot::B).await, 0.3);

    tokio::time::sleep(Duration::from_secs(3)).await;
    engine.render().await;
    assert_eq!(b.opacity(), 0.3);
}

#[tokio::test(start_paused = true)]
async fn test_unmount_halts_and_cancels_settle() {
    let (a, b, engine) = mount(LoopConfig::default()).await;

    a.set_position(8.5);
    engine.on_time_advance(BufferSlot::A).await;
    engine.unmount().await;

    assert!(a.is_paused());
    assert!(b.is_paused());
    assert_eq!(a.position(), 0.0);
    assert_eq!(b.position(), 0.0);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(engine.active_slot().await, BufferSlot::A);
    assert_eq!(engine.on_time_advance(BufferSlot::A).await, TimeAdvance::Ignored);

    // Second unmount is harmless
    engine.unmount().await;
}
