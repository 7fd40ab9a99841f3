//! Unit tests for haptic-atomic.

use haptic_atomic::{CounterSnapshot, LatestMailbox, LoopCounters, SnapshotCell};

#[test]
fn test_loop_counters_default() {
    let counters = LoopCounters::default();
    assert_eq!(counters.snapshot(), CounterSnapshot::default());
}

#[test]
fn test_loop_counters_all_operations() {
    let counters = LoopCounters::new();

    counters.inc_processed();
    counters.inc_processed();
    counters.inc_idle_poll();
    counters.record_force_command(true);
    counters.record_force_command(false);
    counters.add_edge_events(4);
    counters.record_display_publish(false);
    counters.record_display_publish(true);

    let snapshot = counters.snapshot();
    assert_eq!(snapshot.processed_samples, 2);
    assert_eq!(snapshot.idle_polls, 1);
    assert_eq!(snapshot.force_commands, 1);
    assert_eq!(snapshot.command_rejections, 1);
    assert_eq!(snapshot.edge_events, 4);
    assert_eq!(snapshot.display_published, 2);
    assert_eq!(snapshot.display_dropped, 1);

    assert_eq!(counters.processed_samples(), 2);
    assert_eq!(counters.idle_polls(), 1);
    assert_eq!(counters.command_rejections(), 1);
}

#[test]
fn test_snapshot_cell_default() {
    let cell: SnapshotCell<u64> = SnapshotCell::default();
    assert_eq!(cell.load(), 0);
}

#[test]
fn test_mailbox_default_is_empty() {
    let mailbox: LatestMailbox<u64> = LatestMailbox::default();
    assert!(!mailbox.has_pending());
}
