use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use combo_table::remote::row_source::{ProviderError, RowSource};
use combo_table::remote::simulated::SimulatedBackend;
use combo_table::widgets::combo_table::{ComboKey, KeyOutcome, Wake};
use combo_table::widgets::selection::Selection;
use combo_table::{
    ComboTable, DataProvider, RemoteTableModel, Row, SearchModel, SearchPattern, SearchableModel,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn rows() -> Vec<Row> {
    vec![
        Row::pair("k1", "abc one"),
        Row::pair("k2", "ab two"),
        Row::pair("k3", "abc three"),
        Row::pair("k4", "xyz"),
    ]
}

/// Row source whose count requests can be switched to fail
struct Flaky {
    failing: AtomicBool,
}

#[async_trait]
impl RowSource for Flaky {
    async fn estimate_count(&self, _pattern: &SearchPattern) -> anyhow::Result<usize> {
        tokio::time::sleep(ms(20)).await;
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("service unavailable");
        }
        Ok(12)
    }

    async fn load_window(
        &self,
        _pattern: &SearchPattern,
        first: usize,
        last: usize,
    ) -> anyhow::Result<Vec<Row>> {
        Ok((first..=last)
            .map(|id| Row::pair(id.to_string(), format!("item {}", id)))
            .collect())
    }
}

#[test]
fn test_burst_of_keystrokes_commits_once() {
    let start = Instant::now();
    let mut combo = ComboTable::new(SearchableModel::with_rows(rows()));

    combo.handle_input_at("a", start);
    combo.handle_input_at("ab", start + ms(50));
    combo.handle_input_at("abc", start + ms(60));

    for t in [100, 150, 200, 209] {
        assert!(!combo.poll_debounce_at(start + ms(t)).unwrap());
        assert_eq!(combo.model().search_pattern(), None);
    }

    assert!(combo.poll_debounce_at(start + ms(210)).unwrap());
    assert_eq!(combo.model().search_pattern(), Some("abc"));
    assert_eq!(combo.row_count(), 2);

    assert!(!combo.poll_debounce_at(start + ms(1_000)).unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_process_next_waits_out_the_burst() {
    let mut combo = ComboTable::new(SearchableModel::with_rows(rows()));
    let start = Instant::now();

    combo.handle_input("a");
    tokio::time::sleep(ms(50)).await;
    combo.handle_input("ab");
    tokio::time::sleep(ms(10)).await;
    combo.handle_input("abc");

    assert_eq!(combo.process_next().await, Some(Wake::Committed));
    assert_eq!(Instant::now() - start, ms(210));
    assert_eq!(combo.model().search_pattern(), Some("abc"));
    assert_eq!(combo.process_next().await, None);
}

#[test]
fn test_data_change_moves_selection_to_first_row() {
    let mut combo = ComboTable::new(SearchableModel::with_rows(rows()));
    combo.commit_now(Some("ab".to_string())).unwrap();
    combo.handle_input("ab");
    assert!(combo.set_selection(2));
    assert_eq!(combo.selection(), Selection::Selected(2));

    combo.commit_now(Some("abc".to_string())).unwrap();
    assert_eq!(combo.selection(), Selection::Selected(0));
    assert_eq!(combo.selected_row_data().unwrap().key, "k1");
}

#[test]
fn test_data_change_without_matches_clears_selection() {
    let mut combo = ComboTable::new(SearchableModel::with_rows(rows()));
    combo.handle_input("abc");
    combo.commit_now(Some("abc".to_string())).unwrap();
    assert_eq!(combo.selection(), Selection::Selected(0));

    combo.handle_input("nothing");
    combo.commit_now(Some("nothing".to_string())).unwrap();
    assert_eq!(combo.row_count(), 0);
    assert_eq!(combo.selection(), Selection::NoSelection);
}

#[test]
fn test_model_edit_reselects_under_input() {
    let mut combo = ComboTable::new(SearchableModel::with_rows(rows()));
    combo.handle_input("abc");
    combo.commit_now(Some("abc".to_string())).unwrap();
    combo.set_selection(1);

    combo
        .update_model(|m| m.insert_rows(vec![Row::pair("k0", "abc zero")], 0))
        .unwrap();
    assert_eq!(combo.row_count(), 3);
    assert_eq!(combo.selection(), Selection::Selected(0));
    assert_eq!(combo.selected_row_data().unwrap().value, "abc zero");
}

#[test]
fn test_navigation_does_not_wrap() {
    let mut combo = ComboTable::new(SearchableModel::with_rows(rows()));
    combo.handle_key(ComboKey::Down);
    combo.handle_key(ComboKey::Up);
    assert_eq!(combo.selection(), Selection::Selected(0));

    for _ in 0..10 {
        combo.handle_key(ComboKey::Down);
    }
    assert_eq!(combo.selection(), Selection::Selected(3));
    assert!(!combo.set_selection(4));
    assert_eq!(combo.selection(), Selection::Selected(3));
}

#[tokio::test(start_paused = true)]
async fn test_keys_suppressed_while_remote_loads() {
    let backend = SimulatedBackend::with_seed(2)
        .with_base_population(40)
        .with_latency(ms(100));
    let mut combo = ComboTable::new(RemoteTableModel::new(Arc::new(backend)));

    combo.update_model(|m| m.reload_data());
    assert!(combo.is_loading());
    assert_eq!(combo.handle_key(ComboKey::Down), KeyOutcome::Suppressed);
    assert_eq!(combo.selection(), Selection::NoSelection);

    assert_eq!(
        combo.process_next().await,
        Some(Wake::Completion { applied: true })
    );
    assert!(!combo.is_loading());
    assert_eq!(combo.row_count(), 40);

    combo.request_rows(0, 9);
    assert!(combo.is_loading());
    combo.settle().await;
    assert_eq!(combo.handle_key(ComboKey::Down), KeyOutcome::Handled);
    assert_eq!(combo.selected_row_data().unwrap().key, "0");
}

#[tokio::test(start_paused = true)]
async fn test_remote_commit_goes_through_debounce() {
    let backend = SimulatedBackend::with_seed(4).with_base_population(5_000_000);
    let mut combo = ComboTable::new(RemoteTableModel::new(Arc::new(backend)));

    combo.handle_input("California dreaming");
    assert_eq!(combo.process_next().await, Some(Wake::Committed));
    assert!(combo.is_loading());

    combo.settle().await;
    assert_eq!(combo.row_count(), 98);
    assert_eq!(combo.selection(), Selection::Selected(0));
    assert!(combo.model().generation() > 0);
}

#[tokio::test(start_paused = true)]
async fn test_load_failure_keeps_last_view() {
    let source = Arc::new(Flaky {
        failing: AtomicBool::new(false),
    });
    let mut combo = ComboTable::new(RemoteTableModel::new(source.clone()));

    combo.commit_now(Some("item".to_string())).unwrap();
    combo.settle().await;
    combo.request_rows(0, 11);
    combo.settle().await;
    assert_eq!(combo.row_count(), 12);
    assert!(combo.last_load_error().is_none());

    source.failing.store(true, Ordering::SeqCst);
    combo.commit_now(Some("item 1".to_string())).unwrap();
    combo.settle().await;

    assert!(matches!(
        combo.last_load_error(),
        Some(ProviderError::RowCount { .. })
    ));
    assert!(!combo.is_loading());
    assert_eq!(combo.row_count(), 12);
    assert_eq!(combo.model().get_row(0).unwrap().text(), "item 0");
    assert_eq!(combo.model().search_pattern(), Some("item"));
    assert_eq!(combo.handle_key(ComboKey::Down), KeyOutcome::Handled);
}

#[tokio::test(start_paused = true)]
async fn test_load_error_cleared_by_next_success() {
    let source = Arc::new(Flaky {
        failing: AtomicBool::new(true),
    });
    let mut combo = ComboTable::new(RemoteTableModel::new(source.clone()));

    combo.commit_now(Some("a".to_string())).unwrap();
    combo.settle().await;
    assert!(combo.last_load_error().is_some());

    source.failing.store(false, Ordering::SeqCst);
    combo.commit_now(Some("b".to_string())).unwrap();
    assert!(combo.last_load_error().is_none());
    combo.settle().await;

    assert_eq!(combo.row_count(), 12);
    assert!(combo.last_load_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_load_error_is_taken_once() {
    let source = Arc::new(Flaky {
        failing: AtomicBool::new(true),
    });
    let mut combo = ComboTable::new(RemoteTableModel::new(source));

    combo.update_model(|m| m.reload_data());
    combo.settle().await;
    assert!(matches!(
        combo.take_load_error(),
        Some(ProviderError::RowCount { .. })
    ));
    assert_eq!(combo.take_load_error(), None);
}

#[test]
fn test_rejected_match_mode_keeps_view() {
    let mut combo = ComboTable::new(SearchableModel::with_rows(vec![
        Row::pair("a", "(x first"),
        Row::pair("b", "a (x later"),
    ]));
    combo.commit_now(Some("(x".to_string())).unwrap();
    assert_eq!(combo.row_count(), 2);

    assert!(combo.set_match_mode(true, true).is_err());
    assert_eq!(combo.row_count(), 2);
    assert!(combo.last_pattern_error().is_some());
    assert!(!combo.model().anchor_front());
    assert!(!combo.model().search_as_regex());

    combo.set_match_mode(true, false).unwrap();
    assert_eq!(combo.row_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_drops_pending_commit() {
    let mut combo = ComboTable::new(SearchableModel::with_rows(rows()));
    combo.handle_input("xyz");
    combo.dispose();

    assert_eq!(combo.process_next().await, None);
    assert_eq!(combo.model().search_pattern(), None);
    assert_eq!(combo.model().get_row_count(), 4);
}
