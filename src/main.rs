use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

mod table_display;

use combo_table::config::Config;
use combo_table::data::csv_loader::load_rows_from_csv;
use combo_table::remote::estimator::DecayEstimator;
use combo_table::remote::simulated::SimulatedBackend;
use combo_table::utils::logging::init_tracing;
use combo_table::widgets::combo_table::{ComboKey, ComboTable, Wake};
use combo_table::{RemoteTableModel, Row, SearchModel, SearchableModel};
use table_display::display_view;

struct Options {
    remote: bool,
    regex: bool,
    anchor: bool,
    file: Option<String>,
}

fn print_help() {
    println!("combo-table - incremental search over a row source");
    println!();
    println!("Usage:");
    println!("  combo-table [OPTIONS] [FILE.csv]");
    println!();
    println!("Options:");
    println!("  --remote   - Search the simulated paged backend");
    println!("  --regex    - Treat input as a case-insensitive regular expression");
    println!("  --anchor   - Only match at the start of the text");
    println!("  --generate-config - Print a documented config file");
    println!();
    println!("Each input line replaces the search text. Commands:");
    println!("  :down :up   - Move the selection");
    println!("  :enter      - Pick the selected row");
    println!("  :esc        - Close the result list");
    println!("  :clear      - Reset the search");
    println!("  :logs       - Show recent log entries");
    println!("  :quit       - Exit");
    println!();
    println!("A CSV file needs 'key' and 'text' columns.");
}

fn parse_args() -> Option<Options> {
    let mut options = Options {
        remote: false,
        regex: false,
        anchor: false,
        file: None,
    };

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--remote" => options.remote = true,
            "--regex" => options.regex = true,
            "--anchor" => options.anchor = true,
            "--help" | "-h" => {
                print_help();
                return None;
            }
            "--generate-config" => {
                print!("{}", Config::create_default_with_comments());
                return None;
            }
            _ => options.file = Some(arg),
        }
    }

    Some(options)
}

fn sample_rows() -> Vec<Row> {
    [
        "California dreaming",
        "winter day",
        "California walk",
        "All the leaves are brown",
        "the sky is grey",
        "I went for a walk",
        "On such a winter's day",
        "I stopped into a church",
        "the preacher likes the cold",
        "I pretend to pray",
    ]
    .iter()
    .enumerate()
    .map(|(i, text)| Row::pair(format!("k{}", i + 1), *text))
    .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let Some(options) = parse_args() else {
        return Ok(());
    };

    let logs = init_tracing();
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(target: "combo_table", "Using default config: {:#}", e);
        Config::default()
    });
    let anchor = options.anchor || config.search.anchor_front;
    let regex = options.regex || config.search.search_as_regex;

    if options.remote {
        let remote = &config.remote;
        let backend = SimulatedBackend::new()
            .with_base_population(remote.base_population)
            .with_estimator(DecayEstimator::new(remote.decay, remote.decay_threshold))
            .with_latency(Duration::from_millis(remote.latency_ms));
        let model = RemoteTableModel::new(Arc::new(backend))
            .with_block_size(remote.block_size)
            .with_max_cached_blocks(remote.max_cached_blocks);

        let mut combo = ComboTable::with_config(model, &config.search);
        combo.set_match_mode(anchor, regex)?;
        combo.update_model(|m| m.reload_data());
        run(combo, &config, logs).await
    } else {
        let rows = match &options.file {
            Some(path) => load_rows_from_csv(path, "key", "text")
                .with_context(|| format!("Cannot load {}", path))?,
            None => sample_rows(),
        };
        let mut combo = ComboTable::with_config(SearchableModel::with_rows(rows), &config.search);
        combo.set_match_mode(anchor, regex)?;
        run(combo, &config, logs).await
    }
}

async fn run<M: SearchModel>(
    mut combo: ComboTable<M>,
    config: &Config,
    logs: combo_table::utils::logging::LogRingBuffer,
) -> Result<()> {
    let max_rows = config.display.max_rows;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    combo.settle().await;
    fetch_visible(&mut combo, max_rows);
    combo.settle().await;
    display_view(&combo, max_rows, config.display.show_keys);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    ":quit" => break,
                    ":down" => { combo.handle_key(ComboKey::Down); }
                    ":up" => { combo.handle_key(ComboKey::Up); }
                    ":enter" => {
                        combo.handle_key(ComboKey::Enter);
                        if let Some(key) = combo.model_value() {
                            println!("Picked {} ({})", key, combo.value().unwrap_or_default());
                        }
                    }
                    ":esc" => { combo.handle_key(ComboKey::Escape); }
                    ":clear" => {
                        if let Err(e) = combo.reset_value() {
                            println!("{}", e);
                        }
                    }
                    ":logs" => {
                        for entry in logs.get_recent(20) {
                            println!("{}", entry.format_for_display());
                        }
                        continue;
                    }
                    _ => {
                        combo.handle_input(line);
                        continue;
                    }
                }
            }
            wake = combo.process_next(), if combo.is_commit_pending() || combo.is_loading() => {
                match wake {
                    Some(Wake::Committed) => {
                        if let Some(e) = combo.last_pattern_error() {
                            println!("{}", e);
                        }
                    }
                    Some(Wake::Completion { applied: false }) | None => continue,
                    Some(Wake::Completion { applied: true }) => {}
                }
                if combo.is_loading() {
                    continue;
                }
                fetch_visible(&mut combo, max_rows);
                if combo.is_loading() {
                    continue;
                }
            }
        }

        if let Some(e) = combo.take_load_error() {
            println!("{}", e);
        }
        display_view(&combo, max_rows, config.display.show_keys);
    }

    combo.dispose();
    Ok(())
}

/// Ask for the rows the table is about to print
fn fetch_visible<M: SearchModel>(combo: &mut ComboTable<M>, max_rows: usize) {
    let row_count = combo.row_count();
    if row_count > 0 && max_rows > 0 {
        combo.request_rows(0, row_count.min(max_rows) - 1);
    }
}
