use chrono::Local;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Maximum number of log entries to keep in memory
const MAX_LOG_ENTRIES: usize = 1000;

/// Filter used when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "combo_table=info";

/// A log entry with timestamp and message
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, target: &str, message: String) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S.%3f").to_string(),
            level: level.to_string().to_uppercase(),
            target: target.to_string(),
            message,
        }
    }

    /// Format for display in the `:logs` view
    pub fn format_for_display(&self) -> String {
        format!(
            "[{}] {} [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }
}

/// Thread-safe ring buffer for log entries
#[derive(Clone, Default)]
pub struct LogRingBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogRingBuffer {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        // A panic mid-push leaves at worst one entry missing
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        if entries.len() >= MAX_LOG_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(count);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Split a compact-format line ("LEVEL target: message") into its parts
fn parse_compact_line(line: &str) -> (Level, &str, &str) {
    let levels = [
        ("TRACE ", Level::TRACE),
        ("DEBUG ", Level::DEBUG),
        ("INFO ", Level::INFO),
        ("WARN ", Level::WARN),
        ("ERROR ", Level::ERROR),
    ];
    let Some((level, rest)) = levels
        .iter()
        .find_map(|(prefix, level)| line.strip_prefix(prefix).map(|rest| (*level, rest)))
    else {
        return (Level::INFO, "general", line);
    };

    let rest = rest.trim_start();
    match rest.split_once(':') {
        // A target never contains spaces
        Some((target, msg)) if !target.contains(' ') => (level, target, msg.trim()),
        _ => (level, "general", rest),
    }
}

/// Custom writer that captures logs to our ring buffer
#[derive(Clone)]
pub struct RingBufferWriter {
    buffer: LogRingBuffer,
    mirror_to_stderr: bool,
}

impl RingBufferWriter {
    pub fn new(buffer: LogRingBuffer) -> Self {
        Self {
            buffer,
            mirror_to_stderr: false,
        }
    }

    pub fn mirror_to_stderr(mut self, mirror: bool) -> Self {
        self.mirror_to_stderr = mirror;
        self
    }
}

impl std::io::Write for RingBufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(message) = std::str::from_utf8(buf) {
            let message = message.trim();
            if !message.is_empty() {
                let (level, target, msg) = parse_compact_line(message);
                let entry = LogEntry::new(level, target, msg.to_string());
                if self.mirror_to_stderr {
                    eprintln!("{}", entry.format_for_display());
                }
                self.buffer.push(entry);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RingBufferWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Global log buffer accessible throughout the application
static LOG_BUFFER: OnceLock<LogRingBuffer> = OnceLock::new();

/// Get the global log buffer
pub fn get_log_buffer() -> Option<LogRingBuffer> {
    LOG_BUFFER.get().cloned()
}

/// Initialize tracing into the in-memory ring buffer.
///
/// `RUST_LOG` overrides the default filter; `COMBO_TABLE_DEBUG` mirrors every
/// entry to stderr. Calling this twice returns the first buffer.
pub fn init_tracing() -> LogRingBuffer {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    if let Some(buffer) = get_log_buffer() {
        return buffer;
    }
    let buffer = LOG_BUFFER.get_or_init(LogRingBuffer::new).clone();

    let writer = RingBufferWriter::new(buffer.clone())
        .mirror_to_stderr(std::env::var("COMBO_TABLE_DEBUG").is_ok());

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .without_time() // We add our own timestamps
        .compact();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Another subscriber may already be installed (tests, embedding hosts)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();

    tracing::info!(target: "combo_table", "Logging system initialized");
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_compact_line() {
        let (level, target, msg) = parse_compact_line("WARN ComboTable: Load failed: boom");
        assert_eq!(level, Level::WARN);
        assert_eq!(target, "ComboTable");
        assert_eq!(msg, "Load failed: boom");

        let (level, target, msg) = parse_compact_line("plain text");
        assert_eq!(level, Level::INFO);
        assert_eq!(target, "general");
        assert_eq!(msg, "plain text");

        let (_, target, _) = parse_compact_line("DEBUG some words: here");
        assert_eq!(target, "general");
    }

    #[test]
    fn test_ring_buffer_is_bounded() {
        let buffer = LogRingBuffer::new();
        for i in 0..MAX_LOG_ENTRIES + 5 {
            buffer.push(LogEntry::new(Level::INFO, "test", format!("entry {}", i)));
        }
        assert_eq!(buffer.len(), MAX_LOG_ENTRIES);

        let recent = buffer.get_recent(2);
        assert_eq!(recent[0].message, format!("entry {}", MAX_LOG_ENTRIES + 3));
        assert_eq!(recent[1].message, format!("entry {}", MAX_LOG_ENTRIES + 4));
    }

    #[test]
    fn test_writer_fills_buffer() {
        let buffer = LogRingBuffer::new();
        let mut writer = RingBufferWriter::new(buffer.clone());
        writer.write_all(b"INFO Debouncer: committed\n").unwrap();

        let entries = buffer.get_recent(10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target, "Debouncer");
        assert_eq!(entries[0].level, "INFO");
    }
}
