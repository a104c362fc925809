use std::time::{Instant, Duration};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use parking_lot::Mutex;

/// Timestamped log sink feeding the GUI log panel.
pub struct Logger {
    sender: mpsc::Sender<String>,
}

impl Logger {
    pub fn new(log_messages: Arc<Mutex<Vec<String>>>) -> Self {
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            for message in receiver {
                log_messages.lock().push(message);
            }
        });

        Logger { sender }
    }

    pub fn log(&self, message: String) {
        // The drain thread only stops once every sender is gone.
        let _ = self.sender.send(timestamped(&message));
    }
}

pub fn timestamped(message: &str) -> String {
    format!("[{}] {}", chrono::Local::now().format("%H:%M:%S%.3f"), message)
}

pub fn measure_time<F, T>(f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let duration = start.elapsed();
    (result, duration)
}

pub fn get_memory_usage() -> String {
    if let Ok(mem_info) = sys_info::mem_info() {
        format!(
            "Memory: Total: {} MB, Free: {} MB, Used: {} MB",
            mem_info.total / 1024,
            mem_info.free / 1024,
            mem_info.total.saturating_sub(mem_info.free) / 1024
        )
    } else {
        "Unable to get memory info".to_string()
    }
}

pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamped_prefix() {
        let line = timestamped("hello");
        assert!(line.starts_with('['));
        assert!(line.ends_with("] hello"));
    }

    #[test]
    fn test_measure_time_returns_result() {
        let (value, _duration) = measure_time(|| 21 * 2);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_logger_reaches_sink() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let logger = Logger::new(sink.clone());
        logger.log("queued".to_string());
        drop(logger);

        for _ in 0..100 {
            if !sink.lock().is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        let lines = sink.lock();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("queued"));
    }
}
