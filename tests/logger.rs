use tasksync::config::LoggingConfig;
use tasksync::logger::{self, Logger};

#[test]
fn test_logs_are_newest_first() {
    let logger = Logger::new();
    logger.log("first".to_string());
    logger.log("second".to_string());

    let logs = logger.get_logs();
    assert_eq!(logs.len(), 2);
    assert!(logs[0].ends_with("second"));
    assert!(logs[1].ends_with("first"));
    assert!(logs[0].starts_with('['));
}

#[test]
fn test_buffer_drops_oldest_lines_at_capacity() {
    let logger = Logger::with_capacity(2);
    for n in 1..=3 {
        logger.log(format!("line {n}"));
    }

    let logs = logger.get_logs();
    assert_eq!(logs.len(), 2);
    assert!(logs[0].ends_with("line 3"));
    assert!(logs[1].ends_with("line 2"));
}

#[test]
fn test_clear_empties_buffer() {
    let logger = Logger::default();
    logger.log("message".to_string());
    logger.clear();
    assert!(logger.get_logs().is_empty());
}

#[test]
fn test_init_captures_log_records_and_is_idempotent() {
    let config = LoggingConfig::default();
    let first = logger::init(&config).unwrap();
    let second = logger::init(&config).unwrap();

    log::info!("cache refreshed for test");

    for handle in [first, second] {
        let logs = handle.get_logs();
        assert!(logs.iter().any(|line| line.contains("INFO cache refreshed for test")));
    }
}
