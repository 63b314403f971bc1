use super::*;

fn sink_in(dir: &Path, capacity: usize) -> (LogSink, Receiver<String>, WorkerGuard, PathBuf) {
    let file_path = dir.join("events.log");
    let file = std::fs::File::create(&file_path).unwrap();
    let (non_blocking, worker) = tracing_appender::non_blocking(file);
    let (tx, rx) = mpsc::sync_channel(capacity);
    let sink = LogSink {
        file: non_blocking,
        lines: tx,
    };
    (sink, rx, worker, file_path)
}

#[test]
fn test_event_writer_reaches_file_and_channel() {
    let dir = tempfile::tempdir().unwrap();
    let (sink, rx, worker, file_path) = sink_in(dir.path(), 8);

    {
        let mut writer = sink.make_writer();
        writer.write_all(b"archive imported").unwrap();
        writer.write_all(b" nodes=3\n").unwrap();
        assert!(rx.try_recv().is_err());
    }
    drop(sink);
    drop(worker);

    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec!["archive imported nodes=3"]
    );
    assert_eq!(
        std::fs::read_to_string(&file_path).unwrap(),
        "archive imported nodes=3\n"
    );
}

#[test]
fn test_forward_lines_skips_blank_lines() {
    let (tx, rx) = mpsc::sync_channel(8);
    assert_eq!(forward_lines(b"first\n\nsecond\n", &tx), 2);
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec!["first", "second"]);
    assert_eq!(forward_lines(b"", &tx), 0);
}

#[test]
fn test_forward_lines_drops_when_host_falls_behind() {
    let (tx, rx) = mpsc::sync_channel(2);
    assert_eq!(forward_lines(b"a\nb\nc\nd\n", &tx), 2);
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec!["a", "b"]);

    drop(rx);
    assert_eq!(forward_lines(b"late\n", &tx), 0);
}

#[test]
fn test_filter_directive_precedence() {
    assert_eq!(
        filter_directive(Some("debug".to_string()), Some("warn")),
        "debug"
    );
    assert_eq!(filter_directive(Some("  ".to_string()), Some("warn")), "warn");
    assert_eq!(filter_directive(None, Some("vfs_workspace=trace")), "vfs_workspace=trace");
    assert_eq!(filter_directive(None, None), DEFAULT_FILTER);
}

#[test]
fn test_options_defaults() {
    let options = LoggingOptions::new("/tmp/logs");
    assert_eq!(options.log_dir, PathBuf::from("/tmp/logs"));
    assert_eq!(options.line_capacity, DEFAULT_LINE_CAPACITY);
    assert!(options.filter.is_none());
    assert!(!options.capture_panics);
}

#[test]
fn test_prepare_log_dir_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("logs");
    assert_eq!(prepare_log_dir(&target), Some(target.clone()));
    assert!(target.is_dir());
}

#[test]
fn test_prepare_log_dir_falls_back_to_temp() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let resolved = prepare_log_dir(&blocker.join("logs")).unwrap();
    assert!(resolved.starts_with(std::env::temp_dir()));
    assert!(resolved.is_dir());
}
