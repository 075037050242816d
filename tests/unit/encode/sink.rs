use super::*;
use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_dir(stem: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "stockmotion-sink-test-{}-{stem}-{n}",
        std::process::id()
    ))
}

fn frame(width: u32, height: u32) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: vec![255u8; (width * height * 4) as usize],
        premultiplied: true,
    }
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: 30,
    }
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 2)).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.config(), Some(cfg()));
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.frames()[1].0, FrameIndex(1));
    assert!(!sink.is_aborted());
}

#[test]
fn in_memory_sink_abort_discards_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2)).unwrap();
    sink.abort();

    assert!(sink.is_aborted());
    assert!(sink.frames().is_empty());
}

#[test]
fn png_sink_writes_numbered_files() {
    let dir = temp_dir("writes");
    let mut sink = PngDirSink::new(&dir);
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 2)).unwrap();
    sink.end().unwrap();

    assert!(dir.join("frame_00000.png").is_file());
    assert!(dir.join("frame_00001.png").is_file());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn png_sink_rejects_use_before_begin_and_size_mismatches() {
    let dir = temp_dir("rejects");
    let mut sink = PngDirSink::new(&dir);
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2)).is_err());

    sink.begin(cfg()).unwrap();
    assert!(sink.push_frame(FrameIndex(0), &frame(4, 2)).is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn png_sink_abort_removes_written_files() {
    let dir = temp_dir("abort");
    let mut sink = PngDirSink::new(&dir);
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 2)).unwrap();
    sink.abort();

    assert!(!dir.join("frame_00000.png").exists());
    assert!(!dir.join("frame_00001.png").exists());

    std::fs::remove_dir_all(&dir).unwrap();
}
