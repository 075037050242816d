use super::*;
use chrono::{NaiveDate, NaiveDateTime};

use crate::render::frame::FrameRGBA;
use crate::series::resample::resample;
use crate::series::time_series::{TimePoint, TimeSeries};

fn at(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn chart(frames: usize) -> ChartSeries {
    let points = vec![
        TimePoint {
            at: at(1),
            value: 10.0,
        },
        TimePoint {
            at: at(31),
            value: 20.0,
        },
    ];
    ChartSeries::Price(resample(&TimeSeries::new(points).unwrap(), frames).unwrap())
}

fn canvas() -> Canvas {
    Canvas {
        width: 4,
        height: 4,
    }
}

/// Renderer stub that records call order and returns solid frames.
#[derive(Default)]
struct StubRenderer {
    calls: Vec<usize>,
    fail_at: Option<usize>,
}

impl FrameRenderer for StubRenderer {
    fn render(
        &mut self,
        _viewport: &crate::animate::viewport::Viewport,
        _series: &ChartSeries,
        revealed: usize,
    ) -> Result<FrameRGBA> {
        if self.fail_at == Some(revealed) {
            return Err(Error::validation("stub renderer failure"));
        }
        self.calls.push(revealed);
        Ok(FrameRGBA {
            width: 4,
            height: 4,
            data: vec![0u8; 4 * 4 * 4],
            premultiplied: true,
        })
    }
}

fn driver(frames: usize) -> AnimationDriver {
    AnimationDriver::new(chart(frames), ViewportOptions::default(), canvas(), 30).unwrap()
}

#[test]
fn rejects_degenerate_construction() {
    assert!(AnimationDriver::new(chart(2), ViewportOptions::default(), canvas(), 0).is_err());
    assert!(
        AnimationDriver::new(
            chart(2),
            ViewportOptions::default(),
            Canvas {
                width: 0,
                height: 4
            },
            30,
        )
        .is_err()
    );
}

#[test]
fn emits_every_frame_in_order_and_completes() {
    let mut driver = driver(10);
    let mut renderer = StubRenderer::default();
    let mut sink = crate::encode::sink::InMemorySink::new();

    driver
        .run(
            &mut renderer,
            &mut sink,
            &mut NullProgress,
            &CancelToken::new(),
        )
        .unwrap();

    assert_eq!(driver.state(), DriverState::Completed);
    assert_eq!(renderer.calls, (0..10).collect::<Vec<_>>());
    assert_eq!(sink.frames().len(), 10);
    for (i, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(*idx, FrameIndex(i as u64));
        assert_eq!(frame.width, 4);
    }
    assert_eq!(
        sink.config(),
        Some(SinkConfig {
            width: 4,
            height: 4,
            fps: 30
        })
    );
}

#[test]
fn progress_reports_every_frame() {
    struct Recorder(Vec<(u64, u64)>);
    impl ProgressObserver for Recorder {
        fn frame_rendered(&mut self, frame: FrameIndex, total: u64) {
            self.0.push((frame.0, total));
        }
    }

    let mut driver = driver(5);
    let mut renderer = StubRenderer::default();
    let mut sink = crate::encode::sink::InMemorySink::new();
    let mut progress = Recorder(Vec::new());

    driver
        .run(&mut renderer, &mut sink, &mut progress, &CancelToken::new())
        .unwrap();

    assert_eq!(progress.0, vec![(0, 5), (1, 5), (2, 5), (3, 5), (4, 5)]);
}

#[test]
fn cancellation_aborts_the_sink() {
    let mut driver = driver(10);
    let mut renderer = StubRenderer::default();
    let mut sink = crate::encode::sink::InMemorySink::new();
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = driver
        .run(&mut renderer, &mut sink, &mut NullProgress, &cancel)
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(driver.state(), DriverState::Failed);
    assert!(sink.is_aborted());
    assert!(sink.frames().is_empty());
}

#[test]
fn renderer_failure_aborts_the_sink_and_discards_frames() {
    let mut driver = driver(10);
    let mut renderer = StubRenderer {
        fail_at: Some(4),
        ..StubRenderer::default()
    };
    let mut sink = crate::encode::sink::InMemorySink::new();

    let err = driver
        .run(
            &mut renderer,
            &mut sink,
            &mut NullProgress,
            &CancelToken::new(),
        )
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(driver.state(), DriverState::Failed);
    assert!(sink.is_aborted());
    assert!(sink.frames().is_empty());
}

#[test]
fn a_driver_cannot_be_rerun() {
    let mut driver = driver(3);
    let mut renderer = StubRenderer::default();
    let mut sink = crate::encode::sink::InMemorySink::new();

    driver
        .run(
            &mut renderer,
            &mut sink,
            &mut NullProgress,
            &CancelToken::new(),
        )
        .unwrap();
    assert!(
        driver
            .run(
                &mut renderer,
                &mut sink,
                &mut NullProgress,
                &CancelToken::new(),
            )
            .is_err()
    );
}
