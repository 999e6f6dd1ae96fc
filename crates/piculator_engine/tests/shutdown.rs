//! Shutdown, signalling and failure handling of the orchestrator.

use std::io;
use std::time::Duration;

use piculator_engine::prelude::*;
use piculator_engine::signal::spawn_timer;

fn unbounded_config(workers: usize, interval: u64) -> EngineConfig {
    EngineConfig::builder()
        .workers(workers)
        .checkpoint_interval(interval)
        .build()
        .unwrap()
}

#[test]
fn test_timer_stops_every_worker() {
    let signal = StopSignal::new();
    let _timer = spawn_timer(Duration::from_millis(100), signal.handle()).unwrap();

    let mut engine = Engine::new(unbounded_config(4, 10_000));
    let mut report = TextReport::new(Vec::new());
    let summary = engine.run_uniform(&signal, &mut report).unwrap();

    assert_eq!(engine.state(), EngineState::Done);
    assert_eq!(summary.limit_exits, 0);
    assert!(summary.per_worker.iter().all(|slot| slot.points_total > 0));
    assert!(summary
        .per_worker
        .iter()
        .all(|slot| slot.points_in_circle <= slot.points_total));

    let summed: SlotSnapshot = summary.per_worker.iter().copied().sum();
    assert_eq!(summed, summary.totals);

    let text = String::from_utf8(report.into_inner()).unwrap();
    for index in 0..4 {
        assert!(text.contains(&format!(
            "Sending interrupt signal to thread: {} and waiting to close.",
            index
        )));
    }
}

#[test]
fn test_deviation_series_is_ordered() {
    let signal = StopSignal::new();
    let _timer = spawn_timer(Duration::from_millis(150), signal.handle()).unwrap();

    let mut engine = Engine::new(unbounded_config(2, 5_000));
    let mut report = TextReport::new(Vec::new());
    let summary = engine.run_uniform(&signal, &mut report).unwrap();

    let text = String::from_utf8(report.into_inner()).unwrap();
    let counts: Vec<u64> = text
        .lines()
        .filter(|line| line.contains(','))
        .map(|line| line.split(',').next().unwrap().parse().unwrap())
        .collect();

    assert_eq!(counts.len(), summary.checkpoints);
    assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(counts.iter().all(|&count| count <= summary.totals.points_total));
}

#[test]
fn test_signal_fired_before_run_still_completes() {
    let signal = StopSignal::new();
    signal.handle().trigger();

    let mut engine = Engine::new(unbounded_config(2, 1_000));
    let summary = engine
        .run_uniform(&signal, TextReport::new(io::sink()))
        .unwrap();

    let summed: SlotSnapshot = summary.per_worker.iter().copied().sum();
    assert_eq!(summed, summary.totals);
    assert_eq!(engine.state(), EngineState::Done);
}

/// Sink that fails once the summary is due.
struct FailingSummary;

impl ReportSink for FailingSummary {
    fn launched(&mut self, _workers: usize) -> io::Result<()> {
        Ok(())
    }

    fn interrupting(&mut self, _index: usize) -> io::Result<()> {
        Ok(())
    }

    fn summary(&mut self, _totals: &SlotSnapshot) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "report closed"))
    }

    fn deviation_header(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn deviation(&mut self, _record: &DeviationRecord) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_report_failure_is_returned() {
    let config = EngineConfig::builder()
        .workers(2)
        .sample_limit(1_000)
        .build()
        .unwrap();

    let mut engine = Engine::new(config);
    let err = engine
        .run_uniform(&StopSignal::new(), FailingSummary)
        .unwrap_err();

    assert!(matches!(err, EngineError::Report(_)));
    assert_eq!(engine.state(), EngineState::Reporting);
}

/// Source that panics on its first draw.
struct ExplodingSource;

impl PointSource for ExplodingSource {
    fn next_point(&mut self) -> (f64, f64) {
        panic!("source exhausted");
    }
}

#[test]
fn test_worker_panic_is_reported_without_hanging() {
    let config = EngineConfig::builder()
        .workers(2)
        .sample_limit(1_000_000_000)
        .build()
        .unwrap();

    let mut engine = Engine::new(config);
    let err = engine
        .run(&StopSignal::new(), TextReport::new(io::sink()), |index| {
            let source: Box<dyn PointSource> = if index == 1 {
                Box::new(ExplodingSource)
            } else {
                Box::new(ScriptedPointSource::with_split(1, 1))
            };
            source
        })
        .unwrap_err();

    assert!(matches!(err, EngineError::WorkerPanicked(1)));
}
