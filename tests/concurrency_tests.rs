//! Parallel execution must be indistinguishable from sequential execution.

use std::sync::Arc;
use std::thread;

use docsift::{
    ExactDedupConfig, ExecutionStrategy, ParallelExecutor, Pipeline, PipelineConfig,
    PipelineError, ScoreRecord, SignatureConfig, gather,
};
use serde_json::{Value, json};

fn batch(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            // every fifth document repeats an earlier one
            let base = if i % 5 == 4 { i - 1 } else { i };
            let text = format!(
                "北京 天安门 文档{base} 词{a} 词{b} 故宫 长城 {tail}",
                a = base % 7,
                b = base % 11,
                tail = "今天 天气 很好 ".repeat(base % 3)
            );
            json!({"id": i as i64, "text": text})
        })
        .collect()
}

fn config(execution: ExecutionStrategy) -> PipelineConfig {
    PipelineConfig {
        execution,
        signature: SignatureConfig::default().with_parallel(true),
        exact_dedup: ExactDedupConfig::default().with_enabled(true),
        ..PipelineConfig::default()
    }
}

fn serialized(records: &[ScoreRecord]) -> String {
    serde_json::to_string(records).expect("serialize")
}

#[test]
fn parallel_matches_sequential() {
    let sequential = Pipeline::new(config(ExecutionStrategy::Sequential), None)
        .expect("sequential pipeline")
        .run(batch(120))
        .expect("sequential run");

    for num_workers in [1, 2, 8] {
        let parallel = Pipeline::new(config(ExecutionStrategy::Parallel { num_workers }), None)
            .expect("parallel pipeline")
            .run(batch(120))
            .expect("parallel run");
        assert_eq!(
            serialized(&sequential),
            serialized(&parallel),
            "{num_workers} workers diverged"
        );
    }
}

#[test]
fn output_order_follows_input_order() {
    let out = Pipeline::new(config(ExecutionStrategy::Parallel { num_workers: 4 }), None)
        .expect("pipeline")
        .run(batch(60))
        .expect("run");
    let ids: Vec<i64> = out
        .iter()
        .filter_map(|r| r.get("id").and_then(Value::as_i64))
        .collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "{ids:?}");
    // duplicates dropped before scoring
    assert_eq!(out.len(), 48);
}

#[test]
fn shared_pipeline_across_threads() {
    let pipeline = Arc::new(
        Pipeline::new(config(ExecutionStrategy::Parallel { num_workers: 2 }), None)
            .expect("pipeline"),
    );
    let expected = serialized(&pipeline.run(batch(30)).expect("run"));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = Arc::clone(&pipeline);
            thread::spawn(move || serialized(&pipeline.run(batch(30)).expect("run")))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread"), expected);
    }
}

#[test]
fn worker_failure_aborts_whole_batch() {
    let executor =
        ParallelExecutor::new(ExecutionStrategy::Parallel { num_workers: 4 }).expect("executor");
    let items: Vec<usize> = (0..64).collect();
    let result = executor.map(&items, |_, x| {
        if *x == 40 || *x == 9 {
            Err(PipelineError::InvalidInput(format!("doc {x}")))
        } else {
            Ok(*x)
        }
    });
    match result {
        Err(PipelineError::WorkerFailure { index, .. }) => assert_eq!(index, 9),
        other => panic!("expected worker failure, got {other:?}"),
    }
}

#[test]
fn scatter_gather_restores_order() {
    let executor =
        ParallelExecutor::new(ExecutionStrategy::Parallel { num_workers: 8 }).expect("executor");
    let items: Vec<u64> = (0..1000).collect();
    let tagged = executor
        .map_tagged(&items, |index, x| Ok((index, x * x)))
        .expect("map_tagged");
    let gathered = gather(tagged);
    assert!(
        gathered
            .iter()
            .enumerate()
            .all(|(i, (index, sq))| i == *index && *sq == (i as u64) * (i as u64))
    );
}
