//! Document-level fan-out over a dedicated rayon pool.
//!
//! The execution strategy is fixed by configuration. There is no runtime
//! probing and no fallback from parallel to sequential: a pool that cannot
//! start is an error.
//!
//! Failure policy: any worker error or panic fails the whole call with
//! [`PipelineError::WorkerFailure`] for the lowest failing index. No
//! partial results are returned and nothing is retried.

use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::PipelineError;

/// How per-document work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// Strict index order on the calling thread.
    Sequential,
    /// A rayon pool of `num_workers` threads.
    Parallel { num_workers: usize },
}

impl Default for ExecutionStrategy {
    /// One worker per available core.
    fn default() -> Self {
        let num_workers = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        ExecutionStrategy::Parallel { num_workers }
    }
}

impl ExecutionStrategy {
    pub fn num_workers(&self) -> usize {
        match self {
            ExecutionStrategy::Sequential => 1,
            ExecutionStrategy::Parallel { num_workers } => *num_workers,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            ExecutionStrategy::Parallel { num_workers: 0 } => {
                Err("execution.num_workers must be > 0".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Runs a pure per-document function over a batch.
pub struct ParallelExecutor {
    strategy: ExecutionStrategy,
    pool: Option<ThreadPool>,
}

impl std::fmt::Debug for ParallelExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelExecutor")
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl ParallelExecutor {
    pub fn new(strategy: ExecutionStrategy) -> Result<Self, PipelineError> {
        strategy.validate().map_err(PipelineError::Executor)?;
        let pool = match strategy {
            ExecutionStrategy::Sequential => None,
            ExecutionStrategy::Parallel { num_workers } => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(num_workers)
                    .thread_name(|i| format!("docsift-worker-{i}"))
                    .build()
                    .map_err(|e| PipelineError::Executor(e.to_string()))?;
                debug!(num_workers, "worker pool started");
                Some(pool)
            }
        };
        Ok(Self { strategy, pool })
    }

    pub fn sequential() -> Self {
        Self {
            strategy: ExecutionStrategy::Sequential,
            pool: None,
        }
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Index-preserving map: `result[i]` belongs to `items[i]`.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>, PipelineError>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> Result<R, PipelineError> + Sync,
    {
        match &self.pool {
            // stops at the first failure, which is the lowest index
            None => items
                .iter()
                .enumerate()
                .map(|(index, item)| run_one(&f, index, item))
                .collect(),
            Some(pool) => {
                let outcomes: Vec<Result<R, PipelineError>> = pool.install(|| {
                    items
                        .par_iter()
                        .enumerate()
                        .map(|(index, item)| run_one(&f, index, item))
                        .collect()
                });
                outcomes.into_iter().collect()
            }
        }
    }

    /// Scatter/gather map: results come back tagged with their input index
    /// in completion order. Use [`gather`] to restore input order.
    pub fn map_tagged<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<(usize, R)>, PipelineError>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> Result<R, PipelineError> + Sync,
    {
        let Some(pool) = &self.pool else {
            return items
                .iter()
                .enumerate()
                .map(|(index, item)| run_one(&f, index, item).map(|r| (index, r)))
                .collect();
        };

        let (tx, rx) = mpsc::channel();
        pool.scope(|scope| {
            for (index, item) in items.iter().enumerate() {
                let tx = tx.clone();
                let f = &f;
                scope.spawn(move |_| {
                    // receiver outlives the scope
                    let _ = tx.send((index, run_one(f, index, item)));
                });
            }
        });
        drop(tx);

        let mut tagged = Vec::with_capacity(items.len());
        let mut failure: Option<(usize, PipelineError)> = None;
        for (index, outcome) in rx {
            match outcome {
                Ok(value) => tagged.push((index, value)),
                Err(err) => {
                    if failure.as_ref().is_none_or(|(lowest, _)| index < *lowest) {
                        failure = Some((index, err));
                    }
                }
            }
        }
        match failure {
            Some((_, err)) => Err(err),
            None => Ok(tagged),
        }
    }
}

/// Re-sort tagged results into input order.
pub fn gather<R>(mut tagged: Vec<(usize, R)>) -> Vec<R> {
    tagged.sort_unstable_by_key(|(index, _)| *index);
    tagged.into_iter().map(|(_, value)| value).collect()
}

fn run_one<T, R, F>(f: &F, index: usize, item: &T) -> Result<R, PipelineError>
where
    F: Fn(usize, &T) -> Result<R, PipelineError>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| f(index, item))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(PipelineError::WorkerFailure {
            index,
            reason: err.to_string(),
        }),
        Err(payload) => Err(PipelineError::WorkerFailure {
            index,
            reason: format!("panicked: {}", panic_message(payload.as_ref())),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executors() -> Vec<ParallelExecutor> {
        vec![
            ParallelExecutor::sequential(),
            ParallelExecutor::new(ExecutionStrategy::Parallel { num_workers: 4 }).unwrap(),
        ]
    }

    #[test]
    fn map_preserves_order() {
        let items: Vec<u64> = (0..500).collect();
        for exec in executors() {
            let out = exec.map(&items, |i, x| Ok((i as u64, x * 2))).unwrap();
            assert!(out.iter().enumerate().all(|(i, (j, v))| i as u64 == *j && *v == 2 * i as u64));
        }
    }

    #[test]
    fn tagged_results_gather_back_in_order() {
        let items: Vec<String> = (0..200).map(|i| format!("doc-{i}")).collect();
        for exec in executors() {
            let tagged = exec.map_tagged(&items, |_, s| Ok(s.len())).unwrap();
            assert_eq!(tagged.len(), items.len());
            let gathered = gather(tagged);
            let expected: Vec<usize> = items.iter().map(String::len).collect();
            assert_eq!(gathered, expected);
        }
    }

    #[test]
    fn error_reports_lowest_index() {
        let items: Vec<usize> = (0..100).collect();
        for exec in executors() {
            let failing = |_: usize, x: &usize| {
                if *x % 30 == 17 {
                    Err(PipelineError::InvalidInput(format!("bad {x}")))
                } else {
                    Ok(*x)
                }
            };
            match exec.map(&items, failing) {
                Err(PipelineError::WorkerFailure { index, reason }) => {
                    assert_eq!(index, 17);
                    assert!(reason.contains("bad 17"));
                }
                other => panic!("expected worker failure, got {other:?}"),
            }
            assert!(matches!(
                exec.map_tagged(&items, failing),
                Err(PipelineError::WorkerFailure { index: 17, .. })
            ));
        }
    }

    #[test]
    fn panic_becomes_worker_failure() {
        let items = vec![1, 2, 3];
        for exec in executors() {
            let result = exec.map(&items, |_, x| {
                if *x == 2 {
                    panic!("boom on {x}");
                }
                Ok(*x)
            });
            match result {
                Err(PipelineError::WorkerFailure { index, reason }) => {
                    assert_eq!(index, 1);
                    assert!(reason.contains("boom on 2"));
                }
                other => panic!("expected worker failure, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_workers_rejected() {
        assert!(matches!(
            ParallelExecutor::new(ExecutionStrategy::Parallel { num_workers: 0 }),
            Err(PipelineError::Executor(_))
        ));
    }

    #[test]
    fn strategy_parses_tagged() {
        let s: ExecutionStrategy =
            serde_json::from_str(r#"{"strategy": "parallel", "num_workers": 3}"#).unwrap();
        assert_eq!(s, ExecutionStrategy::Parallel { num_workers: 3 });
        let s: ExecutionStrategy = serde_json::from_str(r#"{"strategy": "sequential"}"#).unwrap();
        assert_eq!(s.num_workers(), 1);
    }

    #[test]
    fn empty_batch() {
        for exec in executors() {
            let out: Vec<u8> = exec.map(&Vec::<u8>::new(), |_, x| Ok(*x)).unwrap();
            assert!(out.is_empty());
        }
    }
}
