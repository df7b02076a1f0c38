//! Mock operations and observers for retry tests

// Test doubles panic on misuse; the failing test reports it.
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use crate::resilience::{AttemptObserver, AttemptRecord};

type Script<T, E> = Arc<Mutex<VecDeque<Result<T, E>>>>;

/// Operation that replays a fixed script of results.
///
/// Each call consumes the next scripted result; once a single result is left
/// it is repeated forever, so `ScriptedOperation::new([Err(503)])` fails on
/// every call.
#[derive(Debug)]
pub struct ScriptedOperation<T, E> {
    script: Script<T, E>,
    calls: Arc<AtomicU32>,
    call_times: Arc<Mutex<Vec<Instant>>>,
}

impl<T, E> Clone for ScriptedOperation<T, E> {
    fn clone(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
            calls: Arc::clone(&self.calls),
            call_times: Arc::clone(&self.call_times),
        }
    }
}

impl<T: Clone, E: Clone> ScriptedOperation<T, E> {
    /// Create an operation from its results, in call order. The script must
    /// not be empty.
    pub fn new<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<T, E>>,
    {
        let script: VecDeque<_> = results.into_iter().collect();
        assert!(!script.is_empty(), "scripted operation needs at least one result");
        Self {
            script: Arc::new(Mutex::new(script)),
            calls: Arc::new(AtomicU32::new(0)),
            call_times: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Operation failing with `error` on every call.
    pub fn always_failing(error: E) -> Self {
        Self::new([Err(error)])
    }

    /// Invoke the operation once.
    pub async fn call(&self) -> Result<T, E> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().expect("call log poisoned").push(Instant::now());

        let mut script = self.script.lock().expect("script poisoned");
        if script.len() > 1 {
            script.pop_front().expect("script has more than one entry")
        } else {
            script.front().cloned().expect("script is never empty")
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Instants at which each call started (tokio clock, so paused-time
    /// tests see virtual time).
    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().expect("call log poisoned").clone()
    }
}

/// Observer that keeps every [`AttemptRecord`] it is given.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    records: Arc<Mutex<Vec<AttemptRecord>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AttemptRecord> {
        self.records.lock().expect("records poisoned").clone()
    }

    /// Attempt numbers in the order they were observed.
    pub fn attempts(&self) -> Vec<u32> {
        self.records().iter().map(|record| record.attempt).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("records poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttemptObserver for RecordingObserver {
    fn on_attempt(&self, record: &AttemptRecord) {
        self.records.lock().expect("records poisoned").push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates `ScriptedOperation::new` behavior for the replay scenario.
    ///
    /// Assertions:
    /// - Confirms results come back in script order.
    /// - Confirms the last result repeats once the script runs out.
    /// - Confirms `calls()` counts every invocation, clones included.
    #[tokio::test]
    async fn test_scripted_operation_replays_then_repeats_last() {
        let operation = ScriptedOperation::new([Err(503u16), Ok("OK")]);
        let clone = operation.clone();

        assert_eq!(operation.call().await, Err(503));
        assert_eq!(clone.call().await, Ok("OK"));
        assert_eq!(operation.call().await, Ok("OK"));
        assert_eq!(operation.calls(), 3);
        assert_eq!(operation.call_times().len(), 3);
    }

    #[tokio::test]
    async fn test_always_failing() {
        let operation = ScriptedOperation::<(), u16>::always_failing(503);

        for _ in 0..4 {
            assert_eq!(operation.call().await, Err(503));
        }
        assert_eq!(operation.calls(), 4);
    }

    #[test]
    #[should_panic(expected = "at least one result")]
    fn test_empty_script_panics() {
        let _ = ScriptedOperation::<(), u16>::new([]);
    }
}
