//! Property-based tests for sdrflow-core streaming primitives.
//!
//! Tests sample-ring FIFO order and admission atomicity, and the
//! range/step invariant of block parameters, using proptest for
//! randomized input generation.

use proptest::prelude::*;
use sdrflow_core::{BlockParameter, FlowError, SampleBuffer};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Pushes whose cumulative size never exceeds capacity are all accepted,
    /// and every sample comes back out exactly once, in order.
    #[test]
    fn pushes_within_capacity_drain_in_order(
        chunks in prop::collection::vec(prop::collection::vec(any::<i8>(), 1..32), 1..16),
    ) {
        let total: usize = chunks.iter().map(Vec::len).sum();
        let (mut writer, mut reader) = SampleBuffer::with_capacity(total);

        for chunk in &chunks {
            prop_assert!(writer.try_write(chunk).is_ok());
        }
        prop_assert_eq!(reader.len(), total);

        let mut drained = vec![0i8; total];
        prop_assert!(reader.read_window(&mut drained));
        let expected: Vec<i8> = chunks.concat();
        prop_assert_eq!(drained, expected);
        prop_assert!(reader.is_empty());
    }

    /// A chunk larger than the remaining free space is rejected and leaves
    /// the buffered content exactly as it was.
    #[test]
    fn oversized_push_is_atomic(
        capacity in 1usize..256,
        prefill in prop::collection::vec(any::<i8>(), 0..256),
        extra in 1usize..64,
    ) {
        let prefill: Vec<i8> = prefill.into_iter().take(capacity).collect();
        let (mut writer, mut reader) = SampleBuffer::with_capacity(capacity);
        if !prefill.is_empty() {
            writer.try_write(&prefill).unwrap();
        }

        let free = capacity - prefill.len();
        let oversized = vec![42i8; free + extra];
        let err = writer.try_write(&oversized).unwrap_err();
        prop_assert_eq!(err, FlowError::AdmissionRejected { requested: free + extra, free });

        prop_assert_eq!(reader.len(), prefill.len());
        let mut drained = vec![0i8; prefill.len()];
        prop_assert!(reader.read_window(&mut drained));
        prop_assert_eq!(drained, prefill);
    }

    /// Interleaved writes and window reads preserve global FIFO order
    /// across ring wraparound.
    #[test]
    fn interleaved_windows_stay_fifo(
        window in 1usize..16,
        rounds in 1usize..40,
    ) {
        let (mut writer, mut reader) = SampleBuffer::with_capacity(window * 2 + 1);
        let mut next: i32 = 0;
        let mut expected: i32 = 0;
        let mut buf = vec![0i8; window];

        for _ in 0..rounds {
            let chunk: Vec<i8> = (0..window).map(|i| ((next + i as i32) % 128) as i8).collect();
            writer.try_write(&chunk).unwrap();
            next += window as i32;

            prop_assert!(reader.read_window(&mut buf));
            for &s in &buf {
                prop_assert_eq!(i32::from(s), expected % 128);
                expected += 1;
            }
        }
    }

    /// Any accepted value lands inside the range and on the step grid.
    #[test]
    fn parameter_values_stay_on_grid(
        min in -1000.0f64..1000.0,
        span in 0.0f64..5000.0,
        step in 0.01f64..50.0,
        requests in prop::collection::vec(-7000.0f64..7000.0, 1..32),
    ) {
        let max = min + span;
        let mut param = BlockParameter::new("p", min, max, step, min).unwrap();

        for value in requests {
            let before = param.value();
            match param.set(value) {
                Ok(stored) => {
                    prop_assert!(stored >= min - 1e-9 && stored <= max + 1e-9);
                    let steps = (stored - min) / step;
                    prop_assert!((steps - steps.round()).abs() < 1e-6);
                    prop_assert!(param.accepts(stored));
                }
                Err(_) => {
                    prop_assert!(value < min || value > max);
                    prop_assert_eq!(param.value(), before);
                }
            }
        }
    }
}
