//! Property-based tests for voting, masking and window invariants.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tmr_ringbuf::RingBuffer;
use tmr_voter::prelude::*;
use tmr_voter::{PairwiseDeviation, vote_masked};

fn reading() -> impl Strategy<Value = Reading> {
    any::<[u16; 3]>().prop_map(Reading::from)
}

proptest! {
    #[test]
    fn test_vote_is_bitwise_majority(r in reading()) {
        let result = majority_vote(r);
        let [a, b, c] = r.samples();
        for bit in 0..16u32 {
            let set = [a, b, c].iter().filter(|v| (**v >> bit) & 1 == 1).count();
            prop_assert_eq!((result >> bit) & 1 == 1, set >= 2, "bit {}", bit);
        }
    }

    #[test]
    fn test_vote_is_symmetric(r in reading()) {
        let [a, b, c] = r.samples();
        let expected = majority_vote(r);
        for permuted in [
            Reading::new(a, c, b),
            Reading::new(b, a, c),
            Reading::new(b, c, a),
            Reading::new(c, a, b),
            Reading::new(c, b, a),
        ] {
            prop_assert_eq!(majority_vote(permuted), expected);
        }
    }

    #[test]
    fn test_single_fault_is_outvoted(good in any::<u16>(), bad in any::<u16>(), slot in 0usize..3) {
        let mut samples = [good; 3];
        if let Some(s) = samples.get_mut(slot) {
            *s = bad;
        }
        prop_assert_eq!(majority_vote(Reading::from(samples)), good);
    }

    #[test]
    fn test_bits_outside_mask_never_matter(
        r in reading(),
        noise in any::<[u16; 3]>(),
        mask in any::<u16>(),
    ) {
        let [a, b, c] = r.samples();
        let [x, y, z] = noise;
        let disturbed = Reading::new(a ^ (x & !mask), b ^ (y & !mask), c ^ (z & !mask));

        let (masked, result) = vote_masked(r, mask);
        let (masked_disturbed, result_disturbed) = vote_masked(disturbed, mask);
        prop_assert_eq!(masked, masked_disturbed);
        prop_assert_eq!(result, result_disturbed);
        prop_assert_eq!(result & !mask, 0);
    }

    #[test]
    fn test_masking_is_idempotent(r in reading(), mask in any::<u16>()) {
        let once = r.masked(mask);
        prop_assert_eq!(once.masked(mask), once);
    }

    #[test]
    fn test_classification_matches_deviation_rules(r in reading(), threshold in 0u16..64) {
        let deviation = PairwiseDeviation::of(r);
        let state = classify(r, threshold);
        match state {
            SystemState::AllSensorsOk => prop_assert!(deviation.all_within(threshold)),
            SystemState::CriticalError => {
                prop_assert!(!deviation.all_within(threshold));
                prop_assert!(deviation.all_at_least(threshold));
            }
            SystemState::OneSensorFail => {
                prop_assert!(!deviation.all_within(threshold));
                prop_assert!(!deviation.all_at_least(threshold));
            }
        }
    }

    #[test]
    fn test_window_counts_only_valid_payloads(
        sizes in prop::collection::vec(prop_oneof![4 => Just(READING_SIZE), 1 => 0usize..12], 1..60),
        window_len in 1u32..8,
    ) {
        let sensors = Arc::new(RingBuffer::for_items(64, 12).map_err(|e| TestCaseError::fail(e.to_string()))?);
        let monitor = Arc::new(RingBuffer::for_items(64, RESULT_SIZE).map_err(|e| TestCaseError::fail(e.to_string()))?);
        let log = Arc::new(TransitionLog::with_capacity(64));
        let config = VoterConfig {
            window_len,
            receive_timeout_ms: 5,
            send_timeout_ms: 5,
            ..VoterConfig::default()
        };
        let mut voter = Voter::new(config, Arc::clone(&sensors), Arc::clone(&monitor), Arc::clone(&log))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        for size in &sizes {
            sensors
                .send(&vec![0x11; *size], Duration::from_millis(5))
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            voter.poll_once();
        }

        let valid = sizes.iter().filter(|s| **s == READING_SIZE).count() as u64;
        let stats = voter.stats();
        prop_assert_eq!(stats.voted, valid);
        prop_assert_eq!(stats.classifications(), valid / u64::from(window_len));
        prop_assert_eq!(log.len() as u64, valid / u64::from(window_len));
        prop_assert_eq!(u64::from(voter.window_position()), valid % u64::from(window_len));
        prop_assert_eq!(sensors.outstanding(), 0);
        prop_assert_eq!(sensors.stats().returned, sizes.len() as u64);
    }
}
