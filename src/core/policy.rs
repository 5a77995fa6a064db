//! Sampling policy: when does a measurement become a new coefficient?
//!
//! Each curve instance owns one policy. On every single-sample `extend` the
//! policy either appends a fresh coefficient or merges the sample into the
//! most recently added one, so that `minimum_measurements` consecutive
//! samples share a single coefficient slot (the slot keeps the latest
//! sample's time and value). Multi-sample batches bypass the policy entirely
//! and are inserted one coefficient per sample.
//!
//! The policy talks to the curve's [`CoefficientManager`] through its public
//! interface only; it holds no handle into curve internals.

use tracing::debug;

use crate::core::manager::CoefficientManager;
use crate::core::{Key, Time};
use crate::error::{CurveError, CurveResult};

/// Construction parameters for a [`SamplingPolicy`].
#[derive(Clone, Copy, Debug)]
pub struct SamplingPolicyConfig {
    /// How many consecutive extend calls share one coefficient slot
    pub minimum_measurements: usize,
    /// Minimum elapsed time before a new coefficient may be created
    pub min_sampling_period: Time,
}

impl Default for SamplingPolicyConfig {
    fn default() -> Self {
        SamplingPolicyConfig {
            minimum_measurements: 1,
            min_sampling_period: 0,
        }
    }
}

/// Stateful insert/append/merge decision procedure for `extend`.
#[derive(Clone, Debug)]
pub struct SamplingPolicy {
    minimum_measurements: usize,
    min_sampling_period: Time,
    measurements_since_last_extend: usize,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self::from_config(SamplingPolicyConfig::default())
    }
}

impl SamplingPolicy {
    /// Create a policy with the given measurement ratio and sampling period.
    pub fn new(minimum_measurements: usize, min_sampling_period: Time) -> Self {
        SamplingPolicy {
            minimum_measurements,
            min_sampling_period,
            measurements_since_last_extend: 0,
        }
    }

    /// Create a policy from a config struct.
    pub fn from_config(config: SamplingPolicyConfig) -> Self {
        Self::new(config.minimum_measurements, config.min_sampling_period)
    }

    /// Set the sampling ratio, e.g. 4 will add a coefficient every 4 extends.
    pub fn set_minimum_measurements(&mut self, ratio: usize) {
        self.minimum_measurements = ratio;
    }

    /// Set the minimum sampling period.
    ///
    /// Recorded on the policy but currently advisory; the batch extension
    /// path does not honor it.
    pub fn set_min_sampling_period(&mut self, period: Time) {
        self.min_sampling_period = period;
    }

    /// Current sampling ratio.
    pub fn minimum_measurements(&self) -> usize {
        self.minimum_measurements
    }

    /// Current minimum sampling period.
    pub fn min_sampling_period(&self) -> Time {
        self.min_sampling_period
    }

    /// Measurements absorbed by the current coefficient slot so far.
    pub fn measurements_since_last_extend(&self) -> usize {
        self.measurements_since_last_extend
    }

    /// Reset the running measurement counter. Called by curve `clear()`.
    pub fn reset(&mut self) {
        self.measurements_since_last_extend = 0;
    }

    /// Apply the extend decision table to a batch of (time, value) samples.
    ///
    /// Decision table, in order:
    /// 1. More than one sample: bypass the policy, batch-insert one
    ///    coefficient per sample.
    /// 2. Empty curve: insert the very first coefficient (bootstrap, not
    ///    counted).
    /// 3. `minimum_measurements == 1`: insert (bootstrap) at size 1, append
    ///    at the end otherwise. No counting.
    /// 4. Otherwise every sample ticks the measurement counter. At size 1
    ///    the sample is inserted (bootstrap) and starts the second slot's
    ///    cycle; afterwards the first sample of each cycle appends a
    ///    coefficient and the remaining samples overwrite the most recently
    ///    added one. The counter resets once it reaches
    ///    `minimum_measurements`, so the next sample starts a fresh slot.
    pub fn extend<C: Clone>(
        &mut self,
        times: &[Time],
        values: &[C],
        manager: &mut CoefficientManager<C>,
    ) -> CurveResult<Vec<Key>> {
        if times.len() != values.len() {
            return Err(CurveError::MismatchedLengths {
                times: times.len(),
                values: values.len(),
            });
        }
        if times.is_empty() {
            return Ok(Vec::new());
        }

        // TODO: honor min_sampling_period when extending with multiple
        // samples at once; the batch path currently bypasses it.
        if times.len() != 1 {
            return manager.insert_coefficients(times, values);
        }

        if manager.is_empty() {
            return manager.insert_coefficients(times, values);
        }

        if self.minimum_measurements <= 1 {
            if manager.size() == 1 {
                return manager.insert_coefficients(times, values);
            }
            let key = manager.add_coefficient_at_end(times[0], values[0].clone())?;
            return Ok(vec![key]);
        }

        self.measurements_since_last_extend += 1;

        let key = if manager.size() == 1 {
            let keys = manager.insert_coefficients(times, values)?;
            keys.into_iter().next().ok_or(CurveError::EmptyCurve)?
        } else if self.measurements_since_last_extend == 1 {
            manager.add_coefficient_at_end(times[0], values[0].clone())?
        } else {
            let key = manager.last().ok_or(CurveError::EmptyCurve)?.key;
            manager.modify_coefficient(key, times[0], values[0].clone())?;
            debug!(%key, time = times[0], "merged measurement into last coefficient");
            key
        };

        if self.measurements_since_last_extend >= self.minimum_measurements {
            self.measurements_since_last_extend = 0;
        }
        Ok(vec![key])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extend_one(
        policy: &mut SamplingPolicy,
        manager: &mut CoefficientManager<f64>,
        time: Time,
        value: f64,
    ) -> Vec<Key> {
        policy.extend(&[time], &[value], manager).unwrap()
    }

    #[test]
    fn test_bootstrap_always_inserts() {
        let mut policy = SamplingPolicy::new(3, 0);
        let mut manager = CoefficientManager::new();
        extend_one(&mut policy, &mut manager, 0, 0.0);
        assert_eq!(manager.size(), 1);
        extend_one(&mut policy, &mut manager, 10, 1.0);
        assert_eq!(manager.size(), 2);
    }

    #[test]
    fn test_ratio_one_appends_every_call() {
        let mut policy = SamplingPolicy::new(1, 0);
        let mut manager = CoefficientManager::new();
        for (i, time) in [0, 10, 20, 30].into_iter().enumerate() {
            extend_one(&mut policy, &mut manager, time, i as f64);
        }
        assert_eq!(manager.size(), 4);
    }

    #[test]
    fn test_ratio_three_slot_cadence_from_single_coefficient() {
        // Ratio 3, starting from one coefficient: the first call creates the
        // second slot, the next two overwrite it, and a third coefficient
        // appears only with the fourth call.
        let mut policy = SamplingPolicy::new(3, 0);
        let mut manager = CoefficientManager::new();
        manager.insert_coefficients(&[0], &[0.0]).unwrap();

        extend_one(&mut policy, &mut manager, 10, 1.0);
        assert_eq!(manager.size(), 2);
        extend_one(&mut policy, &mut manager, 20, 2.0);
        assert_eq!(manager.size(), 2);
        assert_eq!(manager.back_time().unwrap(), 20);
        extend_one(&mut policy, &mut manager, 30, 3.0);
        assert_eq!(manager.size(), 2);
        assert_eq!(manager.back_time().unwrap(), 30);

        extend_one(&mut policy, &mut manager, 40, 4.0);
        assert_eq!(manager.size(), 3);
    }

    #[test]
    fn test_ratio_three_slot_cadence_from_empty() {
        let mut policy = SamplingPolicy::new(3, 0);
        let mut manager = CoefficientManager::new();

        let sizes: Vec<usize> = [0, 10, 20, 30, 40, 50]
            .into_iter()
            .enumerate()
            .map(|(i, time)| {
                extend_one(&mut policy, &mut manager, time, i as f64);
                manager.size()
            })
            .collect();
        // The first coefficient is the uncounted bootstrap; every later slot
        // absorbs three measurements.
        assert_eq!(sizes, vec![1, 2, 2, 2, 3, 3]);
    }

    #[test]
    fn test_merge_keeps_latest_value_and_key() {
        let mut policy = SamplingPolicy::new(2, 0);
        let mut manager = CoefficientManager::new();
        extend_one(&mut policy, &mut manager, 0, 0.0);

        // Slot 2 is created by the first counted measurement and absorbs the
        // second one, keeping the latest time and value under the same key.
        let appended = extend_one(&mut policy, &mut manager, 10, 1.0);
        let merged = extend_one(&mut policy, &mut manager, 20, 2.0);
        assert_eq!(appended, merged);
        assert_eq!(manager.size(), 2);
        assert_eq!(*manager.coefficient_by_key(merged[0]).unwrap(), 2.0);
        assert_eq!(manager.time_at_key(merged[0]).unwrap(), 20);

        let next = extend_one(&mut policy, &mut manager, 30, 3.0);
        assert_ne!(next, merged);
        assert_eq!(manager.size(), 3);
    }

    #[test]
    fn test_batch_bypasses_policy() {
        let mut policy = SamplingPolicy::new(3, 1_000);
        let mut manager = CoefficientManager::new();
        extend_one(&mut policy, &mut manager, 0, 0.0);
        extend_one(&mut policy, &mut manager, 10, 1.0);

        let keys = policy
            .extend(&[20, 21, 22], &[2.0, 2.1, 2.2], &mut manager)
            .unwrap();
        assert_eq!(keys.len(), 3);
        assert_eq!(manager.size(), 5);
        // The running counter is untouched by the batch path.
        assert_eq!(policy.measurements_since_last_extend(), 0);
    }

    #[test]
    fn test_reset_restarts_cycle() {
        let mut policy = SamplingPolicy::new(3, 0);
        let mut manager = CoefficientManager::new();
        for (i, time) in [0, 10, 20, 30, 40].into_iter().enumerate() {
            extend_one(&mut policy, &mut manager, time, i as f64);
        }
        assert_eq!(manager.size(), 3);
        assert_eq!(policy.measurements_since_last_extend(), 1);

        // Without the reset this measurement would merge into slot 3.
        policy.reset();
        extend_one(&mut policy, &mut manager, 50, 5.0);
        assert_eq!(manager.size(), 4);
    }
}
