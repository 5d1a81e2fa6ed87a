use std::time::SystemTime;

use crate::proto;

/// Most of the tracked values are durations, negative numbers are not expected.
const LOWEST_TRACKABLE: f64 = 0.0;
/// 2^30 = 1073741824
const HIGHEST_TRACKABLE: f64 = (1u32 << 30) as f64;

/// `2^K` is the power of two closest to `10^2`.
const K: u32 = 7;
/// Below this every integer gets its own bucket.
const LINEAR_LIMIT: u32 = 1 << (K + 1);

const MIN_RESOLUTION: f64 = 1.0;
const SIGNIFICANT_DIGITS: u32 = 2;

/// Summary of the values of a trend time series.
///
/// Values in `[0, 2^30]` land in buckets keeping two significant digits,
/// anything else only bumps the extra-low or extra-high counter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    buckets: Vec<u32>,
    first_not_zero_bucket: u32,
    last_not_zero_bucket: u32,
    extra_low_bucket: u32,
    extra_high_bucket: u32,
    min: f64,
    max: f64,
    sum: f64,
    count: u32,
}
impl Histogram {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let mut h = Self::default();
        for value in values {
            h.add(value);
        }
        h.trim_zeros();
        h
    }

    fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;

        if value > HIGHEST_TRACKABLE {
            self.extra_high_bucket += 1;
            return;
        }
        // NaN fails every comparison and lands here as well.
        if !(value >= LOWEST_TRACKABLE) {
            self.extra_low_bucket += 1;
            return;
        }

        let index = resolve_bucket_index(value);
        if self.buckets.is_empty() {
            self.first_not_zero_bucket = index;
            self.last_not_zero_bucket = index;
        } else {
            self.first_not_zero_bucket = self.first_not_zero_bucket.min(index);
            self.last_not_zero_bucket = self.last_not_zero_bucket.max(index);
        }

        let index = index as usize;
        if index >= self.buckets.len() {
            self.buckets.resize(index + 1, 0);
        }
        self.buckets[index] += 1;
    }

    /// Keeps only `[first_not_zero_bucket, last_not_zero_bucket]`.
    fn trim_zeros(&mut self) {
        if self.buckets.is_empty() {
            return;
        }
        self.buckets.truncate(self.last_not_zero_bucket as usize + 1);
        self.buckets.drain(..self.first_not_zero_bucket as usize);
    }

    /// Counters starting at [`Self::first_not_zero_bucket`].
    pub fn buckets(&self) -> &[u32] {
        &self.buckets
    }
    pub fn first_not_zero_bucket(&self) -> u32 {
        self.first_not_zero_bucket
    }
    pub fn last_not_zero_bucket(&self) -> u32 {
        self.last_not_zero_bucket
    }
    pub fn extra_low_bucket(&self) -> u32 {
        self.extra_low_bucket
    }
    pub fn extra_high_bucket(&self) -> u32 {
        self.extra_high_bucket
    }
    pub fn min(&self) -> f64 {
        self.min
    }
    pub fn max(&self) -> f64 {
        self.max
    }
    pub fn sum(&self) -> f64 {
        self.sum
    }
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn to_proto(&self, time: SystemTime) -> proto::TrendHdrValue {
        proto::TrendHdrValue {
            time: Some(time.into()),
            counters: self.buckets.clone(),
            lower_counter_index: self.first_not_zero_bucket,
            min_resolution: MIN_RESOLUTION,
            significant_digits: SIGNIFICANT_DIGITS,
            min_value: self.min,
            max_value: self.max,
            sum: self.sum,
            count: self.count,
            extra_low_values_counter: (self.extra_low_bucket > 0)
                .then_some(self.extra_low_bucket),
            extra_high_values_counter: (self.extra_high_bucket > 0)
                .then_some(self.extra_high_bucket),
        }
    }
}

/// Absolute bucket index of a value in `[0, 2^30]`.
///
/// Values under 256 map to their ceiling. Above that, with
/// `n = floor(log2(u >> k))` the major bucket is `n - k + 1` and the sub
/// bucket `(u >> (n - k)) - 2^k`, which simplifies to `(n << k) + (u >> n)`
/// once expressed relative to the shifted value.
pub fn resolve_bucket_index(value: f64) -> u32 {
    if !(value > LOWEST_TRACKABLE) {
        return 0;
    }
    let upscaled = value.min(HIGHEST_TRACKABLE).ceil() as u32;
    if upscaled < LINEAR_LIMIT {
        return upscaled;
    }
    let n = (upscaled >> K).ilog2();
    (n << K) + (upscaled >> n)
}
