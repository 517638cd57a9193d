//! Keyframe tracks: binary search plus per-channel interpolation
//!
//! Positions and scales interpolate linearly; rotations use shortest-arc
//! quaternion slerp. Sampling clamps at both ends and never extrapolates.

use glam::{Quat, Vec3};

/// A value that can be blended between two keyframes.
pub trait Interpolate: Copy {
    /// Blend from `self` to `other` by `t` in `[0, 1]`.
    fn interpolate(self, other: Self, t: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(self, other: Self, t: f32) -> Self {
        self.lerp(other, t)
    }
}

impl Interpolate for Quat {
    /// Shortest-arc slerp. `glam` flips `other` when the dot product is
    /// negative and falls back to normalized lerp for nearly equal inputs.
    fn interpolate(self, other: Self, t: f32) -> Self {
        self.slerp(other, t)
    }
}

/// A value at a point in clip time (ticks)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeSample<T> {
    pub value: T,
    pub timestamp: f64,
}

impl<T> KeyframeSample<T> {
    pub fn new(timestamp: f64, value: T) -> Self {
        Self { value, timestamp }
    }
}

/// Ordered samples for one channel of one bone.
///
/// Timestamps must be non-decreasing in storage order; the track does not
/// sort. `rest` is returned when the track has no samples.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T> {
    samples: Vec<KeyframeSample<T>>,
    rest: T,
}

impl KeyframeTrack<Vec3> {
    /// Position channel; rests at the origin.
    pub fn positions(samples: Vec<KeyframeSample<Vec3>>) -> Self {
        Self::new(samples, Vec3::ZERO)
    }

    /// Scale channel; rests at unit scale.
    pub fn scales(samples: Vec<KeyframeSample<Vec3>>) -> Self {
        Self::new(samples, Vec3::ONE)
    }
}

impl KeyframeTrack<Quat> {
    /// Rotation channel; rests at identity.
    pub fn rotations(samples: Vec<KeyframeSample<Quat>>) -> Self {
        Self::new(samples, Quat::IDENTITY)
    }
}

impl<T: Interpolate> KeyframeTrack<T> {
    pub fn new(samples: Vec<KeyframeSample<T>>, rest: T) -> Self {
        Self { samples, rest }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<f64> {
        self.samples.first().map(|s| s.timestamp)
    }

    /// Timestamp of the last sample
    pub fn end_time(&self) -> Option<f64> {
        self.samples.last().map(|s| s.timestamp)
    }

    /// Index of the sample that starts the interval containing `time`:
    /// the largest index whose timestamp is `<= time`.
    ///
    /// Times before the first sample map to 0.
    pub fn interval_index(&self, time: f64) -> usize {
        self.samples
            .partition_point(|s| s.timestamp <= time)
            .saturating_sub(1)
    }

    /// Sample the track at `time`, clamping outside the keyed range.
    ///
    /// When two samples share a timestamp, a time equal to it returns the
    /// later one and interpolation continues from there; the zero-length
    /// interval between them is never sampled. The `span <= 0` guard below
    /// only fires for out-of-order input.
    pub fn sample_at(&self, time: f64) -> T {
        let samples = &self.samples;

        let (first, last) = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return self.rest,
        };

        // Before first keyframe (or NaN): clamp to first value
        if time.is_nan() || time <= first.timestamp {
            return first.value;
        }

        // After last keyframe: clamp to last value
        if time >= last.timestamp {
            return last.value;
        }

        // first.timestamp < time < last.timestamp, so i + 1 is in bounds
        let i = self.interval_index(time);
        let prev = &samples[i];
        let next = &samples[i + 1];

        if time == prev.timestamp {
            return prev.value;
        }

        let span = next.timestamp - prev.timestamp;
        if span <= 0.0 {
            return prev.value;
        }
        let t = ((time - prev.timestamp) / span) as f32;

        prev.value.interpolate(next.value, t)
    }
}
