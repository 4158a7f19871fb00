use crate::core::prelude::*;

use std::hash::Hash;
use tracing_subscriber::fmt::time::OffsetTime;

pub mod assert;
pub mod collision;
pub mod colour;
pub mod linalg;
pub mod log;

pub mod gg_iter {
    pub trait GgFloatIter: Iterator<Item = f32> {
        /// Returns the "obvious" max, with the following caveats:
        /// - if any input is NaN, returns the first NaN encountered;
        /// - +0.0 vs. -0.0 is handled nondeterministically, see `f32::max()`.
        fn max_f32(self) -> Option<f32>
        where
            Self: Sized,
        {
            self.fold(None, |max, x| {
                if max.is_some_and(f32::is_nan) {
                    return max;
                }
                if x.is_nan() {
                    return Some(x);
                }
                match max {
                    None => Some(x),
                    Some(m) => Some(m.max(x)),
                }
            })
        }
        fn min_f32(self) -> Option<f32>
        where
            Self: Sized,
        {
            self.fold(None, |min, x| {
                if min.is_some_and(f32::is_nan) {
                    return min;
                }
                if x.is_nan() {
                    return Some(x);
                }
                match min {
                    None => Some(x),
                    Some(m) => Some(m.min(x)),
                }
            })
        }
    }

    impl<T: Iterator<Item = f32>> GgFloatIter for T {}
}

pub mod gg_err {
    use anyhow::Result;
    use tracing::error;

    fn log_error(e: &anyhow::Error) {
        error!("{}", e);
        e.chain()
            .skip(1)
            .for_each(|cause| error!("caused by: {}", cause));
    }

    pub fn log_err_and_ignore<T>(result: Result<T>) {
        if let Err(e) = result {
            log_error(&e);
        }
    }

    pub fn log_and_ok<T>(result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                log_error(&e);
                None
            }
        }
    }
}

pub mod gg_float {
    use num_traits::Zero;
    use std::num::FpCategory;

    pub fn is_finite(x: f32) -> bool {
        matches!(x.classify(), FpCategory::Zero | FpCategory::Normal)
    }

    pub fn sign_zero(x: f32) -> f32 {
        if x.is_zero() { 0.0 } else { x.signum() }
    }

    /// Moves `x` towards `target` by at most `step`, without overshooting.
    pub fn approach(x: f32, target: f32, step: f32) -> f32 {
        if x < target {
            (x + step).min(target)
        } else {
            (x - step).max(target)
        }
    }
}

pub mod gg_range {
    use std::ops::Range;

    /// Strict overlap: ranges that merely touch do not overlap.
    pub fn overlaps_f32(r1: &Range<f32>, r2: &Range<f32>) -> bool {
        r1.end > r2.start && r2.end > r1.start
    }
}

#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct UnorderedPair<T: Copy + Clone + Ord + PartialOrd + Eq + PartialEq>(T, T);
impl<T: Copy + Clone + Ord + PartialOrd + Eq + PartialEq> UnorderedPair<T> {
    pub fn new(a: T, b: T) -> Self {
        if a < b { Self(a, b) } else { Self(b, a) }
    }

    pub fn fst(&self) -> T {
        self.0
    }
    pub fn snd(&self) -> T {
        self.1
    }
    pub fn contains(&self, value: T) -> bool {
        self.fst() == value || self.snd() == value
    }
}

impl<T: Copy + Clone + Ord + PartialOrd + Eq + PartialEq + Hash> From<(T, T)> for UnorderedPair<T> {
    fn from(value: (T, T)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// Where [`setup_log`] sends its output.
pub enum LogTarget<'a> {
    Stderr,
    File(&'a str),
}

/// Installs the global `tracing` subscriber. Fails if one is already installed.
pub fn setup_log(target: LogTarget<'_>) -> Result<()> {
    let timer = OffsetTime::new(
        time::UtcOffset::UTC,
        time::macros::format_description!("[hour]:[minute]:[second].[subsecond digits:6]"),
    );
    let builder = tracing_subscriber::fmt().event_format(
        tracing_subscriber::fmt::format()
            .with_target(false)
            .with_source_location(true)
            .with_timer(timer),
    );
    match target {
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow!("could not install log subscriber: {e}"))?,
        LogTarget::File(path) => {
            let logfile = std::fs::OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(path)
                .with_context(|| format!("could not open log file {path}"))?;
            builder
                .with_writer(logfile)
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow!("could not install log subscriber: {e}"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::gg_iter::GgFloatIter;
    use super::*;

    #[test]
    fn unordered_pair_is_order_independent() {
        assert_eq!(UnorderedPair::new(3, 1), UnorderedPair::new(1, 3));
        assert_eq!(UnorderedPair::new(3, 1).fst(), 1);
        assert!(UnorderedPair::from((5, 7)).contains(7));
    }

    #[test]
    fn range_overlap_is_strict() {
        assert!(!gg_range::overlaps_f32(&(0.0..1.0), &(1.0..2.0)));
        assert!(gg_range::overlaps_f32(&(0.0..1.0), &(0.99..2.0)));
        assert!(gg_range::overlaps_f32(&(0.0..4.0), &(1.0..2.0)));
    }

    #[test]
    fn float_iter_extrema() {
        assert_eq!([3.0, -1.0, 2.0].into_iter().max_f32(), Some(3.0));
        assert_eq!([3.0, -1.0, 2.0].into_iter().min_f32(), Some(-1.0));
        assert_eq!(std::iter::empty::<f32>().max_f32(), None);
        assert!([1.0, f32::NAN, 5.0].into_iter().max_f32().unwrap().is_nan());
    }

    #[test]
    fn float_helpers() {
        assert_eq!(gg_float::sign_zero(-0.0), 0.0);
        assert_eq!(gg_float::sign_zero(-3.0), -1.0);
        assert_eq!(gg_float::approach(0.0, 1.0, 0.25), 0.25);
        assert_eq!(gg_float::approach(0.9, 1.0, 0.25), 1.0);
        assert_eq!(gg_float::approach(-0.5, -1.0, 0.25), -0.75);
        assert!(!gg_float::is_finite(f32::NAN));
        assert!(gg_float::is_finite(0.0));
    }
}
