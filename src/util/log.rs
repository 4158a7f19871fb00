use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};
use std::time::Instant;

pub static LAST_LOG: LazyLock<Mutex<HashMap<String, Instant>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Returns true at most once every `seconds` for a given call site.
pub fn should_log(loc: &str, seconds: u64) -> bool {
    let Ok(mut last_log) = LAST_LOG.lock() else {
        return true;
    };
    if last_log
        .get(loc)
        .map_or(true, |then| then.elapsed().as_secs() >= seconds)
    {
        last_log.insert(loc.to_string(), Instant::now());
        true
    } else {
        false
    }
}

#[macro_export]
macro_rules! info_every_seconds {
    ($seconds:expr, $($args:expr),+) => {
        if $crate::util::log::should_log(&format!("{}:{}", file!(), line!()), $seconds) {
            $crate::core::prelude::info!($($args),+);
        }
    }
}
#[macro_export]
macro_rules! warn_every_seconds {
    ($seconds:expr, $($args:expr),+) => {
        if $crate::util::log::should_log(&format!("{}:{}", file!(), line!()), $seconds) {
            $crate::core::prelude::warn!($($args),+);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_log_rate_limits_per_location() {
        assert!(should_log("log.rs:test-a", 60));
        assert!(!should_log("log.rs:test-a", 60));
        assert!(should_log("log.rs:test-b", 60));
        assert!(should_log("log.rs:test-c", 0));
        assert!(should_log("log.rs:test-c", 0));
    }
}
