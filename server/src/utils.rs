use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Wall clock in milliseconds since the Unix epoch. All gameplay timers
/// (respawn, invincibility, fire cooldown) are expressed on this clock.
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_monotonic_enough() {
        let first = get_timestamp();
        std::thread::sleep(Duration::from_millis(2));
        let second = get_timestamp();
        assert!(second > first);
    }
}
