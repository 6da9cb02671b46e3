use std::{env, net::IpAddr, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn http_host() -> IpAddr {
    env::var("GAME_SERVER_HOST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}

pub fn http_port() -> u16 {
    env::var("GAME_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

/// Simulation and snapshot rate in Hz.
pub fn tick_rate() -> u32 {
    env::var("TICK_RATE")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|rate| (1..=MAX_TICK_RATE).contains(rate))
        .unwrap_or(DEFAULT_TICK_RATE)
}

/// Fixed seed for the world RNG; unset means a fresh layout every start.
pub fn world_seed() -> Option<u64> {
    env::var("WORLD_SEED").ok().and_then(|v| v.parse().ok())
}

pub fn tick_interval(tick_rate: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(tick_rate.max(1)))
}

pub const DEFAULT_TICK_RATE: u32 = 60;
pub const MAX_TICK_RATE: u32 = 240;

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const OUTBOX_CAPACITY: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_tick_rate_is_sixty_then_interval_is_about_sixteen_millis() {
        let interval = tick_interval(60);
        assert_eq!(interval.as_millis(), 16);
        assert_eq!(tick_interval(0), Duration::from_secs(1));
    }
}
