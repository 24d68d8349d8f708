/// Interval on the platform's monotonic microsecond counter. The counter is
/// supplied by the caller at every tick, so the stopwatch works on any clock.
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    start: u64,
    current: u64,
    expires: u64,
}

impl Stopwatch {
    pub const fn new(now_us: u64) -> Self {
        Self {
            start: now_us,
            current: now_us,
            expires: u64::MAX,
        }
    }

    pub fn init_usecs_expire(&mut self, us: u64) {
        self.expires = self.start.saturating_add(us);
    }

    pub fn tick(&mut self, now_us: u64) {
        self.current = now_us;
    }

    pub fn expired(&self) -> bool {
        self.current >= self.expires
    }

    pub fn duration_us(&self) -> u64 {
        self.current.wrapping_sub(self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::Stopwatch;

    #[test]
    fn expires_after_budget() {
        let mut sw = Stopwatch::new(100);
        sw.init_usecs_expire(10);
        sw.tick(109);
        assert!(!sw.expired());
        sw.tick(110);
        assert!(sw.expired());
        assert_eq!(sw.duration_us(), 10);
    }
}
