use crate::Timeout;
use types::Block;
use util::timer::Stopwatch;

/// Synchronous register access. Reads and writes never fail; a bus fault is
/// a platform-level event outside the sequencer's model.
pub trait RegisterBus {
    fn read(&mut self, block: Block, offset: u32) -> u32;
    fn write(&mut self, block: Block, offset: u32, value: u32);
}

/// Monotonic microsecond counter that keeps running while the primary
/// controller is suspended.
pub trait Timestamp {
    fn now_us(&self) -> u64;
}

/// Read-modify-write: clear `clear`, then set `set`. Returns the value written.
pub fn modify<B: RegisterBus + ?Sized>(bus: &mut B, block: Block, offset: u32, clear: u32, set: u32) -> u32 {
    let v = (bus.read(block, offset) & !clear) | set;
    bus.write(block, offset, v);
    v
}

/// Poll `done` until it holds or `timeout_us` elapsed. Timeouts are the
/// documented hardware maxima of the signal being waited for.
pub fn poll_until<P, F>(hw: &mut P, timeout_us: u32, mut done: F) -> Result<(), Timeout>
where
    P: Timestamp + ?Sized,
    F: FnMut(&mut P) -> bool,
{
    let mut sw = Stopwatch::new(hw.now_us());
    sw.init_usecs_expire(timeout_us as u64);

    while !sw.expired() {
        if done(hw) {
            return Ok(());
        }
        sw.tick(hw.now_us());
    }

    // the signal may have landed between the last check and the last tick
    if done(hw) {
        Ok(())
    } else {
        Err(Timeout {
            waited_us: sw.duration_us(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct Counter {
        now: Cell<u64>,
        ready_at: u64,
    }

    impl Timestamp for Counter {
        fn now_us(&self) -> u64 {
            let t = self.now.get();
            self.now.set(t + 1);
            t
        }
    }

    #[test]
    fn poll_sees_signal_before_deadline() {
        let mut c = Counter {
            now: Cell::new(0),
            ready_at: 5,
        };
        assert!(poll_until(&mut c, 20, |c| c.now.get() >= c.ready_at).is_ok());
    }

    #[test]
    fn poll_times_out() {
        let mut c = Counter {
            now: Cell::new(0),
            ready_at: 1000,
        };
        let err = poll_until(&mut c, 20, |c| c.now.get() >= c.ready_at).unwrap_err();
        assert!(err.waited_us >= 20);
    }
}
