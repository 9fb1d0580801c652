use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Instant, Ticker};

use crate::{
    registry::UnitRegistry,
    reporter::{report_changes, ButtonEventChannel},
    scan::{InputState, Polarity, ScanSource},
};

/// Default cycle period.
pub const POLL_PERIOD: Duration = Duration::from_millis(1);

/// Drives scan → update → collect → report on a fixed period.
pub struct Poller<
    'c,
    S: ScanSource<SCAN>,
    M: RawMutex,
    const UNITS: usize,
    const OUTPUTS: usize,
    const SCAN: usize,
    const PS: usize,
> {
    source: S,
    state: InputState<SCAN>,
    registry: UnitRegistry<UNITS, OUTPUTS, SCAN>,
    channel: &'c ButtonEventChannel<M, PS>,
}

impl<
        'c,
        S: ScanSource<SCAN>,
        M: RawMutex,
        const UNITS: usize,
        const OUTPUTS: usize,
        const SCAN: usize,
        const PS: usize,
    > Poller<'c, S, M, UNITS, OUTPUTS, SCAN, PS>
{
    pub fn new(
        source: S,
        polarity: Polarity,
        registry: UnitRegistry<UNITS, OUTPUTS, SCAN>,
        channel: &'c ButtonEventChannel<M, PS>,
    ) -> Self {
        Self {
            source,
            state: InputState::new(polarity),
            registry,
            channel,
        }
    }

    pub fn registry(&self) -> &UnitRegistry<UNITS, OUTPUTS, SCAN> {
        &self.registry
    }

    pub fn state(&self) -> &InputState<SCAN> {
        &self.state
    }

    /// Run one cycle at `now`. Returns the number of events queued.
    pub fn poll(&mut self, now: Instant) -> usize {
        self.source.scan(&mut self.state);
        self.registry.update(&self.state, now);

        let mut sink = self.channel;
        let count = report_changes(self.registry.collect_changes(), &mut sink);
        if count != 0 {
            crate::debug!("{} button events at {}ms", count, now.as_millis());
        }
        count
    }

    /// Poll forever, sampling the clock once per cycle.
    pub async fn run(&mut self, period: Duration) -> ! {
        let mut ticker = Ticker::every(period);
        loop {
            self.poll(Instant::now());
            ticker.next().await;
        }
    }
}

#[cfg(test)]
#[path = "poller_test.rs"]
mod test;
