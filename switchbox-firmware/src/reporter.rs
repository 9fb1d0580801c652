use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Channel};

use crate::button::Delta;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    Press(u16),
    Release(u16),
}

impl ButtonEvent {
    pub fn from_delta(output_index: u16, delta: Delta) -> Option<Self> {
        match delta {
            Delta::Pressed => Some(Self::Press(output_index)),
            Delta::Released => Some(Self::Release(output_index)),
            Delta::None => None,
        }
    }

    pub fn output_index(&self) -> u16 {
        match self {
            Self::Press(i) | Self::Release(i) => *i,
        }
    }
}

/// Receives presses and releases by logical button number; implemented by the HID transport.
pub trait ButtonSink {
    fn press(&mut self, output_index: u16);
    fn release(&mut self, output_index: u16);

    fn report(&mut self, event: ButtonEvent) {
        match event {
            ButtonEvent::Press(i) => self.press(i),
            ButtonEvent::Release(i) => self.release(i),
        }
    }
}

/// Report every non-zero delta in output order. Returns how many events were reported.
pub fn report_changes(changes: &[Delta], sink: &mut impl ButtonSink) -> usize {
    let mut count = 0;
    for (i, delta) in changes.iter().enumerate() {
        if let Some(event) = ButtonEvent::from_delta(i as u16, *delta) {
            sink.report(event);
            count += 1;
        }
    }
    count
}

/// Queue between the poller and the transport task.
pub struct ButtonEventChannel<M: RawMutex, const N: usize>(Channel<M, ButtonEvent, N>);
impl<M: RawMutex, const N: usize> Default for ButtonEventChannel<M, N> {
    fn default() -> Self {
        Self(Channel::new())
    }
}
impl<M: RawMutex, const N: usize> ButtonEventChannel<M, N> {
    pub async fn receive(&self) -> ButtonEvent {
        self.0.receive().await
    }

    pub fn try_receive(&self) -> Option<ButtonEvent> {
        self.0.try_receive().ok()
    }

    /// Queue `event` without waiting. The event is dropped if the queue is full.
    pub fn try_send(&self, event: ButtonEvent) -> bool {
        if self.0.try_send(event).is_err() {
            crate::warn!("event queue full, dropped {:?}", event);
            false
        } else {
            true
        }
    }
}

impl<M: RawMutex, const N: usize> ButtonSink for &ButtonEventChannel<M, N> {
    fn press(&mut self, output_index: u16) {
        self.try_send(ButtonEvent::Press(output_index));
    }

    fn release(&mut self, output_index: u16) {
        self.try_send(ButtonEvent::Release(output_index));
    }
}

/// Forward queued events to `sink` forever.
pub async fn run<M: RawMutex, const N: usize>(
    channel: &ButtonEventChannel<M, N>,
    sink: &mut impl ButtonSink,
) -> ! {
    loop {
        sink.report(channel.receive().await);
    }
}

#[cfg(test)]
#[path = "reporter_test.rs"]
mod test;
