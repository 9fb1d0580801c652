extern crate std;

use embassy_futures::{
    block_on,
    select::{select, Either},
};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use std::vec::Vec;

use super::*;

#[derive(Default)]
struct Recorder(Vec<ButtonEvent>);

impl ButtonSink for Recorder {
    fn press(&mut self, output_index: u16) {
        self.0.push(ButtonEvent::Press(output_index));
    }

    fn release(&mut self, output_index: u16) {
        self.0.push(ButtonEvent::Release(output_index));
    }
}

#[test]
fn event_from_delta() {
    assert_eq!(
        ButtonEvent::from_delta(3, Delta::Pressed),
        Some(ButtonEvent::Press(3))
    );
    assert_eq!(
        ButtonEvent::from_delta(4, Delta::Released),
        Some(ButtonEvent::Release(4))
    );
    assert_eq!(ButtonEvent::from_delta(5, Delta::None), None);
    assert_eq!(ButtonEvent::Release(9).output_index(), 9);
}

#[test]
fn report_changes_in_output_order() {
    let mut sink = Recorder::default();
    let changes = [
        Delta::None,
        Delta::Released,
        Delta::None,
        Delta::Pressed,
        Delta::Pressed,
    ];

    assert_eq!(report_changes(&changes, &mut sink), 3);
    assert_eq!(
        sink.0,
        [
            ButtonEvent::Release(1),
            ButtonEvent::Press(3),
            ButtonEvent::Press(4)
        ]
    );

    assert_eq!(report_changes(&[Delta::None; 4], &mut sink), 0);
    assert_eq!(sink.0.len(), 3);
}

#[test]
fn channel_drops_when_full() {
    let channel = ButtonEventChannel::<NoopRawMutex, 2>::default();
    let mut sink = &channel;

    sink.press(1);
    sink.release(1);
    assert!(!channel.try_send(ButtonEvent::Press(2)));

    assert_eq!(channel.try_receive(), Some(ButtonEvent::Press(1)));
    assert_eq!(channel.try_receive(), Some(ButtonEvent::Release(1)));
    assert_eq!(channel.try_receive(), None);
}

#[test]
fn run_forwards_to_sink() {
    let channel = ButtonEventChannel::<NoopRawMutex, 4>::default();
    let mut sink = Recorder::default();

    assert!(channel.try_send(ButtonEvent::Press(7)));
    assert!(channel.try_send(ButtonEvent::Release(7)));

    block_on(async {
        let drained = async {
            while !channel.0.is_empty() {
                embassy_futures::yield_now().await;
            }
        };
        match select(run(&channel, &mut sink), drained).await {
            Either::First(_) => unreachable!(),
            Either::Second(_) => {}
        }
    });

    assert_eq!(
        sink.0,
        [ButtonEvent::Press(7), ButtonEvent::Release(7)]
    );
}
