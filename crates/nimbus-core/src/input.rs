//! Input queue between the button source and the controller.
//!
//! Button sources (GPIO tasks, the simulator window) push [`InputEvent`]s
//! into an [`InputQueue`]; the loop that owns the controller drains it, so
//! events are handled one at a time, strictly in arrival order.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Instant;
use log::warn;

use crate::buttons::InputEvent;
use crate::dialog::DialogController;
use crate::error::DialogError;
use crate::leds::LedDriver;
use crate::speech::SpeechEngine;

/// Channel capacity for button events.
/// Ten buttons pressed and released at once fit without dropping.
pub const INPUT_QUEUE_DEPTH: usize = 20;

pub type InputQueue = Channel<CriticalSectionRawMutex, InputEvent, INPUT_QUEUE_DEPTH>;

/// Offer an event to the queue without waiting.
pub fn submit(queue: &InputQueue, event: InputEvent) -> Result<(), DialogError> {
    queue.try_send(event).map_err(|_| {
        warn!("input queue full, dropping {:?}", event);
        DialogError::QueueFull
    })
}

/// Feed every queued event to `controller`. Returns how many were handled.
pub fn drain_input<L, S>(
    queue: &InputQueue,
    controller: &mut DialogController<L, S>,
    now: Instant,
) -> usize
where
    L: LedDriver,
    S: SpeechEngine,
{
    let mut handled = 0;
    while let Ok(event) = queue.try_receive() {
        controller.handle_event(event, now);
        handled += 1;
    }
    handled
}
