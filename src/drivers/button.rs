//! ISR-debounced front-panel buttons.
//!
//! ## Hardware
//!
//! Three active-low momentary switches (power, up, down) with pull-ups.
//! Each GPIO fires on the falling edge; its ISR records the raw timestamp
//! into a per-button atomic, and [`ButtonDriver::tick`] (called from the
//! main loop) runs the debounce state machine.
//!
//! Only short presses are recognised. A press is reported once the line
//! has been held for the debounce window; bounces inside that window are
//! absorbed.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::events::ButtonId;

const DEBOUNCE_MS: u32 = 50;

/// Raw ISR timestamps (milliseconds since boot, truncated to u32), one per
/// button. Zero means "never pressed".
static POWER_ISR_TIMESTAMP: AtomicU32 = AtomicU32::new(0);
static UP_ISR_TIMESTAMP: AtomicU32 = AtomicU32::new(0);
static DOWN_ISR_TIMESTAMP: AtomicU32 = AtomicU32::new(0);

fn isr_slot(id: ButtonId) -> &'static AtomicU32 {
    match id {
        ButtonId::Power => &POWER_ISR_TIMESTAMP,
        ButtonId::Up => &UP_ISR_TIMESTAMP,
        ButtonId::Down => &DOWN_ISR_TIMESTAMP,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Idle,
    DebounceWait { since_ms: u32 },
}

pub struct ButtonDriver {
    id: ButtonId,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    gpio: i32,
    slot: &'static AtomicU32,
    state: DebounceState,
    last_isr_ms: u32,
}

impl ButtonDriver {
    pub fn new(id: ButtonId, gpio: i32) -> Self {
        Self::with_slot(id, gpio, isr_slot(id))
    }

    /// Read ISR timestamps from `slot` instead of the per-button static.
    pub fn with_slot(id: ButtonId, gpio: i32, slot: &'static AtomicU32) -> Self {
        Self {
            id,
            gpio,
            slot,
            state: DebounceState::Idle,
            last_isr_ms: slot.load(Ordering::Acquire),
        }
    }

    /// Call from the main loop. Returns the button id on a confirmed press.
    pub fn tick(&mut self, now_ms: u32) -> Option<ButtonId> {
        let isr_ms = self.slot.load(Ordering::Acquire);

        match self.state {
            DebounceState::Idle => {
                if isr_ms != self.last_isr_ms && isr_ms != 0 {
                    self.last_isr_ms = isr_ms;
                    self.state = DebounceState::DebounceWait { since_ms: now_ms };
                }
                None
            }
            DebounceState::DebounceWait { since_ms } => {
                if now_ms.wrapping_sub(since_ms) < DEBOUNCE_MS {
                    return None;
                }
                // Swallow edges that arrived while bouncing.
                self.last_isr_ms = isr_ms;
                self.state = DebounceState::Idle;
                self.is_pressed_hw().then_some(self.id)
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn is_pressed_hw(&self) -> bool {
        !crate::drivers::hw_init::gpio_read(self.gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_pressed_hw(&self) -> bool {
        true
    }
}

/// ISR handler — register on each button's falling edge.
/// Safe to call from interrupt context (lock-free atomic store).
pub fn button_isr_handler(id: ButtonId, now_ms: u32) {
    isr_slot(id).store(now_ms.max(1), Ordering::Release);
}
