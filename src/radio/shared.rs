//! Interrupt Hand-off
//!
//! The slot through which the foreground lends the [`ModemCore`] to the
//! symbol and sample interrupts. The core sits behind a critical-section
//! mutex; completion is signalled through an atomic flag that only the
//! symbol interrupt sets, so the foreground can poll it without locking.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;

use crate::drivers::dac::FrequencyDac;
use crate::radio::engine::{ModemCore, Watchdog};
use crate::radio::scheduler::{SymbolEvent, SymbolScheduler};

/// Core slot shared with the interrupt handlers
///
/// Meant to live in a `static`; interrupt handlers call
/// [`on_symbol_interrupt`](Self::on_symbol_interrupt) and
/// [`on_sample_interrupt`](Self::on_sample_interrupt).
pub struct SharedModem<D, W> {
    slot: Mutex<RefCell<Option<ModemCore<D, W>>>>,
    complete: AtomicBool,
}

impl<D, W> SharedModem<D, W> {
    /// Create an empty slot
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
            complete: AtomicBool::new(false),
        }
    }

    /// Whether the last loaded frame has finished
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    /// Whether a core is currently lent out
    #[must_use]
    pub fn is_lent(&self) -> bool {
        critical_section::with(|cs| self.slot.borrow_ref(cs).is_some())
    }

    /// Hand the core to the interrupt side
    pub fn lend(&self, core: ModemCore<D, W>) {
        self.complete.store(false, Ordering::Release);
        critical_section::with(|cs| {
            let previous = self.slot.borrow_ref_mut(cs).replace(core);
            debug_assert!(previous.is_none(), "modem core lent twice");
        });
    }

    /// Take the core back
    pub fn reclaim(&self) -> Option<ModemCore<D, W>> {
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).take())
    }

    /// Run a closure against the lent core
    pub fn with_core<R>(&self, f: impl FnOnce(&mut ModemCore<D, W>) -> R) -> Option<R> {
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).as_mut().map(f))
    }
}

impl<D, W> SharedModem<D, W>
where
    D: FrequencyDac,
    W: Watchdog,
{
    /// Load the next frame and clear the completion flag
    pub fn begin_frame(&self, load: impl FnOnce(&mut SymbolScheduler)) -> Option<()> {
        critical_section::with(|cs| {
            let mut slot = self.slot.borrow_ref_mut(cs);
            let core = slot.as_mut()?;
            load(core.scheduler_mut());
            self.complete.store(false, Ordering::Release);
            Some(())
        })
    }

    /// Symbol timer interrupt entry point
    ///
    /// On [`SymbolEvent::Complete`] the caller stops the symbol timer.
    pub fn on_symbol_interrupt(&self) -> SymbolEvent {
        critical_section::with(|cs| {
            let mut slot = self.slot.borrow_ref_mut(cs);
            let Some(core) = slot.as_mut() else {
                return SymbolEvent::Idle;
            };
            let event = core.on_symbol_tick();
            if event == SymbolEvent::Complete {
                self.complete.store(true, Ordering::Release);
            }
            event
        })
    }

    /// Sample timer interrupt entry point
    pub fn on_sample_interrupt(&self) {
        critical_section::with(|cs| {
            if let Some(core) = self.slot.borrow_ref_mut(cs).as_mut() {
                core.on_sample_tick();
            }
        });
    }
}

impl<D, W> Default for SharedModem<D, W> {
    fn default() -> Self {
        Self::new()
    }
}
