//! Hardware Abstraction Layer
//!
//! STM32G474 pieces the modem needs beyond the `embedded-hal` traits:
//! the two interrupt timers and the independent watchdog.

pub mod timer;
pub mod watchdog;
