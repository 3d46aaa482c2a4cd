//! Interrupt-visible state
//!
//! Everything an interrupt handler may touch lives here, one word per
//! concern, accessed only through atomics. Interrupt context sets bits and
//! requests a reset; the foreground drains the words through the realtime
//! poll. Multi-word data (the probe snapshot in [`super::System`]) is never
//! written while a contending interrupt source is armed.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use bitflags::bitflags;

bitflags! {
    /// Pending asynchronous events, set from interrupt context.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RtFlags: u8 {
        /// Queue a status report on the next foreground pass.
        const STATUS_REPORT = 1 << 0;
        /// Start or resume the cycle.
        const CYCLE_START = 1 << 1;
        /// The step executor ran out of motion.
        const CYCLE_STOP = 1 << 2;
        /// Hold the current cycle.
        const FEED_HOLD = 1 << 3;
        /// Abort everything; sticky until reinitialisation.
        const RESET = 1 << 4;
        /// Safety door opened.
        const SAFETY_DOOR = 1 << 5;
        /// End the current motion early without raising an alarm.
        const MOTION_CANCEL = 1 << 6;
        /// Enter sleep after the buffer drains.
        const SLEEP = 1 << 7;
    }
}

/// Latched alarm conditions. All of them require user acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Alarm {
    /// A limit switch was hit during motion.
    HardLimit = 1,
    /// A queued target exceeded the machine travel bounds.
    SoftLimit = 2,
    /// Reset arrived while motion was executing; position is lost.
    AbortCycle = 3,
    /// The probe pin was already asserted before the probe move started.
    ProbeFailInitial = 4,
    /// The probe move finished without the pin ever triggering.
    ProbeFailContact = 5,
    /// Reset arrived while homing; machine zero was not established.
    HomingFailReset = 6,
    /// Safety door opened during homing.
    HomingFailDoor = 7,
    /// A limit switch was still asserted after the homing pull-off move.
    HomingFailPulloff = 8,
    /// An axis failed to reach its limit switch within the search distance.
    HomingFailApproach = 9,
}

impl Alarm {
    fn from_code(code: u8) -> Option<Alarm> {
        match code {
            1 => Some(Alarm::HardLimit),
            2 => Some(Alarm::SoftLimit),
            3 => Some(Alarm::AbortCycle),
            4 => Some(Alarm::ProbeFailInitial),
            5 => Some(Alarm::ProbeFailContact),
            6 => Some(Alarm::HomingFailReset),
            7 => Some(Alarm::HomingFailDoor),
            8 => Some(Alarm::HomingFailPulloff),
            9 => Some(Alarm::HomingFailApproach),
            _ => None,
        }
    }
}

/// Probe monitor state, polled by the step executor while a probe move runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ProbeMonitor {
    /// No probe cycle in progress.
    Off = 0,
    /// Watching the pin; the executor stops motion on the asserting edge.
    Active = 1,
}

/// The interrupt-visible word set.
#[derive(Debug, Default)]
pub struct SharedState {
    exec_state: AtomicU8,
    exec_alarm: AtomicU8,
    abort: AtomicBool,
    probe_monitor: AtomicU8,
}

impl SharedState {
    /// Create with no pending events.
    pub const fn new() -> Self {
        Self {
            exec_state: AtomicU8::new(0),
            exec_alarm: AtomicU8::new(0),
            abort: AtomicBool::new(false),
            probe_monitor: AtomicU8::new(ProbeMonitor::Off as u8),
        }
    }

    /// Current pending-event set.
    pub fn exec_state(&self) -> RtFlags {
        RtFlags::from_bits_truncate(self.exec_state.load(Ordering::SeqCst))
    }

    /// Set pending-event bits. Safe from interrupt context.
    pub fn set_exec_state_flag(&self, flags: RtFlags) {
        self.exec_state.fetch_or(flags.bits(), Ordering::SeqCst);
    }

    /// Clear pending-event bits.
    pub fn clear_exec_state_flag(&self, flags: RtFlags) {
        self.exec_state.fetch_and(!flags.bits(), Ordering::SeqCst);
    }

    /// Request a reset. The only interrupt-side entry point for aborting:
    /// the hardware-stopping half runs on the next foreground pass.
    pub fn request_reset(&self) {
        self.set_exec_state_flag(RtFlags::RESET);
    }

    /// Pending alarm, if any.
    pub fn exec_alarm(&self) -> Option<Alarm> {
        Alarm::from_code(self.exec_alarm.load(Ordering::SeqCst))
    }

    /// Latch an alarm. Safe from interrupt context.
    pub fn set_exec_alarm(&self, alarm: Alarm) {
        self.exec_alarm.store(alarm as u8, Ordering::SeqCst);
    }

    /// Clear the pending alarm after it has been reported.
    pub fn clear_exec_alarm(&self) {
        self.exec_alarm.store(0, Ordering::SeqCst);
    }

    /// Sticky abort flag.
    pub fn abort(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }

    /// Set the abort flag. Stays set until [`SharedState::reinitialize`].
    pub fn set_abort(&self) {
        self.abort.store(true, Ordering::SeqCst);
    }

    /// Probe monitor state.
    pub fn probe_monitor(&self) -> ProbeMonitor {
        if self.probe_monitor.load(Ordering::SeqCst) == ProbeMonitor::Active as u8 {
            ProbeMonitor::Active
        } else {
            ProbeMonitor::Off
        }
    }

    /// Arm or disarm the probe monitor.
    pub fn set_probe_monitor(&self, state: ProbeMonitor) {
        self.probe_monitor.store(state as u8, Ordering::SeqCst);
    }

    /// Reboot-equivalent wipe: clears events, alarm, abort, probe monitor.
    pub fn reinitialize(&self) {
        self.exec_state.store(0, Ordering::SeqCst);
        self.exec_alarm.store(0, Ordering::SeqCst);
        self.abort.store(false, Ordering::SeqCst);
        self.probe_monitor
            .store(ProbeMonitor::Off as u8, Ordering::SeqCst);
    }
}
