//! Ctrl-C handling. The first interrupt asks the main loop to stop,
//! a second one exits right away.

use std::sync::{
    atomic::{AtomicBool, Ordering::SeqCst},
    Arc,
};

/// 128 + SIGINT
pub const UNIX_INTERRUPT_EXIT_CODE: i32 = 130;

/// STATUS_CONTROL_C_EXIT (0xC000013A)
pub const WINDOWS_INTERRUPT_EXIT_CODE: i32 = -1073741510;

/// Stop request shared between the signal handler and the main loop
#[derive(Clone, Debug, Default)]
#[repr(transparent)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop, returns true if one was already requested
    pub fn request(&self) -> bool {
        self.0.swap(true, SeqCst)
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(SeqCst)
    }
}

pub fn interrupt_exit_code() -> i32 {
    if cfg!(target_family = "unix") {
        UNIX_INTERRUPT_EXIT_CODE
    } else {
        WINDOWS_INTERRUPT_EXIT_CODE
    }
}

/// Install the process-wide Ctrl-C handler, can only be done once
pub fn install_handler() -> Result<StopFlag, ctrlc::Error> {
    let flag = StopFlag::new();
    let handler_flag = flag.clone();
    ctrlc::set_handler(move || {
        if handler_flag.request() {
            std::process::exit(interrupt_exit_code());
        }
    })?;
    Ok(flag)
}
