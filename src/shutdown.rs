//! Interrupt handling for the watch loop

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Flag set once SIGINT or SIGTERM arrives
#[cfg(unix)]
pub fn install() -> Result<Arc<AtomicBool>> {
    use anyhow::Context;
    use signal_hook::consts::{SIGINT, SIGTERM};

    let stop = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&stop))
            .with_context(|| format!("Failed to register handler for signal {signal}"))?;
    }
    Ok(stop)
}

#[cfg(not(unix))]
pub fn install() -> Result<Arc<AtomicBool>> {
    Ok(Arc::new(AtomicBool::new(false)))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_flag_starts_clear_and_sets_on_signal() {
        let stop = install().unwrap();
        assert!(!stop.load(Ordering::Relaxed));

        signal_hook::low_level::raise(signal_hook::consts::SIGTERM).unwrap();
        assert!(stop.load(Ordering::Relaxed));
    }
}
