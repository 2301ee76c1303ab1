use crate::error::LoadError;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared flag that lets another thread (a Ctrl-C handler) abort a load.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn check_cancelled(&self, stage: &'static str) -> Result<(), LoadError> {
        if self.is_cancelled() {
            return Err(LoadError::Cancelled(stage));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(token.check_cancelled("spine").is_ok());
        handle.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(
            token.check_cancelled("spine"),
            Err(LoadError::Cancelled("spine"))
        ));
    }
}
