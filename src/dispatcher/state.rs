use std::{
    fmt,
    sync::atomic::{AtomicU8, Ordering},
};

/// Состояние жизненного цикла диспетчера.
///
/// Переходы только вперёд: `Idle → Running → Stopping → Stopped`.
/// Остановленный диспетчер повторно не запускается.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DispatcherState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

/// Атомарная ячейка состояния, разделяемая между владельцем диспетчера и
/// его рабочим потоком.
#[derive(Debug)]
pub(crate) struct AtomicState(AtomicU8);

impl DispatcherState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => DispatcherState::Idle,
            1 => DispatcherState::Running,
            2 => DispatcherState::Stopping,
            _ => DispatcherState::Stopped,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DispatcherState::Idle => "idle",
            DispatcherState::Running => "running",
            DispatcherState::Stopping => "stopping",
            DispatcherState::Stopped => "stopped",
        }
    }
}

impl AtomicState {
    pub(crate) fn new(state: DispatcherState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn load(&self) -> DispatcherState {
        DispatcherState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(
        &self,
        state: DispatcherState,
    ) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Переводит `from → to`. При неудаче возвращает фактическое состояние.
    pub(crate) fn transition(
        &self,
        from: DispatcherState,
        to: DispatcherState,
    ) -> Result<(), DispatcherState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(DispatcherState::from_u8)
    }
}

impl fmt::Display for DispatcherState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_success_and_failure() {
        let state = AtomicState::new(DispatcherState::Idle);
        assert_eq!(
            state.transition(DispatcherState::Idle, DispatcherState::Running),
            Ok(())
        );
        assert_eq!(state.load(), DispatcherState::Running);

        assert_eq!(
            state.transition(DispatcherState::Idle, DispatcherState::Running),
            Err(DispatcherState::Running)
        );
    }

    #[test]
    fn test_roundtrip_all_states() {
        let state = AtomicState::new(DispatcherState::Idle);
        for s in [
            DispatcherState::Idle,
            DispatcherState::Running,
            DispatcherState::Stopping,
            DispatcherState::Stopped,
        ] {
            state.store(s);
            assert_eq!(state.load(), s);
        }
    }
}
