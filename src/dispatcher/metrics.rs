use std::sync::atomic::{AtomicU64, Ordering};

/// Счётчики диспетчера.
#[derive(Debug, Default)]
pub struct DispatcherMetrics {
    /// Событий принято в очередь
    pub enqueued: AtomicU64,
    /// Событий обработано без ошибки
    pub handled: AtomicU64,
    /// Событий, обработчик которых вернул ошибку или запаниковал
    pub failed: AtomicU64,
    /// Событий, отброшенных при принудительной остановке
    pub abandoned: AtomicU64,
    /// Событий, отклонённых из-за переполнения или закрытия очереди
    pub rejected: AtomicU64,
    /// Вызовов `on_idle`
    pub idle_ticks: AtomicU64,
    /// Паник в хуках и callback-е ошибок
    pub hook_panics: AtomicU64,
}

/// Снимок счётчиков на момент вызова.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatcherStats {
    pub enqueued: u64,
    pub handled: u64,
    pub failed: u64,
    pub abandoned: u64,
    pub rejected: u64,
    pub idle_ticks: u64,
    pub hook_panics: u64,
}

impl DispatcherMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn inc_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_handled(&self) {
        self.handled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_idle_ticks(&self) {
        self.idle_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_hook_panics(&self) {
        self.hook_panics.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_abandoned(
        &self,
        n: u64,
    ) {
        self.abandoned.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatcherStats {
        DispatcherStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            handled: self.handled.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            idle_ticks: self.idle_ticks.load(Ordering::Relaxed),
            hook_panics: self.hook_panics.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let m = DispatcherMetrics::new();
        m.inc_enqueued();
        m.inc_enqueued();
        m.inc_handled();
        m.inc_failed();
        m.inc_rejected();
        m.add_abandoned(3);
        m.inc_idle_ticks();
        m.inc_hook_panics();

        assert_eq!(
            m.snapshot(),
            DispatcherStats {
                enqueued: 2,
                handled: 1,
                failed: 1,
                abandoned: 3,
                rejected: 1,
                idle_ticks: 1,
                hook_panics: 1,
            }
        );
    }
}
