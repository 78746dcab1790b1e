use std::{collections::VecDeque, time::Duration};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Поведение производителя при публикации в заполненную очередь.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Производитель ждёт, пока потребитель освободит место.
    #[default]
    Block,
    /// Публикация сразу завершается ошибкой `QueueFull`.
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushError {
    Full { capacity: usize },
    Closed,
}

/// Результат ожидания в [`EventQueue::pop_or_idle`].
#[derive(Debug)]
pub(crate) enum Popped {
    Event(Event),
    /// Событий не было дольше заданного интервала
    Idle,
    /// Очередь закрыта и пуста
    Closed,
}

/// FIFO-очередь событий одного диспетчера.
///
/// Много производителей, один потребитель. `Mutex` + два `Condvar`:
/// `not_empty` будит потребителя, `not_full` будит производителей,
/// ожидающих места в ограниченной очереди.
#[derive(Debug)]
pub(crate) struct EventQueue {
    inner: Mutex<QueueInner>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: Option<usize>,
    overflow: OverflowPolicy,
}

#[derive(Debug, Default)]
struct QueueInner {
    items: VecDeque<Event>,
    closed: bool,
}

impl EventQueue {
    pub(crate) fn new(
        capacity: Option<usize>,
        overflow: OverflowPolicy,
    ) -> Self {
        Self {
            inner: Mutex::new(QueueInner::default()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
            overflow,
        }
    }

    /// Кладёт событие в хвост очереди.
    ///
    /// Для неограниченной очереди блокируется только на время захвата
    /// мьютекса. Для ограниченной поведение при переполнении задаёт
    /// [`OverflowPolicy`].
    pub(crate) fn push(
        &self,
        event: Event,
    ) -> Result<(), PushError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(PushError::Closed);
        }

        if let Some(capacity) = self.capacity {
            while inner.items.len() >= capacity {
                match self.overflow {
                    OverflowPolicy::Fail => return Err(PushError::Full { capacity }),
                    OverflowPolicy::Block => {
                        self.not_full.wait(&mut inner);
                        if inner.closed {
                            return Err(PushError::Closed);
                        }
                    }
                }
            }
        }

        inner.items.push_back(event);
        drop(inner);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Забирает голову очереди, ожидая события или закрытия.
    ///
    /// Возвращает `None`, когда очередь закрыта и пуста.
    pub(crate) fn pop(&self) -> Option<Event> {
        match self.pop_or_idle(None) {
            Popped::Event(event) => Some(event),
            Popped::Idle | Popped::Closed => None,
        }
    }

    /// Как [`EventQueue::pop`], но с `idle = Some(t)` возвращает
    /// `Popped::Idle`, если за `t` не пришло ни одного события.
    pub(crate) fn pop_or_idle(
        &self,
        idle: Option<Duration>,
    ) -> Popped {
        let mut inner = self.inner.lock();
        loop {
            if let Some(event) = inner.items.pop_front() {
                drop(inner);
                self.not_full.notify_one();
                return Popped::Event(event);
            }
            if inner.closed {
                return Popped::Closed;
            }
            match idle {
                Some(timeout) => {
                    let timed_out = self.not_empty.wait_for(&mut inner, timeout).timed_out();
                    if timed_out && inner.items.is_empty() && !inner.closed {
                        return Popped::Idle;
                    }
                }
                None => self.not_empty.wait(&mut inner),
            }
        }
    }

    /// Закрывает очередь для новых событий.
    ///
    /// При `drain == true` накопленные события остаются и будут выбраны
    /// потребителем; иначе они отбрасываются. Возвращает число
    /// отброшенных событий.
    pub(crate) fn close(
        &self,
        drain: bool,
    ) -> usize {
        let mut inner = self.inner.lock();
        inner.closed = true;
        let abandoned = if drain {
            0
        } else {
            let n = inner.items.len();
            inner.items.clear();
            n
        };
        drop(inner);

        self.not_empty.notify_all();
        self.not_full.notify_all();
        abandoned
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub(crate) fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
