use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::{
    dispatcher::{Dispatcher, DispatcherHandle, DispatcherId},
    error::{DispatchError, PublishError},
    event::Event,
};

type EventKey = Arc<str>;
type SubscriberList = Arc<Vec<DispatcherHandle>>;

/// Издатель событий: реестр «имя события → подписанные диспетчеры» и
/// раздача опубликованных событий их очередям.
///
/// Поддерживает:
/// - Идемпотентную подписку и отписку по имени события
/// - Публикацию без ожидания обработки (только постановка в очередь)
/// - Статистику публикаций и отказов доставки
/// - Объявление публикуемых событий (`register_event`); строгий издатель
///   ([`Publisher::strict`]) отказывается публиковать необъявленные
///
/// Список подписчиков каждого события неизменяем и заменяется целиком при
/// подписке или отписке, поэтому `publish` берёт снимок под коротким
/// захватом блокировки и раздаёт событие уже без неё. Подписки
/// остановленных диспетчеров удаляются при первой публикации, которая на
/// них наткнулась.
pub struct Publisher {
    name: Arc<str>,
    subscribers: RwLock<HashMap<EventKey, SubscriberList>>,
    declared: RwLock<HashSet<EventKey>>,
    strict: bool,
    metrics: PublisherMetrics,
}

/// Счётчики издателя.
#[derive(Debug, Default)]
pub struct PublisherMetrics {
    /// Общее количество вызовов `publish`
    pub published: AtomicU64,
    /// Успешных постановок в очереди диспетчеров
    pub delivered: AtomicU64,
    /// Публикаций, у которых не оказалось подписчиков
    pub unrouted: AtomicU64,
    /// Отказов из-за заполненной очереди
    pub rejected: AtomicU64,
    /// Пропусков диспетчеров, которые уже остановлены
    pub skipped_closed: AtomicU64,
    /// Подписок остановленных диспетчеров, удалённых из реестра
    pub pruned: AtomicU64,
    /// Отказов строгого издателя публиковать необъявленное событие
    pub unregistered: AtomicU64,
}

/// Снимок [`PublisherMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublisherStats {
    pub published: u64,
    pub delivered: u64,
    pub unrouted: u64,
    pub rejected: u64,
    pub skipped_closed: u64,
    pub pruned: u64,
    pub unregistered: u64,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Publisher {
    /// Создаёт издателя. Имя используется только в логах.
    pub fn new(name: &str) -> Self {
        Self::build(name, false)
    }

    /// Создаёт строгого издателя: `publish` события, не объявленного
    /// через [`Publisher::register_event`], возвращает `NotRegistered`.
    pub fn strict(name: &str) -> Self {
        Self::build(name, true)
    }

    fn build(
        name: &str,
        strict: bool,
    ) -> Self {
        Self {
            name: Arc::from(name),
            subscribers: RwLock::new(HashMap::new()),
            declared: RwLock::new(HashSet::new()),
            strict,
            metrics: PublisherMetrics::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Объявляет событие, которое публикует этот издатель.
    pub fn register_event(
        &self,
        event_name: &str,
    ) -> Result<(), PublishError> {
        if !self.declared.write().insert(Arc::from(event_name)) {
            return Err(PublishError::AlreadyRegistered(event_name.to_string()));
        }
        debug!(publisher = %self.name, event = event_name, "Event registered");
        Ok(())
    }

    /// Снимает объявление события вместе со всеми подписками на него.
    pub fn unregister_event(
        &self,
        event_name: &str,
    ) -> Result<(), PublishError> {
        if !self.declared.write().remove(event_name) {
            return Err(PublishError::NotRegistered(event_name.to_string()));
        }
        self.subscribers.write().remove(event_name);
        debug!(publisher = %self.name, event = event_name, "Event unregistered");
        Ok(())
    }

    pub fn is_registered(
        &self,
        event_name: &str,
    ) -> bool {
        self.declared.read().contains(event_name)
    }

    /// Объявленные события в лексикографическом порядке.
    pub fn event_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.declared.read().iter().map(|k| k.to_string()).collect();
        names.sort();
        names
    }

    /// Подписывает диспетчер на событие. Повторная подписка ничего не
    /// меняет.
    pub fn subscribe(
        &self,
        event_name: &str,
        dispatcher: &Dispatcher,
    ) {
        self.subscribe_handle(event_name, dispatcher.handle());
    }

    /// То же, что [`Publisher::subscribe`], но по уже полученному handle.
    pub fn subscribe_handle(
        &self,
        event_name: &str,
        handle: DispatcherHandle,
    ) {
        let mut subs = self.subscribers.write();
        let list = subs.entry(Arc::from(event_name)).or_default();
        if list.iter().any(|h| h.id() == handle.id()) {
            return;
        }

        let mut next = Vec::with_capacity(list.len() + 1);
        next.extend(list.iter().cloned());
        debug!(
            publisher = %self.name,
            event = event_name,
            dispatcher = handle.name(),
            "Subscribe"
        );
        next.push(handle);
        *list = Arc::new(next);
    }

    /// Отписывает диспетчер от события. Если подписки нет, ничего не
    /// делает. После возврата новые публикации диспетчеру не доставляются.
    pub fn unsubscribe(
        &self,
        event_name: &str,
        dispatcher: &Dispatcher,
    ) {
        self.unsubscribe_id(event_name, dispatcher.id());
    }

    pub fn unsubscribe_id(
        &self,
        event_name: &str,
        id: DispatcherId,
    ) {
        let mut subs = self.subscribers.write();
        let Some(list) = subs.get_mut(event_name) else {
            return;
        };
        if !list.iter().any(|h| h.id() == id) {
            return;
        }

        let next: Vec<DispatcherHandle> = list.iter().filter(|h| h.id() != id).cloned().collect();
        debug!(
            publisher = %self.name,
            event = event_name,
            dispatcher = %id,
            "Unsubscribe"
        );
        if next.is_empty() {
            subs.remove(event_name);
        } else {
            *list = Arc::new(next);
        }
    }

    /// Удаляет все подписки на указанное событие.
    pub fn unsubscribe_all(
        &self,
        event_name: &str,
    ) {
        if self.subscribers.write().remove(event_name).is_some() {
            debug!(publisher = %self.name, event = event_name, "Unsubscribe all");
        }
    }

    /// Публикует событие: ставит его в очередь каждого подписанного
    /// диспетчера и возвращает число диспетчеров, получивших событие.
    ///
    /// Обработки не ждёт. Для ограниченной очереди с политикой `Block`
    /// ждёт освобождения места, с политикой `Fail` доставляет остальным
    /// подписчикам и возвращает первую ошибку `QueueFull`. Остановленные
    /// диспетчеры пропускаются, а их подписки на это событие удаляются.
    pub fn publish(
        &self,
        event: &Event,
    ) -> Result<usize, PublishError> {
        self.metrics.published.fetch_add(1, Ordering::Relaxed);

        if self.strict && !self.is_registered(event.name()) {
            self.metrics.unregistered.fetch_add(1, Ordering::Relaxed);
            warn!(publisher = %self.name, event = event.name(), "Publishing undeclared event");
            return Err(PublishError::NotRegistered(event.name().to_string()));
        }

        let Some(targets) = self.snapshot(event.name()) else {
            self.metrics.unrouted.fetch_add(1, Ordering::Relaxed);
            trace!(publisher = %self.name, event = event.name(), "No subscribers");
            return Ok(0);
        };

        let mut delivered = 0;
        let mut saw_closed = false;
        let mut first_error = None;
        for target in targets.iter() {
            match target.deliver(event.clone()) {
                Ok(()) => delivered += 1,
                Err(DispatchError::QueueFull { name, capacity }) => {
                    self.metrics.rejected.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        publisher = %self.name,
                        event = event.name(),
                        dispatcher = %name,
                        capacity,
                        "Dispatcher queue is full"
                    );
                    first_error.get_or_insert(PublishError::QueueFull {
                        event: event.name().to_string(),
                        dispatcher: name,
                        capacity,
                    });
                }
                Err(err) => {
                    saw_closed = true;
                    self.metrics.skipped_closed.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        publisher = %self.name,
                        event = event.name(),
                        error = %err,
                        "Skipping dispatcher"
                    );
                }
            }
        }

        if saw_closed {
            self.prune_closed(event.name());
        }

        self.metrics
            .delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
        trace!(
            publisher = %self.name,
            event = event.name(),
            delivered,
            "Event published"
        );

        match first_error {
            Some(err) => Err(err),
            None => Ok(delivered),
        }
    }

    /// Имена событий, на которые есть хотя бы одна подписка.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .subscribers
            .read()
            .keys()
            .map(|k| k.to_string())
            .collect();
        names.sort();
        names
    }

    /// Идентификаторы подписчиков события в порядке подписки.
    pub fn subscribers(
        &self,
        event_name: &str,
    ) -> Vec<DispatcherId> {
        self.snapshot(event_name)
            .map(|list| list.iter().map(DispatcherHandle::id).collect())
            .unwrap_or_default()
    }

    pub fn subscriber_count(
        &self,
        event_name: &str,
    ) -> usize {
        self.snapshot(event_name).map_or(0, |list| list.len())
    }

    pub fn is_subscribed(
        &self,
        event_name: &str,
        dispatcher: &Dispatcher,
    ) -> bool {
        self.snapshot(event_name)
            .is_some_and(|list| list.iter().any(|h| h.id() == dispatcher.id()))
    }

    pub fn stats(&self) -> PublisherStats {
        self.metrics.snapshot()
    }

    fn snapshot(
        &self,
        event_name: &str,
    ) -> Option<SubscriberList> {
        self.subscribers.read().get(event_name).cloned()
    }

    /// Убирает из списка события диспетчеры, которые больше не принимают
    /// события.
    fn prune_closed(
        &self,
        event_name: &str,
    ) {
        let mut subs = self.subscribers.write();
        let Some(list) = subs.get_mut(event_name) else {
            return;
        };

        let live: Vec<DispatcherHandle> = list.iter().filter(|h| h.is_accepting()).cloned().collect();
        let removed = list.len() - live.len();
        if removed == 0 {
            return;
        }

        self.metrics
            .pruned
            .fetch_add(removed as u64, Ordering::Relaxed);
        debug!(
            publisher = %self.name,
            event = event_name,
            removed,
            "Pruned stopped dispatchers"
        );
        if live.is_empty() {
            subs.remove(event_name);
        } else {
            *list = Arc::new(live);
        }
    }
}

impl PublisherMetrics {
    pub fn snapshot(&self) -> PublisherStats {
        PublisherStats {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            unrouted: self.unrouted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            skipped_closed: self.skipped_closed.load(Ordering::Relaxed),
            pruned: self.pruned.load(Ordering::Relaxed),
            unregistered: self.unregistered.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("name", &self.name)
            .field("strict", &self.strict)
            .field("events", &self.event_names())
            .finish()
    }
}
