use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bridges_logging::{bridges_debug, bridges_trace, bridges_warn};
use futures_util::{Stream, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::CancellationGroup;

pub type ItemFilter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// An item together with the producer run that emitted it.
struct Tagged<T> {
    run: u64,
    item: T,
}

struct Observer<T> {
    items: mpsc::UnboundedSender<Tagged<T>>,
    task: JoinHandle<()>,
}

/// Restartable producer feeding a long-lived observer.
///
/// The observer filters incoming items, appends accepted ones to the
/// published list, and republishes the whole list each time. Every producer
/// run gets a new generation number. Items still queued from an older run
/// are dropped, so a restart never mixes results of two runs.
pub struct ResultAccumulator<T> {
    name: String,
    filter: ItemFilter<T>,
    published: Arc<watch::Sender<Vec<T>>>,
    generation: Arc<AtomicU64>,
    group: CancellationGroup,
    runtime: Handle,
    observer: Option<Observer<T>>,
}

impl<T> ResultAccumulator<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(
        name: impl Into<String>,
        filter: ItemFilter<T>,
        published: Arc<watch::Sender<Vec<T>>>,
        group: CancellationGroup,
        runtime: Handle,
    ) -> Self {
        Self {
            name: name.into(),
            filter,
            published,
            generation: Arc::new(AtomicU64::new(0)),
            group,
            runtime,
            observer: None,
        }
    }

    pub fn accept_all() -> ItemFilter<T> {
        Arc::new(|_: &T| true)
    }

    /// True once [`ResultAccumulator::cancel_full`] has run.
    pub fn is_closed(&self) -> bool {
        self.group.is_cancelled()
    }

    pub fn is_observing(&self) -> bool {
        !self.group.is_cancelled()
            && self
                .observer
                .as_ref()
                .is_some_and(|observer| !observer.task.is_finished())
    }

    /// Replaces the running producer with `producer`.
    ///
    /// Returns `None` once the accumulator has been torn down.
    pub fn start<S>(&mut self, producer: S) -> Option<JoinHandle<()>>
    where
        S: Stream<Item = T> + Send + 'static,
    {
        self.cancel_children();
        if self.group.is_cancelled() {
            bridges_warn!("{}: start ignored after teardown", self.name);
            return None;
        }

        // The observer must be listening before the producer emits anything.
        let items = self.attach_observer();
        let run = self.generation.load(Ordering::Acquire);
        let token = self.group.child_token();
        let name = self.name.clone();

        bridges_debug!("{}: starting producer run {}", name, run);
        Some(self.runtime.spawn(async move {
            let forward = async {
                let mut producer = Box::pin(producer);
                while let Some(item) = producer.next().await {
                    if items.send(Tagged { run, item }).is_err() {
                        break;
                    }
                }
            };
            tokio::select! {
                biased;
                _ = token.cancelled() => bridges_debug!("{}: producer run {} cancelled", name, run),
                _ = forward => bridges_debug!("{}: producer run {} finished", name, run),
            }
        }))
    }

    /// Stops the current producer and clears the list; the observer stays.
    pub fn cancel_children(&mut self) {
        self.group.cancel_children();
        let generation = &self.generation;
        self.published.send_if_modified(|items| {
            generation.fetch_add(1, Ordering::AcqRel);
            let had_items = !items.is_empty();
            items.clear();
            had_items
        });
    }

    /// Tears down producer and observer for good.
    pub fn cancel_full(&mut self) {
        self.cancel_children();
        self.group.cancel();
        if let Some(observer) = self.observer.take() {
            observer.task.abort();
            bridges_debug!("{}: observer torn down", self.name);
        }
    }

    fn attach_observer(&mut self) -> mpsc::UnboundedSender<Tagged<T>> {
        if let Some(observer) = &self.observer {
            if !observer.task.is_finished() {
                return observer.items.clone();
            }
            bridges_warn!("{}: observer stopped unexpectedly, reattaching", self.name);
        }

        let (items, incoming) = mpsc::unbounded_channel();
        let task = self.runtime.spawn(observe(
            self.name.clone(),
            incoming,
            self.filter.clone(),
            self.published.clone(),
            self.generation.clone(),
            self.group.scope_token(),
        ));
        bridges_debug!("{}: observer attached", self.name);
        self.observer = Some(Observer {
            items: items.clone(),
            task,
        });
        items
    }
}

async fn observe<T>(
    name: String,
    mut incoming: mpsc::UnboundedReceiver<Tagged<T>>,
    filter: ItemFilter<T>,
    published: Arc<watch::Sender<Vec<T>>>,
    generation: Arc<AtomicU64>,
    scope: CancellationToken,
) {
    loop {
        let Tagged { run, item } = tokio::select! {
            _ = scope.cancelled() => break,
            next = incoming.recv() => match next {
                Some(tagged) => tagged,
                None => break,
            },
        };

        if !filter(&item) {
            bridges_trace!("{}: item of run {} filtered out", name, run);
            continue;
        }

        // Checked under the channel lock, the same lock `cancel_children` bumps it under.
        let accepted = published.send_if_modified(|items| {
            if generation.load(Ordering::Acquire) != run {
                return false;
            }
            items.push(item);
            true
        });
        if !accepted {
            bridges_trace!("{}: dropped stale item of run {}", name, run);
        }
    }
    bridges_debug!("{}: observer detached", name);
}
