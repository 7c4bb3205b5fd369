//! Dataplane session client.
//!
//! [`XlateClient`] owns an initialized [`Dataplane`] and the event queue fed
//! by it. Configuration calls go through the typed API accessors; events are
//! pulled with [`XlateClient::sync_for_events`] and consumed with
//! [`XlateClient::dequeue_event`] or [`XlateClient::drain_events`].

use crate::api::{AclApi, InterfaceApi, NeighborApi, RouteApi, VrfApi};
use crate::config::XlateConfig;
use crate::dataplane::Dataplane;
use crate::error::XlateResult;
use crate::event::VppEvent;
use crate::event_queue::{
    channel_with_free, DequeuedEvent, EventConsumer, EventProducer, QueueStats,
};
use tracing::{debug, info, trace};

pub struct XlateClient<D: Dataplane> {
    dataplane: D,
    config: XlateConfig,
    producer: EventProducer<VppEvent>,
    events: EventConsumer<VppEvent>,
}

impl<D: Dataplane> XlateClient<D> {
    /// Initializes the dataplane session and returns a client for it.
    pub fn connect(dataplane: D, config: XlateConfig) -> XlateResult<Self> {
        config.validate()?;

        crate::api::check("init_vpp_client", dataplane.init_vpp_client()?)?;
        info!("Connected to dataplane");

        let (producer, events) = channel_with_free(|event: VppEvent| {
            trace!("Released event: {}", event);
        });
        let client = Self {
            dataplane,
            config,
            producer,
            events,
        };

        if client.config.connect.refresh_interfaces {
            client.refresh_interfaces()?;
        }

        Ok(client)
    }

    /// Re-reads the engine's interface list.
    pub fn refresh_interfaces(&self) -> XlateResult<()> {
        crate::api::check(
            "refresh_interfaces_list",
            self.dataplane.refresh_interfaces_list()?,
        )?;
        debug!("Refreshed interface list");
        Ok(())
    }

    pub fn interfaces(&self) -> InterfaceApi<'_, D> {
        InterfaceApi::new(&self.dataplane)
    }

    pub fn routes(&self) -> RouteApi<'_, D> {
        RouteApi::new(&self.dataplane)
    }

    pub fn neighbors(&self) -> NeighborApi<'_, D> {
        NeighborApi::new(&self.dataplane)
    }

    pub fn vrfs(&self) -> VrfApi<'_, D> {
        VrfApi::new(&self.dataplane)
    }

    pub fn acls(&self) -> AclApi<'_, D> {
        AclApi::new(&self.dataplane)
    }

    /// Pulls every state change the engine knows about into the queue.
    pub fn sync_for_events(&self) -> XlateResult<()> {
        let before = self.producer.pending();
        crate::api::check(
            "vpp_sync_for_events",
            self.dataplane.sync_for_events(&self.producer)?,
        )?;
        debug!(
            "Synced events, {} pending (was {})",
            self.producer.pending(),
            before
        );
        Ok(())
    }

    /// Takes the oldest pending event, or `None` if the queue is empty.
    pub fn dequeue_event(&mut self) -> Option<DequeuedEvent<VppEvent>> {
        self.events.dequeue()
    }

    /// Dispatches pending events to `handler` and releases them.
    ///
    /// Syncs with the engine first when `events.sync_before_drain` is set,
    /// then handles at most `events.drain_batch` events (all of them if 0).
    /// Events of an unknown kind are released without reaching `handler`.
    /// Returns the number of events dispatched.
    pub fn drain_events<F>(&mut self, mut handler: F) -> XlateResult<usize>
    where
        F: FnMut(&VppEvent),
    {
        if self.config.events.sync_before_drain {
            self.sync_for_events()?;
        }

        let limit = self.config.drain_limit().unwrap_or(usize::MAX);
        let mut taken = 0;
        let mut dispatched = 0;
        while taken < limit {
            let Some(event) = self.events.dequeue() else {
                break;
            };
            taken += 1;

            if event.is_known() {
                handler(&event);
                dispatched += 1;
            } else {
                debug!("Ignoring {}", *event);
            }
            event.free();
        }

        Ok(dispatched)
    }

    /// Returns a producer handle for in-process publishers.
    pub fn event_producer(&self) -> EventProducer<VppEvent> {
        self.producer.clone()
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.events.stats()
    }

    pub fn dataplane(&self) -> &D {
        &self.dataplane
    }

    pub fn config(&self) -> &XlateConfig {
        &self.config
    }
}

impl<D: Dataplane + std::fmt::Debug> std::fmt::Debug for XlateClient<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlateClient")
            .field("dataplane", &self.dataplane)
            .field("config", &self.config)
            .field("events", &self.events)
            .finish()
    }
}
