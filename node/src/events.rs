//! Platform events and the synchronous bus that fans them out.

use dfund_campaign::CampaignEvent;
use dfund_factory::FactoryEvent;
use dfund_token::TokenEvent;
use dfund_types::Address;
use serde::{Deserialize, Serialize};

/// Everything observable by the indexer, tagged with its source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformEvent {
    Factory(FactoryEvent),
    Campaign {
        campaign: Address,
        event: CampaignEvent,
    },
    Token(TokenEvent),
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the emitting thread, after the operation
/// that produced the event has committed.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&PlatformEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&PlatformEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &PlatformEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfund_types::Wei;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    fn minted() -> PlatformEvent {
        PlatformEvent::Token(TokenEvent::Minted {
            to: Address::repeat(1),
            amount: 1_000,
        })
    }

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));
        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&minted());
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        EventBus::default().emit(&minted());
    }

    #[test]
    fn listener_sees_campaign_identity() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = Arc::clone(&seen);
        bus.subscribe(Box::new(move |event: &PlatformEvent| {
            if let PlatformEvent::Campaign { campaign, .. } = event {
                sink.lock().unwrap().push(*campaign);
            }
        }));

        bus.emit(&minted());
        bus.emit(&PlatformEvent::Campaign {
            campaign: Address::repeat(7),
            event: CampaignEvent::RefundIssued {
                backer: Address::repeat(2),
                amount: Wei::ether(1),
            },
        });
        assert_eq!(*seen.lock().unwrap(), vec![Address::repeat(7)]);
    }

    #[test]
    fn events_serialize_to_json() {
        let event = PlatformEvent::Campaign {
            campaign: Address::repeat(0xab),
            event: CampaignEvent::MilestoneRejected { milestone_index: 2 },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("MilestoneRejected"));
        let back: PlatformEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
