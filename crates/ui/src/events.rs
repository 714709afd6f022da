//! Named page events and the handler registry they are published through

use std::collections::HashMap;
use std::str::FromStr;

use soilcast_core::Coordinate;

use crate::lookup::PendingLookup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    FragmentReplaced,
    MapClicked,
    GeocodeRequested,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::FragmentReplaced => "fragment-replaced",
            EventKind::MapClicked => "map-clicked",
            EventKind::GeocodeRequested => "geocode-requested",
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fragment-replaced" => Ok(EventKind::FragmentReplaced),
            "map-clicked" => Ok(EventKind::MapClicked),
            "geocode-requested" => Ok(EventKind::GeocodeRequested),
            other => Err(format!("unknown page event: {}", other)),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// HTMX swapped new content into the element with this id
    FragmentReplaced { target_id: String },
    MapClicked(Coordinate),
    /// The search button was pressed; the query is read from the form
    GeocodeRequested,
}

impl PageEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PageEvent::FragmentReplaced { .. } => EventKind::FragmentReplaced,
            PageEvent::MapClicked(_) => EventKind::MapClicked,
            PageEvent::GeocodeRequested => EventKind::GeocodeRequested,
        }
    }
}

/// Work a handler asks the runtime to perform after it returns
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Geocode(PendingLookup),
}

pub type Handler<C> = Box<dyn FnMut(&mut C, &PageEvent) -> Option<Effect>>;

pub struct EventBus<C> {
    handlers: HashMap<EventKind, Vec<Handler<C>>>,
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<C> EventBus<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: FnMut(&mut C, &PageEvent) -> Option<Effect> + 'static,
    {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Run the event's handlers in subscription order, collecting their effects.
    pub fn publish(&mut self, ctx: &mut C, event: &PageEvent) -> Vec<Effect> {
        let Some(handlers) = self.handlers.get_mut(&event.kind()) else {
            log::trace!("no handlers for {}", event.kind());
            return Vec::new();
        };
        handlers
            .iter_mut()
            .filter_map(|handler| handler(&mut *ctx, event))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in [
            EventKind::FragmentReplaced,
            EventKind::MapClicked,
            EventKind::GeocodeRequested,
        ] {
            assert_eq!(kind.name().parse::<EventKind>(), Ok(kind));
        }
        assert!("htmx:afterSwap".parse::<EventKind>().is_err());
    }

    #[test]
    fn publishes_to_matching_handlers_in_order() {
        let mut bus: EventBus<Vec<String>> = EventBus::new();
        bus.subscribe(EventKind::FragmentReplaced, |log, event| {
            if let PageEvent::FragmentReplaced { target_id } = event {
                log.push(format!("first:{}", target_id));
            }
            None
        });
        bus.subscribe(EventKind::FragmentReplaced, |log, _| {
            log.push("second".into());
            None
        });
        bus.subscribe(EventKind::GeocodeRequested, |log, _| {
            log.push("geocode".into());
            Some(Effect::Geocode(PendingLookup {
                generation: 1,
                query: "x".into(),
            }))
        });

        let mut log = Vec::new();
        let effects = bus.publish(
            &mut log,
            &PageEvent::FragmentReplaced {
                target_id: "forecast-chart".into(),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(log, vec!["first:forecast-chart", "second"]);

        let effects = bus.publish(&mut log, &PageEvent::GeocodeRequested);
        assert_eq!(effects.len(), 1);
        assert_eq!(bus.handler_count(EventKind::MapClicked), 0);
        assert!(bus
            .publish(
                &mut log,
                &PageEvent::MapClicked(Coordinate::new(0.0, 0.0).unwrap())
            )
            .is_empty());
    }
}
