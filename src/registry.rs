//! Static registry mapping push-event subscriptions to handlers.
//!
//! The table below is the single source of truth for which local
//! endpoints the bridge subscribes to and which handler runs for an
//! incoming `(path, kind)` pair. Events that resolve to no route are
//! ignored explicitly rather than falling through.

use crate::event::EventKind;

/// Path of the game-flow phase resource.
pub const GAMEFLOW_PHASE_PATH: &str = "/lol-gameflow/v1/gameflow-phase";

/// Path of the current-summoner resource.
pub const CURRENT_SUMMONER_PATH: &str = "/lol-summoner/v1/current-summoner";

/// Path of the region/locale resource (request-only, no subscription).
pub const REGION_LOCALE_PATH: &str = "/riotclient/region-locale";

/// Handler routes for subscribed push events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventRoute {
    /// Game-flow phase changed.
    GameflowPhase,
    /// Local player identity was created or updated.
    Summoner,
}

/// One subscription: a resource path, the event kinds it accepts, and
/// the handler it routes to.
#[derive(Debug)]
pub struct Subscription {
    /// Resource path on the local endpoint.
    pub path: &'static str,
    /// Event kinds this subscription reacts to.
    pub kinds: &'static [EventKind],
    route: EventRoute,
}

/// The full subscription table, resolved once at startup.
pub(crate) const SUBSCRIPTIONS: &[Subscription] = &[
    Subscription {
        path: GAMEFLOW_PHASE_PATH,
        kinds: &[EventKind::Create, EventKind::Update, EventKind::Delete],
        route: EventRoute::GameflowPhase,
    },
    Subscription {
        path: CURRENT_SUMMONER_PATH,
        kinds: &[EventKind::Update, EventKind::Create],
        route: EventRoute::Summoner,
    },
];

/// Paths the event stream must subscribe to.
pub fn subscription_paths() -> impl Iterator<Item = &'static str> {
    SUBSCRIPTIONS.iter().map(|s| s.path)
}

/// Resolve an incoming `(path, kind)` pair to its handler route.
///
/// Returns `None` for anything outside the table; such events are
/// logged at debug level and dropped by the caller.
pub(crate) fn resolve(path: &str, kind: EventKind) -> Option<EventRoute> {
    SUBSCRIPTIONS
        .iter()
        .find(|s| s.path == path && s.kinds.contains(&kind))
        .map(|s| s.route)
}
