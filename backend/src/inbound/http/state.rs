//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the driving ports,
//! so they stay testable without storage.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    BeerCatalog, BeerRepository, EventLifecycle, EventRepository, FavoriteLedger,
    FavoriteRepository, IdentityResolver, MembershipLedger, ParticipantRepository, ReviewLedger,
    ReviewRepository, UserRepository,
};
use crate::domain::{
    BeerService, EventService, FavoriteService, IdentityService, JoinCodeSource,
    MembershipService, ReviewService,
};

/// Parameter object bundling every driving port the handlers call.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Identity Resolver.
    pub identity: Arc<dyn IdentityResolver>,
    /// Event Lifecycle.
    pub events: Arc<dyn EventLifecycle>,
    /// Membership Ledger.
    pub membership: Arc<dyn MembershipLedger>,
    /// Beer catalogue.
    pub beers: Arc<dyn BeerCatalog>,
    /// Favorite Ledger.
    pub favorites: Arc<dyn FavoriteLedger>,
    /// Review Ledger.
    pub reviews: Arc<dyn ReviewLedger>,
}

/// The driven adapters a set of services is built over.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use tasting_backend::domain::RandomJoinCodeSource;
/// use tasting_backend::inbound::http::state::{HttpState, Repositories};
/// use tasting_backend::outbound::memory::MemoryStore;
///
/// let ports = Repositories::shared(Arc::new(MemoryStore::new()))
///     .into_ports(Arc::new(RandomJoinCodeSource::new()), Arc::new(DefaultClock));
/// let state = HttpState::new(ports);
/// assert!(!state.trust_identity_headers);
/// ```
pub struct Repositories<U, E, P, B, F, R> {
    /// User store.
    pub users: Arc<U>,
    /// Event store.
    pub events: Arc<E>,
    /// Participant store.
    pub participants: Arc<P>,
    /// Beer store.
    pub beers: Arc<B>,
    /// Favourite store.
    pub favorites: Arc<F>,
    /// Review store.
    pub reviews: Arc<R>,
}

impl<S> Repositories<S, S, S, S, S, S> {
    /// Use one adapter for every port.
    pub fn shared(store: Arc<S>) -> Self {
        Self {
            users: Arc::clone(&store),
            events: Arc::clone(&store),
            participants: Arc::clone(&store),
            beers: Arc::clone(&store),
            favorites: Arc::clone(&store),
            reviews: store,
        }
    }
}

impl<U, E, P, B, F, R> Repositories<U, E, P, B, F, R>
where
    U: UserRepository + 'static,
    E: EventRepository + 'static,
    P: ParticipantRepository + 'static,
    B: BeerRepository + 'static,
    F: FavoriteRepository + 'static,
    R: ReviewRepository + 'static,
{
    /// Build every domain service over these adapters.
    pub fn into_ports(self, codes: Arc<dyn JoinCodeSource>, clock: Arc<dyn Clock>) -> HttpStatePorts {
        let Self {
            users,
            events,
            participants,
            beers,
            favorites,
            reviews,
        } = self;
        HttpStatePorts {
            identity: Arc::new(IdentityService::new(users, Arc::clone(&clock))),
            events: Arc::new(EventService::new(
                Arc::clone(&events),
                Arc::clone(&participants),
                codes,
                Arc::clone(&clock),
            )),
            membership: Arc::new(MembershipService::new(
                Arc::clone(&events),
                Arc::clone(&participants),
                Arc::clone(&clock),
            )),
            beers: Arc::new(BeerService::new(
                Arc::clone(&events),
                Arc::clone(&participants),
                Arc::clone(&beers),
                Arc::clone(&clock),
            )),
            favorites: Arc::new(FavoriteService::new(
                Arc::clone(&events),
                Arc::clone(&participants),
                Arc::clone(&beers),
                favorites,
                Arc::clone(&clock),
            )),
            reviews: Arc::new(ReviewService::new(events, participants, beers, reviews, clock)),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Identity Resolver.
    pub identity: Arc<dyn IdentityResolver>,
    /// Event Lifecycle.
    pub events: Arc<dyn EventLifecycle>,
    /// Membership Ledger.
    pub membership: Arc<dyn MembershipLedger>,
    /// Beer catalogue.
    pub beers: Arc<dyn BeerCatalog>,
    /// Favorite Ledger.
    pub favorites: Arc<dyn FavoriteLedger>,
    /// Review Ledger.
    pub reviews: Arc<dyn ReviewLedger>,
    /// Whether the identity headers set by the fronting proxy are trusted.
    ///
    /// When false no caller can be resolved and caller-bound endpoints
    /// answer 503.
    pub trust_identity_headers: bool,
}

impl HttpState {
    /// Construct state from the ports bundle.
    ///
    /// Identity headers start untrusted; see [`HttpState::trusting_identity_headers`].
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            identity,
            events,
            membership,
            beers,
            favorites,
            reviews,
        } = ports;
        Self {
            identity,
            events,
            membership,
            beers,
            favorites,
            reviews,
            trust_identity_headers: false,
        }
    }

    /// Set whether the identity proxy headers are trusted.
    #[must_use]
    pub fn trusting_identity_headers(mut self, trusted: bool) -> Self {
        self.trust_identity_headers = trusted;
        self
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
