//! Driving port for the beers poured at an event.

use async_trait::async_trait;

use crate::domain::{Beer, Caller, Error, EventId};

/// Raw beer fields from a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddBeerRequest {
    /// Name.
    pub name: String,
    /// Brewery.
    pub brewery: Option<String>,
    /// Style.
    pub style: Option<String>,
    /// Alcohol by volume in percent.
    pub abv: Option<f64>,
}

/// Beer use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BeerCatalog: Send + Sync {
    /// Add a beer; requires access.
    async fn add(
        &self,
        caller: &Caller,
        event_id: &EventId,
        request: AddBeerRequest,
    ) -> Result<Beer, Error>;

    /// Beers of an event, oldest first; requires access.
    async fn list(&self, caller: &Caller, event_id: &EventId) -> Result<Vec<Beer>, Error>;
}
