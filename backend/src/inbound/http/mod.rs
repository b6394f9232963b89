//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every caller-bound handler takes an [`caller::Authenticated`] extractor,
//! so identity resolution happens before the handler body runs.

pub mod beers;
pub mod caller;
pub mod error;
pub mod events;
pub mod favorites;
pub mod health;
pub mod membership;
pub mod reviews;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::{Scope, web};

/// Every caller-bound route under `/api`.
///
/// Route order matters: the fixed `/events/mine` and `/events/open` paths are
/// registered before `/events/{event_id}`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use tasting_backend::inbound::http::api_scope;
///
/// let _app = App::new().service(api_scope());
/// ```
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .service(users::get_me)
        .service(users::update_me)
        .service(events::create_event)
        .service(events::list_my_events)
        .service(events::list_open_events)
        .service(events::get_event)
        .service(events::delete_event)
        .service(events::change_event_status)
        .service(membership::join_event)
        .service(membership::remove_participant)
        .service(membership::restore_participant)
        .service(beers::list_beers)
        .service(beers::add_beer)
        .service(favorites::add_favorite)
        .service(favorites::remove_favorite)
        .service(favorites::list_event_favorites)
        .service(favorites::list_my_favorites)
        .service(reviews::create_review)
        .service(reviews::get_my_review)
        .service(reviews::update_my_review)
}
