// Route exports
pub mod matches;
pub mod profiles;

use actix_web::web;

pub use matches::{AppState, MatchContext};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(profiles::configure),
    );
}
