//! Realtime routes: the websocket upgrade endpoint.

use actix_web::web;

use crate::ws::session::upgrade;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::get().to(upgrade)));
}
