#[macro_use]
extern crate rocket;
#[macro_use]
extern crate diesel;

mod config;
mod database;
mod error;
mod event_store;
mod hub;
mod ledger;
mod session_registry;
mod table_actor;
mod view;

use database::DbConn;
use hub::Hub;
use session_registry::SessionRegistry;

#[launch]
fn rocket() -> _ {
    env_logger::init();
    let settings = config::Settings::load().expect("failed to load configuration");
    let registry = SessionRegistry::new();
    let hub = Hub::new(registry, settings.clone());

    let figment = rocket::Config::figment()
        .merge(("address", settings.bind_address.clone()))
        .merge(("port", settings.bind_port))
        .merge(("databases.sqlite.url", settings.database_url.clone()));

    rocket::custom(figment)
        .manage(hub)
        .manage(settings)
        .attach(DbConn::fairing())
        .mount("/", routes![hub::ws])
}
