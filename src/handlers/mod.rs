pub mod bond;
pub mod fund;
pub mod futures;
pub mod health;
pub mod index;
pub mod macro_china;
pub mod stock;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(stock::config)
            .configure(futures::config)
            .configure(bond::config)
            .configure(fund::config)
            .configure(index::config)
            .configure(macro_china::config),
    );
}
