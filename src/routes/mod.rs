pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

/// Registers every handler; mounted under the `/api/tasks` scope by the
/// server (and by the integration tests). Register/login come first so the
/// static segments win over the `/{id}` matcher.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(tasks::list_tasks)
        .service(tasks::create_task)
        .service(tasks::get_task)
        .service(tasks::update_task)
        .service(tasks::delete_task);
}
