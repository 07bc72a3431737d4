pub mod auth;
pub mod health;
pub mod priorities;
pub mod recurring;
pub mod tags;
pub mod tasks;
pub mod users;

use actix_web::web;

/// Registers the API routes. Literal sub-paths (`/{id}/complete`,
/// `/{id}/tags`, `/{id}/spawn`) are registered before the bare `/{id}`
/// resources so a literal segment is never captured as an identifier.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::refresh)
            .service(auth::logout)
            .service(auth::forgot_password)
            .service(auth::reset_password),
    )
    .service(
        web::scope("/users")
            .service(users::get_me)
            .service(users::update_me),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::toggle_complete)
            .service(tasks::list_task_tags)
            .service(tasks::attach_tag)
            .service(tasks::detach_tag)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/priorities")
            .service(priorities::list_priorities)
            .service(priorities::create_priority)
            .service(priorities::update_priority)
            .service(priorities::delete_priority),
    )
    .service(
        web::scope("/tags")
            .service(tags::list_tags)
            .service(tags::create_tag)
            .service(tags::update_tag)
            .service(tags::delete_tag),
    )
    .service(
        web::scope("/recurring")
            .service(recurring::list_recurring)
            .service(recurring::create_recurring)
            .service(recurring::spawn_instance)
            .service(recurring::list_instances)
            .service(recurring::get_recurring)
            .service(recurring::update_recurring)
            .service(recurring::delete_recurring),
    );
}
