pub(crate) mod app_error;
pub(crate) mod envelope;
pub(crate) mod extract;
pub(crate) mod handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;
