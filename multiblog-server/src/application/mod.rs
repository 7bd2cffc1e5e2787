pub(crate) mod admin_service;
pub(crate) mod auth_service;
pub(crate) mod comment_service;
pub(crate) mod post_service;
pub(crate) mod tag_service;
pub(crate) mod user_service;
