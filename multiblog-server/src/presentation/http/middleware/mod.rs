pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod cors;
pub(crate) mod limits;
pub(crate) mod trace;
