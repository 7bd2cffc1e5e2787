pub(crate) mod comment;
pub(crate) mod error;
pub(crate) mod pagination;
pub(crate) mod post;
pub(crate) mod slug;
pub(crate) mod stats;
pub(crate) mod tag;
pub(crate) mod text;
pub(crate) mod user;
