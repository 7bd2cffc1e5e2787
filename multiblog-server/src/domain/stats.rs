use super::tag::TagWithCount;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct UserStats {
    pub(crate) total: i64,
    pub(crate) active: i64,
    pub(crate) inactive: i64,
    pub(crate) admins: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PostStats {
    pub(crate) total: i64,
    pub(crate) drafts: i64,
    pub(crate) published: i64,
    pub(crate) archived: i64,
    pub(crate) total_views: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CommentStats {
    pub(crate) total: i64,
    pub(crate) pending: i64,
    pub(crate) approved: i64,
    pub(crate) rejected: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TagStats {
    pub(crate) total: i64,
    pub(crate) used: i64,
    pub(crate) unused: i64,
    pub(crate) top: Vec<TagWithCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DashboardStats {
    pub(crate) users: UserStats,
    pub(crate) posts: PostStats,
    pub(crate) comments: CommentStats,
    pub(crate) tags: TagStats,
}
