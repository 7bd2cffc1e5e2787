use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::data::comment_repository::{CommentPatch, CommentRepository, NewComment};
use crate::data::post_repository::{NewPost, PostFilter, PostOrder, PostPatch, PostRepository};
use crate::data::tag_repository::{NewTag, TagPatch, TagRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::comment::{Comment, CommentStatus};
use crate::domain::error::DomainError;
use crate::domain::pagination::PageRequest;
use crate::domain::post::{Post, PostStatus};
use crate::domain::stats::{CommentStats, PostStats, TagStats, UserStats};
use crate::domain::tag::{Tag, TagWithCount};
use crate::domain::user::{AuthorSummary, ProfileChanges, User};

/// In-process store implementing every repository trait over one shared
/// state, with the same uniqueness and cascade rules as the SQL schema.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    users: Vec<UserCredentials>,
    posts: Vec<Post>,
    tags: Vec<Tag>,
    post_tags: Vec<(i64, i64)>,
    comments: Vec<Comment>,
    fail_tag_writes: bool,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn published_count(&self, tag_id: i64) -> i64 {
        self.post_tags
            .iter()
            .filter(|(post_id, id)| {
                *id == tag_id
                    && self
                        .posts
                        .iter()
                        .any(|p| p.id == *post_id && p.status == PostStatus::Published)
            })
            .count() as i64
    }

    fn with_counts(&self, tags: Vec<Tag>) -> Vec<TagWithCount> {
        tags.into_iter()
            .map(|tag| {
                let posts_count = self.published_count(tag.id);
                TagWithCount { tag, posts_count }
            })
            .collect()
    }

    fn popular(&self, limit: i64) -> Vec<TagWithCount> {
        let mut tags: Vec<TagWithCount> = self
            .with_counts(self.tags.clone())
            .into_iter()
            .filter(|t| t.posts_count > 0)
            .collect();
        tags.sort_by(|a, b| {
            b.posts_count
                .cmp(&a.posts_count)
                .then_with(|| a.tag.name.cmp(&b.tag.name))
        });
        tags.truncate(usize::try_from(limit).unwrap_or(0));
        tags
    }

    fn matches(&self, post: &Post, filter: &PostFilter) -> bool {
        if filter.live_only {
            if !post.is_live(Utc::now()) {
                return false;
            }
        } else if filter.status.is_some_and(|status| status != post.status) {
            return false;
        }
        if filter.author_id.is_some_and(|id| id != post.author_id) {
            return false;
        }
        if let Some(tag_id) = filter.tag_id
            && !self.post_tags.contains(&(post.id, tag_id))
        {
            return false;
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            return [&post.title, &post.content, &post.excerpt]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
        }
        true
    }

    fn subtree(&self, id: i64) -> HashSet<i64> {
        let mut ids = HashSet::from([id]);
        loop {
            let before = ids.len();
            for comment in &self.comments {
                if comment.parent_id.is_some_and(|parent| ids.contains(&parent)) {
                    ids.insert(comment.id);
                }
            }
            if ids.len() == before {
                return ids;
            }
        }
    }
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory store mutex poisoned")
    }

    /// Inserts a user directly, bypassing password hashing.
    pub(crate) fn seed_user(&self, username: &str, is_admin: bool) -> User {
        let mut state = self.lock();
        let id = state.next_id();
        let now = Utc::now();
        let user = User {
            id,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: format!("{username}@example.com"),
            username: username.to_string(),
            bio: None,
            avatar: None,
            is_active: true,
            is_admin,
            created_at: now,
            updated_at: now,
        };
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: "not-a-hash".to_string(),
        });
        user
    }

    /// Direct mutable access to a stored post, for arranging edge cases.
    pub(crate) fn edit_post(&self, id: i64, edit: impl FnOnce(&mut Post)) {
        let mut state = self.lock();
        if let Some(post) = state.posts.iter_mut().find(|p| p.id == id) {
            edit(post);
        }
    }

    /// Makes every later `replace_post_tags` call fail.
    pub(crate) fn fail_tag_writes(&self) {
        self.lock().fail_tag_writes = true;
    }

    pub(crate) fn post_tag_ids(&self, post_id: i64) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .lock()
            .post_tags
            .iter()
            .filter(|(id, _)| *id == post_id)
            .map(|(_, tag_id)| *tag_id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.lock();
        if state.users.iter().any(|c| c.user.username == input.username) {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }
        if state.users.iter().any(|c| c.user.email == input.email) {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: state.next_id(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            username: input.username,
            bio: None,
            avatar: None,
            is_active: true,
            is_admin: input.is_admin,
            created_at: now,
            updated_at: now,
        };
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|c| c.user.id == id)
            .map(|c| c.user.clone()))
    }

    async fn find_credentials(&self, login: &str) -> Result<Option<UserCredentials>, DomainError> {
        let email = login.to_lowercase();
        Ok(self
            .lock()
            .users
            .iter()
            .find(|c| c.user.email == email || c.user.username == login)
            .cloned())
    }

    async fn find_credentials_by_id(
        &self,
        id: i64,
    ) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self.lock().users.iter().find(|c| c.user.id == id).cloned())
    }

    async fn email_taken(&self, email: &str, exclude_id: Option<i64>) -> Result<bool, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .any(|c| c.user.email == email && Some(c.user.id) != exclude_id))
    }

    async fn username_taken(
        &self,
        username: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .any(|c| c.user.username == username && Some(c.user.id) != exclude_id))
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<Option<User>, DomainError> {
        let mut state = self.lock();
        let Some(entry) = state.users.iter_mut().find(|c| c.user.id == id) else {
            return Ok(None);
        };
        let user = &mut entry.user;
        if let Some(first_name) = changes.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(bio) = changes.bio {
            user.bio = bio;
        }
        if let Some(avatar) = changes.avatar {
            user.avatar = avatar;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool, DomainError> {
        let mut state = self.lock();
        match state.users.iter_mut().find(|c| c.user.id == id) {
            Some(entry) => {
                entry.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<Option<User>, DomainError> {
        let mut state = self.lock();
        Ok(state
            .users
            .iter_mut()
            .find(|c| c.user.id == id)
            .map(|entry| {
                entry.user.is_active = is_active;
                entry.user.clone()
            }))
    }

    async fn list_users(&self, page: PageRequest) -> Result<Vec<User>, DomainError> {
        let mut users: Vec<User> = self.lock().users.iter().map(|c| c.user.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(users, page))
    }

    async fn count_users(&self) -> Result<i64, DomainError> {
        Ok(self.lock().users.len() as i64)
    }

    async fn summaries(&self, ids: &[i64]) -> Result<Vec<AuthorSummary>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|c| ids.contains(&c.user.id))
            .map(|c| c.user.summary())
            .collect())
    }

    async fn stats(&self) -> Result<UserStats, DomainError> {
        let state = self.lock();
        let total = state.users.len() as i64;
        let active = state.users.iter().filter(|c| c.user.is_active).count() as i64;
        let admins = state.users.iter().filter(|c| c.user.is_admin).count() as i64;
        Ok(UserStats {
            total,
            active,
            inactive: total - active,
            admins,
        })
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.lock();
        if state.posts.iter().any(|p| p.slug == input.slug) {
            return Err(DomainError::AlreadyExists("post slug".to_string()));
        }
        if !state.users.iter().any(|c| c.user.id == input.author_id) {
            return Err(DomainError::NotFound("author".to_string()));
        }

        let now = Utc::now();
        let post = Post {
            id: state.next_id(),
            author_id: input.author_id,
            title: input.title,
            slug: input.slug,
            content: input.content,
            excerpt: input.excerpt,
            featured_image: input.featured_image,
            status: input.status,
            view_count: 0,
            published_at: input.published_at,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.lock().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        Ok(self.lock().posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, DomainError> {
        Ok(self
            .lock()
            .posts
            .iter()
            .any(|p| p.slug == slug && Some(p.id) != exclude_id))
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        if state.posts.iter().any(|p| p.slug == patch.slug && p.id != id) {
            return Err(DomainError::AlreadyExists("post slug".to_string()));
        }
        let Some(post) = state.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        post.title = patch.title;
        post.slug = patch.slug;
        post.content = patch.content;
        post.excerpt = patch.excerpt;
        post.featured_image = patch.featured_image;
        post.status = patch.status;
        post.published_at = patch.published_at;
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.posts.len();
        state.posts.retain(|p| p.id != id);
        if state.posts.len() == before {
            return Ok(false);
        }
        state.post_tags.retain(|(post_id, _)| *post_id != id);
        state.comments.retain(|c| c.post_id != id);
        Ok(true)
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Vec<Post>, DomainError> {
        let state = self.lock();
        let mut posts: Vec<Post> = state
            .posts
            .iter()
            .filter(|p| state.matches(p, filter))
            .cloned()
            .collect();
        match filter.order {
            PostOrder::CreatedDesc => {
                posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)))
            }
            PostOrder::PublishedDesc => posts.sort_by(|a, b| {
                // `None` sorts first under Option's Ord, last once reversed
                b.published_at
                    .cmp(&a.published_at)
                    .then(b.id.cmp(&a.id))
            }),
        }
        Ok(paginate(posts, page))
    }

    async fn count_posts(&self, filter: &PostFilter) -> Result<i64, DomainError> {
        let state = self.lock();
        Ok(state.posts.iter().filter(|p| state.matches(p, filter)).count() as i64)
    }

    async fn increment_view_count(&self, id: i64) -> Result<(), DomainError> {
        if let Some(post) = self.lock().posts.iter_mut().find(|p| p.id == id) {
            post.view_count += 1;
        }
        Ok(())
    }

    async fn stats(&self) -> Result<PostStats, DomainError> {
        let state = self.lock();
        let count = |status: PostStatus| {
            state.posts.iter().filter(|p| p.status == status).count() as i64
        };
        Ok(PostStats {
            total: state.posts.len() as i64,
            drafts: count(PostStatus::Draft),
            published: count(PostStatus::Published),
            archived: count(PostStatus::Archived),
            total_views: state.posts.iter().map(|p| p.view_count).sum(),
        })
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn create_tag(&self, input: NewTag) -> Result<Tag, DomainError> {
        let mut state = self.lock();
        if state.tags.iter().any(|t| t.slug == input.slug) {
            return Err(DomainError::AlreadyExists("tag slug".to_string()));
        }
        if state
            .tags
            .iter()
            .any(|t| t.name.to_lowercase() == input.name.to_lowercase())
        {
            return Err(DomainError::AlreadyExists("tag name".to_string()));
        }

        let now = Utc::now();
        let tag = Tag {
            id: state.next_id(),
            name: input.name,
            slug: input.slug,
            description: input.description,
            color: input.color,
            created_at: now,
            updated_at: now,
        };
        state.tags.push(tag.clone());
        Ok(tag)
    }

    async fn get_tag(&self, id: i64) -> Result<Option<Tag>, DomainError> {
        Ok(self.lock().tags.iter().find(|t| t.id == id).cloned())
    }

    async fn get_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, DomainError> {
        Ok(self.lock().tags.iter().find(|t| t.slug == slug).cloned())
    }

    async fn name_taken(&self, name: &str, exclude_id: Option<i64>) -> Result<bool, DomainError> {
        let name = name.to_lowercase();
        Ok(self
            .lock()
            .tags
            .iter()
            .any(|t| t.name.to_lowercase() == name && Some(t.id) != exclude_id))
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, DomainError> {
        Ok(self
            .lock()
            .tags
            .iter()
            .any(|t| t.slug == slug && Some(t.id) != exclude_id))
    }

    async fn update_tag(&self, id: i64, patch: TagPatch) -> Result<Option<Tag>, DomainError> {
        let mut state = self.lock();
        if state.tags.iter().any(|t| t.slug == patch.slug && t.id != id) {
            return Err(DomainError::AlreadyExists("tag slug".to_string()));
        }
        let Some(tag) = state.tags.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        tag.name = patch.name;
        tag.slug = patch.slug;
        tag.description = patch.description;
        tag.color = patch.color;
        tag.updated_at = Utc::now();
        Ok(Some(tag.clone()))
    }

    async fn delete_tag(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.tags.len();
        state.tags.retain(|t| t.id != id);
        state.post_tags.retain(|(_, tag_id)| *tag_id != id);
        Ok(state.tags.len() < before)
    }

    async fn list_tags(&self, page: PageRequest) -> Result<Vec<TagWithCount>, DomainError> {
        let state = self.lock();
        let mut tags = state.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(state.with_counts(tags), page))
    }

    async fn count_tags(&self) -> Result<i64, DomainError> {
        Ok(self.lock().tags.len() as i64)
    }

    async fn all_tags(&self) -> Result<Vec<Tag>, DomainError> {
        let mut tags = self.lock().tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn popular_tags(&self, limit: i64) -> Result<Vec<TagWithCount>, DomainError> {
        Ok(self.lock().popular(limit))
    }

    async fn published_post_count(&self, tag_id: i64) -> Result<i64, DomainError> {
        Ok(self.lock().published_count(tag_id))
    }

    async fn existing_ids(&self, ids: &[i64]) -> Result<Vec<i64>, DomainError> {
        let mut found: Vec<i64> = self
            .lock()
            .tags
            .iter()
            .map(|t| t.id)
            .filter(|id| ids.contains(id))
            .collect();
        found.sort_unstable();
        Ok(found)
    }

    async fn replace_post_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<(), DomainError> {
        let mut state = self.lock();
        if state.fail_tag_writes {
            return Err(DomainError::Unexpected("post_tags write failed".to_string()));
        }
        state.post_tags.retain(|(id, _)| *id != post_id);
        let known: Vec<i64> = state
            .tags
            .iter()
            .map(|t| t.id)
            .filter(|id| tag_ids.contains(id))
            .collect();
        state
            .post_tags
            .extend(known.into_iter().map(|tag_id| (post_id, tag_id)));
        Ok(())
    }

    async fn tags_for_posts(&self, post_ids: &[i64]) -> Result<Vec<(i64, Tag)>, DomainError> {
        let state = self.lock();
        let tags: HashMap<i64, &Tag> = state.tags.iter().map(|t| (t.id, t)).collect();
        let mut pairs: Vec<(i64, Tag)> = state
            .post_tags
            .iter()
            .filter(|(post_id, _)| post_ids.contains(post_id))
            .filter_map(|(post_id, tag_id)| tags.get(tag_id).map(|t| (*post_id, (*t).clone())))
            .collect();
        pairs.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        Ok(pairs)
    }

    async fn stats(&self) -> Result<TagStats, DomainError> {
        let state = self.lock();
        let used = state
            .tags
            .iter()
            .filter(|t| state.post_tags.iter().any(|(_, id)| *id == t.id))
            .count() as i64;
        let total = state.tags.len() as i64;
        Ok(TagStats {
            total,
            used,
            unused: total - used,
            top: state.popular(5),
        })
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.lock();
        if !state.posts.iter().any(|p| p.id == input.post_id) {
            return Err(DomainError::NotFound("post".to_string()));
        }
        if let Some(parent_id) = input.parent_id
            && !state
                .comments
                .iter()
                .any(|c| c.id == parent_id && c.post_id == input.post_id)
        {
            return Err(DomainError::NotFound("parent comment".to_string()));
        }

        let now = Utc::now();
        let comment = Comment {
            id: state.next_id(),
            post_id: input.post_id,
            author_id: input.author_id,
            parent_id: input.parent_id,
            content: input.content,
            status: CommentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        Ok(self.lock().comments.iter().find(|c| c.id == id).cloned())
    }

    async fn update_comment(
        &self,
        id: i64,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, DomainError> {
        let mut state = self.lock();
        Ok(state
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .map(|comment| {
                comment.content = patch.content;
                comment.status = patch.status;
                comment.updated_at = Utc::now();
                comment.clone()
            }))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        if !state.comments.iter().any(|c| c.id == id) {
            return Ok(false);
        }
        let doomed = state.subtree(id);
        state.comments.retain(|c| !doomed.contains(&c.id));
        Ok(true)
    }

    async fn set_status(
        &self,
        id: i64,
        status: CommentStatus,
    ) -> Result<Option<Comment>, DomainError> {
        let mut state = self.lock();
        Ok(state
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .map(|comment| {
                comment.status = status;
                comment.updated_at = Utc::now();
                comment.clone()
            }))
    }

    async fn approved_roots(
        &self,
        post_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Comment>, DomainError> {
        let mut roots: Vec<Comment> = self
            .lock()
            .comments
            .iter()
            .filter(|c| {
                c.post_id == post_id && c.parent_id.is_none() && c.status == CommentStatus::Approved
            })
            .cloned()
            .collect();
        roots.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(roots, page))
    }

    async fn count_approved_roots(&self, post_id: i64) -> Result<i64, DomainError> {
        Ok(self
            .lock()
            .comments
            .iter()
            .filter(|c| {
                c.post_id == post_id && c.parent_id.is_none() && c.status == CommentStatus::Approved
            })
            .count() as i64)
    }

    async fn approved_descendants(&self, root_ids: &[i64]) -> Result<Vec<Comment>, DomainError> {
        let state = self.lock();
        let mut reached: HashSet<i64> = root_ids.iter().copied().collect();
        let mut found = Vec::new();
        loop {
            let next: Vec<Comment> = state
                .comments
                .iter()
                .filter(|c| {
                    c.status == CommentStatus::Approved
                        && !reached.contains(&c.id)
                        && c.parent_id.is_some_and(|parent| reached.contains(&parent))
                })
                .cloned()
                .collect();
            if next.is_empty() {
                break;
            }
            reached.extend(next.iter().map(|c| c.id));
            found.extend(next);
        }
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn by_author(
        &self,
        author_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Comment>, DomainError> {
        let mut comments: Vec<Comment> = self
            .lock()
            .comments
            .iter()
            .filter(|c| c.author_id == author_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(comments, page))
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64, DomainError> {
        Ok(self
            .lock()
            .comments
            .iter()
            .filter(|c| c.author_id == author_id)
            .count() as i64)
    }

    async fn pending(&self, page: PageRequest) -> Result<Vec<Comment>, DomainError> {
        let mut comments: Vec<Comment> = self
            .lock()
            .comments
            .iter()
            .filter(|c| c.status == CommentStatus::Pending)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(paginate(comments, page))
    }

    async fn count_pending(&self) -> Result<i64, DomainError> {
        Ok(self
            .lock()
            .comments
            .iter()
            .filter(|c| c.status == CommentStatus::Pending)
            .count() as i64)
    }

    async fn approved_counts(&self, post_ids: &[i64]) -> Result<Vec<(i64, i64)>, DomainError> {
        let state = self.lock();
        Ok(post_ids
            .iter()
            .map(|post_id| {
                let total = state
                    .comments
                    .iter()
                    .filter(|c| c.post_id == *post_id && c.status == CommentStatus::Approved)
                    .count() as i64;
                (*post_id, total)
            })
            .collect())
    }

    async fn stats(&self) -> Result<CommentStats, DomainError> {
        let state = self.lock();
        let count = |status: CommentStatus| {
            state.comments.iter().filter(|c| c.status == status).count() as i64
        };
        Ok(CommentStats {
            total: state.comments.len() as i64,
            pending: count(CommentStatus::Pending),
            approved: count(CommentStatus::Approved),
            rejected: count(CommentStatus::Rejected),
        })
    }
}
