use std::time::{SystemTime, UNIX_EPOCH};

use multiblog_client::{BlogClient, BlogClientError, NewPost, PostUpdate, RegisterInput};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{nanos}")
}

fn base_url() -> String {
    std::env::var("MULTIBLOG_SERVER").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

async fn registered_client(prefix: &str) -> BlogClient {
    let mut client = BlogClient::new(base_url()).expect("client must build");
    let suffix = unique_suffix();
    let input = RegisterInput {
        first_name: "Smoke".to_string(),
        last_name: "Tester".to_string(),
        email: format!("{prefix}_{suffix}@example.com"),
        username: format!("{prefix}{}", &suffix[suffix.len() - 12..]),
        password: "password123".to_string(),
    };

    let auth = client.register(&input).await.expect("register must succeed");
    assert_eq!(auth.user.username, input.username);
    assert_eq!(auth.token_type, "Bearer");
    assert!(client.get_token().is_some());
    client
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn post_lifecycle() {
    let client = registered_client("author").await;

    let created = client
        .create_post(&NewPost {
            title: "Hello World".to_string(),
            content: "This is my first post body.".to_string(),
            ..NewPost::default()
        })
        .await
        .expect("create_post must succeed");
    assert_eq!(created.slug, "hello-world");
    assert_eq!(created.status, "draft");
    assert!(created.published_at.is_none());

    let anonymous = BlogClient::new(base_url()).expect("client must build");
    let hidden = anonymous.get_post(created.id).await;
    assert!(matches!(hidden, Err(BlogClientError::NotFound(_))));

    let published = client
        .publish_post(created.id)
        .await
        .expect("publish must succeed");
    assert_eq!(published.status, "published");
    assert!(published.published_at.is_some());

    let fetched = anonymous
        .get_post(created.id)
        .await
        .expect("published post is public");
    assert_eq!(fetched.id, created.id);

    let updated = client
        .update_post(
            created.id,
            &PostUpdate {
                title: Some("Hello World again".to_string()),
                ..PostUpdate::default()
            },
        )
        .await
        .expect("update_post must succeed");
    assert_eq!(updated.title, "Hello World again");

    let stranger = registered_client("stranger").await;
    let forbidden = stranger.delete_post(created.id).await;
    assert!(matches!(forbidden, Err(BlogClientError::Forbidden(_))));

    client
        .delete_post(created.id)
        .await
        .expect("delete_post must succeed");
    let after_delete = client.get_post(created.id).await;
    assert!(matches!(after_delete, Err(BlogClientError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn comments_wait_for_moderation() {
    let author = registered_client("writer").await;
    let post = author
        .create_post(&NewPost {
            title: "Comment target".to_string(),
            content: "A post that collects comments.".to_string(),
            status: Some("published".to_string()),
            ..NewPost::default()
        })
        .await
        .expect("create_post must succeed");

    let reader = registered_client("reader").await;
    let comment = reader
        .add_comment(post.id, None, "Nice post!")
        .await
        .expect("add_comment must succeed");
    assert_eq!(comment.status, "pending");

    let threads = reader
        .comments_for_post(post.id, 1, 10)
        .await
        .expect("listing must succeed");
    assert!(threads.items.iter().all(|c| c.id != comment.id));

    let denied = reader.approve_comment(comment.id).await;
    assert!(matches!(denied, Err(BlogClientError::Forbidden(_))));
}
