use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use multiblog_client::{
    AuthResponse, BlogClient, BlogClientError, Comment, NewPost, NewTag, Page, Post, PostUpdate,
    RegisterInput, Tag,
};

const TOKEN_FILE: &str = ".blog_token";
const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "multiblog-cli", version, about = "Command-line client for multiblog")]
struct Cli {
    /// Server address; falls back to MULTIBLOG_SERVER, then to the local default.
    #[arg(long, global = true, env = "MULTIBLOG_SERVER")]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account and log in.
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Log in by email or username.
    Login {
        #[arg(long)]
        login: String,
        #[arg(long)]
        password: String,
    },
    /// Show the logged-in account.
    Whoami,
    /// Manage posts.
    #[command(subcommand)]
    Post(PostCommand),
    /// Browse and create tags.
    #[command(subcommand)]
    Tag(TagCommand),
    /// Comment and moderate.
    #[command(subcommand)]
    Comment(CommentCommand),
}

#[derive(Debug, Args)]
struct Paging {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    per_page: u32,
}

#[derive(Debug, Subcommand)]
enum PostCommand {
    /// Create a post (draft unless --status is given).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Comma-separated tag ids.
        #[arg(long, value_delimiter = ',')]
        tags: Vec<i64>,
    },
    /// Show a post by id or by slug.
    Get {
        #[arg(long, conflicts_with = "slug", required_unless_present = "slug")]
        id: Option<i64>,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Change fields of a post; omitted fields stay as they are.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Comma-separated tag ids replacing the current set.
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<i64>>,
    },
    /// Delete a post.
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Publish a post.
    Publish {
        #[arg(long)]
        id: i64,
    },
    /// Move a post back to draft.
    Unpublish {
        #[arg(long)]
        id: i64,
    },
    /// List posts, newest first.
    List {
        /// Only the published feed.
        #[arg(long)]
        published: bool,
        #[command(flatten)]
        paging: Paging,
    },
    /// Search published posts.
    Search {
        #[arg(long)]
        query: String,
        #[command(flatten)]
        paging: Paging,
    },
}

#[derive(Debug, Subcommand)]
enum TagCommand {
    /// List tags by name.
    List {
        #[command(flatten)]
        paging: Paging,
    },
    /// Most used tags.
    Popular {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Create a tag (admin).
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum CommentCommand {
    /// Comment on a post or reply to a comment.
    Add {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        parent_id: Option<i64>,
        #[arg(long)]
        content: String,
    },
    /// Approved comment threads of a post.
    List {
        #[arg(long)]
        post_id: i64,
        #[command(flatten)]
        paging: Paging,
    },
    /// Approve a pending comment (admin).
    Approve {
        #[arg(long)]
        id: i64,
    },
    /// Reject a comment (admin).
    Reject {
        #[arg(long)]
        id: i64,
    },
    /// Show the moderation queue (admin).
    Pending {
        #[command(flatten)]
        paging: Paging,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let server = normalize_server(cli.server.unwrap_or_else(|| DEFAULT_SERVER.to_string()));
    let mut client = BlogClient::new(server).map_err(map_client_error)?;

    if let Some(token) = load_token().context("failed to read .blog_token")? {
        client.set_token(token);
    }

    match cli.command {
        Command::Register {
            first_name,
            last_name,
            email,
            username,
            password,
        } => {
            let input = RegisterInput {
                first_name,
                last_name,
                email,
                username,
                password,
            };
            let auth = client.register(&input).await.map_err(map_client_error)?;
            persist_token(&client).context("failed to save token")?;
            print_auth("Registered and logged in", &auth);
        }
        Command::Login { login, password } => {
            let auth = client
                .login(&login, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("failed to save token")?;
            print_auth("Logged in", &auth);
        }
        Command::Whoami => {
            let user = client.profile().await.map_err(map_client_error)?;
            let role = if user.is_admin { "admin" } else { "user" };
            println!("{} <{}> id={} role={role}", user.username, user.email, user.id);
        }
        Command::Post(command) => run_post(&client, command).await?,
        Command::Tag(command) => run_tag(&client, command).await?,
        Command::Comment(command) => run_comment(&client, command).await?,
    }

    Ok(())
}

async fn run_post(client: &BlogClient, command: PostCommand) -> Result<()> {
    match command {
        PostCommand::Create {
            title,
            content,
            excerpt,
            status,
            tags,
        } => {
            let post = client
                .create_post(&NewPost {
                    title,
                    content,
                    excerpt,
                    featured_image: None,
                    status,
                    tag_ids: tags,
                })
                .await
                .map_err(map_client_error)?;
            print_post("Post created", &post);
        }
        PostCommand::Get { id, slug } => {
            let post = match (id, slug) {
                (Some(id), _) => client.get_post(id).await,
                (None, Some(slug)) => client.get_post_by_slug(&slug).await,
                (None, None) => anyhow::bail!("either --id or --slug is required"),
            }
            .map_err(map_client_error)?;
            print_post("Post", &post);
        }
        PostCommand::Update {
            id,
            title,
            content,
            excerpt,
            status,
            tags,
        } => {
            let update = PostUpdate {
                title,
                content,
                excerpt,
                featured_image: None,
                status,
                tag_ids: tags,
            };
            let post = client
                .update_post(id, &update)
                .await
                .map_err(map_client_error)?;
            print_post("Post updated", &post);
        }
        PostCommand::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Post deleted: id={id}");
        }
        PostCommand::Publish { id } => {
            let post = client.publish_post(id).await.map_err(map_client_error)?;
            print_post("Post published", &post);
        }
        PostCommand::Unpublish { id } => {
            let post = client.unpublish_post(id).await.map_err(map_client_error)?;
            print_post("Post moved to draft", &post);
        }
        PostCommand::List { published, paging } => {
            let page = if published {
                client.published_posts(paging.page, paging.per_page).await
            } else {
                client.list_posts(paging.page, paging.per_page).await
            }
            .map_err(map_client_error)?;
            print_posts(&page);
        }
        PostCommand::Search { query, paging } => {
            let page = client
                .search_posts(&query, paging.page, paging.per_page)
                .await
                .map_err(map_client_error)?;
            print_posts(&page);
        }
    }
    Ok(())
}

async fn run_tag(client: &BlogClient, command: TagCommand) -> Result<()> {
    match command {
        TagCommand::List { paging } => {
            let page = client
                .list_tags(paging.page, paging.per_page)
                .await
                .map_err(map_client_error)?;
            print_page_header("Tags", &page);
            for tag in &page.items {
                print_tag(tag);
            }
        }
        TagCommand::Popular { limit } => {
            let tags = client.popular_tags(limit).await.map_err(map_client_error)?;
            for tag in &tags {
                print_tag(tag);
            }
        }
        TagCommand::Create {
            name,
            description,
            color,
        } => {
            let tag = client
                .create_tag(&NewTag {
                    name,
                    description,
                    color,
                })
                .await
                .map_err(map_client_error)?;
            println!("Tag created");
            print_tag(&tag);
        }
    }
    Ok(())
}

async fn run_comment(client: &BlogClient, command: CommentCommand) -> Result<()> {
    match command {
        CommentCommand::Add {
            post_id,
            parent_id,
            content,
        } => {
            let comment = client
                .add_comment(post_id, parent_id, &content)
                .await
                .map_err(map_client_error)?;
            println!("Comment submitted, awaiting moderation");
            print_comment(&comment, 0);
        }
        CommentCommand::List { post_id, paging } => {
            let page = client
                .comments_for_post(post_id, paging.page, paging.per_page)
                .await
                .map_err(map_client_error)?;
            print_page_header("Threads", &page);
            for comment in &page.items {
                print_comment(comment, 0);
            }
        }
        CommentCommand::Approve { id } => {
            let comment = client.approve_comment(id).await.map_err(map_client_error)?;
            print_comment(&comment, 0);
        }
        CommentCommand::Reject { id } => {
            let comment = client.reject_comment(id).await.map_err(map_client_error)?;
            print_comment(&comment, 0);
        }
        CommentCommand::Pending { paging } => {
            let page = client
                .pending_comments(paging.page, paging.per_page)
                .await
                .map_err(map_client_error)?;
            print_page_header("Pending comments", &page);
            for comment in &page.items {
                print_comment(comment, 0);
            }
        }
    }
    Ok(())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(client: &BlogClient) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn map_client_error(err: BlogClientError) -> anyhow::Error {
    let message = match err {
        BlogClientError::Unauthorized(message) => format!(
            "not authorized ({message}): run `multiblog-cli login ...` or `multiblog-cli register ...`"
        ),
        BlogClientError::Forbidden(message) => format!("forbidden: {message}"),
        BlogClientError::NotFound(message) => format!("not found: {message}"),
        BlogClientError::Conflict(message) => format!("already exists: {message}"),
        BlogClientError::InvalidRequest(message) => format!("invalid request: {message}"),
        BlogClientError::Http(err) => format!("HTTP error: {err}"),
    };
    anyhow::anyhow!(message)
}

fn print_auth(title: &str, auth: &AuthResponse) {
    println!("{title}");
    println!("token: {}", auth.token);
    println!("expires_in: {}s", auth.expires_in);
    println!("user:");
    println!("  id: {}", auth.user.id);
    println!("  username: {}", auth.user.username);
    println!("  email: {}", auth.user.email);
    println!("  admin: {}", auth.user.is_admin);
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("slug: {}", post.slug);
    println!("status: {}", post.status);
    println!("author_id: {}", post.author_id);
    if !post.tags.is_empty() {
        let names: Vec<&str> = post.tags.iter().map(|t| t.name.as_str()).collect();
        println!("tags: {}", names.join(", "));
    }
    println!("views: {}, comments: {}", post.view_count, post.comment_count);
    if let Some(published_at) = post.published_at {
        println!("published_at: {published_at}");
    }
    println!("excerpt: {}", post.excerpt);
    println!("content: {}", post.content);
}

fn print_page_header<T>(title: &str, page: &Page<T>) {
    println!(
        "{title}: {} (page {}/{}, per_page={}, total={})",
        page.items.len(),
        page.page,
        page.total_pages,
        page.per_page,
        page.total
    );
}

fn print_posts(page: &Page<Post>) {
    print_page_header("Posts", page);
    for post in &page.items {
        println!(
            "- [{}] {} ({}, author_id={})",
            post.id, post.title, post.status, post.author_id
        );
    }
}

fn print_tag(tag: &Tag) {
    match tag.posts_count {
        Some(count) => println!("- [{}] {} ({}) posts={count}", tag.id, tag.name, tag.slug),
        None => println!("- [{}] {} ({})", tag.id, tag.name, tag.slug),
    }
}

fn print_comment(comment: &Comment, depth: usize) {
    let author = comment
        .author
        .as_ref()
        .map(|a| a.username.as_str())
        .unwrap_or("unknown");
    println!(
        "{}- [{}] {author} ({}): {}",
        "  ".repeat(depth),
        comment.id,
        comment.status,
        comment.content
    );
    for reply in &comment.replies {
        print_comment(reply, depth + 1);
    }
}
