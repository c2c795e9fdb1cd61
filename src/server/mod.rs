//! Local reader server with new-post notifications

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tower_http::trace::TraceLayer;

use crate::api::ApiError;
use crate::clock::Clock;
use crate::monitor::MonitorEvent;
use crate::page::Page;
use crate::reader::{Reader, Session};
use crate::RepoBlog;

/// Session and page shared by all requests
struct View {
    session: Session,
    page: Page,
}

/// Server state
///
/// The view lock is only held to read or swap the view, never across a
/// fetch. Loads run on a copy of the session and a blank page whose
/// content is swapped in when they finish.
struct ServerState {
    reader: Reader,
    clock: Arc<dyn Clock>,
    view: Mutex<View>,
    events_tx: broadcast::Sender<MonitorEvent>,
    /// New-post counts, sent once the banner is on the page
    page_tx: broadcast::Sender<usize>,
}

/// Start the reader server
pub async fn start(blog: &RepoBlog, ip: &str, port: u16, monitor: bool, open: bool) -> Result<()> {
    let (events_tx, _) = broadcast::channel::<MonitorEvent>(16);
    let state = new_state(blog, events_tx.clone());

    if let Err(e) = reload(&state).await {
        tracing::warn!("Initial load failed: {}", e);
    }

    spawn_notifier(state.clone());
    let monitor = monitor.then(|| blog.monitor().spawn(events_tx));

    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Reading {}/{} at {}", blog.config.owner, blog.config.repo, url);
    if monitor.is_some() {
        println!(
            "Checking for new posts every {}s.",
            blog.config.poll_period().as_secs()
        );
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(monitor) = monitor {
        monitor.stop().await;
    }

    Ok(())
}

fn new_state(blog: &RepoBlog, events_tx: broadcast::Sender<MonitorEvent>) -> Arc<ServerState> {
    let (page_tx, _) = broadcast::channel(16);
    Arc::new(ServerState {
        reader: blog.reader(),
        clock: blog.clock(),
        view: Mutex::new(View {
            session: Session::new(),
            page: blog.page(),
        }),
        events_tx,
        page_tx,
    })
}

fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/toggle", post(toggle_handler))
        .route("/refresh", post(refresh_handler))
        .route("/notifications/:id/dismiss", post(dismiss_handler))
        .route("/notifications/:id/refresh", post(notification_refresh_handler))
        .route("/__events", get(events_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Turn monitor events into page banners, then tell the event clients
fn spawn_notifier(state: Arc<ServerState>) {
    let mut events_rx = state.events_tx.subscribe();
    tokio::spawn(async move {
        loop {
            match events_rx.recv().await {
                Ok(MonitorEvent::NewPosts(count)) => {
                    let now = state.clock.now();
                    state.view.lock().await.page.notifications.push(count, now);
                    // no event clients connected
                    let _ = state.page_tx.send(count);
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Html<String> {
    let mut view = state.view.lock().await;
    view.page.notifications.prune(state.clock.now());
    Html(view.page.render_html(true, state.clock.now()))
}

async fn toggle_handler(State(state): State<Arc<ServerState>>) -> Redirect {
    let (mut session, mut page) = snapshot(&state).await;
    if state.reader.toggle(&mut session, &mut page).await {
        commit(&state, session, page).await;
    }
    Redirect::to("/")
}

async fn refresh_handler(State(state): State<Arc<ServerState>>) -> Redirect {
    // the page shows the error
    let _ = reload(&state).await;
    Redirect::to("/")
}

async fn dismiss_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<u64>,
) -> Redirect {
    state.view.lock().await.page.notifications.dismiss(id);
    Redirect::to("/")
}

async fn notification_refresh_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<u64>,
) -> Redirect {
    state.view.lock().await.page.notifications.dismiss(id);
    let _ = reload(&state).await;
    Redirect::to("/")
}

/// Fetch the listing and rebuild the posts container
async fn reload(state: &ServerState) -> Result<usize, ApiError> {
    let (mut session, mut page) = snapshot(state).await;
    let loaded = state.reader.load(&mut session, &mut page).await;
    commit(state, session, page).await;
    loaded
}

/// Copy the session and start a blank page to load into
async fn snapshot(state: &ServerState) -> (Session, Page) {
    let view = state.view.lock().await;
    (view.session.clone(), view.page.blank())
}

/// Swap a finished load into the view; the last load to finish wins
async fn commit(state: &ServerState, session: Session, page: Page) {
    let mut view = state.view.lock().await;
    view.session = session;
    view.page.replace_content(page);
}

/// WebSocket handler for new-post events
async fn events_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let page_rx = state.page_tx.subscribe();
    ws.on_upgrade(move |socket| handle_events_socket(socket, page_rx))
}

/// Forward new-post counts to one client
async fn handle_events_socket(mut socket: WebSocket, mut page_rx: broadcast::Receiver<usize>) {
    tracing::debug!("Event client connected");

    loop {
        tokio::select! {
            result = page_rx.recv() => {
                match result {
                    Ok(count) => {
                        if socket.send(Message::Text(format!("notify:{}", count))).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            // Handle incoming messages (ping/pong)
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Event client disconnected");
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{files, FakeSource};
    use crate::api::CommitDate;
    use crate::clock::FixedClock;
    use crate::config::BlogConfig;
    use chrono::{TimeZone, Utc};
    use futures::StreamExt;
    use std::time::Duration;
    use tokio_tungstenite::tungstenite;

    fn two_posts() -> FakeSource {
        FakeSource::new()
            .with_listing(files(&["b-post.md", "a-post.md"]))
            .with_post("b-post.md", "Newest **post**", CommitDate::Unknown)
            .with_post("a-post.md", "Older post", CommitDate::Unknown)
    }

    fn test_blog(source: FakeSource) -> (RepoBlog, Arc<FakeSource>) {
        let source = Arc::new(source);
        let blog = RepoBlog::with_source(
            BlogConfig::default(),
            source.clone(),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())),
        );
        (blog, source)
    }

    /// Serve the router on an ephemeral port after an initial load
    async fn spawn_server(state: Arc<ServerState>) -> String {
        reload(&state).await.unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn post_text(client: &reqwest::Client, url: String) -> String {
        client.post(url).send().await.unwrap().text().await.unwrap()
    }

    #[tokio::test]
    async fn test_index_and_toggle() {
        let (blog, source) = test_blog(two_posts());
        let (events_tx, _) = broadcast::channel(16);
        let base = spawn_server(new_state(&blog, events_tx)).await;
        let client = reqwest::Client::new();

        let html = client.get(&base).send().await.unwrap().text().await.unwrap();
        assert!(html.contains("b post"));
        assert!(!html.contains("a post"));
        assert!(html.contains("<strong>post</strong>"));
        assert!(html.contains("📚 Show All Blogs"));

        // redirects back to the page
        let html = post_text(&client, format!("{}/toggle", base)).await;
        assert!(html.contains("b post"));
        assert!(html.contains("a post"));
        assert!(html.contains("📄 Show Recent Only"));

        // toggling reuses the cached listing
        assert_eq!(source.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_refetches_listing() {
        let source = two_posts()
            .with_listing(files(&["c-post.md", "b-post.md", "a-post.md"]))
            .with_post("c-post.md", "Brand new", CommitDate::Unknown);
        let (blog, source) = test_blog(source);
        let (events_tx, _) = broadcast::channel(16);
        let base = spawn_server(new_state(&blog, events_tx)).await;
        let client = reqwest::Client::new();

        let html = post_text(&client, format!("{}/refresh", base)).await;
        assert_eq!(source.list_calls(), 2);
        assert!(html.contains("c post"));
        assert!(html.contains("Brand new"));
        assert!(!html.contains("b post"));
    }

    #[tokio::test]
    async fn test_notification_refresh_dismisses_and_reloads() {
        let source = two_posts()
            .with_listing(files(&["c-post.md", "b-post.md", "a-post.md"]))
            .with_post("c-post.md", "Brand new", CommitDate::Unknown);
        let (blog, source) = test_blog(source);
        let (events_tx, _) = broadcast::channel(16);
        let state = new_state(&blog, events_tx);
        let base = spawn_server(state.clone()).await;

        let id = {
            let now = state.clock.now();
            state.view.lock().await.page.notifications.push(1, now)
        };

        let client = reqwest::Client::new();
        let html = client.get(&base).send().await.unwrap().text().await.unwrap();
        assert!(html.contains("🎉 1 new blog post added!"));

        let html = post_text(&client, format!("{}/notifications/{}/refresh", base, id)).await;
        assert!(!html.contains("new blog post added"));
        assert!(html.contains("c post"));
        assert_eq!(source.list_calls(), 2);
        assert!(state.view.lock().await.page.notifications.active().is_empty());
    }

    #[tokio::test]
    async fn test_page_stays_available_during_stalled_load() {
        let (blog, source) = test_blog(two_posts());
        let (events_tx, _) = broadcast::channel(16);
        let base = spawn_server(new_state(&blog, events_tx)).await;
        let client = reqwest::Client::new();

        source.stall_bodies();
        let refresh = tokio::spawn({
            let client = client.clone();
            let url = format!("{}/refresh", base);
            async move { client.post(url).send().await }
        });
        for _ in 0..200 {
            if source.list_calls() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(source.list_calls(), 2);

        let html = tokio::time::timeout(Duration::from_secs(3), async {
            client.get(&base).send().await.unwrap().text().await.unwrap()
        })
        .await
        .expect("page blocked by a stalled load");
        assert!(html.contains("b post"));
        assert!(!html.contains("Loading posts..."));

        refresh.abort();
    }

    #[tokio::test]
    async fn test_monitor_event_becomes_banner() {
        let (blog, _) = test_blog(two_posts());
        let (events_tx, _) = broadcast::channel(16);
        let state = new_state(&blog, events_tx.clone());
        spawn_notifier(state.clone());
        let base = spawn_server(state.clone()).await;

        events_tx.send(MonitorEvent::NewPosts(3)).unwrap();
        for _ in 0..50 {
            if !state.view.lock().await.page.notifications.active().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let client = reqwest::Client::new();
        let html = client.get(&base).send().await.unwrap().text().await.unwrap();
        assert!(html.contains("🎉 3 new blog posts added!"));
        assert!(html.contains(r#"data-ttl="10""#));

        let id = state.view.lock().await.page.notifications.active()[0].id;
        let html = post_text(&client, format!("{}/notifications/{}/dismiss", base, id)).await;
        assert!(!html.contains("new blog posts added"));
    }

    #[tokio::test]
    async fn test_event_stream_announces_after_banner_is_stored() {
        let (blog, _) = test_blog(two_posts());
        let (events_tx, _) = broadcast::channel(16);
        let state = new_state(&blog, events_tx.clone());
        spawn_notifier(state.clone());
        let base = spawn_server(state.clone()).await;

        let ws_url = format!("{}/__events", base.replacen("http", "ws", 1));
        let (mut socket, _) = tokio_tungstenite::connect_async(ws_url).await.unwrap();

        events_tx.send(MonitorEvent::NewPosts(2)).unwrap();
        let message = tokio::time::timeout(Duration::from_secs(3), socket.next())
            .await
            .expect("no event received")
            .unwrap()
            .unwrap();
        assert_eq!(message, tungstenite::Message::Text("notify:2".to_string()));

        // the reload the client does on this message must see the banner
        let html = reqwest::get(&base).await.unwrap().text().await.unwrap();
        assert!(html.contains("🎉 2 new blog posts added!"));
    }
}
