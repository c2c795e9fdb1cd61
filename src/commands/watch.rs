//! Watch the repository for new posts

use anyhow::Result;
use tokio::sync::broadcast;

use crate::monitor::MonitorEvent;
use crate::page::new_posts_message;
use crate::RepoBlog;

/// Print a line for every batch of new posts until Ctrl+C
pub async fn run(blog: &RepoBlog) -> Result<()> {
    let (events_tx, mut events_rx) = broadcast::channel::<MonitorEvent>(16);
    let monitor = blog.monitor().spawn(events_tx);

    println!(
        "Watching {}/{} every {}s. Press Ctrl+C to stop.",
        blog.config.owner,
        blog.config.repo,
        blog.config.poll_period().as_secs()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events_rx.recv() => {
                match event {
                    Ok(MonitorEvent::NewPosts(count)) => println!("{}", new_posts_message(count)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    monitor.stop().await;
    Ok(())
}
