//! Render the reader page once

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::reader::Session;
use crate::RepoBlog;

/// Render the latest post (or all posts) as an HTML document
///
/// The document is written even when the listing fails, carrying the error
/// message; the error is returned afterwards.
pub async fn run(blog: &RepoBlog, all: bool, output: Option<&Path>) -> Result<()> {
    let (html, loaded) = render(blog, all).await;

    match output {
        Some(path) => {
            fs::write(path, &html)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", html),
    }

    loaded?;
    Ok(())
}

async fn render(blog: &RepoBlog, all: bool) -> (String, Result<usize>) {
    let mut session = if all {
        Session::showing_all_posts()
    } else {
        Session::new()
    };
    let mut page = blog.page();
    page.set_showing_all(all);

    let loaded = blog
        .reader()
        .load(&mut session, &mut page)
        .await
        .map_err(anyhow::Error::from);
    (page.render_html(false, blog.clock().now()), loaded)
}
