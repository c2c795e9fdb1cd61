//! List repository posts

use anyhow::Result;

use crate::api::FileEntry;
use crate::content::{title_from_filename, PostSelector};
use crate::RepoBlog;

/// List posts, or every listing entry with `all_files`
pub async fn run(blog: &RepoBlog, all_files: bool) -> Result<()> {
    let entries = blog.source().list_entries().await?;
    print!("{}", format_listing(blog, &entries, all_files));
    Ok(())
}

fn format_listing(blog: &RepoBlog, entries: &[FileEntry], all_files: bool) -> String {
    let selector = PostSelector::from_config(&blog.config);
    let mut out = String::new();

    if all_files {
        out.push_str(&format!("Entries ({}):\n", entries.len()));
        for entry in entries {
            let marker = if selector.is_post(entry) { "*" } else { " " };
            out.push_str(&format!("  {} {:?} {}\n", marker, entry.kind, entry.name));
        }
        return out;
    }

    let posts = selector.select(entries);
    out.push_str(&format!("Posts ({}):\n", posts.len()));
    for post in posts {
        out.push_str(&format!(
            "  {} [{}]\n",
            title_from_filename(&post.name, &blog.config.post_extension),
            post.name
        ));
    }
    out
}
