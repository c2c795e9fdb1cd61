//! HTML helper functions

/// Simple HTML escaping
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Generate a form that posts to `action` when its button is clicked
///
/// # Examples
/// ```ignore
/// post_button("/toggle", Some("showAllBtn"), "Show All")
/// // -> <form method="post" action="/toggle"><button id="showAllBtn" type="submit">Show All</button></form>
/// ```
pub fn post_button(action: &str, id: Option<&str>, label: &str) -> String {
    let id_attr = id
        .map(|id| format!(r#" id="{}""#, html_escape(id)))
        .unwrap_or_default();
    format!(
        r#"<form method="post" action="{}"><button{} type="submit">{}</button></form>"#,
        html_escape(action),
        id_attr,
        html_escape(label)
    )
}
