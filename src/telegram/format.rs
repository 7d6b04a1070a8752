//! HTML rendering of rich messages for Telegram's HTML parse mode.

use teloxide::utils::html::escape;

use crate::transport::RichMessage;

/// Render a rich message as Telegram HTML.
pub fn rich_to_html(rich: &RichMessage) -> String {
    let mut out = format!("<b>{}</b>", escape(&rich.title));

    if let Some(author) = &rich.author {
        let name = escape(&author.name);
        match &author.link {
            Some(url) => out.push_str(&format!("\n<a href=\"{}\">{}</a>", escape(url), name)),
            None => out.push_str(&format!("\n<i>{}</i>", name)),
        }
    }

    if !rich.description.is_empty() {
        out.push_str("\n\n");
        out.push_str(&escape(&rich.description));
    }

    for (name, value) in &rich.fields {
        out.push_str(&format!(
            "\n\n<b>{}</b>\n<code>{}</code>",
            escape(name),
            escape(value)
        ));
    }

    if let Some(footer) = &rich.footer {
        out.push_str(&format!("\n\n<i>{}</i>", escape(footer)));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Author;

    fn rich(description: &str) -> RichMessage {
        RichMessage {
            title: "Queue".to_string(),
            author: None,
            description: description.to_string(),
            fields: Vec::new(),
            footer: Some("Queue Bot v0.1.0".to_string()),
        }
    }

    #[test]
    fn test_empty_queue() {
        assert_eq!(
            rich_to_html(&rich("")),
            "<b>Queue</b>\n\n<i>Queue Bot v0.1.0</i>"
        );
    }

    #[test]
    fn test_names_are_escaped() {
        let html = rich_to_html(&rich("Tom & Jerry\n<admin>"));
        assert!(html.contains("Tom &amp; Jerry\n&lt;admin&gt;"));
    }

    #[test]
    fn test_author_and_fields() {
        let mut msg = rich("");
        msg.author = Some(Author {
            name: "Queue Bot".to_string(),
            link: Some("https://example.org".to_string()),
        });
        msg.fields.push(("Join the queue".to_string(), "!queue join".to_string()));

        let html = rich_to_html(&msg);
        assert!(html.contains("<a href=\"https://example.org\">Queue Bot</a>"));
        assert!(html.contains("<b>Join the queue</b>\n<code>!queue join</code>"));
    }
}
