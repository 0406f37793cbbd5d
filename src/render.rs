//! HTML rendering of the chat page
//!
//! Turn content is rendered as markdown. Raw HTML inside it is shown as
//! escaped text and links with script-capable schemes are neutralized, so
//! user and model text never becomes live markup.

use crate::config::UiConfig;
use crate::conversation::{Conversation, Role, Turn};
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use std::fmt::Write;

const USER_BUBBLE_STYLE: &str = "background-color: #DCF8C6; color: black; padding: 10px; \
border-radius: 15px; margin-left: 80px; max-width: 100%;";

const ASSISTANT_BUBBLE_STYLE: &str = "background-color: #E3F2FD; color: black; padding: 10px; \
border-radius: 15px; margin: 10px; max-width: 100%; margin-left: auto;";

const AUTO_SCROLL_SCRIPT: &str = r#"<script>
const chatContainer = document.querySelector('div[data-chat="container"]');
if (chatContainer) {
    chatContainer.scrollTop = chatContainer.scrollHeight;
}
</script>"#;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Markdown to HTML with raw HTML escaped and unsafe link targets dropped.
pub fn markdown_to_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Relative URLs and http(s)/mailto only.
fn is_safe_url(url: &str) -> bool {
    let url = url.trim().to_ascii_lowercase();
    match url.split_once(':') {
        None => true,
        Some((scheme, _)) => {
            scheme.contains(|c| matches!(c, '/' | '?' | '#'))
                || matches!(scheme, "http" | "https" | "mailto")
        }
    }
}

/// One chat bubble.
pub fn render_turn(turn: &Turn) -> String {
    let (style, label) = match turn.role {
        Role::User => (USER_BUBBLE_STYLE, "You:"),
        Role::Assistant => (ASSISTANT_BUBBLE_STYLE, "AI:"),
    };

    format!(
        "<div class=\"turn {}\" style='{}'>\n<strong>{}</strong>\n{}</div>\n",
        turn.role,
        style,
        label,
        markdown_to_html(&turn.content)
    )
}

/// Full page: header, input form, optional error notice, every turn in order.
pub fn render_page(ui: &UiConfig, conversation: &Conversation, notice: Option<&str>) -> String {
    let mut page = String::new();

    // writeln! into a String cannot fail
    let _ = writeln!(
        page,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n</head>\n<body style='font-family: sans-serif; margin: 2rem;'>\n\
         <h1>{title}</h1>\n<p style='color: gray;'>{caption}</p>",
        title = escape_html(&ui.title),
        caption = escape_html(&ui.caption),
    );

    let _ = writeln!(
        page,
        "<form method=\"post\" action=\"/ask\">\n\
         <label for=\"query\">{label}</label><br>\n\
         <input id=\"query\" name=\"query\" type=\"text\" autocomplete=\"off\" autofocus \
         style='width: 100%; padding: 8px;'>\n</form>\n\
         <form method=\"post\" action=\"/session/end\"><button type=\"submit\">New conversation</button></form>",
        label = escape_html(&ui.input_label),
    );

    if let Some(notice) = notice {
        let _ = writeln!(
            page,
            "<div class=\"error\" role=\"alert\" style='background-color: #FDECEA; color: #B71C1C; \
             padding: 10px; border-radius: 8px; margin: 10px 0;'>{}</div>",
            escape_html(notice)
        );
    }

    page.push_str("<div data-chat=\"container\" style='max-height: 70vh; overflow-y: auto;'>\n");
    for turn in conversation.snapshot() {
        page.push_str(&render_turn(turn));
    }
    page.push_str("</div>\n");

    page.push_str(AUTO_SCROLL_SCRIPT);
    page.push_str("\n</body>\n</html>\n");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#x27;y&#x27;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_turns_render_in_order_with_roles() {
        let mut conversation = Conversation::new();
        conversation.append(Turn::user("How do I reset my password?"));
        conversation.append(Turn::assistant("Go to the account portal."));

        let page = render_page(&Settings::default().ui, &conversation, None);

        let user_at = page.find("How do I reset my password?").unwrap();
        let ai_at = page.find("Go to the account portal.").unwrap();
        assert!(user_at < ai_at);
        assert!(page.contains("#DCF8C6"));
        assert!(page.contains("#E3F2FD"));
        assert_eq!(page.matches("<strong>You:</strong>").count(), 1);
        assert_eq!(page.matches("<strong>AI:</strong>").count(), 1);
        assert!(!page.contains("role=\"alert\""));
    }

    #[test]
    fn test_untrusted_content_is_escaped() {
        let mut conversation = Conversation::new();
        conversation.append(Turn::user("<img src=x onerror=alert(1)>"));

        let page = render_page(&Settings::default().ui, &conversation, Some("<b>boom</b>"));

        assert!(!page.contains("<img src=x"));
        assert!(page.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(page.contains("&lt;b&gt;boom&lt;/b&gt;"));
    }

    #[test]
    fn test_page_has_form_and_scroll_script() {
        let page = render_page(&Settings::default().ui, &Conversation::new(), None);
        assert!(page.contains("action=\"/ask\""));
        assert!(page.contains("Ask a question about your subject:"));
        assert!(page.contains("chatContainer.scrollTop = chatContainer.scrollHeight"));
    }

    #[test]
    fn test_reply_markdown_is_formatted() {
        let html = render_turn(&Turn::assistant(
            "**Category:** Network Support\n1. Restart router\n2. Reconnect to Wi-Fi",
        ));
        assert!(html.contains("<strong>Category:</strong> Network Support"));
        assert!(html.contains("<ol>"));
        assert!(html.contains("<li>Restart router</li>"));
        assert!(!html.contains("**Category:**"));
    }

    #[test]
    fn test_raw_html_in_markdown_is_escaped() {
        let html = markdown_to_html("Try this: <script>alert(1)</script> then **reboot**");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<strong>reboot</strong>"));
    }

    #[test]
    fn test_script_links_are_neutralized() {
        let html = markdown_to_html("[reset](javascript:alert(1)) or [portal](https://example.com/reset)");
        assert!(!html.contains("javascript:"));
        assert!(html.contains("href=\"#\""));
        assert!(html.contains("href=\"https://example.com/reset\""));
    }
}
