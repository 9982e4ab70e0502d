//! HTML → plain text for HTML-only message bodies.

use tracing::warn;

/// Render width. Wide enough that paragraphs stay on one line.
const RENDER_WIDTH: usize = 4096;

/// Render HTML as text, one block element per line.
///
/// Lines are trimmed and blank lines dropped. Markup that cannot be
/// rendered yields an empty body.
pub fn html_to_text(html: &str) -> String {
    let rendered = match html2text::from_read(html.as_bytes(), RENDER_WIDTH) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Failed to render HTML body");
            return String::new();
        }
    };

    rendered
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_text() {
        assert_eq!(html_to_text("<p>Hello</p>"), "Hello");
    }

    #[test]
    fn block_elements_become_lines() {
        let html = "<html><body><p>Acme Corp</p><div>Total: $42.50</div>\
                    <p>Thanks<br>Acme Team</p></body></html>";
        assert_eq!(html_to_text(html), "Acme Corp\nTotal: $42.50\nThanks\nAcme Team");
    }

    #[test]
    fn script_and_style_content_dropped() {
        let html = "<html><head><style>p { color: red; }</style></head>\
                    <body><script>var tracking = 1;</script><p>Visible</p></body></html>";
        let text = html_to_text(html);
        assert!(text.contains("Visible"));
        assert!(!text.contains("color"));
        assert!(!text.contains("tracking"));
    }

    #[test]
    fn bare_less_than_is_kept_as_text() {
        assert_eq!(html_to_text("<p>a < b</p>"), "a < b");
    }

    #[test]
    fn entities_decoded() {
        assert_eq!(html_to_text("<p>Tom &amp; Jerry &lt;3</p>"), "Tom & Jerry <3");
    }

    #[test]
    fn empty_input() {
        assert_eq!(html_to_text(""), "");
    }
}
