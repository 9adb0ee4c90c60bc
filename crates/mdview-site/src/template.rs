//! HTML page shell around a rendered document.

use std::fmt::Write;

use mdview_renderer::escape_html;

/// Stylesheet linked from every page unless configured otherwise.
pub const DEFAULT_STYLESHEET_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/github-markdown-css/5.2.0/github-markdown-light.min.css";

const PAGE_STYLE: &str = "\
body { padding: 2em; }
.markdown-body { margin: auto; }
.markdown-body pre {
  white-space: pre-wrap;
  word-wrap: break-word;
}
.markdown-body code {
  white-space: pre-wrap;
}
.mermaid-image { width: auto; height: auto; }
";

/// Wrap rendered body HTML in a complete page.
///
/// `title` and `stylesheet_url` are escaped; `body` is inserted as is.
#[must_use]
pub fn render_page(title: &str, stylesheet_url: &str, body: &str) -> String {
    let mut page = String::with_capacity(body.len() + PAGE_STYLE.len() + 512);

    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(page, "<title>{}</title>", escape_html(title));
    if !stylesheet_url.is_empty() {
        let _ = writeln!(
            page,
            r#"<link rel="stylesheet" href="{}">"#,
            escape_html(stylesheet_url)
        );
    }
    page.push_str("<style>\n");
    page.push_str(PAGE_STYLE);
    page.push_str("</style>\n</head>\n<body>\n<article class=\"markdown-body\">\n");
    page.push_str(body);
    page.push_str("</article>\n</body>\n</html>\n");

    page
}
