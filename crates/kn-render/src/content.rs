//! Deck, book and bundle pages.

use std::fmt::Write;

use kn_config::SiteConfig;
use kn_tree::ContentKind;

use crate::{DOCSIFY_CDN, REVEAL_CDN, escape, js_string, push_head};

/// Data for one content page.
#[derive(Debug)]
pub struct ContentPage<'a> {
    pub site: &'a SiteConfig,
    pub kind: ContentKind,
    /// Entry title.
    pub title: &'a str,
    /// URL of the markdown source (decks, books) or of the bundle's
    /// `index.html`.
    pub source_url: String,
    /// URL of the home page.
    pub home_url: String,
}

impl ContentPage<'_> {
    fn page_title(&self) -> String {
        if self.site.title.is_empty() {
            self.title.to_owned()
        } else {
            format!("{} - {}", self.title, self.site.title)
        }
    }
}

/// Render a content page with the template for its kind.
#[must_use]
pub fn render_content(page: &ContentPage<'_>) -> String {
    let mut html = String::with_capacity(4096);
    push_head(&mut html, &page.page_title(), &page.site.icon);

    match page.kind {
        ContentKind::Deck => render_deck(&mut html, page),
        ContentKind::Book => render_book(&mut html, page),
        ContentKind::Bundle => render_bundle(&mut html, page),
    }

    html.push_str("</body>\n</html>");
    html
}

/// reveal.js with slides loaded by the markdown plugin.
fn render_deck(html: &mut String, page: &ContentPage<'_>) {
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{REVEAL_CDN}/reveal.css\">");
    let _ = writeln!(
        html,
        "<link rel=\"stylesheet\" href=\"{REVEAL_CDN}/theme/white.css\">"
    );
    html.push_str("</head>\n<body>\n");
    html.push_str("<div class=\"reveal\">\n<div class=\"slides\">\n");
    let _ = writeln!(
        html,
        "<section data-markdown=\"{}\" data-separator=\"^\\n---\\n$\" \
         data-separator-vertical=\"^\\n--\\n$\" data-charset=\"utf-8\"></section>",
        escape(&page.source_url)
    );
    html.push_str("</div>\n</div>\n");
    let _ = writeln!(html, "<script src=\"{REVEAL_CDN}/reveal.js\"></script>");
    let _ = writeln!(
        html,
        "<script src=\"{REVEAL_CDN}/plugin/markdown/markdown.js\"></script>"
    );
    let _ = writeln!(
        html,
        "<script src=\"{REVEAL_CDN}/plugin/highlight/highlight.js\"></script>"
    );
    html.push_str(
        "<script>\nReveal.initialize({ hash: true, plugins: [RevealMarkdown, RevealHighlight] });\n</script>\n",
    );
}

/// docsify rendering the markdown source as its home page.
fn render_book(html: &mut String, page: &ContentPage<'_>) {
    let _ = writeln!(
        html,
        "<link rel=\"stylesheet\" href=\"{DOCSIFY_CDN}/lib/themes/vue.css\">"
    );
    html.push_str("</head>\n<body>\n<div id=\"app\"></div>\n<script>\n");
    let _ = writeln!(
        html,
        "window.$docsify = {{ name: {}, nameLink: {}, homepage: {}, loadSidebar: false, subMaxLevel: 3 }};",
        js_string(page.title),
        js_string(&page.home_url),
        js_string(&page.source_url),
    );
    html.push_str("</script>\n");
    let _ = writeln!(html, "<script src=\"{DOCSIFY_CDN}\"></script>");
}

/// Full-page frame around the bundle's own `index.html`.
fn render_bundle(html: &mut String, page: &ContentPage<'_>) {
    html.push_str(
        "<style>\nhtml, body { margin: 0; height: 100%; overflow: hidden; }\n\
         iframe { border: 0; width: 100%; height: 100%; }\n</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(
        html,
        "<iframe src=\"{}\" title=\"{}\"></iframe>",
        escape(&page.source_url),
        escape(page.title)
    );
}
