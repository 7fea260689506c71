//! Site landing page.
//!
//! The page itself carries only branding. The folder tree is fetched from
//! `folders.json` and rendered client-side, so the same page works for the
//! live server and for a static export.

use std::fmt::Write;

use chrono::Datelike;
use kn_config::SiteConfig;
use serde_json::json;

use crate::{escape, push_head, script_json};

/// How entry links on the home page are formed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkMode {
    /// Served by the live server: `/decks/talks/intro`.
    Live,
    /// Exported files under `base_path`: `{base}decks/talks/intro.html`,
    /// `{base}bundles/api/index.html`.
    Static {
        /// URL prefix of the export, ending with `/`.
        base_path: String,
    },
}

impl LinkMode {
    fn base_path(&self) -> &str {
        match self {
            Self::Live => "/",
            Self::Static { base_path } => base_path,
        }
    }
}

/// Data for the home page.
#[derive(Debug)]
pub struct HomeData<'a> {
    pub site: &'a SiteConfig,
    /// Year shown in the footer.
    pub year: i32,
    pub links: LinkMode,
}

impl<'a> HomeData<'a> {
    /// Home page data for the current year.
    #[must_use]
    pub fn new(site: &'a SiteConfig, links: LinkMode) -> Self {
        Self {
            site,
            year: chrono::Utc::now().year(),
            links,
        }
    }
}

/// Client-side tree rendering. Reads `window.KN_CONFIG`.
const TREE_SCRIPT: &str = r#"(function () {
  var config = window.KN_CONFIG;
  function href(kind, crumbs, name) {
    var path = crumbs.concat([name]).map(encodeURIComponent).join("/");
    var url = config.base + kind + "s/" + path;
    if (!config.static) return url;
    return kind === "bundle" ? url + "/index.html" : url + ".html";
  }
  function el(tag, cls, text) {
    var node = document.createElement(tag);
    if (cls) node.className = cls;
    if (text) node.textContent = text;
    return node;
  }
  function renderFolder(folder, depth) {
    var section = el("section", "kn-folder");
    if (depth > 0) section.appendChild(el("h" + Math.min(depth + 1, 6), "kn-folder-title", folder.title));
    var crumbs = folder.breadcrumb.slice(1);
    if (folder.entries.length) {
      var list = el("ul", "kn-entries");
      folder.entries.forEach(function (entry) {
        var item = el("li", "kn-entry kn-" + entry.kind);
        var link = el("a", null, entry.title);
        link.href = href(entry.kind, crumbs, entry.name);
        item.appendChild(link);
        item.appendChild(el("span", "kn-kind", entry.kind));
        item.appendChild(el("time", "kn-date", entry.createdAt.slice(0, 10)));
        if (entry.description) item.appendChild(el("p", "kn-description", entry.description));
        list.appendChild(item);
      });
      section.appendChild(list);
    }
    folder.subfolders.forEach(function (sub) {
      section.appendChild(renderFolder(sub, depth + 1));
    });
    return section;
  }
  fetch(config.foldersUrl)
    .then(function (response) { return response.json(); })
    .then(function (data) {
      document.getElementById("folders").appendChild(renderFolder(data.rootFolder, 0));
    })
    .catch(function (err) {
      document.getElementById("folders").textContent = "Failed to load content: " + err;
    });
})();"#;

const HOME_STYLE: &str = "\
body { font-family: system-ui, sans-serif; max-width: 56rem; margin: 0 auto; padding: 2rem 1rem; color: #1f2937; }
header { display: flex; align-items: center; gap: 1rem; margin-bottom: 2rem; }
header img { height: 3rem; }
a { color: #1d4ed8; text-decoration: none; }
a:hover { text-decoration: underline; }
.kn-entries { list-style: none; padding: 0; }
.kn-entry { padding: 0.5rem 0; border-bottom: 1px solid #e5e7eb; }
.kn-kind, .kn-date { margin-left: 0.75rem; font-size: 0.8rem; color: #6b7280; }
.kn-description { margin: 0.25rem 0 0; color: #4b5563; }
.kn-folder .kn-folder { margin-left: 1rem; }
footer { margin-top: 3rem; font-size: 0.8rem; color: #6b7280; }
";

/// Render the home page.
#[must_use]
pub fn render_home(data: &HomeData<'_>) -> String {
    let site = data.site;
    let base = data.links.base_path();
    let mut html = String::with_capacity(8192);

    push_head(&mut html, &site.title, &site.icon);
    if !site.description.is_empty() {
        let _ = writeln!(
            html,
            "<meta name=\"description\" content=\"{}\">",
            escape(&site.description)
        );
    }
    if !site.author.is_empty() {
        let _ = writeln!(
            html,
            "<meta name=\"author\" content=\"{}\">",
            escape(&site.author)
        );
    }
    let _ = write!(html, "<style>\n{HOME_STYLE}</style>\n");
    html.push_str("</head>\n<body>\n");

    // Branding
    html.push_str("<header>\n");
    if !site.logo.is_empty() {
        let link = if site.link.is_empty() { base } else { site.link.as_str() };
        let _ = writeln!(
            html,
            "<a href=\"{}\"><img src=\"{}\" alt=\"{}\"></a>",
            escape(link),
            escape(&site.logo),
            escape(&site.name),
        );
    }
    let _ = writeln!(html, "<h1>{}</h1>", escape(&site.name));
    html.push_str("</header>\n");
    if !site.summary.is_empty() {
        let _ = writeln!(html, "<p class=\"kn-summary\">{}</p>", escape(&site.summary));
    }

    html.push_str("<main id=\"folders\"></main>\n");

    let _ = write!(html, "<footer>&copy; {}", data.year);
    if !site.copyright.is_empty() {
        let _ = write!(html, " {}", escape(&site.copyright));
    }
    html.push_str("</footer>\n");

    let config = json!({
        "foldersUrl": format!("{base}folders.json"),
        "base": base,
        "static": matches!(data.links, LinkMode::Static { .. }),
    });
    let _ = write!(
        html,
        "<script>window.KN_CONFIG = {};</script>\n<script>\n{TREE_SCRIPT}\n</script>\n",
        script_json(&config)
    );
    html.push_str("</body>\n</html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            name: "Talks".to_owned(),
            title: "Team <Talks>".to_owned(),
            logo: "/assets/logo.png".to_owned(),
            icon: "/favicon.ico".to_owned(),
            summary: "Slides & books".to_owned(),
            copyright: "Example Inc.".to_owned(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_render_home_branding() {
        let site = site();
        let html = render_home(&HomeData {
            site: &site,
            year: 2024,
            links: LinkMode::Live,
        });

        assert!(html.contains("<title>Team &lt;Talks&gt;</title>"));
        assert!(html.contains("<link rel=\"icon\" href=\"/favicon.ico\">"));
        assert!(html.contains("<img src=\"/assets/logo.png\" alt=\"Talks\">"));
        assert!(html.contains("<p class=\"kn-summary\">Slides &amp; books</p>"));
        assert!(html.contains("&copy; 2024 Example Inc."));
        assert!(!html.contains("name=\"description\""));
    }

    #[test]
    fn test_render_home_live_links() {
        let site = SiteConfig::default();
        let html = render_home(&HomeData::new(&site, LinkMode::Live));

        assert!(html.contains(r#""foldersUrl":"/folders.json""#));
        assert!(html.contains(r#""static":false"#));
        assert!(!html.contains("<link rel=\"icon\""));
    }

    #[test]
    fn test_render_home_static_links() {
        let site = SiteConfig::default();
        let html = render_home(&HomeData::new(
            &site,
            LinkMode::Static {
                base_path: "/slides/".to_owned(),
            },
        ));

        assert!(html.contains(r#""foldersUrl":"/slides/folders.json""#));
        assert!(html.contains(r#""base":"/slides/""#));
        assert!(html.contains(r#""static":true"#));
    }
}
