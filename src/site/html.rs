use std::path::Path;

use minijinja::{context, Environment};
use serde::Serialize;

use crate::items::{NormalizedItem, SidebarEntry};
use crate::site::paginate::Page;
use crate::site::RenderError;

/// Template shipped with the binary, used when no `index.html` override exists.
pub const BUILTIN_TEMPLATE: &str = include_str!("../../templates/index.html");

// The `.html` suffix turns on HTML auto-escaping in minijinja.
const PAGE_TEMPLATE: &str = "index.html";

/// File name a page is written to and linked by.
pub fn page_file_name(page_name: &str) -> String {
    format!("{page_name}.html")
}

/// Item fields exposed to the page template.
#[derive(Debug, Serialize)]
struct ItemView<'a> {
    title: &'a str,
    link: &'a str,
    source_name: &'a str,
    display_date: &'a str,
    summary: &'a str,
}

impl<'a> From<&'a NormalizedItem> for ItemView<'a> {
    fn from(item: &'a NormalizedItem) -> Self {
        Self {
            title: &item.title,
            link: &item.link,
            source_name: &item.source_name,
            display_date: &item.display_date,
            summary: &item.summary,
        }
    }
}

/// Renders HTML pages from a Jinja-style template.
///
/// The template sees:
///
/// - `site_title`, `last_build`: strings
/// - `items`: list of `{ title, link, source_name, display_date, summary }`
/// - `sidebar`: list of `{ display_name, link }`
/// - `page_number`: 1-based
/// - `prev_link`, `next_link`: page file names, absent at either end
///
/// Output is auto-escaped, so feed text never reaches the page as markup.
#[derive(Debug)]
pub struct HtmlRenderer {
    env: Environment<'static>,
    site_title: String,
}

impl HtmlRenderer {
    /// Compiles `template`. Syntax errors surface here, not per page.
    pub fn new(
        template: impl Into<String>,
        site_title: impl Into<String>,
    ) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.add_template_owned(PAGE_TEMPLATE, template.into())?;
        Ok(Self {
            env,
            site_title: site_title.into(),
        })
    }

    /// Uses `<templates_dir>/index.html` if present, else [`BUILTIN_TEMPLATE`].
    pub async fn load(templates_dir: &Path, site_title: &str) -> Result<Self, RenderError> {
        let path = templates_dir.join(PAGE_TEMPLATE);
        match tokio::fs::read_to_string(&path).await {
            Ok(template) => {
                tracing::debug!(path = %path.display(), "Using page template");
                Self::new(template, site_title)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No page template found, using built-in");
                Self::new(BUILTIN_TEMPLATE, site_title)
            }
            Err(source) => Err(RenderError::Template {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn render_page(
        &self,
        page: &Page,
        sidebar: &[SidebarEntry],
        last_build: &str,
    ) -> Result<String, RenderError> {
        let items: Vec<ItemView<'_>> = page.items.iter().map(ItemView::from).collect();
        let template = self.env.get_template(PAGE_TEMPLATE)?;
        let html = template.render(context! {
            site_title => &self.site_title,
            items => items,
            sidebar => sidebar,
            page_number => page.number,
            prev_link => page.prev_link.as_deref().map(page_file_name),
            next_link => page.next_link.as_deref().map(page_file_name),
            last_build => last_build,
        })?;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::EPOCH;

    fn item(title: &str, link: &str) -> NormalizedItem {
        NormalizedItem {
            title: title.into(),
            link: link.into(),
            source_name: "Source & Co".into(),
            display_date: "2024-01-01".into(),
            summary: "<p>Hello</p>".into(),
            sort_timestamp: EPOCH,
        }
    }

    fn page(number: usize, prev: Option<&str>, next: Option<&str>) -> Page {
        Page {
            number,
            items: vec![item("Fish & <Chips>", "https://example.com/?a=1&b=\"2\"")],
            prev_link: prev.map(str::to_string),
            next_link: next.map(str::to_string),
        }
    }

    #[test]
    fn test_page_file_name() {
        assert_eq!(page_file_name("index"), "index.html");
        assert_eq!(page_file_name("page3"), "page3.html");
    }

    #[test]
    fn test_render_escapes_feed_text() {
        let renderer = HtmlRenderer::new(BUILTIN_TEMPLATE, "My <Site>").unwrap();
        let html = renderer.render_page(&page(1, None, None), &[], "now").unwrap();

        assert!(html.contains("<title>My &lt;Site&gt;</title>"));
        assert!(html.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(html.contains("a=1&amp;b=&quot;2&quot;"));
        assert!(html.contains("&lt;p&gt;Hello"));
        assert!(!html.contains("<p>Hello"));
        assert!(html.contains("Source &amp; Co"));
        assert!(!html.contains("<Chips>"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_custom_template_loops_over_items() {
        let template = "<ul>{% for item in items %}<li>{{ item.title }}</li>{% endfor %}</ul>";
        let renderer = HtmlRenderer::new(template, "t").unwrap();
        let mut page = page(1, None, None);
        page.items.push(item("Second", "https://example.com/2"));

        let html = renderer.render_page(&page, &[], "").unwrap();

        assert_eq!(html, "<ul><li>Fish &amp; &lt;Chips&gt;</li><li>Second</li></ul>");
    }

    #[test]
    fn test_render_pagination_links() {
        let renderer = HtmlRenderer::new(BUILTIN_TEMPLATE, "t").unwrap();

        let first = renderer.render_page(&page(1, None, Some("page2")), &[], "").unwrap();
        assert!(!first.contains(r#"class="prev""#));
        assert!(first.contains(r#"class="next" href="page2.html""#));

        let second = renderer
            .render_page(&page(2, Some("index"), Some("page3")), &[], "")
            .unwrap();
        assert!(second.contains(r#"class="prev" href="index.html""#));
        assert!(second.contains(r#"class="next" href="page3.html""#));
        assert!(second.contains("Page 2"));

        let last = renderer.render_page(&page(3, Some("page2"), None), &[], "").unwrap();
        assert!(last.contains(r#"class="prev" href="page2.html""#));
        assert!(!last.contains(r#"class="next""#));
    }

    #[test]
    fn test_render_sidebar_in_given_order() {
        let renderer = HtmlRenderer::new(
            "{% for source in sidebar %}[{{ source.display_name }}]{% endfor %}",
            "t",
        )
        .unwrap();
        let sidebar = vec![
            SidebarEntry {
                display_name: "alpha".into(),
                link: "https://a.example.com/".into(),
            },
            SidebarEntry {
                display_name: "Beta".into(),
                link: "https://b.example.com/".into(),
            },
        ];
        let html = renderer.render_page(&page(1, None, None), &sidebar, "").unwrap();
        assert_eq!(html, "[alpha][Beta]");
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let result = HtmlRenderer::new("{% for item in items %}", "t");
        assert!(matches!(result, Err(RenderError::Engine(_))));
    }

    #[tokio::test]
    async fn test_load_falls_back_to_builtin() {
        let dir = std::env::temp_dir().join("feedboard_html_test_no_template");
        let renderer = HtmlRenderer::load(&dir, "Site").await.unwrap();
        let html = renderer.render_page(&page(1, None, None), &[], "").unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn test_load_custom_template() {
        let dir = std::env::temp_dir().join("feedboard_html_test_custom_template");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("index.html"),
            "<main>{% for item in items %}<h2>{{ item.title }}</h2>{% endfor %}</main>",
        )
        .unwrap();

        let renderer = HtmlRenderer::load(&dir, "Site").await.unwrap();
        let html = renderer.render_page(&page(1, None, None), &[], "").unwrap();
        assert_eq!(html, "<main><h2>Fish &amp; &lt;Chips&gt;</h2></main>");

        std::fs::remove_dir_all(&dir).ok();
    }
}
