//! End-to-end site builds against mock feed servers.
//!
//! Each test gets its own directory under the system temp dir and its own
//! `MockServer`, then drives `feedboard::pipeline::run` exactly as the binary
//! does and inspects the files it writes.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use feedboard::config::Config;
use feedboard::feed::SourceListError;
use feedboard::pipeline::{run, BuildError};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALPHA_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Alpha News</title>
    <link>https://alpha.example.com/</link>
    <description>Alpha</description>
    <item>
      <title>A1</title>
      <link>https://alpha.example.com/1</link>
      <pubDate>Fri, 01 Mar 2024 10:00:00 GMT</pubDate>
      <description>First &amp; foremost</description>
    </item>
    <item>
      <title>A2</title>
      <link>https://alpha.example.com/2</link>
      <pubDate>Wed, 10 Jan 2024 10:00:00 GMT</pubDate>
      <description>Second</description>
    </item>
    <item>
      <title>A3</title>
      <link>https://alpha.example.com/3</link>
      <description>Undated</description>
    </item>
  </channel>
</rss>"#;

const BETA_ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>beta log</title>
  <link href="https://beta.example.com/"/>
  <id>urn:beta</id>
  <updated>2024-02-15T00:00:00Z</updated>
  <entry>
    <title>B1</title>
    <link href="https://beta.example.com/1"/>
    <id>urn:beta:1</id>
    <updated>2024-02-15T00:00:00Z</updated>
    <summary>Beta one</summary>
  </entry>
  <entry>
    <title>B2</title>
    <link href="https://beta.example.com/2"/>
    <id>urn:beta:2</id>
    <updated>2024-01-20T00:00:00Z</updated>
    <summary>Beta two</summary>
  </entry>
</feed>"#;

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("feedboard_it_{name}"));
    std::fs::remove_dir_all(&dir).ok();
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn build_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 3).unwrap()
}

fn config_for(dir: &Path, feeds: &str, output: &str, page_size: usize) -> Config {
    let feeds_file = dir.join("feeds.txt");
    std::fs::write(&feeds_file, feeds).unwrap();
    Config {
        feeds_file,
        output_dir: dir.join(output),
        templates_dir: dir.join("no_templates"),
        static_dir: dir.join("static"),
        page_size,
        ..Config::default()
    }
}

async fn mount_feeds(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/alpha.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ALPHA_RSS)
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/beta.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(BETA_ATOM)
                .insert_header("Content-Type", "application/atom+xml"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

fn feeds_list(server: &MockServer) -> String {
    format!(
        "# test sources\n\
         {uri}/alpha.xml\n\
         \n\
         Broken, {uri}/broken.xml\n\
         {uri}/beta.xml\n",
        uri = server.uri()
    )
}

fn read(path: PathBuf) -> String {
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

// Attribute values may come out entity-encoded (`/` as `&#x2f;`).
fn read_decoded(path: PathBuf) -> String {
    html_escape::decode_html_entities(&read(path)).into_owned()
}

fn titles_in_order(html: &str, titles: &[&str]) -> bool {
    let positions: Vec<usize> = titles
        .iter()
        .map(|t| html.find(&format!(">{t}</a>")).unwrap_or(usize::MAX))
        .collect();
    positions.iter().all(|&p| p != usize::MAX) && positions.windows(2).all(|w| w[0] < w[1])
}

// ============================================================================
// Full Build Tests
// ============================================================================

#[tokio::test]
async fn test_build_writes_paginated_site() {
    let server = MockServer::start().await;
    mount_feeds(&server).await;
    let dir = test_dir("paginated");
    std::fs::create_dir_all(dir.join("static")).unwrap();
    std::fs::write(dir.join("static").join("styles.css"), "body {}").unwrap();
    let config = config_for(&dir, &feeds_list(&server), "public", 2);

    let report = run(&config, build_time()).await.unwrap();

    assert_eq!(report.sources, 3);
    assert_eq!(report.items, 5);
    assert_eq!(report.pages, 3);
    assert_eq!(report.feed_items, 5);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].display_name, "Broken");
    assert!(report.defects.is_empty());

    let out = config.output_dir.clone();
    let index = read(out.join("index.html"));
    let page2 = read(out.join("page2.html"));
    let page3 = read(out.join("page3.html"));
    assert!(!out.join("page1.html").exists());
    assert!(!out.join("page4.html").exists());

    // Newest first across sources, undated last
    assert!(titles_in_order(&index, &["A1", "B1"]));
    assert!(titles_in_order(&page2, &["B2", "A2"]));
    assert!(titles_in_order(&page3, &["A3"]));

    assert!(index.contains(r#"href="page2.html""#));
    assert!(!index.contains(r#"class="prev""#));
    assert!(page2.contains(r#"class="prev" href="index.html""#));
    assert!(page2.contains(r#"class="next" href="page3.html""#));
    assert!(!page3.contains(r#"class="next""#));

    assert!(index.contains("First &amp; foremost"));
    assert!(index.contains("Fri, 01 Mar 2024 10:00:00 +0000"));
    assert!(index.contains("Sat, 09 Mar 2024 07:05:03 +0000"));

    assert_eq!(read(out.join("static").join("styles.css")), "body {}");
}

#[tokio::test]
async fn test_build_sidebar_lists_every_source_sorted() {
    let server = MockServer::start().await;
    mount_feeds(&server).await;
    let dir = test_dir("sidebar");
    let config = config_for(&dir, &feeds_list(&server), "public", 10);

    run(&config, build_time()).await.unwrap();

    let index = read_decoded(config.output_dir.join("index.html"));
    let alpha_url = format!("{}/alpha.xml", server.uri());
    let beta_url = format!("{}/beta.xml", server.uri());

    // Bare lines are named by their URL, never by the feed title
    assert!(!index.contains(">Alpha News</a>"));
    assert!(!index.contains(">beta log</a>"));

    let broken = index.find(">Broken</a>").unwrap();
    let alpha = index.find(&format!(">{alpha_url}</a>")).unwrap();
    let beta = index.find(&format!(">{beta_url}</a>")).unwrap();
    assert!(broken < alpha && alpha < beta);

    // Sources link to the site the feed names, failed ones to their URL
    assert!(index.contains(r#"href="https://alpha.example.com/""#));
    assert!(index.contains(&format!(r#"href="{}/broken.xml""#, server.uri())));
}

#[tokio::test]
async fn test_build_items_carry_source_name() {
    let server = MockServer::start().await;
    mount_feeds(&server).await;
    let dir = test_dir("source_names");
    let feeds = format!("Alpha, {uri}/alpha.xml\n{uri}/beta.xml\n", uri = server.uri());
    let config = config_for(&dir, &feeds, "public", 10);

    run(&config, build_time()).await.unwrap();

    let index = read_decoded(config.output_dir.join("index.html"));
    assert!(index.contains("From <strong>Alpha</strong>"));
    assert!(index.contains(&format!("From <strong>{}/beta.xml</strong>", server.uri())));

    let xml = read(config.output_dir.join("feed.xml"));
    assert!(xml.contains("<source>Alpha</source>"));
}

#[tokio::test]
async fn test_build_uses_custom_template() {
    let server = MockServer::start().await;
    mount_feeds(&server).await;
    let dir = test_dir("custom_template");
    let mut config = config_for(&dir, &feeds_list(&server), "public", 2);
    config.templates_dir = dir.join("templates");
    std::fs::create_dir_all(&config.templates_dir).unwrap();
    std::fs::write(
        config.templates_dir.join("index.html"),
        "<ol>{% for item in items %}<li>{{ item.title }}</li>{% endfor %}</ol>\
         {% if next_link %}<a href=\"{{ next_link }}\">more</a>{% endif %}",
    )
    .unwrap();

    run(&config, build_time()).await.unwrap();

    assert_eq!(
        read(config.output_dir.join("index.html")),
        r#"<ol><li>A1</li><li>B1</li></ol><a href="page2.html">more</a>"#
    );
    assert_eq!(read(config.output_dir.join("page3.html")), "<ol><li>A3</li></ol>");
}

#[tokio::test]
async fn test_build_rejects_broken_template() {
    let server = MockServer::start().await;
    mount_feeds(&server).await;
    let dir = test_dir("broken_template");
    let mut config = config_for(&dir, &feeds_list(&server), "public", 10);
    config.templates_dir = dir.join("templates");
    std::fs::create_dir_all(&config.templates_dir).unwrap();
    std::fs::write(config.templates_dir.join("index.html"), "{% for item in items %}").unwrap();

    let result = run(&config, build_time()).await;

    assert!(matches!(result, Err(BuildError::Render(_))));
}

#[tokio::test]
async fn test_build_writes_combined_feed() {
    let server = MockServer::start().await;
    mount_feeds(&server).await;
    let dir = test_dir("combined_feed");
    let mut config = config_for(&dir, &feeds_list(&server), "public", 10);
    config.feed_item_limit = 4;
    config.site.title = "Planet Test".to_string();

    run(&config, build_time()).await.unwrap();

    let xml = read(config.output_dir.join("feed.xml"));
    assert!(xml.contains("<title>Planet Test</title>"));
    assert!(xml.contains("<lastBuildDate>Sat, 09 Mar 2024 07:05:03 +0000</lastBuildDate>"));
    assert_eq!(xml.matches("<item>").count(), 4);
    assert!(xml.contains("<pubDate>Fri, 01 Mar 2024 10:00:00 +0000</pubDate>"));
    assert!(xml.contains(&format!("<source>{}/beta.xml</source>", server.uri())));
    // The undated item is fifth and falls outside the limit
    assert!(!xml.contains("https://alpha.example.com/3"));
}

#[tokio::test]
async fn test_build_is_repeatable() {
    let server = MockServer::start().await;
    mount_feeds(&server).await;
    let dir = test_dir("repeatable");
    let feeds = feeds_list(&server);

    let first = config_for(&dir, &feeds, "first", 2);
    let second = config_for(&dir, &feeds, "second", 2);
    run(&first, build_time()).await.unwrap();
    run(&second, build_time()).await.unwrap();

    for name in ["index.html", "page2.html", "page3.html", "feed.xml"] {
        assert_eq!(
            read(first.output_dir.join(name)),
            read(second.output_dir.join(name)),
            "{name} differs between runs"
        );
    }
}

#[tokio::test]
async fn test_build_with_every_source_down_still_writes_index() {
    let server = MockServer::start().await;
    mount_feeds(&server).await;
    let dir = test_dir("all_down");
    let feeds = format!("{uri}/broken.xml\n{uri}/missing.xml\n", uri = server.uri());
    let config = config_for(&dir, &feeds, "public", 10);

    let report = run(&config, build_time()).await.unwrap();

    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.items, 0);
    assert_eq!(report.pages, 1);
    let index = read(config.output_dir.join("index.html"));
    assert!(!index.contains("<article>"));
    assert!(config.output_dir.join("feed.xml").exists());
}

// ============================================================================
// Fatal Error Tests
// ============================================================================

#[tokio::test]
async fn test_build_missing_source_list_fails() {
    let dir = test_dir("missing_list");
    let config = Config {
        feeds_file: dir.join("does_not_exist.txt"),
        output_dir: dir.join("public"),
        ..Config::default()
    };

    let result = run(&config, build_time()).await;

    assert!(matches!(
        result,
        Err(BuildError::Sources(SourceListError::Io { .. }))
    ));
    assert!(!config.output_dir.exists());
}

#[tokio::test]
async fn test_build_empty_source_list_fails() {
    let dir = test_dir("empty_list");
    let config = config_for(&dir, "# nothing here\n\n", "public", 10);

    let result = run(&config, build_time()).await;

    assert!(matches!(result, Err(BuildError::Sources(SourceListError::Empty))));
}

#[tokio::test]
async fn test_build_zero_page_size_fails() {
    let dir = test_dir("zero_page_size");
    let config = config_for(&dir, "https://example.com/feed.xml\n", "public", 0);

    let result = run(&config, build_time()).await;

    assert!(matches!(result, Err(BuildError::Config(_))));
}
