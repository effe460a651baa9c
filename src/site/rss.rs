use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::items::{CombinedFeed, NormalizedItem, EPOCH, LAST_BUILD_FORMAT};
use crate::site::RenderError;

/// Channel-level metadata for the combined feed.
#[derive(Debug, Clone, Default)]
pub struct ChannelInfo<'a> {
    pub title: &'a str,
    pub link: &'a str,
    pub description: &'a str,
}

/// Writes the combined feed as an RSS 2.0 document.
///
/// Text is escaped by `quick-xml`; characters XML 1.0 cannot carry at all
/// (C0 controls other than tab, LF, CR) are dropped first. `pubDate` is
/// omitted for items without a real date.
pub fn render_rss(channel: &ChannelInfo<'_>, feed: &CombinedFeed) -> Result<String, RenderError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_document(&mut writer, channel, feed)?;

    let mut out =
        String::from_utf8(writer.into_inner()).map_err(|e| RenderError::Xml(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

fn write_document(
    w: &mut Writer<Vec<u8>>,
    channel: &ChannelInfo<'_>,
    feed: &CombinedFeed,
) -> Result<(), RenderError> {
    emit(w, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    emit(w, Event::Start(rss))?;
    emit(w, Event::Start(BytesStart::new("channel")))?;

    write_text_element(w, "title", channel.title)?;
    write_text_element(w, "link", channel.link)?;
    write_text_element(w, "description", channel.description)?;
    write_text_element(w, "lastBuildDate", &feed.last_build)?;

    for item in &feed.items {
        write_item(w, item)?;
    }

    emit(w, Event::End(BytesEnd::new("channel")))?;
    emit(w, Event::End(BytesEnd::new("rss")))?;
    Ok(())
}

fn write_item(w: &mut Writer<Vec<u8>>, item: &NormalizedItem) -> Result<(), RenderError> {
    emit(w, Event::Start(BytesStart::new("item")))?;
    write_text_element(w, "title", &item.title)?;
    write_text_element(w, "link", &item.link)?;

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "true"));
    emit(w, Event::Start(guid))?;
    emit(w, Event::Text(BytesText::new(&xml_safe(&item.link))))?;
    emit(w, Event::End(BytesEnd::new("guid")))?;

    write_text_element(w, "description", &item.summary)?;
    write_text_element(w, "source", &item.source_name)?;
    if item.sort_timestamp != EPOCH {
        let pub_date = item.sort_timestamp.format(LAST_BUILD_FORMAT).to_string();
        write_text_element(w, "pubDate", &pub_date)?;
    }
    emit(w, Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn write_text_element(w: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), RenderError> {
    emit(w, Event::Start(BytesStart::new(name)))?;
    emit(w, Event::Text(BytesText::new(&xml_safe(text))))?;
    emit(w, Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn emit(w: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), RenderError> {
    w.write_event(event).map_err(|e| RenderError::Xml(e.to_string()))
}

// Remove C0 control characters except tab, LF, CR; they are invalid in XML 1.0.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= ' ')
        .collect()
}
