//! RSS 2.0 and Atom feed entries.

use std::time::Duration;

use quick_xml::{
	Reader,
	events::{BytesStart, Event},
};
use reqwest::Client;

use crate::{Error, Result};

/// One published episode as announced by a feed. Blank values are `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedEntry {
	pub title: String,
	pub guid: Option<String>,
	pub link: Option<String>,
	pub description: Option<String>,
	pub published: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
	Title,
	Guid,
	Link,
	Description,
	Summary,
	Published,
	Updated,
}
impl Field {
	fn from_tag(tag: &[u8]) -> Option<Self> {
		match tag {
			b"title" => Some(Self::Title),
			b"guid" | b"id" => Some(Self::Guid),
			b"link" => Some(Self::Link),
			b"description" | b"content" => Some(Self::Description),
			b"summary" => Some(Self::Summary),
			b"pubDate" | b"published" => Some(Self::Published),
			b"updated" => Some(Self::Updated),
			_ => None,
		}
	}
}

#[derive(Default)]
struct EntryBuilder {
	title: String,
	guid: String,
	link: String,
	description: String,
	summary: String,
	published: String,
	updated: String,
}
impl EntryBuilder {
	fn slot(&mut self, field: Field) -> &mut String {
		match field {
			Field::Title => &mut self.title,
			Field::Guid => &mut self.guid,
			Field::Link => &mut self.link,
			Field::Description => &mut self.description,
			Field::Summary => &mut self.summary,
			Field::Published => &mut self.published,
			Field::Updated => &mut self.updated,
		}
	}

	fn finish(self) -> FeedEntry {
		FeedEntry {
			title: self.title.trim().to_string(),
			guid: non_blank(self.guid),
			link: non_blank(self.link),
			description: non_blank(self.summary).or_else(|| non_blank(self.description)),
			published: non_blank(self.published).or_else(|| non_blank(self.updated)),
		}
	}
}

/// Downloads and parses a feed.
pub async fn fetch(cfg: &mm_config::Feeds, url: &str) -> Result<Vec<FeedEntry>> {
	let client = Client::builder()
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.user_agent(cfg.user_agent.as_str())
		.build()?;
	let res = client.get(url).send().await?;
	let body = res.error_for_status()?.text().await?;
	let entries = parse_feed(&body)?;

	tracing::debug!(url, entries = entries.len(), "Fetched feed.");

	Ok(entries)
}

/// Parses RSS `<item>` and Atom `<entry>` elements in document order.
///
/// Namespaced extension elements such as `itunes:title` are ignored. A feed without any
/// `<rss>` or `<feed>` root is rejected.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
	let mut reader = Reader::from_str(xml);

	reader.config_mut().trim_text(true);

	let mut saw_root = false;
	let mut entries = Vec::new();
	let mut entry: Option<EntryBuilder> = None;
	let mut open: Option<(Field, Vec<u8>)> = None;

	loop {
		match reader.read_event()? {
			Event::Start(start) => {
				let tag = start.name().as_ref().to_vec();

				match tag.as_slice() {
					b"rss" | b"feed" => saw_root = true,
					b"item" | b"entry" => entry = Some(EntryBuilder::default()),
					_ => {
						if let Some(builder) = entry.as_mut()
							&& open.is_none()
							&& let Some(field) = Field::from_tag(&tag)
						{
							if field == Field::Link {
								link_href(&start, builder)?;
							}

							open = Some((field, tag));
						}
					},
				}
			},
			Event::Empty(start) => {
				if let Some(builder) = entry.as_mut()
					&& start.name().as_ref() == b"link"
				{
					link_href(&start, builder)?;
				}
			},
			Event::Text(text) => {
				if let (Some(builder), Some((field, _))) = (entry.as_mut(), open.as_ref()) {
					builder.slot(*field).push_str(&text.unescape()?);
				}
			},
			Event::CData(data) => {
				if let (Some(builder), Some((field, _))) = (entry.as_mut(), open.as_ref()) {
					builder.slot(*field).push_str(&String::from_utf8_lossy(&data.into_inner()));
				}
			},
			Event::End(end) => {
				let tag = end.name();

				if open.as_ref().is_some_and(|(_, open_tag)| open_tag.as_slice() == tag.as_ref()) {
					open = None;
				} else if matches!(tag.as_ref(), b"item" | b"entry")
					&& let Some(builder) = entry.take()
				{
					entries.push(builder.finish());
				}
			},
			Event::Eof => break,
			_ => {},
		}
	}

	if !saw_root {
		return Err(Error::InvalidResponse {
			message: "Feed document has no <rss> or <feed> root element.".to_string(),
		});
	}

	Ok(entries)
}

/// Atom links carry the target in `href`. RSS links carry it as text.
fn link_href(start: &BytesStart<'_>, builder: &mut EntryBuilder) -> Result<()> {
	let Some(attr) = start.try_get_attribute("href").map_err(quick_xml::Error::from)? else {
		return Ok(());
	};

	if builder.link.trim().is_empty() {
		builder.link = attr.unescape_value()?.into_owned();
	}

	Ok(())
}

fn non_blank(value: String) -> Option<String> {
	let trimmed = value.trim();

	if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}
