use super::{fetch_text, http_client, Paper, PaperSource, SourceError, PAGE_SIZE};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::time::Duration;

pub const SOURCE_NAME: &str = "arxiv.org";
/// https://arxiv.org/help/api/user-manual
pub const DEFAULT_BASE_URL: &str = "http://export.arxiv.org/api";

pub struct ArxivClient {
    client: reqwest::Client,
    base_url: String,
}

impl ArxivClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/query", self.base_url.trim_end_matches('/'))
    }
}

/// Newest submissions first, one fixed page.
fn query_params(query: &str) -> [(&'static str, String); 5] {
    [
        ("search_query", format!("all:{}", query)),
        ("sortBy", "submittedDate".to_string()),
        ("sortOrder", "descending".to_string()),
        ("start", "0".to_string()),
        ("max_results", PAGE_SIZE.to_string()),
    ]
}

#[async_trait]
impl PaperSource for ArxivClient {
    fn name(&self) -> &str {
        "arxiv"
    }

    async fn search(&self, query: &str, _date: &str) -> Result<Vec<Paper>, SourceError> {
        let url = self.endpoint();
        tracing::debug!(source = SOURCE_NAME, %url, query, "Querying arXiv");
        let request = self.client.get(&url).query(&query_params(query));
        let body = fetch_text(SOURCE_NAME, request).await?;
        let papers = parse_atom_feed(&body)?;
        tracing::info!(source = SOURCE_NAME, count = papers.len(), "arXiv search finished");
        Ok(papers)
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Summary,
    Id,
    Published,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"title" => Some(Field::Title),
            b"summary" => Some(Field::Summary),
            b"id" => Some(Field::Id),
            b"published" => Some(Field::Published),
            _ => None,
        }
    }
}

#[derive(Default)]
struct EntryFields {
    title: Option<String>,
    summary: Option<String>,
    id: Option<String>,
    published: Option<String>,
}

impl EntryFields {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Summary => &mut self.summary,
            Field::Id => &mut self.id,
            Field::Published => &mut self.published,
        }
    }

    fn into_paper(self, index: usize) -> Result<Paper, SourceError> {
        let require = |value: Option<String>, tag: &str| {
            value
                .map(|v| v.trim().to_string())
                .ok_or_else(|| SourceError::Parse(format!("arXiv entry {} has no <{}>", index, tag)))
        };
        Ok(Paper {
            source: SOURCE_NAME.to_string(),
            posted: require(self.published, "published")?,
            title: require(self.title, "title")?,
            summary: require(self.summary, "summary")?,
            link: require(self.id, "id")?,
        })
    }
}

/// Map every `<entry>` of an Atom feed to a [`Paper`], in feed order.
///
/// Only direct children of `<entry>` are read, so the feed's own `<title>`
/// and `<id>` and nested elements such as `<author><name>` never leak into a
/// paper. A feed without entries is an empty result.
fn parse_atom_feed(xml: &str) -> Result<Vec<Paper>, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut papers = Vec::new();
    let mut entry: Option<EntryFields> = None;
    // Nesting level below the open <entry>; 1 is a direct child.
    let mut depth = 0usize;
    let mut field: Option<Field> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if let Some(current) = entry.as_mut() {
                    depth += 1;
                    if depth == 1 {
                        field = Field::from_tag(e.name().as_ref());
                        if let Some(f) = field {
                            current.slot(f).get_or_insert_with(String::new);
                        }
                    }
                } else if e.name().as_ref() == b"entry" {
                    entry = Some(EntryFields::default());
                    depth = 0;
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some(current) = entry.as_mut() {
                    if depth == 0 {
                        if let Some(f) = Field::from_tag(e.name().as_ref()) {
                            current.slot(f).get_or_insert_with(String::new);
                        }
                    }
                } else if e.name().as_ref() == b"entry" {
                    papers.push(EntryFields::default().into_paper(papers.len())?);
                }
            }
            Ok(Event::Text(e)) if depth == 1 => {
                if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                    let text = e
                        .unescape()
                        .map_err(|e| SourceError::Parse(format!("XML parse error: {}", e)))?;
                    if let Some(value) = current.slot(f).as_mut() {
                        value.push_str(&text);
                    }
                }
            }
            Ok(Event::CData(e)) if depth == 1 => {
                if let (Some(current), Some(f)) = (entry.as_mut(), field) {
                    if let Some(value) = current.slot(f).as_mut() {
                        value.push_str(&String::from_utf8_lossy(&e));
                    }
                }
            }
            Ok(Event::End(_)) if entry.is_some() => {
                if depth == 0 {
                    if let Some(fields) = entry.take() {
                        papers.push(fields.into_paper(papers.len())?);
                    }
                } else {
                    depth -= 1;
                    if depth == 0 {
                        field = None;
                    }
                }
            }
            Ok(Event::Eof) => {
                if entry.is_some() {
                    return Err(SourceError::Parse(
                        "XML parse error: feed ended inside <entry>".to_string(),
                    ));
                }
                break;
            }
            Err(e) => return Err(SourceError::Parse(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }
    Ok(papers)
}
