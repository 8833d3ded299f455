use super::{fetch_text, http_client, Paper, PaperSource, SourceError, PAGE_SIZE};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const SOURCE_NAME: &str = "biorxiv.org";
/// https://www.rxivist.org/docs#Preprints-Search
pub const DEFAULT_BASE_URL: &str = "https://api.rxivist.org/v1/papers";

/// bioRxiv preprints ranked by the rxivist aggregator.
pub struct BiorxivClient {
    client: reqwest::Client,
    base_url: String,
}

impl BiorxivClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into(),
        })
    }
}

/// Most tweeted papers of the last day.
fn query_params(query: &str) -> [(&'static str, String); 4] {
    [
        ("q", query.to_string()),
        ("metric", "twitter".to_string()),
        ("timeframe", "day".to_string()),
        ("page_size", PAGE_SIZE.to_string()),
    ]
}

#[derive(Deserialize)]
struct RxivistResponse {
    results: Vec<RxivistPaper>,
}

#[derive(Deserialize)]
struct RxivistPaper {
    first_posted: String,
    title: String,
    #[serde(rename = "abstract")]
    abstract_text: String,
    biorxiv_url: String,
}

fn rxivist_to_paper(r: RxivistPaper) -> Paper {
    Paper {
        source: SOURCE_NAME.to_string(),
        posted: r.first_posted,
        title: r.title,
        summary: r.abstract_text,
        link: r.biorxiv_url,
    }
}

fn parse_results(json: &str) -> Result<Vec<Paper>, SourceError> {
    let resp: RxivistResponse = serde_json::from_str(json)
        .map_err(|e| SourceError::Parse(format!("rxivist response: {}", e)))?;
    Ok(resp.results.into_iter().map(rxivist_to_paper).collect())
}

#[async_trait]
impl PaperSource for BiorxivClient {
    fn name(&self) -> &str {
        "biorxiv"
    }

    async fn search(&self, query: &str, _date: &str) -> Result<Vec<Paper>, SourceError> {
        tracing::debug!(source = SOURCE_NAME, url = %self.base_url, query, "Querying rxivist");
        let request = self.client.get(&self.base_url).query(&query_params(query));
        let body = fetch_text(SOURCE_NAME, request).await?;
        let papers = parse_results(&body)?;
        tracing::info!(source = SOURCE_NAME, count = papers.len(), "bioRxiv search finished");
        Ok(papers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::test_server::serve_once;
    use pretty_assertions::assert_eq;

    const SAMPLE_JSON: &str = r#"{
        "query": {"text_search": "crispr", "metric": "twitter", "timeframe": "day"},
        "results": [
            {
                "id": 101,
                "metric": 250,
                "title": "Prime editing in mice",
                "url": "https://www.biorxiv.org/content/10.1101/2024.01.01.000001v1",
                "biorxiv_url": "https://www.biorxiv.org/content/10.1101/2024.01.01.000001v1",
                "doi": "10.1101/2024.01.01.000001",
                "category": "genetics",
                "first_posted": "2024-01-01",
                "abstract": "We edit genomes.\n",
                "authors": [{"id": 1, "name": "R. Franklin"}]
            },
            {
                "id": 102,
                "title": "CRISPR screens",
                "biorxiv_url": "https://www.biorxiv.org/content/10.1101/2024.01.01.000002v1",
                "first_posted": "2023-12-31",
                "abstract": "Screens."
            }
        ]
    }"#;

    #[test]
    fn test_parse_results() {
        let papers = parse_results(SAMPLE_JSON).unwrap();
        assert_eq!(papers.len(), 2);
        assert_eq!(
            papers[0],
            Paper {
                source: "biorxiv.org".to_string(),
                posted: "2024-01-01".to_string(),
                title: "Prime editing in mice".to_string(),
                summary: "We edit genomes.\n".to_string(),
                link: "https://www.biorxiv.org/content/10.1101/2024.01.01.000001v1".to_string(),
            }
        );
        assert_eq!(papers[1].title, "CRISPR screens");
        assert_eq!(papers[1].posted, "2023-12-31");
    }

    #[test]
    fn test_empty_results() {
        assert!(parse_results(r#"{"results": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_missing_results_is_parse_error() {
        match parse_results(r#"{"query": {}}"#).unwrap_err() {
            SourceError::Parse(msg) => assert!(msg.contains("results"), "{}", msg),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            parse_results(r#"{"error": "rate limited"}"#),
            Err(SourceError::Parse(_))
        ));
    }

    #[test]
    fn test_text_passes_through_unchanged() {
        let json = r#"{"results": [{
            "first_posted": "2024-01-01",
            "title": "  Spaced\n title ",
            "abstract": "\nLine one\nLine two\n",
            "biorxiv_url": "https://www.biorxiv.org/content/1"
        }]}"#;
        let papers = parse_results(json).unwrap();
        assert_eq!(papers[0].title, "  Spaced\n title ");
        assert_eq!(papers[0].summary, "\nLine one\nLine two\n");
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let json = r#"{"results": [{"title": "t", "abstract": "a", "biorxiv_url": "u"}]}"#;
        match parse_results(json).unwrap_err() {
            SourceError::Parse(msg) => assert!(msg.contains("first_posted"), "{}", msg),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        assert!(matches!(
            parse_results("<html>gateway timeout</html>"),
            Err(SourceError::Parse(_))
        ));
    }

    #[test]
    fn test_query_params() {
        assert_eq!(
            query_params("gene drive"),
            [
                ("q", "gene drive".to_string()),
                ("metric", "twitter".to_string()),
                ("timeframe", "day".to_string()),
                ("page_size", "10".to_string()),
            ]
        );
    }

    fn client(base: &str) -> BiorxivClient {
        BiorxivClient::new(format!("{}/v1/papers", base), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_query_and_parses_results() {
        let (base, server) = serve_once("200 OK", "application/json", SAMPLE_JSON).await;

        let papers = client(&base).search("gene drive", "2024-01-01").await.unwrap();

        assert_eq!(
            server.await.unwrap(),
            "GET /v1/papers?q=gene+drive&metric=twitter&timeframe=day&page_size=10 HTTP/1.1"
        );
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].title, "Prime editing in mice");
        assert_eq!(papers[1].title, "CRISPR screens");
    }

    #[tokio::test]
    async fn test_search_empty_results() {
        let (base, server) = serve_once("200 OK", "application/json", r#"{"results": []}"#).await;

        let papers = client(&base).search("nothing", "2024-01-01").await.unwrap();

        assert!(papers.is_empty());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_search_non_200_is_fetch_error() {
        let (base, server) = serve_once("503 Service Unavailable", "text/plain", "try later").await;

        let err = client(&base).search("q", "2024-01-01").await.unwrap_err();

        server.await.unwrap();
        match err {
            SourceError::Fetch { origin, status, body } => {
                assert_eq!(origin, "biorxiv.org");
                assert_eq!(status, 503);
                assert_eq!(body, "try later");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_missing_results_fails() {
        let (base, server) = serve_once("200 OK", "application/json", r#"{"error": "x"}"#).await;

        let err = client(&base).search("q", "2024-01-01").await.unwrap_err();

        server.await.unwrap();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
