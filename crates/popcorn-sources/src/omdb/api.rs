use popcorn_models::{parse_imdb_rating, parse_runtime_minutes, MovieDetail, MovieSummary};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::LookupError;
use crate::omdb::client::OmdbSettings;

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Option<Vec<OmdbSearchItem>>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

// OMDb reports lookups that failed as 200 OK with "Response": "False"
#[derive(Debug, Deserialize)]
struct OmdbDetail {
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
    #[serde(rename = "imdbID", default)]
    imdb_id: Option<String>,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Released", default)]
    released: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Genre", default)]
    genre: String,
}

/// Decode a search body; a missing or empty `Search` array is an empty result
pub fn parse_search_response(query: &str, body: &str) -> Result<Vec<MovieSummary>, LookupError> {
    let response: OmdbSearchResponse = serde_json::from_str(body)?;

    let items = match response.search {
        Some(items) if !items.is_empty() => items,
        _ => {
            debug!(query, provider_error = ?response.error, "Search returned no results");
            return Err(LookupError::EmptyResult {
                query: query.to_string(),
            });
        }
    };

    Ok(items
        .into_iter()
        .map(|item| MovieSummary {
            id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster_url: item.poster,
        })
        .collect())
}

/// Decode a by-id body into a detail record
pub fn parse_detail_response(id: &str, body: &str) -> Result<MovieDetail, LookupError> {
    let detail: OmdbDetail = serde_json::from_str(body)?;

    if detail.response.as_deref() == Some("False") {
        return Err(LookupError::NotFound {
            id: id.to_string(),
            message: detail.error.unwrap_or_else(|| "unknown error".to_string()),
        });
    }

    Ok(MovieDetail {
        id: detail.imdb_id.unwrap_or_else(|| id.to_string()),
        runtime_minutes: parse_runtime_minutes(&detail.runtime),
        imdb_rating: parse_imdb_rating(&detail.imdb_rating),
        title: detail.title,
        year: detail.year,
        poster_url: detail.poster,
        runtime: detail.runtime,
        plot: detail.plot,
        release_date: detail.released,
        actors: detail.actors,
        director: detail.director,
        genre: detail.genre,
    })
}

async fn get_body(client: &Client, settings: &OmdbSettings, params: &[(&str, &str)]) -> Result<String, LookupError> {
    let response = client
        .get(&settings.base_url)
        .query(&[("apikey", settings.api_key.as_str())])
        .query(params)
        .header("Accept", "application/json")
        .timeout(settings.timeout)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(LookupError::Status {
            status: response.status().as_u16(),
        });
    }

    Ok(response.text().await?)
}

/// Search titles by free text
pub async fn search(client: &Client, settings: &OmdbSettings, query: &str) -> Result<Vec<MovieSummary>, LookupError> {
    let body = get_body(client, settings, &[("s", query)]).await?;
    parse_search_response(query, &body)
}

/// Fetch a single title by IMDb id
pub async fn get_by_id(client: &Client, settings: &OmdbSettings, id: &str) -> Result<MovieDetail, LookupError> {
    let body = get_body(client, settings, &[("i", id)]).await?;
    parse_detail_response(id, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one connection on localhost: capture the request head, then
    /// answer with `response`, or hold the socket open when it is `None`
    async fn serve_once(response: Option<String>) -> (OmdbSettings, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (request_tx, request_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let _ = request_tx.send(String::from_utf8_lossy(&head).into_owned());

            match response {
                Some(response) => {
                    socket.write_all(response.as_bytes()).await.unwrap();
                    let _ = socket.shutdown().await;
                }
                None => tokio::time::sleep(Duration::from_secs(5)).await,
            }
        });

        let settings = OmdbSettings {
            api_key: "test".to_string(),
            base_url: format!("http://{}/", addr),
            timeout: Duration::from_secs(5),
        };
        (settings, request_rx)
    }

    #[tokio::test]
    async fn test_search_sends_key_and_query() {
        let body = r#"{"Search":[{"Title":"Batman","Year":"1989","imdbID":"tt0096895","Poster":"N/A"}],"Response":"True"}"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let (settings, request) = serve_once(Some(response)).await;

        let movies = search(&Client::new(), &settings, "batman").await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, "tt0096895");

        let request = request.await.unwrap();
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("GET /?"));
        assert!(request_line.contains("apikey=test"));
        assert!(request_line.contains("s=batman"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let (settings, _request) = serve_once(Some(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n".to_string(),
        ))
        .await;

        let err = get_by_id(&Client::new(), &settings, "tt0096895").await.unwrap_err();
        assert!(matches!(err, LookupError::Status { status: 503 }));
    }

    #[tokio::test]
    async fn test_unresponsive_server_times_out() {
        let (mut settings, _request) = serve_once(None).await;
        settings.timeout = Duration::from_millis(50);

        let err = search(&Client::new(), &settings, "batman").await.unwrap_err();
        assert!(matches!(err, LookupError::Network(ref e) if e.is_timeout()));
    }

    #[test]
    fn test_parse_search_response() {
        let body = r#"{"Search":[{"Title":"Batman","Year":"1989","imdbID":"tt0096895","Type":"movie","Poster":"https://img/batman.jpg"}],"totalResults":"1","Response":"True"}"#;
        let movies = parse_search_response("batman", body).unwrap();
        assert_eq!(
            movies,
            vec![MovieSummary {
                id: "tt0096895".to_string(),
                title: "Batman".to_string(),
                year: "1989".to_string(),
                poster_url: "https://img/batman.jpg".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_search_without_results() {
        let body = r#"{"Response":"False","Error":"Movie not found!"}"#;
        let err = parse_search_response("qwzx", body).unwrap_err();
        assert!(matches!(err, LookupError::EmptyResult { ref query } if query == "qwzx"));

        let err = parse_search_response("qwzx", r#"{"Search":[]}"#).unwrap_err();
        assert!(matches!(err, LookupError::EmptyResult { .. }));
    }

    #[test]
    fn test_parse_search_rejects_non_json() {
        let err = parse_search_response("bat", "<html>busy</html>").unwrap_err();
        assert!(matches!(err, LookupError::Decode(_)));
    }

    #[test]
    fn test_parse_detail_response() {
        let body = r#"{
            "Title":"Batman","Year":"1989","Rated":"PG-13","Released":"23 Jun 1989",
            "Runtime":"126 min","Genre":"Action, Adventure","Director":"Tim Burton",
            "Actors":"Michael Keaton, Jack Nicholson","Plot":"The Dark Knight of Gotham City begins his war on crime.",
            "Poster":"https://img/batman.jpg","imdbRating":"7.5","imdbID":"tt0096895","Response":"True"
        }"#;
        let detail = parse_detail_response("tt0096895", body).unwrap();
        assert_eq!(detail.title, "Batman");
        assert_eq!(detail.runtime, "126 min");
        assert_eq!(detail.runtime_minutes, Some(126));
        assert_eq!(detail.imdb_rating, Some(7.5));
        assert_eq!(detail.release_date, "23 Jun 1989");
        assert_eq!(detail.director, "Tim Burton");
    }

    #[test]
    fn test_parse_detail_with_missing_numbers() {
        let body = r#"{"Title":"Obscure","Runtime":"N/A","imdbRating":"N/A","Response":"True"}"#;
        let detail = parse_detail_response("tt9", body).unwrap();
        assert_eq!(detail.id, "tt9");
        assert_eq!(detail.runtime_minutes, None);
        assert_eq!(detail.imdb_rating, None);
    }

    #[test]
    fn test_parse_detail_not_found() {
        let body = r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#;
        let err = parse_detail_response("tt0", body).unwrap_err();
        assert!(matches!(err, LookupError::NotFound { ref message, .. } if message == "Incorrect IMDb ID."));
    }
}
