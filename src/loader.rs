//! Data Loader - one-shot fetch of the survey CSV
//!
//! The source is either a local path or an http(s) URL. Any failure is
//! logged and yields an empty dataset; there is no retry.

use std::collections::HashMap;
use thiserror::Error;

use crate::survey::{Dataset, SurveyRow};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetch the raw CSV text
pub async fn fetch_text(source: &str) -> Result<String, LoadError> {
    if is_remote(source) {
        tracing::debug!("Fetching CSV from: {}", source);
        let client = reqwest::Client::new();
        let response = client
            .get(source)
            .header("User-Agent", "MxmhDashboard/0.1")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LoadError::Status(response.status()));
        }
        let text = response.text().await?;
        tracing::debug!("Downloaded {} bytes of CSV", text.len());
        Ok(text)
    } else {
        tokio::fs::read_to_string(source)
            .await
            .map_err(|source_err| LoadError::Read {
                path: source.to_string(),
                source: source_err,
            })
    }
}

/// Parse CSV text into rows, ids in order of appearance
pub fn parse_rows(text: &str) -> Result<Vec<SurveyRow>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for (id, record) in reader.records().enumerate() {
        let record = record?;
        // a short row reads its missing trailing cells as empty
        let cells: HashMap<&str, &str> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h, record.get(i).unwrap_or("")))
            .collect();
        rows.push(SurveyRow::from_record(id, &cells));
    }

    Ok(rows)
}

/// Fetch, parse and derive all three views
pub async fn load(source: &str) -> Result<Dataset, LoadError> {
    let text = fetch_text(source).await?;
    let rows = parse_rows(&text)?;
    tracing::debug!("Parsed {} survey rows", rows.len());
    Ok(Dataset::from_rows(&rows))
}

/// Load the dataset, or log the failure and return empty views
pub async fn load_or_empty(source: &str) -> Dataset {
    match load(source).await {
        Ok(data) => {
            tracing::info!(
                "Loaded {} genres, {} scatter points, {} parallel tuples from {}",
                data.genres.len(),
                data.scatter.len(),
                data.parallel.len(),
                source
            );
            data
        }
        Err(e) => {
            crate::log_error!(e, source = %source);
            Dataset::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Age,Primary streaming service,Hours per day,Fav genre,Anxiety,Depression,Insomnia,OCD
18,Spotify,3,Latin,3,0,1,0
63,Pandora,1.5,Rock,7,2,2,1
18,Spotify,4,Video game music,7,7,10,2
61,YouTube Music,2.5,Jazz,9,7,3,3
18,,4,R&B,7,2,5,9
";

    #[test]
    fn test_parse_assigns_ids_in_order() {
        let rows = parse_rows(SAMPLE).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(rows[1].fav_genre.as_deref(), Some("Rock"));
        assert_eq!(rows[4].streaming_service.as_deref(), Some(""));
    }

    #[test]
    fn test_short_row_fields_are_empty() {
        let rows = parse_rows("Fav genre,Hours per day,Anxiety\nRock,2\n").unwrap();
        assert_eq!(rows[0].hours_per_day.as_deref(), Some("2"));
        assert_eq!(rows[0].anxiety.as_deref(), Some(""));
        assert!(Dataset::from_rows(&rows).scatter.is_empty());
    }

    #[test]
    fn test_short_row_genre_groups_under_empty_label() {
        let rows = parse_rows("Hours per day,Anxiety,Fav genre\n2,3\n1,4,Rock\n").unwrap();
        let genres: Vec<(String, usize)> = Dataset::from_rows(&rows)
            .genres
            .into_iter()
            .map(|g| (g.genre, g.count))
            .collect();
        assert_eq!(genres, vec![(String::new(), 1), ("Rock".to_string(), 1)]);
    }

    #[test]
    fn test_headers_match_verbatim() {
        let rows = parse_rows("fav genre,Hours Per Day,Anxiety\nRock,2,3\n").unwrap();
        assert_eq!(rows[0].fav_genre, None);
        assert_eq!(rows[0].hours_per_day, None);
        assert_eq!(rows[0].anxiety.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.csv");
        std::fs::write(&path, SAMPLE).unwrap();

        let data = load(path.to_str().unwrap()).await.unwrap();
        assert_eq!(data.genres.len(), 5);
        assert_eq!(data.scatter.len(), 5);
        // the row without a streaming service is dropped
        assert_eq!(data.parallel.len(), 4);
    }

    #[tokio::test]
    async fn test_missing_file_yields_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");

        let err = load(path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));

        let data = load_or_empty(path.to_str().unwrap()).await;
        assert!(data.is_empty());
    }
}
