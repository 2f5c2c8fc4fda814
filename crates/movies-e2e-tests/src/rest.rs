use anyhow::{Result, anyhow};
use movies_dal::movie::Movie;
use reqwest::Url;
use serde_json::json;
use tracing::info;

pub fn movie_payload(title: &str, release_date: &str, genre: &str) -> serde_json::Value {
    json!({
        "title": title,
        "release_date": release_date,
        "genre": genre,
        "duration_minutes": 120,
    })
}

pub async fn create_movie<T>(client: &reqwest::Client, base_url: &Url, payload: &T) -> Result<Movie>
where
    T: serde::Serialize,
{
    let api_url = base_url.join("api/movie")?;

    let response = client.post(api_url).json(payload).send().await?;
    info!("Response: {:#?}", response);
    if response.status().as_u16() != 201 {
        let status = response.status();
        let body = response.text().await?;
        return Err(anyhow!("Movie not created, status {status}, body {body}"));
    }

    let new_movie: Movie = response.json().await?;
    Ok(new_movie)
}
