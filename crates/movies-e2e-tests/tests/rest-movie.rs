use movies_dal::{genre::Genre, movie::Movie, validation::messages};
use movies_e2e_tests::{
    TEST_TODAY, extend_url, launch_env, prepare_env,
    rest::{create_movie, movie_payload},
};
use reqwest::Url;
use serde_json::{Value, json};
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_movie_crud() {
    let (args, _config_guard) = prepare_env("test_movie_crud").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _) = launch_env(args).await.unwrap();
    let api_url = base_url.join("api/movie").unwrap();

    let payload = json!({
        "title": "Movie-Matrix",
        "release_date": TEST_TODAY.to_string(),
        "genre": "Action",
        "duration_minutes": 136,
        "rating": 8.7
    });
    let movie = create_movie(&client, &base_url, &payload).await.unwrap();
    assert_eq!(movie.title, "Movie-Matrix");
    assert_eq!(movie.release_date, TEST_TODAY);
    assert_eq!(movie.rating, Some(8.7));

    let record_url = extend_url(&api_url, movie.id);
    let response = client.get(record_url.clone()).send().await.unwrap();
    assert!(response.status().is_success());
    let rec: Movie = response.json().await.unwrap();
    assert_eq!(rec, movie);

    let replacement = movie_payload("Movie-Matrix Reloaded", "2003-05-15", "Sci-Fi");
    let response = client
        .put(record_url.clone())
        .json(&replacement)
        .send()
        .await
        .unwrap();
    info!("Response: {:#?}", response);
    assert!(response.status().is_success());
    let rec: Movie = response.json().await.unwrap();
    assert_eq!(rec.id, movie.id);
    assert_eq!(rec.genre, Genre::SciFi);
    assert_eq!(rec.duration_minutes, 120);
    assert_eq!(rec.rating, None);

    let response = client
        .patch(record_url.clone())
        .json(&json!({"duration_minutes": 138}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let rec: Movie = response.json().await.unwrap();
    assert_eq!(rec.title, "Movie-Matrix Reloaded");
    assert_eq!(rec.duration_minutes, 138);

    let response = client
        .patch(record_url.clone())
        .json(&json!({"rating": "7.5"}))
        .send()
        .await
        .unwrap();
    let rec: Movie = response.json().await.unwrap();
    assert_eq!(rec.rating, Some(7.5));

    let response = client
        .patch(record_url.clone())
        .json(&json!({"rating": null}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let rec: Movie = response.json().await.unwrap();
    assert_eq!(rec.rating, None);
    assert_eq!(rec.duration_minutes, 138);

    let response = client.delete(record_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client.get(record_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

async fn post_movie(client: &reqwest::Client, api_url: &Url, payload: Value) -> (u16, Value) {
    let response = client
        .post(api_url.clone())
        .json(&payload)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    let body: Value = response.json().await.unwrap();
    (status, body)
}

#[tokio::test]
#[traced_test]
async fn test_movie_validation() {
    let (args, _config_guard) = prepare_env("test_movie_validation").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _) = launch_env(args).await.unwrap();
    let api_url = base_url.join("api/movie").unwrap();

    let payload = movie_payload("Matrix", "2010-01-01", "Action");
    let (status, body) = post_movie(&client, &api_url, payload).await;
    assert_eq!(status, 422);
    let title_errors = body["title"].as_array().unwrap();
    assert!(title_errors.contains(&json!(messages::TITLE_PREFIX_MISSING)));

    let payload = movie_payload("Movie-Casablanca", "1942-11-26", "Drama");
    let (status, body) = post_movie(&client, &api_url, payload).await;
    assert_eq!(status, 422);
    assert_eq!(body["release_date"], json!([messages::RELEASE_DATE_TOO_OLD]));

    let payload = movie_payload("Movie-Tomorrow", "2024-06-16", "Drama");
    let (status, body) = post_movie(&client, &api_url, payload).await;
    assert_eq!(status, 422);
    assert_eq!(body["release_date"], json!([messages::RELEASE_DATE_FUTURE]));

    let (status, body) = post_movie(&client, &api_url, json!({"title": "Movie-Empty"})).await;
    assert_eq!(status, 422);
    assert_eq!(body["release_date"], json!([messages::RELEASE_DATE_REQUIRED]));
    assert_eq!(body["genre"], json!([messages::GENRE_REQUIRED]));
    assert_eq!(body["duration_minutes"], json!([messages::DURATION_REQUIRED]));
    assert!(body.get("rating").is_none());

    let mut payload = movie_payload("Movie-Epic", "2010-01-01", "Drama");
    payload["duration_minutes"] = json!(601);
    payload["rating"] = json!(-0.5);
    let (status, body) = post_movie(&client, &api_url, payload).await;
    assert_eq!(status, 422);
    assert_eq!(body["duration_minutes"], json!([messages::DURATION_TOO_LONG]));
    assert_eq!(body["rating"], json!([messages::RATING_TOO_LOW]));

    let payload = movie_payload("Movie-Heat", "1995-12-15", "Thriller");
    let (status, _) = post_movie(&client, &api_url, payload).await;
    assert_eq!(status, 201);
    let payload = movie_payload("Movie-Heat", "1995-12-15", "Thriller");
    let (status, body) = post_movie(&client, &api_url, payload).await;
    assert_eq!(status, 400);
    assert_eq!(body["title"], json!([messages::TITLE_DUPLICATE]));

    let response = client
        .post(api_url.clone())
        .header("content-type", "application/json")
        .body("{\"title\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client.get(base_url.join("api/movie/count").unwrap()).send().await.unwrap();
    let count: u64 = response.json().await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[traced_test]
async fn test_movie_listing() {
    let (args, _config_guard) = prepare_env("test_movie_listing").await.unwrap();
    let base_url = args.base_url.clone();
    let (client, _) = launch_env(args).await.unwrap();

    let titles = [
        ("Movie-Alien Covenant", "Sci-Fi"),
        ("Movie-Big Lebowski", "Comedy"),
        ("Movie-Collateral", "Thriller"),
        ("Movie-Dunkirk", "Drama"),
        ("Movie-Edge of Tomorrow", "Sci-Fi"),
    ];
    for (title, genre) in titles {
        create_movie(&client, &base_url, &movie_payload(title, "2010-01-01", genre))
            .await
            .unwrap();
    }

    let list_url = base_url.join("api/movie?page=2&page_size=2&sort=title").unwrap();
    let response = client.get(list_url).send().await.unwrap();
    assert!(response.status().is_success());
    let page: Value = response.json().await.unwrap();
    assert_eq!(page["page"], 2);
    assert_eq!(page["total"], 5);
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["rows"][0]["title"], "Movie-Collateral");
    assert_eq!(page["rows"][1]["title"], "Movie-Dunkirk");

    let list_url = base_url.join("api/movie?genre=Sci-Fi&sort=-title").unwrap();
    let page: Value = client.get(list_url).send().await.unwrap().json().await.unwrap();
    assert_eq!(page["total"], 2);
    assert_eq!(page["rows"][0]["title"], "Movie-Edge of Tomorrow");

    let list_url = base_url.join("api/movie?genre=Western").unwrap();
    let response = client.get(list_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 400);
}
