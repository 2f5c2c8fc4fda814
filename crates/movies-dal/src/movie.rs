use futures::TryStreamExt as _;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Pool};
use time::Date;
use tracing::debug;

use crate::{Batch, ChosenDB, Error, ListingParams, error::Result, genre::Genre};

const VALID_ORDER_FIELDS: &[&str] = &[
    "id",
    "title",
    "release_date",
    "genre",
    "duration_minutes",
    "rating",
];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CreateMovie {
    pub title: String,
    pub release_date: Date,
    pub genre: Genre,
    pub duration_minutes: i64,
    pub rating: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: Date,
    pub genre: Genre,
    pub duration_minutes: i64,
    pub rating: Option<f64>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MovieInt {
    id: i64,
    title: String,
    release_date: Date,
    genre: String,
    duration_minutes: i64,
    rating: Option<f64>,
}

impl TryFrom<MovieInt> for Movie {
    type Error = Error;

    fn try_from(value: MovieInt) -> Result<Self> {
        let genre = value
            .genre
            .parse::<Genre>()
            .map_err(|_| Error::InvalidStoredValue {
                column: "genre",
                value: value.genre.clone(),
            })?;
        Ok(Self {
            id: value.id,
            title: value.title,
            release_date: value.release_date,
            genre,
            duration_minutes: value.duration_minutes,
            rating: value.rating,
        })
    }
}

fn map_unique_violation(e: sqlx::Error, title: &str) -> Error {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            debug!("Unique constraint violated: {db_err}");
            Error::DuplicateTitle(title.to_string())
        }
        _ => e.into(),
    }
}

pub type MovieRepository = MovieRepositoryImpl<Pool<ChosenDB>>;

pub struct MovieRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> MovieRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateMovie) -> Result<Movie> {
        let result = sqlx::query(
            "INSERT INTO movie (title, release_date, genre, duration_minutes, rating) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&payload.title)
        .bind(payload.release_date)
        .bind(payload.genre.as_str())
        .bind(payload.duration_minutes)
        .bind(payload.rating)
        .execute(&self.executor)
        .await
        .map_err(|e| map_unique_violation(e, &payload.title))?;

        let id = result.last_insert_rowid();
        self.get(id).await
    }

    pub async fn update(&self, id: i64, payload: CreateMovie) -> Result<Movie> {
        let mut conn = self.executor.acquire().await?;
        let mut transaction = conn.begin().await?;
        let result = sqlx::query(
            "UPDATE movie SET title = ?, release_date = ?, genre = ?, duration_minutes = ?, rating = ? WHERE id = ?",
        )
        .bind(&payload.title)
        .bind(payload.release_date)
        .bind(payload.genre.as_str())
        .bind(payload.duration_minutes)
        .bind(payload.rating)
        .bind(id)
        .execute(&mut *transaction)
        .await
        .map_err(|e| map_unique_violation(e, &payload.title))?;

        if result.rows_affected() == 0 {
            Err(Error::RecordNotFound("Movie".to_string()))
        } else {
            let record = get(id, &mut *transaction).await?;
            transaction.commit().await?;
            Ok(record)
        }
    }

    pub async fn count(&self, genre: Option<Genre>) -> Result<u64> {
        let count: u64 = match genre {
            Some(genre) => {
                sqlx::query_scalar("SELECT count(*) FROM movie WHERE genre = ?")
                    .bind(genre.as_str())
                    .fetch_one(&self.executor)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT count(*) FROM movie")
                    .fetch_one(&self.executor)
                    .await?
            }
        };
        Ok(count)
    }

    pub async fn list(&self, params: ListingParams, genre: Option<Genre>) -> Result<Batch<Movie>> {
        let order = params.ordering(VALID_ORDER_FIELDS)?;
        let condition = if genre.is_some() {
            "WHERE genre = ?"
        } else {
            ""
        };
        let sql = format!("SELECT * FROM movie {condition} {order} LIMIT ? OFFSET ?");
        let mut query = sqlx::query_as::<_, MovieInt>(&sql);
        if let Some(genre) = genre {
            query = query.bind(genre.as_str());
        }
        let rows = query
            .bind(params.limit)
            .bind(params.offset)
            .fetch(&self.executor)
            .map_err(Error::from)
            .and_then(|r| futures::future::ready(Movie::try_from(r)))
            .try_collect::<Vec<_>>()
            .await?;
        let total = self.count(genre).await?;

        Ok(Batch {
            offset: params.offset,
            limit: params.limit,
            total,
            rows,
        })
    }

    pub async fn list_all(&self) -> Result<Vec<Movie>> {
        let batch = self
            .list(
                ListingParams::default().with_order(vec![crate::Order::Asc("id".into())]),
                None,
            )
            .await?;
        Ok(batch.rows)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM movie WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound("Movie".to_string()))
        } else {
            Ok(())
        }
    }

    pub async fn get(&self, id: i64) -> Result<Movie> {
        get(id, &self.executor).await
    }

    pub async fn find_by_title(&self, title: &str) -> Result<Movie> {
        let record = sqlx::query_as::<_, MovieInt>("SELECT * FROM movie WHERE title = ?")
            .bind(title)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound("Movie".to_string()))?;
        Movie::try_from(record)
    }
}

async fn get<'c, E>(id: i64, executor: E) -> Result<Movie>
where
    E: sqlx::Executor<'c, Database = ChosenDB>,
{
    let record = sqlx::query_as::<_, MovieInt>("SELECT * FROM movie WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| Error::RecordNotFound("Movie".to_string()))?;
    Movie::try_from(record)
}
