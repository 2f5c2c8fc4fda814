pub mod error;
pub mod genre;
pub mod movie;
pub mod validation;

use std::{fmt::Display, str::FromStr};

pub use error::Error;
pub use sqlx::Error as SqlxError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type Pool = sqlx::Pool<ChosenDB>;

pub const MAX_LIMIT: usize = 10_000;

pub async fn new_pool(database_url: &str) -> Result<Pool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(50)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &Pool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

#[derive(Debug, Clone)]
pub enum Order {
    Asc(String),
    Desc(String),
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Order::Asc(s) => write!(f, "{}", s),
            Order::Desc(s) => write!(f, "{} DESC", s),
        }
    }
}

impl AsRef<str> for Order {
    fn as_ref(&self) -> &str {
        match self {
            Order::Asc(s) => s.as_str(),
            Order::Desc(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingParams {
    pub offset: i64,
    pub limit: i64,
    pub order: Option<Vec<Order>>,
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_LIMIT as i64,
            order: None,
        }
    }
}

impl ListingParams {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            order: None,
        }
    }
    pub fn with_order(mut self, order: Vec<Order>) -> Self {
        self.order = Some(order);
        self
    }

    /// Renders `ORDER BY` clause, empty string if no ordering requested
    pub fn ordering(&self, valid_fields: &[&str]) -> Result<String> {
        let ordering = self
            .order
            .as_ref()
            .map(|o| {
                o.iter()
                    .map(|o| {
                        if valid_fields.contains(&o.as_ref()) {
                            Ok(o.to_string())
                        } else {
                            Err(Error::InvalidOrderByField(o.as_ref().to_string()))
                        }
                    })
                    .collect::<Result<Vec<String>>>()
                    .map(|o| format!("ORDER BY {}", o.join(", ")))
            })
            .transpose()?
            .unwrap_or_default();
        Ok(ordering)
    }
}

#[derive(Debug, Clone)]
pub struct Batch<T> {
    pub offset: i64,
    pub limit: i64,
    pub total: u64,
    pub rows: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        let params = ListingParams::default().with_order(vec![
            Order::Desc("rating".to_string()),
            Order::Asc("title".to_string()),
        ]);
        let ordering = params.ordering(&["title", "rating"]).unwrap();
        assert_eq!(ordering, "ORDER BY rating DESC, title");

        assert_eq!(ListingParams::new(0, 10).ordering(&["title"]).unwrap(), "");
    }

    #[test]
    fn test_invalid_ordering() {
        let params = ListingParams::new(0, 10).with_order(vec![Order::Asc("1; DROP".into())]);
        let res = params.ordering(&["title"]);
        assert!(matches!(res, Err(Error::InvalidOrderByField(f)) if f == "1; DROP"));
    }
}
