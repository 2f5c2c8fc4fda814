use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Drama,
    Comedy,
    Thriller,
    #[serde(rename = "Sci-Fi")]
    SciFi,
}

impl Genre {
    pub const ALL: [Genre; 5] = [
        Genre::Action,
        Genre::Drama,
        Genre::Comedy,
        Genre::Thriller,
        Genre::SciFi,
    ];

    /// Label as used on the wire and in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Drama => "Drama",
            Genre::Comedy => "Comedy",
            Genre::Thriller => "Thriller",
            Genre::SciFi => "Sci-Fi",
        }
    }
}

impl Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown genre: {0}")]
pub struct UnknownGenre(pub String);

impl FromStr for Genre {
    type Err = UnknownGenre;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| UnknownGenre(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_labels() {
        for genre in Genre::ALL {
            let json = serde_json::to_string(&genre).unwrap();
            assert_eq!(json, format!("\"{}\"", genre));
            assert_eq!(genre, genre.as_str().parse::<Genre>().unwrap());
        }
        assert_eq!(
            serde_json::from_str::<Genre>("\"Sci-Fi\"").unwrap(),
            Genre::SciFi
        );
    }

    #[test]
    fn test_unknown_genre() {
        assert!("Horror".parse::<Genre>().is_err());
        assert!("action".parse::<Genre>().is_err());
        assert!(serde_json::from_str::<Genre>("\"SciFi\"").is_err());
    }
}
