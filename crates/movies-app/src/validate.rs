use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use garde::Validate;
use http::request::Parts;
use movies_dal::validation::ValidationErrors;
use std::fmt::{Display, Formatter};
use std::ops::{Deref, DerefMut};

use crate::error::ApiError;
use crate::state::AppState;

/// Extractor wrapper running `garde` validation on the extracted value
#[derive(Debug, Clone, Copy, Default)]
pub struct Garde<E>(pub E);

impl<E> Deref for Garde<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<E> DerefMut for Garde<E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<E> Garde<E> {
    pub fn into_inner(self) -> E {
        self.0
    }
}

#[derive(Debug)]
pub enum GardeRejection<E> {
    /// Extracted value failed validation
    Invalid(ValidationErrors),
    /// Inner extractor failed
    Inner(E),
}

impl<E: Display> Display for GardeRejection<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GardeRejection::Invalid(errors) => write!(f, "{errors}"),
            GardeRejection::Inner(error) => write!(f, "{error}"),
        }
    }
}

impl<E: IntoResponse> IntoResponse for GardeRejection<E> {
    fn into_response(self) -> Response {
        match self {
            GardeRejection::Invalid(errors) => ApiError::Validation(errors).into_response(),
            GardeRejection::Inner(e) => e.into_response(),
        }
    }
}

impl<Extractor, T> FromRequestParts<AppState> for Garde<Extractor>
where
    T: Validate<Context = ()>,
    Extractor: Deref<Target = T> + FromRequestParts<AppState>,
{
    type Rejection = GardeRejection<<Extractor as FromRequestParts<AppState>>::Rejection>;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let inner = Extractor::from_request_parts(parts, state)
            .await
            .map_err(GardeRejection::Inner)?;

        inner
            .deref()
            .validate()
            .map_err(|report| GardeRejection::Invalid(report.into()))?;
        Ok(Garde(inner))
    }
}
