//! Doctor list and filter endpoint.

use axum::{
    Json,
    extract::{Query, State},
};
use db::{Doctor, DoctorFilter};
use serde::Deserialize;
use tracing::{debug, instrument};
use utoipa::IntoParams;

use crate::{
    AppState,
    error::{AppError, MessageResponse, Result},
};

/// Query parameters for listing doctors. Absent or blank parameters match everything.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQueryParams {
    /// Part of the doctor's name, matched case-insensitively.
    pub name: Option<String>,

    /// The doctor's gender.
    pub gender: Option<String>,

    /// Part of the specialization, matched case-insensitively.
    pub specialization: Option<String>,
}

impl ListQueryParams {
    /// Collects the known parameters from raw query pairs.
    ///
    /// A repeated parameter keeps its first value, unknown ones are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "name" => &mut params.name,
                "gender" => &mut params.gender,
                "specialization" => &mut params.specialization,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }
}

/// List doctors
///
/// Returns every doctor matching all supplied filters, in storage order.
#[utoipa::path(
    get,
    path = "/api/doctors",
    params(ListQueryParams),
    responses(
        (status = 200, description = "Returns the matching doctors", body = Vec<Doctor>),
        (status = 500, description = "The doctors could not be loaded", body = MessageResponse),
    )
)]
#[instrument(skip(store, config))]
#[axum::debug_handler]
pub async fn list_doctors(
    State(AppState { store, config }): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Doctor>>> {
    let params = ListQueryParams::from_pairs(pairs);
    let filter = DoctorFilter::new(
        params.name,
        params.gender,
        params.specialization,
        config.gender_match,
    );

    let doctors = store
        .find(&filter)
        .await
        .map_err(|err| AppError::from_store(err, "Database connection error"))?;

    debug!(count = doctors.len(), "listed doctors");

    Ok(Json(doctors))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn repeated_parameters_keep_the_first_value() {
        let params = ListQueryParams::from_pairs(pairs(&[
            ("name", "amy"),
            ("name", "lee"),
            ("gender", "female"),
        ]));

        assert_eq!(params.name.as_deref(), Some("amy"));
        assert_eq!(params.gender.as_deref(), Some("female"));
        assert_eq!(params.specialization, None);
    }

    #[test]
    fn unknown_parameters_are_ignored() {
        let params = ListQueryParams::from_pairs(pairs(&[("sort", "name"), ("specialization", "")]));

        assert_eq!(params.name, None);
        assert_eq!(params.specialization.as_deref(), Some(""));
    }
}
