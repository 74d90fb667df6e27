use axum::Router;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_scalar::{Scalar, Servable as _};

use crate::AppState;

mod create;
mod list;

pub fn build_router() -> Router<AppState> {
    let (router, openapi) = OpenApiRouter::<AppState>::new()
        .routes(routes!(create::create_doctor))
        .routes(routes!(list::list_doctors))
        .split_for_parts();

    router.merge(Scalar::with_url("/docs", openapi))
}
