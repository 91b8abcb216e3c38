use axum::Json;
use axum::extract::Query;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::{ROUTES, RouteMeta};

pub const META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/routes",
    desc: "Lists every route, optionally filtered by category.",
    category: "utility",
};

#[derive(Debug, Deserialize)]
pub struct RoutesQuery {
    pub category: Option<String>,
}

pub async fn list_routes(Query(query): Query<RoutesQuery>) -> ApiResult<Json<Vec<RouteMeta>>> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(wanted) = category
        && !ROUTES.iter().any(|route| route.category == wanted)
    {
        let mut categories: Vec<&str> = ROUTES.iter().map(|route| route.category).collect();
        categories.sort_unstable();
        categories.dedup();
        return Err(ApiError::not_found(format!(
            "Unknown category `{wanted}`. Available: {}",
            categories.join(", ")
        )));
    }

    Ok(Json(sorted_routes(category)))
}

fn sorted_routes(category: Option<&str>) -> Vec<RouteMeta> {
    let mut routes: Vec<RouteMeta> = ROUTES
        .iter()
        .filter(|route| category.is_none_or(|wanted| route.category == wanted))
        .copied()
        .collect();
    routes.sort_by(|a, b| a.category.cmp(b.category).then(a.path.cmp(b.path)));
    routes
}

#[cfg(test)]
mod tests {
    use super::sorted_routes;
    use crate::ROUTES;

    #[test]
    fn catalog_has_no_duplicates() {
        let mut keys: Vec<(&str, &str)> = ROUTES.iter().map(|r| (r.method, r.path)).collect();
        keys.sort_unstable();
        let before = keys.len();
        keys.dedup();
        assert_eq!(keys.len(), before);
    }

    #[test]
    fn filters_by_category() {
        let economy = sorted_routes(Some("economy"));
        assert_eq!(economy.len(), 2);
        assert!(economy.iter().all(|route| route.category == "economy"));
        assert_eq!(sorted_routes(None).len(), ROUTES.len());
    }
}
