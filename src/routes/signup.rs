use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    Form,
};
use tracing::{debug, error, warn};

use crate::{
    middleware::password::password_error,
    models::{menu::ClaimRequest, week::WeekResolution},
    services::{
        claims::{ClaimError, ClaimService},
        page::{self, PageContext},
        store::TabularStore,
    },
    AppState,
};

type Page = (StatusCode, Html<String>);

/// GET / — this week's sign-up sheet
pub async fn show_week(State(state): State<AppState>) -> Page {
    let ctx = PageContext::from_config(&state.config);
    let resolution = state.week.read().await.resolution;
    week_page(&ctx, &state.claims, &resolution).await
}

/// POST /claims — form submission from the sign-up page
pub async fn submit_claims(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Page {
    let ctx = PageContext::from_config(&state.config);
    let req = ClaimRequest::from_pairs(pairs);
    let resolution = state.week.read().await.resolution;
    claim_page(
        &ctx,
        &state.claims,
        state.config.app_password.as_deref(),
        &resolution,
        req,
    )
    .await
}

pub async fn week_page<S: TabularStore>(
    ctx: &PageContext,
    claims: &ClaimService<S>,
    resolution: &WeekResolution,
) -> Page {
    match claims.fetch_items(resolution.week_key).await {
        Ok(menu) if menu.is_empty() => {
            debug!("Week {} sheet has no items", resolution.week_key);
            (StatusCode::OK, Html(page::render_sheet_empty(ctx, resolution)))
        }
        Ok(menu) => (
            StatusCode::OK,
            Html(page::render_signup(ctx, resolution, &menu)),
        ),
        Err(e) => claim_error_page(ctx, resolution, e),
    }
}

/// Password gate, then the claim batch against the week being served.
pub async fn claim_page<S: TabularStore>(
    ctx: &PageContext,
    claims: &ClaimService<S>,
    app_password: Option<&str>,
    resolution: &WeekResolution,
    req: ClaimRequest,
) -> Page {
    if let Some(message) = password_error(app_password, req.password.as_deref()) {
        warn!("Claim submission rejected: bad password");
        return (StatusCode::UNAUTHORIZED, Html(page::render_error(ctx, message)));
    }

    let week_key = resolution.week_key;
    if let Some(posted) = req.week.filter(|posted| *posted != week_key) {
        warn!("Claim for week {} arrived while serving week {}", posted, week_key);
        return (
            StatusCode::CONFLICT,
            Html(page::render_error(
                ctx,
                "The sign-up list has moved on to a new week. Please reload the page and choose again.",
            )),
        );
    }

    debug!("Week {}: {} requested {:?}", week_key, req.name, req.items);
    match claims.submit_claims(week_key, &req.items, &req.name).await {
        Ok(result) => (
            StatusCode::OK,
            Html(page::render_claim_result(ctx, &req.name, &result)),
        ),
        Err(e) => claim_error_page(ctx, resolution, e),
    }
}

fn claim_error_page(ctx: &PageContext, resolution: &WeekResolution, e: ClaimError) -> Page {
    match e {
        ClaimError::Validation(message) => (
            StatusCode::BAD_REQUEST,
            Html(page::render_error(ctx, &message)),
        ),
        ClaimError::WeekNotFound(_) => (
            StatusCode::OK,
            Html(page::render_week_missing(ctx, resolution)),
        ),
        ClaimError::StoreUnavailable(detail) => {
            error!("Sign-up sheet unavailable: {detail}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Html(page::render_error(
                    ctx,
                    "We couldn't reach the sign-up sheet. Please try again in a moment.",
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory_store::MemoryStore;
    use crate::services::store::claimant_cell;
    use chrono::NaiveDate;

    fn ctx() -> PageContext {
        PageContext {
            group_name: "Sabal Chase".into(),
            coordinator_name: "Kenzie".into(),
            header_image: "header.jpg".into(),
            thanks_image: "thanks.jpg".into(),
            password_required: false,
        }
    }

    fn week(week_key: i64) -> WeekResolution {
        WeekResolution {
            week_key,
            target_sunday: NaiveDate::from_ymd_opt(2025, 1, 19).unwrap(),
        }
    }

    fn service_with_week_two() -> ClaimService<MemoryStore> {
        let store = MemoryStore::new();
        store.insert_table(
            "2",
            vec![
                vec!["Theme".into(), "Soup".into()],
                vec!["Food/Drink Item".into(), "Name - Dish".into()],
                vec!["Salad".into(), "".into()],
                vec!["Bread".into(), "Alice".into()],
            ],
        );
        ClaimService::new(store)
    }

    fn request(pairs: &[(&str, &str)]) -> ClaimRequest {
        ClaimRequest::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn week_page_renders_form_for_current_week() {
        let claims = service_with_week_two();
        let (status, Html(body)) = week_page(&ctx(), &claims, &week(2)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<option value="Salad">Salad</option>"#));
        assert!(body.contains(r#"name="week" value="2""#));
    }

    #[tokio::test]
    async fn missing_week_is_an_ok_page_with_notice() {
        let claims = ClaimService::new(MemoryStore::new());

        let (status, Html(body)) = week_page(&ctx(), &claims, &week(9)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Sheet for week 9 not found."));

        let req = request(&[("items", "Salad"), ("name", "Bob")]);
        let (status, Html(body)) = claim_page(&ctx(), &claims, None, &week(9), req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Sheet for week 9 not found."));
    }

    #[tokio::test]
    async fn successful_claim_writes_name() {
        let claims = service_with_week_two();
        let req = request(&[("items", "Salad"), ("name", "Bob"), ("week", "2")]);

        let (status, Html(body)) = claim_page(&ctx(), &claims, None, &week(2), req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Thank you Bob for signing up to bring Salad!"));
        assert_eq!(claims.store().cell("2", claimant_cell(3)), "Bob");
    }

    #[tokio::test]
    async fn validation_failure_is_bad_request() {
        let claims = service_with_week_two();
        let req = request(&[("items", "Salad"), ("name", "   ")]);

        let (status, _) = claim_page(&ctx(), &claims, None, &week(2), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(claims.store().calls(), 0);
    }

    #[tokio::test]
    async fn store_outage_is_service_unavailable() {
        let claims = service_with_week_two();
        claims.store().set_unavailable(true);

        let (status, _) = week_page(&ctx(), &claims, &week(2)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let req = request(&[("items", "Salad"), ("name", "Bob")]);
        let (status, Html(body)) = claim_page(&ctx(), &claims, None, &week(2), req).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("couldn&#39;t reach the sign-up sheet"));
    }

    #[tokio::test]
    async fn bad_password_is_refused_before_the_store() {
        let claims = service_with_week_two();

        let wrong = request(&[("items", "Salad"), ("name", "Bob"), ("password", "monday")]);
        let (status, _) = claim_page(&ctx(), &claims, Some("sunday"), &week(2), wrong).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let absent = request(&[("items", "Salad"), ("name", "Bob")]);
        let (status, _) = claim_page(&ctx(), &claims, Some("sunday"), &week(2), absent).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        assert_eq!(claims.store().calls(), 0);
        assert_eq!(claims.store().cell("2", claimant_cell(3)), "");
    }

    #[tokio::test]
    async fn form_from_previous_week_is_a_conflict() {
        let claims = service_with_week_two();
        // Rendered for week 1, posted after the Monday rollover
        let req = request(&[("items", "Salad"), ("name", "Bob"), ("week", "1")]);

        let (status, Html(body)) = claim_page(&ctx(), &claims, None, &week(2), req).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("Please reload the page"));
        assert_eq!(claims.store().calls(), 0);
    }
}
