//! SoundExchange report endpoints
//!
//! GET serves the date-range form; POST validates the range and returns the
//! generated report as a file download. Validation failures re-render the
//! form with field messages instead of surfacing an API error.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use chrono::{Duration, NaiveDate};
use serde::Deserialize;

use aerial_common::db::Station;

use crate::report::{self, PeriodError, ReportPeriod};
use crate::{db, ApiError, ApiResult, AppState};

use super::ui::{html_escape, page};

/// Build report routes
pub fn report_routes() -> Router<AppState> {
    Router::new().route(
        "/stations/:station_id/reports/soundexchange",
        get(report_form).post(generate_report),
    )
}

/// Form fields for the report request
///
/// Empty strings count as absent so an untouched form falls back to the
/// default period. The checkbox only posts a value when checked.
#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    fetch_isrc: Option<String>,
}

/// GET /stations/:station_id/reports/soundexchange
///
/// Report form, prefilled with the previous calendar month.
async fn report_form(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> ApiResult<Html<String>> {
    let station = load_station(&state, &station_id).await?;
    let defaults = ReportPeriod::previous_month(station_today(&station));
    Ok(Html(render_form(&station, &FormState::prefilled(&defaults))))
}

/// POST /stations/:station_id/reports/soundexchange
async fn generate_report(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
    Form(request): Form<ReportRequest>,
) -> ApiResult<Response> {
    let station = load_station(&state, &station_id).await?;

    let period = match ReportPeriod::resolve(
        present(request.start_date.as_deref()),
        present(request.end_date.as_deref()),
        station_today(&station),
    ) {
        Ok(period) => period,
        Err(e) => {
            let form = FormState::rejected(&request, &e);
            let html = render_form(&station, &form);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response());
        }
    };

    let report = report::generate(
        &state.db,
        state.lookup.as_ref(),
        &station,
        &period,
        checkbox_checked(request.fetch_isrc.as_deref()),
    )
    .await?;

    let headers = [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report.filename),
        ),
    ];

    Ok((headers, report.body).into_response())
}

async fn load_station(state: &AppState, station_id: &str) -> Result<Station, ApiError> {
    db::load_station(&state.db, station_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Station {} not found", station_id)))
}

/// The station's current local date, per its fixed UTC offset
fn station_today(station: &Station) -> NaiveDate {
    (aerial_common::time::now() + Duration::minutes(station.timezone_offset_min)).date_naive()
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn checkbox_checked(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("on") | Some("true"))
}

/// Values and field messages for one rendering of the form
#[derive(Default)]
struct FormState {
    start_date: String,
    end_date: String,
    fetch_isrc: bool,
    start_error: Option<String>,
    end_error: Option<String>,
}

impl FormState {
    fn prefilled(period: &ReportPeriod) -> Self {
        Self {
            start_date: period.start_iso(),
            end_date: period.end_iso(),
            ..Default::default()
        }
    }

    /// Carry the submitted values back into the form, with the validation
    /// message attached to the offending field.
    fn rejected(request: &ReportRequest, error: &PeriodError) -> Self {
        let message = error.to_string();
        let (start_error, end_error) = match error {
            PeriodError::Malformed { field } if *field == "start" => (Some(message), None),
            _ => (None, Some(message)),
        };

        Self {
            start_date: request.start_date.clone().unwrap_or_default(),
            end_date: request.end_date.clone().unwrap_or_default(),
            fetch_isrc: checkbox_checked(request.fetch_isrc.as_deref()),
            start_error,
            end_error,
        }
    }
}

fn render_form(station: &Station, form: &FormState) -> String {
    let field_error = |err: &Option<String>| match err {
        Some(msg) => format!(r#"<p class="field-error">{}</p>"#, html_escape(msg)),
        None => String::new(),
    };

    let body = format!(
        r#"
        <h2>SoundExchange report &mdash; {name}</h2>
        <p>Pick the reporting period. Leaving both dates empty exports the
        previous calendar month.</p>
        <form method="post" action="/stations/{guid}/reports/soundexchange">
            <div class="field">
                <label for="start_date">Start date</label>
                <input type="date" id="start_date" name="start_date" value="{start}">
                {start_error}
            </div>
            <div class="field">
                <label for="end_date">End date</label>
                <input type="date" id="end_date" name="end_date" value="{end}">
                {end_error}
            </div>
            <div class="field">
                <label>
                    <input type="checkbox" name="fetch_isrc" value="1"{checked}>
                    Look up missing ISRCs on MusicBrainz (slower)
                </label>
            </div>
            <button type="submit">Generate report</button>
        </form>
    "#,
        name = html_escape(&station.name),
        guid = html_escape(&station.guid),
        start = html_escape(&form.start_date),
        end = html_escape(&form.end_date),
        start_error = field_error(&form.start_error),
        end_error = field_error(&form.end_error),
        checked = if form.fetch_isrc { " checked" } else { "" },
    );

    page("SoundExchange Report", &body)
}
