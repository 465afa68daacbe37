//! UI routes - HTML pages for the station reports service
//!
//! Server-rendered pages only (vanilla HTML/CSS, no frameworks): a station
//! index plus the per-station report forms served by [`super::reports`].

use axum::{extract::State, response::Html, routing::get, Router};

use crate::{ApiResult, AppState};

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(index_page))
}

/// GET /
///
/// Station index: one entry per station with links to its reports.
pub async fn index_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let stations = crate::db::list_stations(&state.db).await?;

    let rows: String = if stations.is_empty() {
        r#"<p class="empty">No stations configured yet.</p>"#.to_string()
    } else {
        let items: String = stations
            .iter()
            .map(|s| {
                format!(
                    r#"<li><span class="station-name">{}</span> <span class="short-name">({})</span> &mdash; <a href="/stations/{}/reports/soundexchange">SoundExchange report</a></li>"#,
                    html_escape(&s.name),
                    html_escape(&s.short_name),
                    html_escape(&s.guid),
                )
            })
            .collect();
        format!("<ul class=\"station-list\">{}</ul>", items)
    };

    let body = format!(
        r#"
        <h2>Stations</h2>
        {rows}
    "#
    );

    Ok(Html(page("Stations", &body)))
}

/// Render a full page around `body` with the shared shell and build info
pub(crate) fn page(title: &str, body: &str) -> String {
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = env!("GIT_HASH");
    let build_timestamp = env!("BUILD_TIMESTAMP");
    let build_profile = env!("BUILD_PROFILE");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Aerial Reports - {title}</title>
    <style>
        * {{
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }}
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            line-height: 1.6;
        }}
        header {{
            background-color: #2a2a2a;
            border-bottom: 1px solid #3a3a3a;
            padding: 20px;
            margin-bottom: 30px;
            display: flex;
            justify-content: space-between;
            align-items: center;
        }}
        header h1 {{
            font-size: 22px;
        }}
        .build-info {{
            text-align: right;
            font-size: 12px;
            color: #888;
            font-family: 'Courier New', monospace;
            line-height: 1.3;
        }}
        .container {{
            max-width: 720px;
            margin: 0 auto;
            padding: 0 20px 40px 20px;
        }}
        a {{
            color: #6db3f2;
        }}
        h2 {{
            margin-bottom: 16px;
        }}
        .station-list li {{
            list-style: none;
            padding: 6px 0;
            border-bottom: 1px solid #2a2a2a;
        }}
        .short-name {{
            color: #888;
        }}
        .empty {{
            color: #888;
        }}
        form .field {{
            margin-bottom: 16px;
        }}
        form label {{
            display: block;
            margin-bottom: 4px;
        }}
        form input[type="date"] {{
            background-color: #2a2a2a;
            color: #e0e0e0;
            border: 1px solid #3a3a3a;
            padding: 6px 8px;
        }}
        .field-error {{
            color: #e07a7a;
            font-size: 13px;
            margin-top: 4px;
        }}
        button {{
            background-color: #2a5a8a;
            color: #e0e0e0;
            border: none;
            padding: 8px 16px;
            cursor: pointer;
        }}
        button:hover {{
            background-color: #336ba3;
        }}
    </style>
</head>
<body>
    <header>
        <h1>Aerial Station Reports</h1>
        <div class="build-info">
            v{version} ({build_profile})<br>
            {git_hash} &middot; {build_timestamp}
        </div>
    </header>
    <div class="container">
{body}
    </div>
</body>
</html>"#
    )
}

/// Escape text for interpolation into HTML content or attribute values
pub(crate) fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
