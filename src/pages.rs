//! Server-rendered HTML for the auth and runs screens.

use std::fmt::Write;

use crate::auth::{AuthMode, AuthView};
use crate::models::Location;
use crate::runs::RunsPage;

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{}</title>
<link rel="stylesheet" href="/assets/style.css">
</head>
<body>
{}
</body>
</html>"#,
        escape_html(title),
        body
    )
}

pub fn render_auth_page(view: &AuthView) -> String {
    let title = view.mode.title();
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<div class="auth-container">
<div class="auth-card">
<h1>{title}</h1>
<form method="post" action="/auth">
<input type="hidden" name="mode" value="{mode}">
"#,
        title = title,
        mode = view.mode.as_str(),
    );

    if view.mode == AuthMode::SignUp {
        let _ = write!(
            body,
            r#"<div class="field">
<label for="username">Username</label>
<input type="text" id="username" name="username" value="{}" required>
</div>
"#,
            escape_html(&view.username)
        );
    }

    let _ = write!(
        body,
        r#"<div class="field">
<label for="email">Email</label>
<input type="email" id="email" name="email" value="{}" required>
</div>
<div class="field">
<label for="password">Password</label>
<input type="password" id="password" name="password" required>
</div>
"#,
        escape_html(&view.email)
    );

    if let Some(error) = &view.error {
        let _ = writeln!(body, r#"<p class="error">{}</p>"#, escape_html(error));
    }
    if let Some(message) = &view.message {
        let _ = writeln!(body, r#"<p class="message">{}</p>"#, escape_html(message));
    }

    let (prompt, other) = match view.mode {
        AuthMode::Login => ("Don't have an account?", AuthMode::SignUp),
        AuthMode::SignUp => ("Already have an account?", AuthMode::Login),
    };
    let _ = write!(
        body,
        r#"<button type="submit" class="primary">{title}</button>
</form>
<p class="switch">{prompt} <a href="/?mode={other_mode}">{other_title}</a></p>
</div>
</div>"#,
        title = title,
        prompt = prompt,
        other_mode = other.as_str(),
        other_title = other.title(),
    );

    layout("Run Tracker", &body)
}

pub fn render_runs_page(page: &RunsPage) -> String {
    let stats = page.stats();
    let mut body = String::new();

    body.push_str(
        r#"<header class="page-header">
<h1>Brisk: Track Your Runs</h1>
<form method="post" action="/logout"><button type="submit" class="link">Log out</button></form>
</header>
<div class="runs-container">
<table class="recent-runs-table">
<thead>
<tr><th>Date</th><th>Start Time</th><th>Run Time</th><th>Distance (miles)</th><th>Pace (min/mile)</th><th>Elevation (ft)</th><th>Effort (1-10)</th><th>Location</th></tr>
</thead>
<tbody>
"#,
    );

    for run in &page.runs {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&run.date),
            escape_html(&run.time_started),
            escape_html(&run.total_time),
            escape_html(&run.distance),
            escape_html(&run.avg_pace),
            escape_html(&run.elevation_gain),
            run.effort_level,
            run.location,
        );
    }

    let _ = write!(
        body,
        r#"</tbody>
</table>
</div>
<div class="stats-container">
<div class="stats-column">
<h2>Total Run Stats</h2>
<ul>
<li>Total Distance: {total_distance} miles</li>
<li>Total Elevation Gain: {total_elevation} feet</li>
<li>Total Time: {total_time}</li>
</ul>
</div>
<div class="stats-column">
<h2>Average Run Stats</h2>
<ul>
<li>Average Pace: {average_pace}</li>
<li>Average Run Time: {average_run_time}</li>
<li>Average Distance: {average_distance} miles</li>
</ul>
</div>
</div>
"#,
        total_distance = stats.total_distance_display(),
        total_elevation = stats.total_elevation_display(),
        total_time = stats.total_time_display(),
        average_pace = stats.average_pace_display(),
        average_run_time = stats.average_run_time_display(),
        average_distance = stats.average_distance_display(),
    );

    let form = &page.form;
    let mut location_options = String::new();
    for location in Location::ALL {
        let selected = if form.location.eq_ignore_ascii_case(location.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            location_options,
            r#"<option value="{}"{}>{}</option>"#,
            location.as_str(),
            selected,
            location.label()
        );
    }

    let _ = write!(
        body,
        r#"<div class="add-run-container">
<h2>Add Run</h2>
<form method="post" action="/runs">
<label>Date: <input type="date" name="date" value="{date}" required></label>
<label>Start Time: <input type="time" name="time_started" value="{time_started}" required></label>
<label>Total Time: <input type="text" name="total_time" placeholder="hh:mm:ss" value="{total_time}" required></label>
<label>Distance (miles): <input type="number" name="distance" step="0.01" min="0.01" value="{distance}" required></label>
<label>Elevation Gain (ft): <input type="number" name="elevation_gain" step="0.01" min="0" value="{elevation_gain}" required></label>
<label>Location: <select name="location">{location_options}</select></label>
<label>Effort Level (1-10): <input type="number" name="effort_level" min="1" max="10" value="{effort_level}" required></label>
<button type="submit" class="add-run">Add Run</button>
</form>
</div>
"#,
        date = escape_html(&form.date),
        time_started = escape_html(&form.time_started),
        total_time = escape_html(&form.total_time),
        distance = escape_html(&form.distance),
        elevation_gain = escape_html(&form.elevation_gain),
        location_options = location_options,
        effort_level = escape_html(&form.effort_level),
    );

    if let Some(error) = &page.error {
        let _ = writeln!(body, r#"<p class="error">{}</p>"#, escape_html(error));
    }

    layout("Run Tracker", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunForm;
    use crate::test_utils::mock_run;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn test_login_page_has_no_username_field() {
        let html = render_auth_page(&AuthView::new(AuthMode::Login));
        assert!(html.contains("<h1>Log In</h1>"));
        assert!(!html.contains(r#"name="username""#));
        assert!(html.contains("Don't have an account?"));
        assert!(html.contains(r#"href="/?mode=signup""#));
    }

    #[test]
    fn test_sign_up_page_has_username_field() {
        let html = render_auth_page(&AuthView::new(AuthMode::SignUp));
        assert!(html.contains("<h1>Sign Up</h1>"));
        assert!(html.contains(r#"name="username""#));
        assert!(html.contains(r#"href="/?mode=login""#));
    }

    #[test]
    fn test_auth_page_escapes_error_and_keeps_email() {
        let view = AuthView {
            mode: AuthMode::Login,
            email: "a@b.co".into(),
            username: String::new(),
            error: Some("<bad>".into()),
            message: None,
        };
        let html = render_auth_page(&view);
        assert!(html.contains(r#"<p class="error">&lt;bad&gt;</p>"#));
        assert!(html.contains(r#"value="a@b.co""#));
    }

    #[test]
    fn test_runs_page_renders_rows_and_stats() {
        let page = RunsPage {
            runs: vec![mock_run(1, "2024-05-03", "5.0"), mock_run(2, "2024-05-01", "3.0")],
            form: RunForm::default(),
            error: None,
        };
        let html = render_runs_page(&page);
        assert!(html.contains("<td>2024-05-03</td>"));
        assert!(html.contains("Total Distance: 8.00 miles"));
        assert!(html.contains("Average Run Time: 00:30:00"));
        assert!(html.contains(r#"<option value="track" selected>Track</option>"#));
        assert!(html.find("2024-05-03").unwrap() < html.find("2024-05-01").unwrap());
    }

    #[test]
    fn test_runs_page_keeps_form_and_shows_error() {
        let page = RunsPage {
            runs: vec![],
            form: RunForm {
                distance: "4.5".into(),
                location: "trail".into(),
                ..RunForm::default()
            },
            error: Some("Failed to add run: nope".into()),
        };
        let html = render_runs_page(&page);
        assert!(html.contains(r#"value="4.5""#));
        assert!(html.contains(r#"<option value="trail" selected>Trail</option>"#));
        assert!(html.contains("Failed to add run: nope"));
        assert!(html.contains("Average Run Time: 00:00:00"));
    }
}
