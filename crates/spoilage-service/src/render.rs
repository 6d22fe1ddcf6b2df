//! HTML rendering of the dashboard page.
//!
//! The page is small enough to build with `write!`; chart data is embedded
//! as JSON and drawn client-side with Chart.js.

use std::fmt::Write;

use spoilage_types::Prediction;

use crate::view::{DashboardView, format_label};

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to format page: {0}")]
    Format(#[from] std::fmt::Error),
    #[error("Failed to encode chart data: {0}")]
    ChartData(#[from] serde_json::Error),
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 960px; color: #222; }
h1 { font-size: 1.6rem; }
.cards { display: flex; gap: 1rem; flex-wrap: wrap; }
.card { border: 1px solid #ddd; border-radius: 8px; padding: 0.8rem 1.2rem; min-width: 120px; }
.card .value { font-size: 1.4rem; font-weight: 600; }
.ok { color: #1b7f3b; }
.spoiled { color: #b3261e; }
.result { padding: 0.8rem 1.2rem; border-radius: 8px; margin: 1rem 0; font-weight: 600; }
.result.ok { background: #e6f4ea; }
.result.spoiled { background: #fce8e6; }
form { display: flex; gap: 0.5rem; flex-wrap: wrap; align-items: end; margin: 1.5rem 0; }
label { display: flex; flex-direction: column; font-size: 0.85rem; }
table { border-collapse: collapse; width: 100%; margin-top: 1.5rem; }
th, td { border-bottom: 1px solid #eee; padding: 0.4rem; text-align: right; }
th:first-child, td:first-child { text-align: left; }
"#;

fn css_class(prediction: Prediction) -> &'static str {
    match prediction {
        Prediction::Ok => "ok",
        Prediction::Spoiled => "spoiled",
    }
}

/// Render the dashboard.
///
/// `result` is the prediction just computed by a form submission, or `None`
/// for a plain page view.
pub fn render_dashboard(view: &DashboardView, result: Option<Prediction>) -> Result<String, RenderError> {
    let labels = serde_json::to_string(&view.chart.labels)?;
    let temps = serde_json::to_string(&view.chart.temps)?;
    let hums = serde_json::to_string(&view.chart.hums)?;

    let mut html = String::with_capacity(8 * 1024);

    write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Medicine Storage Monitor</title>
<style>{STYLE}</style>
<script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>
<body>
<h1>Medicine Storage Monitor</h1>
"#
    )?;

    if let Some(prediction) = result {
        writeln!(
            html,
            r#"<div class="result {}">Prediction: {}</div>"#,
            css_class(prediction),
            prediction
        )?;
    }

    write_latest(&mut html, view)?;
    write_form(&mut html)?;

    write!(
        html,
        r##"<canvas id="chart" height="110"></canvas>
<script>
new Chart(document.getElementById("chart"), {{
  type: "line",
  data: {{
    labels: {labels},
    datasets: [
      {{ label: "Temperature (°C)", data: {temps}, borderColor: "#d9480f" }},
      {{ label: "Humidity (%)", data: {hums}, borderColor: "#1971c2" }}
    ]
  }}
}});
</script>
"##
    )?;

    write_records(&mut html, view)?;

    html.push_str("</body>\n</html>\n");
    Ok(html)
}

fn write_latest(html: &mut String, view: &DashboardView) -> std::fmt::Result {
    let Some(latest) = &view.latest else {
        return writeln!(html, "<p>No readings yet.</p>");
    };

    writeln!(html, r#"<div class="cards">"#)?;
    for (name, value) in [
        ("Temperature", format!("{:.1} °C", latest.temperature)),
        ("Humidity", format!("{:.1} %", latest.humidity)),
        ("Light", format!("{:.0}", latest.light)),
        ("Gas level", format!("{:.0}", latest.gas_level)),
    ] {
        writeln!(
            html,
            r#"<div class="card"><div>{name}</div><div class="value">{value}</div></div>"#
        )?;
    }
    writeln!(
        html,
        r#"<div class="card"><div>Status</div><div class="value {}">{}</div></div>"#,
        css_class(latest.prediction),
        latest.prediction
    )?;
    writeln!(
        html,
        "</div>\n<p>Last updated {}</p>",
        format_label(latest.timestamp)
    )
}

fn write_form(html: &mut String) -> std::fmt::Result {
    writeln!(html, r#"<form method="post" action="/predict">"#)?;
    for (name, label) in [
        ("temperature", "Temperature"),
        ("humidity", "Humidity"),
        ("light", "Light"),
        ("gas_level", "Gas level"),
    ] {
        writeln!(
            html,
            r#"<label>{label}<input name="{name}" type="number" step="any" required></label>"#
        )?;
    }
    writeln!(html, r#"<button type="submit">Predict</button>"#)?;
    writeln!(html, "</form>")
}

fn write_records(html: &mut String, view: &DashboardView) -> std::fmt::Result {
    writeln!(
        html,
        "<table>\n<tr><th>Time</th><th>Temperature</th><th>Humidity</th><th>Light</th><th>Gas level</th><th>Status</th></tr>"
    )?;
    for r in &view.records {
        writeln!(
            html,
            r#"<tr><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{:.0}</td><td>{:.0}</td><td class="{}">{}</td></tr>"#,
            format_label(r.timestamp),
            r.temperature,
            r.humidity,
            r.light,
            r.gas_level,
            css_class(r.prediction),
            r.prediction
        )?;
    }
    writeln!(html, "</table>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use spoilage_store::StoredReading;
    use time::OffsetDateTime;

    fn view_with_one(prediction: Prediction) -> DashboardView {
        DashboardView::from_recent(vec![StoredReading {
            id: 1,
            temperature: 26.0,
            humidity: 55.5,
            light: 310.0,
            gas_level: 420.0,
            prediction,
            timestamp: OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        }])
    }

    #[test]
    fn test_render_empty_dashboard() {
        let html = render_dashboard(&DashboardView::default(), None).unwrap();
        assert!(html.contains("No readings yet."));
        assert!(html.contains("labels: []"));
        assert!(!html.contains("Prediction:"));
        assert!(html.contains(r#"action="/predict""#));
    }

    #[test]
    fn test_render_with_result() {
        let html = render_dashboard(&view_with_one(Prediction::Spoiled), Some(Prediction::Spoiled)).unwrap();
        assert!(html.contains(r#"<div class="result spoiled">Prediction: Spoiled</div>"#));
        assert!(html.contains("26.0 °C"));
        assert!(html.contains(r#"labels: ["2023-11-14 22:13:20"]"#));
        assert!(html.contains("data: [26.0]"));
    }

    #[test]
    fn test_render_idle_state_has_no_result_banner() {
        let html = render_dashboard(&view_with_one(Prediction::Ok), None).unwrap();
        assert!(!html.contains(r#"class="result"#));
        assert!(html.contains(r#"<td class="ok">OK</td>"#));
    }
}
