use std::fmt::Write;

use super::snapshot::MetricsSnapshot;
use crate::html;

/// Rendered when nothing has been recorded yet.
pub const EMPTY_STATE_TEXT: &str = "No requests recorded yet.";

/// Render the human-readable dashboard for one snapshot.
///
/// Pure formatting: the snapshot was already copied out of the registry,
/// so this runs without holding any lock. `refresh_secs == 0` disables the
/// auto-refresh meta tag.
pub fn render(snapshot: &MetricsSnapshot, refresh_secs: u64) -> String {
    let mut body = String::with_capacity(4096);
    let global = &snapshot.global;

    let _ = writeln!(body, "<h1>Performance Dashboard</h1>");
    let _ = writeln!(
        body,
        "<p>Uptime: {} &middot; Total requests: {} &middot; Errors: {} &middot; \
         Average response time: {:.2} ms &middot; p95: {:.2} ms</p>",
        format_uptime(snapshot.uptime.as_secs()),
        global.total_requests,
        global.errors,
        global.average_response_time_ms(),
        global.percentiles.p95_ms,
    );

    let routes: Vec<_> = snapshot
        .busiest_first()
        .into_iter()
        .filter(|r| r.count > 0)
        .collect();

    if snapshot.is_empty() || routes.is_empty() {
        let _ = writeln!(body, "<p class=\"empty\">{EMPTY_STATE_TEXT}</p>");
    } else {
        let _ = writeln!(
            body,
            "<table>\n<thead><tr><th>Route</th><th>Requests</th><th>Errors</th>\
             <th>Avg (ms)</th><th>Min (ms)</th><th>Max (ms)</th>\
             <th>p50 (ms)</th><th>p95 (ms)</th><th>p99 (ms)</th></tr></thead>\n<tbody>"
        );
        for r in routes {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td>\
                 <td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>",
                html::escape(&r.route),
                r.count,
                r.errors,
                r.average_ms(),
                r.min_ms,
                r.max_ms,
                r.percentiles.p50_ms,
                r.percentiles.p95_ms,
                r.percentiles.p99_ms,
            );
        }
        let _ = writeln!(body, "</tbody>\n</table>");
    }

    let _ = writeln!(
        body,
        "<p><a href=\"/metrics\">JSON</a> &middot; <a href=\"/health\">Health</a></p>"
    );

    let head = if refresh_secs > 0 {
        format!("<meta http-equiv=\"refresh\" content=\"{refresh_secs}\">")
    } else {
        String::new()
    };

    html::page("Performance Dashboard", &head, &body)
}

fn format_uptime(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    format!("{h}h {m:02}m {s:02}s")
}
