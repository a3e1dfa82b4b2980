use super::RunSummary;

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render a self-contained HTML page with one row per check.
pub fn render_html_report(summary: &RunSummary, base_url: &str) -> String {
    let rows: String = summary
        .outcomes
        .iter()
        .map(|outcome| {
            let (class, result) = if outcome.passed() {
                ("passed", "PASSED")
            } else {
                ("failed", "FAILED")
            };
            let details = outcome
                .failure
                .as_deref()
                .map(|failure| format!("<pre>{}</pre>", escape_html(failure)))
                .unwrap_or_default();
            format!(
                r#"
            <tr class="{class}">
                <td>{suite}</td>
                <td>{name}</td>
                <td>{result}</td>
                <td>{millis} ms</td>
                <td>{details}</td>
            </tr>"#,
                suite = escape_html(outcome.suite),
                name = escape_html(&outcome.name),
                millis = outcome.elapsed.as_millis(),
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>API checks report</title>
    <style>
        body {{ font-family: sans-serif; }}
        table {{ border-collapse: collapse; width: 100%; }}
        td, th {{ border: 1px solid #ccc; padding: 4px 8px; text-align: left; vertical-align: top; }}
        tr.passed td:nth-child(3) {{ color: #1a7f37; }}
        tr.failed td:nth-child(3) {{ color: #cf222e; }}
        pre {{ white-space: pre-wrap; margin: 0; }}
    </style>
</head>
<body>
    <h1>API checks report</h1>
    <p>Target: {base_url}</p>
    <p>Started at: {started_at}</p>
    <p>{total} checks, {passed} passed, {failed} failed</p>
    <table>
        <thead>
            <tr><th>Suite</th><th>Check</th><th>Result</th><th>Duration</th><th>Details</th></tr>
        </thead>
        <tbody>{rows}
        </tbody>
    </table>
</body>
</html>
"#,
        base_url = escape_html(base_url),
        started_at = summary.started_at.to_rfc3339(),
        total = summary.outcomes.len(),
        passed = summary.passed(),
        failed = summary.failed(),
    )
}
