use crate::log::LogEntry;

const TEMPLATE: &str = include_str!("../../assets/logs.html");

pub fn render(entries: &[LogEntry]) -> String {
    let rows: String = entries.iter().map(row).collect();
    TEMPLATE.replace("{{rows}}", &rows)
}

fn row(entry: &LogEntry) -> String {
    let status = match entry.status {
        None => r#"<span class="pending">pending</span>"#.to_string(),
        Some(s) if s < 400 => format!(r#"<span class="ok">{s}</span>"#),
        Some(s) => format!(r#"<span class="err">{s}</span>"#),
    };
    format!(
        "      <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        escape(&entry.method),
        escape(&entry.url),
        status,
        escape(&entry.model),
        escape(entry.ai_time.as_deref().unwrap_or("-")),
        escape(entry.file.as_deref().unwrap_or("-")),
        escape(entry.size.as_deref().unwrap_or("-")),
        escape(&entry.prompt),
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::RequestLog;

    #[test]
    fn renders_pending_and_completed_rows() {
        let log = RequestLog::new();
        let id = log.begin("POST", "/generate", "some/model", "make <a> tool");
        let html = render(&log.snapshot());
        assert!(html.contains("pending"));
        assert!(html.contains("make &lt;a&gt; tool"));

        log.fail(&id, 500);
        let html = render(&log.snapshot());
        assert!(html.contains(r#"<span class="err">500</span>"#));
        assert!(!html.contains("{{rows}}"));
    }
}
