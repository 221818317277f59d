use crate::view::daily_line;
use drips_core::TaskStore;
use drips_core::config::Palette;
use serde_json::json;

/// Condensed daily view for hosting in another page: today's list, bank size
/// and the starter-task hint.
pub fn render_embedded(store: &TaskStore, palette: &Palette) -> String {
    let today = store.today_key();
    let daily = store.daily_tasks();
    let mut lines = vec![palette.accentize("Daily Tasks")];

    if daily.is_empty() {
        lines.push("No tasks for today".to_string());
        lines.push(palette.mutedize("Generate tasks from your bank to get started"));
    } else {
        lines.extend(daily.iter().map(|entry| daily_line(entry, &today, palette)));
    }

    lines.push(palette.mutedize(&format!("Task Bank: {} tasks", store.tasks().len())));
    if store.has_default_tasks() {
        lines.push(palette.mutedize("Starter tasks present (drips clear-defaults)"));
    }
    lines.join("\n")
}

/// Tracks the last height sent to the host and produces a resize message only
/// when the rendered height changes.
#[derive(Debug, Default)]
pub struct ResizeReporter {
    last_height: Option<usize>,
}

impl ResizeReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, rendered: &str) -> Option<String> {
        let height = rendered.lines().count();
        if self.last_height == Some(height) {
            return None;
        }
        self.last_height = Some(height);
        Some(json!({ "type": "resize", "height": height }).to_string())
    }
}

pub fn embed_code(app_url: &str) -> String {
    let base = app_url.trim().trim_end_matches('/');
    format!(
        r#"<!-- Daily Drips Embed Code -->
<iframe
  src="{base}/embedded"
  style="width: 100%; border: none; min-height: 400px;"
  id="daily-drips-frame"
  title="Daily Drips Task Manager"
  allow="clipboard-write"
></iframe>

<script>
  window.addEventListener('message', function(event) {{
    if (event.data && event.data.type === 'resize') {{
      const iframe = document.getElementById('daily-drips-frame');
      if (iframe) {{
        iframe.style.height = (event.data.height + 20) + 'px';
      }}
    }}
  }}, false);
</script>
<!-- End Daily Drips Embed Code -->"#
    )
}
