// src/render.rs

use crate::config::PageConfig;
use crate::snapshot::Snapshot;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{title}}</title>
<style>
  .header { display: flex; align-items: center; justify-content: center; }
  .header img { float: left; max-width: 100%; height: auto; max-height: 100px; }
  .header h1 { text-align: center; margin: 0 auto; font-size: 3vw; }
  #data-table { height: auto; width: 60%; margin: auto; border-collapse: collapse; }
  #data-table th, #data-table td { text-align: center; font-size: 16px; padding: 6px; color: white; }
  #data-table th { background-color: #4F5D75; }
  #data-table td { background-color: #2B3B4B; }
</style>
</head>
<body>
<div class="header">
  <img src="{{logo_url}}" alt="logo">
  <h1>{{title}}</h1>
</div>
{{table}}
<script>
(function () {
  var intervalMs = {{interval_ms}};
  function render(rows) {
    var body = document.querySelector('#data-table tbody');
    while (body.firstChild) { body.removeChild(body.firstChild); }
    rows.forEach(function (row) {
      var tr = document.createElement('tr');
      [row.Attribute, row.Value].forEach(function (text) {
        var td = document.createElement('td');
        td.textContent = text;
        tr.appendChild(td);
      });
      body.appendChild(tr);
    });
  }
  function poll() {
    fetch('/api/snapshot')
      .then(function (resp) { return resp.ok ? resp.json() : null; })
      .then(function (payload) { if (payload) { render(payload.data); } })
      .catch(function () {});
  }
  setInterval(poll, intervalMs);
})();
</script>
</body>
</html>
"#;

/// Two-column table, one row per record, in snapshot order.
pub fn render_table(snapshot: Option<&Snapshot>) -> String {
    let mut html = String::from(
        "<table id=\"data-table\">\n<thead><tr><th>Attribute</th><th>Value</th></tr></thead>\n<tbody>\n",
    );
    for record in snapshot.map(Snapshot::records).unwrap_or_default() {
        html.push_str("<tr><td>");
        html.push_str(&escape_html(&record.attribute));
        html.push_str("</td><td>");
        html.push_str(&escape_html(&record.value));
        html.push_str("</td></tr>\n");
    }
    html.push_str("</tbody>\n</table>");
    html
}

/// The whole dashboard document. The embedded script re-polls the snapshot
/// endpoint every `refresh_interval_ms` and redraws the table body.
pub fn render_page(page: &PageConfig, snapshot: Option<&Snapshot>, refresh_interval_ms: u64) -> String {
    fill_template(PAGE_TEMPLATE, |key| match key {
        "title" => Some(escape_html(&page.title)),
        "logo_url" => Some(escape_html(&page.logo_url)),
        "interval_ms" => Some(refresh_interval_ms.to_string()),
        "table" => Some(render_table(snapshot)),
        _ => None,
    })
}

/// Substitute `{{key}}` placeholders in one pass over `template`, so inserted
/// text is never scanned for placeholders again. Unknown keys stay as written.
fn fill_template(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open + 2..].find("}}") else {
            break;
        };
        let key = &rest[open + 2..open + 2 + close];
        out.push_str(&rest[..open]);
        match lookup(key) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &rest[open + 2 + close + 2..];
    }
    out.push_str(rest);
    out
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
