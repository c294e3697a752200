/// Single-page intake form served at `/`.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Multi-Agent Ingestion System</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
  h1 { text-align: center; color: #1f77b4; }
  .columns { display: flex; gap: 2rem; }
  .columns > section { flex: 1; }
  textarea { width: 100%; height: 200px; }
  .result { background: #f0f2f6; padding: 1rem; border-radius: 10px; margin: 1rem 0; }
  .ok { border-left: 5px solid #44ff44; background: #e6ffe6; }
  .failed { border-left: 5px solid #ff4444; background: #ffe6e6; }
  .metrics { display: flex; gap: 2rem; }
  pre { white-space: pre-wrap; word-break: break-word; }
</style>
</head>
<body>
<h1>Multi-Agent Ingestion System</h1>

<form id="intake">
  <div class="columns">
    <section>
      <h2>File Upload</h2>
      <input type="file" name="file" accept=".pdf,.json,.txt,.eml">
    </section>
    <section>
      <h2>Text Input</h2>
      <textarea name="text" placeholder="Paste email or JSON content here..."></textarea>
    </section>
  </div>
  <button type="submit">Process Input</button>
</form>

<div id="status"></div>
<div id="output"></div>

<h2>System Memory &amp; Statistics</h2>
<button id="refresh" type="button">Refresh</button>
<div class="columns">
  <section>
    <h3>Processing Statistics</h3>
    <div id="stats"></div>
  </section>
  <section>
    <h3>Recent Processing Log</h3>
    <div id="logs"></div>
  </section>
</div>

<script>
const form = document.getElementById("intake");
const status = document.getElementById("status");
const output = document.getElementById("output");
const PREVIEW_CHARS = 500;

function escapeHtml(value) {
  return String(value ?? "").replace(/[&<>"']/g, c => ({
    "&": "&amp;", "<": "&lt;", ">": "&gt;", '"': "&quot;", "'": "&#39;"
  }[c]));
}

function pretty(value) {
  return "<pre>" + escapeHtml(JSON.stringify(value, null, 2)) + "</pre>";
}

function field(label, value) {
  return "<p><b>" + label + ":</b> " + escapeHtml(value || "N/A") + "</p>";
}

function emailDetails(result) {
  return "<h4>Email Analysis</h4>" +
    field("Sender", result.sender_name) +
    field("Email", result.sender_email) +
    field("Urgency", result.urgency) +
    field("Summary", result.summary) +
    field("Action Required", result.action);
}

function jsonDetails(result) {
  let html = "<h4>JSON Validation</h4>";
  if (result.valid) {
    return html + '<p class="ok">JSON is valid and properly structured</p>' + pretty(result.data || {});
  }
  html += '<p class="failed">JSON validation failed</p>';
  const errors = Array.isArray(result.errors) ? result.errors : (result.errors ? [result.errors] : []);
  if (errors.length) {
    html += "<p><b>Validation Errors:</b></p><ul>" + errors.map(e =>
      "<li>" + escapeHtml(typeof e === "string" ? e : e.field + ": " + e.message) + "</li>"
    ).join("") + "</ul>";
  }
  if (result.data) {
    html += "<p><b>Raw Data:</b></p>" + pretty(result.data);
  }
  return html;
}

function pdfDetails(result) {
  const text = result.raw_text || "";
  return "<h4>PDF Analysis</h4>" +
    "<p><b>Text Preview (first " + PREVIEW_CHARS + " chars)</b></p>" +
    "<pre>" + escapeHtml(text.slice(0, PREVIEW_CHARS)) + "</pre>" +
    "<p><b>Total Characters:</b> " + text.length + "</p>";
}

function details(envelope) {
  const result = envelope.result || {};
  if ("error" in result) return "";
  switch (envelope.format) {
    case "EMAIL": return emailDetails(result);
    case "JSON": return jsonDetails(result);
    case "PDF": return pdfDetails(result);
    default: return "";
  }
}

function render(envelope) {
  const result = envelope.result || {};
  const failed = "error" in result;
  status.className = "result " + (failed ? "failed" : "ok");
  status.textContent = failed ? "Processing completed with errors" : "Processing completed successfully";
  output.innerHTML =
    '<div class="metrics">' +
    "<div><b>Source</b><br>" + escapeHtml(envelope.source) + "</div>" +
    "<div><b>Format</b><br>" + escapeHtml(envelope.format) + "</div>" +
    "<div><b>Intent</b><br>" + escapeHtml(envelope.intent) + "</div>" +
    "</div><h3>Detailed Results</h3>" + details(envelope) +
    (failed ? field("Error", result.error) : "") +
    "<details><summary>Raw JSON Output</summary>" + pretty(envelope) + "</details>";
}

function distribution(title, counts) {
  const rows = Object.entries(counts || {});
  if (!rows.length) return "";
  return "<p><b>" + title + ":</b></p><ul>" +
    rows.map(([label, count]) => "<li>" + escapeHtml(label) + ": " + count + "</li>").join("") +
    "</ul>";
}

async function loadStats() {
  const target = document.getElementById("stats");
  try {
    const stats = await (await fetch("/api/stats")).json();
    if (stats.error) {
      target.innerHTML = '<p class="failed">Failed to load stats: ' + escapeHtml(stats.error) + "</p>";
      return;
    }
    target.innerHTML = "<p><b>Total Processed:</b> " + (stats.total_entries || 0) + "</p>" +
      distribution("Format Distribution", stats.format_counts) +
      distribution("Intent Distribution", stats.intent_counts);
  } catch (err) {
    target.innerHTML = '<p class="failed">Statistics unavailable: ' + escapeHtml(err) + "</p>";
  }
}

async function loadLogs() {
  const target = document.getElementById("logs");
  try {
    const logs = await (await fetch("/api/logs?limit=10")).json();
    if (!logs.length) {
      target.innerHTML = "<p>No processing history available</p>";
      return;
    }
    target.innerHTML = logs.map((entry, i) =>
      "<details><summary>Entry " + (i + 1) + ": " + escapeHtml(entry.source) +
      " (" + escapeHtml(new Date(entry.timestamp).toLocaleString()) + ")</summary>" +
      field("Format", entry.format) + field("Intent", entry.intent) + field("Source", entry.source) +
      pretty(entry.payload) + "</details>"
    ).join("");
  } catch (err) {
    target.innerHTML = '<p class="failed">Unable to load processing history: ' + escapeHtml(err) + "</p>";
  }
}

function refresh() {
  loadStats();
  loadLogs();
}

form.addEventListener("submit", async (event) => {
  event.preventDefault();
  status.className = "result";
  status.textContent = "Processing your input...";
  output.innerHTML = "";
  try {
    const response = await fetch("/api/route", { method: "POST", body: new FormData(form) });
    const body = await response.json();
    if (!response.ok) {
      status.className = "result failed";
      status.textContent = body.message || "Request failed";
      return;
    }
    render(body);
    refresh();
  } catch (err) {
    status.className = "result failed";
    status.textContent = "Request failed: " + err;
  }
});

document.getElementById("refresh").addEventListener("click", refresh);
refresh();
</script>
</body>
</html>
"##;
