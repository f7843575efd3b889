use crate::models::ViewSnapshot;

pub fn render_index(snapshot: &ViewSnapshot) -> String {
    // `</` would end the inline script early if a participant name contained it.
    let state = serde_json::to_string(snapshot)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/");
    INDEX_HTML.replace("{{INITIAL_STATE}}", &state)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>ChatPulse</title>
  <style>
    :root {
      --primary: #1877f2;
      --primary-light: #e7f3ff;
      --secondary: #42b72a;
      --error: #f02849;
      --ink: #050505;
      --muted: #606770;
      --line: #dadde1;
      --bg: #f0f2f5;
      --card: #ffffff;
      --active: rgba(54, 162, 235, 0.7);
      --new: rgba(255, 159, 64, 0.7);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg) 0%, #ffffff 50%, var(--primary-light) 100%);
      color: var(--ink);
      font-family: "Segoe UI", -apple-system, BlinkMacSystemFont, "Helvetica Neue", sans-serif;
    }

    header {
      background: var(--card);
      border-bottom: 1px solid var(--line);
      padding: 20px 24px;
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 24px;
    }

    header h1 {
      margin: 0;
      font-size: 24px;
      color: var(--primary);
    }

    header p {
      margin: 4px 0 0;
      color: var(--muted);
      font-size: 14px;
    }

    main {
      max-width: 1400px;
      margin: 32px auto;
      padding: 0 24px;
      display: grid;
      gap: 24px;
      grid-template-columns: 1fr;
    }

    @media (min-width: 1024px) {
      main.loaded {
        grid-template-columns: 2fr 1fr;
      }
    }

    .card {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 12px;
      padding: 24px;
    }

    .card h2,
    .card h3 {
      margin: 0 0 4px;
    }

    .subtitle {
      margin: 0 0 16px;
      color: var(--muted);
      font-size: 14px;
    }

    .hidden {
      display: none !important;
    }

    .dropzone {
      border: 2px dashed var(--line);
      border-radius: 12px;
      padding: 40px 24px;
      text-align: center;
      cursor: pointer;
      transition: border-color 150ms ease, background 150ms ease;
    }

    .dropzone.dragging {
      border-color: var(--primary);
      background: var(--primary-light);
    }

    button {
      appearance: none;
      border: none;
      border-radius: 8px;
      padding: 10px 18px;
      font-size: 15px;
      font-weight: 600;
      cursor: pointer;
      background: var(--primary);
      color: white;
    }

    button.secondary {
      background: var(--secondary);
    }

    .progress {
      height: 8px;
      background: var(--line);
      border-radius: 999px;
      overflow: hidden;
      margin-top: 16px;
    }

    .progress span {
      display: block;
      height: 100%;
      width: 0;
      background: var(--primary);
      transition: width 100ms linear;
    }

    .error {
      color: var(--error);
    }

    .status {
      max-width: 1400px;
      margin: 12px auto 0;
      padding: 0 24px;
      min-height: 1.2em;
      font-size: 14px;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(2, minmax(0, 1fr));
      gap: 16px;
    }

    .stat {
      border: 1px solid var(--line);
      border-radius: 10px;
      padding: 16px;
    }

    .stat .label {
      display: block;
      font-size: 12px;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      color: var(--muted);
    }

    .stat .value {
      display: block;
      font-size: 28px;
      font-weight: 700;
      color: var(--primary);
    }

    #chart {
      width: 100%;
      height: 320px;
      display: block;
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .chart-title {
      fill: var(--ink);
      font-size: 14px;
      font-weight: 600;
    }

    .chart-grid {
      stroke: rgba(5, 5, 5, 0.08);
    }

    .contributors {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 10px;
    }

    .contributors li {
      display: flex;
      align-items: center;
      gap: 12px;
      padding: 10px 12px;
      border-radius: 8px;
      background: var(--bg);
    }

    .badge {
      font-weight: 700;
      color: var(--primary);
      min-width: 32px;
    }
  </style>
</head>
<body>
  <header>
    <div>
      <h1>ChatPulse</h1>
      <p>WhatsApp group activity at a glance</p>
    </div>
    <form id="reset-form" method="post" action="/reset">
      <button id="reset-btn" class="secondary hidden" type="submit">Upload Another File</button>
    </form>
  </header>
  <div class="status error" id="status" role="status"></div>

  <main id="layout">
    <section id="upload-card" class="card">
      <h2>Upload Chat Export</h2>
      <p class="subtitle">Analyze your WhatsApp group activity</p>
      <div id="dropzone" class="dropzone">
        <h3>Drag and drop your chat export here</h3>
        <p class="subtitle">or</p>
        <button id="browse-btn" type="button">Browse Files</button>
        <input id="file-input" type="file" accept=".txt" class="hidden" />
      </div>
    </section>

    <section id="uploading-card" class="card hidden">
      <h3>Analyzing chat data</h3>
      <p class="subtitle" id="uploading-name"></p>
      <div class="progress"><span id="progress-bar"></span></div>
    </section>

    <section id="error-card" class="card hidden">
      <h3 class="error">Upload Error</h3>
      <p id="error-message" class="subtitle"></p>
    </section>

    <section id="empty-card" class="card">
      <h3>Ready to Analyze Your Chat</h3>
      <p class="subtitle">Export a WhatsApp group chat as a .txt file and drop it above.</p>
    </section>

    <section id="dashboard-card" class="card hidden">
      <h2>Activity Dashboard</h2>
      <p class="subtitle" id="dashboard-subtitle">Last 7 Days</p>
      <svg id="chart" viewBox="0 0 640 320" role="img" aria-label="Activity chart"></svg>
    </section>

    <aside id="side-panel" class="hidden">
      <section class="card">
        <h2>Key Metrics</h2>
        <p class="subtitle">Live Statistics</p>
        <div class="stats">
          <div class="stat"><span class="label">Total Messages</span><span class="value" id="stat-total">0</span></div>
          <div class="stat"><span class="label">Active Users</span><span class="value" id="stat-active">0</span></div>
          <div class="stat"><span class="label">Peak Activity</span><span class="value" id="stat-peak">0</span></div>
          <div class="stat"><span class="label">Daily Average</span><span class="value" id="stat-average">0</span></div>
        </div>
      </section>
      <section class="card" style="margin-top: 24px;">
        <h3>Top Contributors</h3>
        <p class="subtitle">Most active members (4+ days)</p>
        <ul id="contributors" class="contributors"></ul>
      </section>
    </aside>
  </main>

  <script>
    const initialState = {{INITIAL_STATE}};

    const el = (id) => document.getElementById(id);
    const layout = el('layout');
    const dropzone = el('dropzone');
    const fileInput = el('file-input');
    const resetForm = el('reset-form');
    const statIds = {
      total_messages: 'stat-total',
      active_users: 'stat-active',
      peak_activity: 'stat-peak',
      average_daily: 'stat-average'
    };

    let pollTimer = null;
    let uploadInFlight = false;
    let animationTimers = [];

    const show = (id, visible) => el(id).classList.toggle('hidden', !visible);

    const stopAnimations = () => {
      animationTimers.forEach((timer) => clearInterval(timer));
      animationTimers = [];
    };

    const animateStat = (id, target, spec) => {
      const node = el(id);
      if (!spec) {
        node.textContent = target;
        return;
      }
      const increment = target / (spec.duration_ms / spec.tick_ms);
      let ticks = Math.floor(spec.elapsed_ms / spec.tick_ms);
      const timer = setInterval(() => {
        ticks += 1;
        const current = ticks * increment;
        if (current >= target) {
          node.textContent = target;
          clearInterval(timer);
          return;
        }
        node.textContent = Math.floor(current);
      }, spec.tick_ms);
      animationTimers.push(timer);
    };

    const escapeText = (value) =>
      String(value).replace(/[&<>"']/g, (ch) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' }[ch]));

    const renderChart = (chart) => {
      const svg = el('chart');
      const width = 640;
      const height = 320;
      const left = 40;
      const right = 16;
      const top = 64;
      const bottom = 40;
      const labels = chart.data.labels;
      const sets = chart.data.datasets;
      const values = sets.flatMap((set) => set.data);
      const max = Math.max(1, ...values);
      const plotHeight = height - top - bottom;
      const groupWidth = labels.length ? (width - left - right) / labels.length : 0;
      const barWidth = (groupWidth * 0.7) / Math.max(sets.length, 1);
      const y = (value) => top + plotHeight - (value / max) * plotHeight;

      let out = `<text class="chart-title" x="${width / 2}" y="20" text-anchor="middle">${escapeText(chart.options.plugins.title.text)}</text>`;
      sets.forEach((set, index) => {
        const x = width / 2 - 110 + index * 120;
        out += `<rect x="${x}" y="32" width="14" height="10" fill="${set.backgroundColor}" />`;
        out += `<text class="chart-label" x="${x + 20}" y="41">${escapeText(set.label)}</text>`;
      });
      for (let i = 0; i <= 4; i += 1) {
        const value = (max * i) / 4;
        const yPos = y(value);
        out += `<line class="chart-grid" x1="${left}" y1="${yPos}" x2="${width - right}" y2="${yPos}" />`;
        out += `<text class="chart-label" x="${left - 8}" y="${yPos + 4}" text-anchor="end">${Math.round(value * 10) / 10}</text>`;
      }
      labels.forEach((label, index) => {
        const groupX = left + index * groupWidth + groupWidth * 0.15;
        sets.forEach((set, setIndex) => {
          const value = set.data[index] || 0;
          const x = groupX + setIndex * barWidth;
          out += `<rect x="${x}" y="${y(value)}" width="${barWidth - 2}" height="${top + plotHeight - y(value)}" fill="${set.backgroundColor}" />`;
        });
        out += `<text class="chart-label" x="${left + index * groupWidth + groupWidth / 2}" y="${height - bottom + 18}" text-anchor="middle">${escapeText(label)}</text>`;
      });
      svg.innerHTML = out;
    };

    const renderContributors = (contributors) => {
      const list = el('contributors');
      if (!contributors.length) {
        list.innerHTML = '<li>No members were active on four or more days.</li>';
        return;
      }
      list.innerHTML = contributors
        .map((entry) => `<li><span class="badge">${escapeText(entry.badge)}</span><span>${escapeText(entry.name)}</span></li>`)
        .join('');
    };

    const render = (state) => {
      const view = state.view;
      show('upload-card', state.show_upload_area);
      show('uploading-card', view === 'uploading');
      show('error-card', view === 'error');
      show('empty-card', view === 'idle');
      show('dashboard-card', view === 'loaded');
      show('side-panel', view === 'loaded');
      el('reset-btn').classList.toggle('hidden', view !== 'loaded');
      layout.classList.toggle('loaded', view === 'loaded');
      el('browse-btn').disabled = state.loading;

      el('uploading-name').textContent = state.file_name;
      el('progress-bar').style.width = `${state.progress}%`;
      el('error-message').textContent = state.error || '';

      stopAnimations();
      if (view === 'loaded') {
        el('dashboard-subtitle').textContent = `${state.file_name} - analyzed ${state.analyzed_at || ''}`;
        renderChart(state.chart);
        renderContributors(state.contributors);
        Object.entries(statIds).forEach(([key, id]) => animateStat(id, state.summary[key], state.animation));
      }

      if (state.loading) {
        if (!pollTimer) {
          pollTimer = setInterval(refresh, 100);
        }
      } else if (pollTimer) {
        clearInterval(pollTimer);
        pollTimer = null;
      }
    };

    const setStatus = (message) => {
      el('status').textContent = message || '';
    };

    // The page's own upload request renders its answer; the poll only takes
    // over views it did not start (a reload mid-upload, a reset elsewhere).
    const refresh = async () => {
      const res = await fetch('/api/session');
      if (!res.ok) {
        return;
      }
      const state = await res.json();
      if (state.view === 'uploading') {
        el('progress-bar').style.width = `${state.progress}%`;
      } else if (!uploadInFlight) {
        render(state);
      }
    };

    const resync = async (message) => {
      uploadInFlight = false;
      setStatus(message);
      const res = await fetch('/api/session');
      if (res.ok) {
        render(await res.json());
      }
    };

    const upload = async (file, source) => {
      const body = new FormData();
      body.append('file', file);
      setStatus('');
      uploadInFlight = true;
      render({ ...initialState, view: 'uploading', loading: true, show_upload_area: false, file_name: file.name, progress: 0, error: null });
      const res = await fetch(`/api/upload?source=${source}`, { method: 'POST', body });
      if (!res.ok) {
        const message = await res.text();
        await resync(message || 'Something went wrong');
        return;
      }
      uploadInFlight = false;
      render(await res.json());
    };

    el('browse-btn').addEventListener('click', () => fileInput.click());
    dropzone.addEventListener('click', (event) => {
      if (event.target === dropzone) {
        fileInput.click();
      }
    });
    fileInput.addEventListener('change', () => {
      const file = fileInput.files && fileInput.files[0];
      if (file) {
        upload(file, 'picker').catch((err) => resync(err.message));
      }
      fileInput.value = '';
    });

    ['dragenter', 'dragover'].forEach((type) =>
      dropzone.addEventListener(type, (event) => {
        event.preventDefault();
        dropzone.classList.add('dragging');
      })
    );
    dropzone.addEventListener('dragleave', (event) => {
      event.preventDefault();
      dropzone.classList.remove('dragging');
    });
    dropzone.addEventListener('drop', (event) => {
      event.preventDefault();
      dropzone.classList.remove('dragging');
      const file = event.dataTransfer.files && event.dataTransfer.files[0];
      if (!file) {
        return;
      }
      upload(file, 'drop').catch((err) => resync(err.message));
    });

    resetForm.addEventListener('submit', async (event) => {
      event.preventDefault();
      const res = await fetch('/api/session/reset', { method: 'POST' });
      if (res.ok) {
        render(await res.json());
      }
    });

    render(initialState);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Pacing;
    use crate::session::Session;

    #[test]
    fn embeds_snapshot_as_json() {
        let session = Session::new(Pacing::Instant);
        let html = render_index(&session.snapshot());
        assert!(html.contains(r#""view":"idle""#));
        assert!(!html.contains("{{INITIAL_STATE}}"));
    }

    #[test]
    fn closing_tags_in_names_are_neutralised() {
        let mut session = Session::new(Pacing::Instant);
        let (token, _rx) = session.begin_upload("chat.txt").unwrap();
        session.complete(
            token,
            Ok(crate::models::ChatAnalysisResult {
                active_users_four_days: vec!["</script><b>".into()],
                ..Default::default()
            }),
        );
        let html = render_index(&session.snapshot());
        assert!(!html.contains("</script><b>"));
        assert!(html.contains(r"<\/script><b>"));
    }

    #[test]
    fn page_opened_mid_upload_follows_the_server_out_of_uploading() {
        let mut session = Session::new(Pacing::Instant);
        let _upload = session.begin_upload("chat.txt").unwrap();
        let html = render_index(&session.snapshot());
        assert!(html.contains(r#""view":"uploading""#));

        let poll = &html[html.find("const refresh = async").unwrap()..];
        let poll = &poll[..poll.find("};").unwrap()];
        assert!(poll.contains("fetch('/api/session')"));
        assert!(poll.contains("render(state)"));
    }

    #[test]
    fn failed_upload_requests_resync_with_the_server() {
        let html = render_index(&Session::new(Pacing::Instant).snapshot());
        let upload = &html[html.find("const upload = async").unwrap()..];
        let failure = &upload[upload.find("if (!res.ok)").unwrap()..];
        let failure = &failure[..failure.find("}").unwrap()];
        assert!(failure.contains("resync("));
        assert!(!failure.contains("view: 'error'"));
    }
}
