//! Embedded HTML/CSS/JS frontend for the moodwatch dashboard.
//!
//! The whole page is compiled into the binary as a string constant. It
//! polls `/api/snapshot` and draws the series as stacked bars; the buttons
//! call the control endpoints.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>moodwatch</title>
<style>
:root {
  --bg: #111827;
  --surface: #1f2937;
  --border: #374151;
  --text: #f9fafb;
  --text-muted: #9ca3af;
  --green: #10b981;
  --red: #ef4444;
  --yellow: #f59e0b;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; }

.app { max-width: 960px; margin: 0 auto; padding: 24px; }

header { display: flex; align-items: center; justify-content: space-between; margin-bottom: 16px; }
header h1 { font-size: 22px; font-weight: 600; display: flex; align-items: center; gap: 8px; }
.dot { width: 10px; height: 10px; border-radius: 50%; background: var(--text-muted); }
.dot.live { background: var(--green); animation: pulse 1.5s infinite; }
@keyframes pulse { 50% { opacity: .3; } }

button {
  background: var(--surface); color: var(--text); border: 1px solid var(--border);
  border-radius: var(--radius); padding: 6px 14px; cursor: pointer; font-size: 13px;
}
button:hover { border-color: var(--text-muted); }

.card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 20px; }
.subtitle { color: var(--text-muted); margin-bottom: 16px; }
.error { background: rgba(239,68,68,.12); border: 1px solid var(--red); color: var(--red);
         border-radius: var(--radius); padding: 8px 12px; margin-bottom: 12px; display: none; }

.chart { display: flex; align-items: flex-end; gap: 16px; height: 240px; border-bottom: 1px solid var(--border); }
.col { flex: 1; display: flex; flex-direction: column; align-items: center; height: 100%; justify-content: flex-end; }
.stack { width: 100%; max-width: 64px; display: flex; flex-direction: column-reverse; height: 100%; }
.seg { width: 100%; }
.seg.pos { background: var(--green); }
.seg.neg { background: var(--red); }
.seg.neu { background: var(--yellow); }
.labels { display: flex; gap: 16px; margin-top: 6px; }
.labels div { flex: 1; text-align: center; color: var(--text-muted); font-size: 12px; }
.empty { color: var(--text-muted); text-align: center; padding: 80px 0; }
.legend { display: flex; gap: 16px; margin-top: 12px; color: var(--text-muted); font-size: 12px; }
.legend span::before { content: ''; display: inline-block; width: 10px; height: 10px; margin-right: 4px; border-radius: 2px; }
.legend .pos::before { background: var(--green); }
.legend .neg::before { background: var(--red); }
.legend .neu::before { background: var(--yellow); }
footer { margin-top: 12px; color: var(--text-muted); font-size: 12px; }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1><span id="dot" class="dot"></span>Customer Sentiment Analysis</h1>
    <div>
      <button id="toggle">Live</button>
      <button id="reset">Reset</button>
    </div>
  </header>
  <div class="card">
    <p id="subtitle" class="subtitle">Distribution of customer emotions across all interactions</p>
    <div id="error" class="error"></div>
    <div id="chart" class="chart"></div>
    <div id="labels" class="labels"></div>
    <div class="legend"><span class="pos">Positive</span><span class="neg">Negative</span><span class="neu">Neutral</span></div>
  </div>
  <footer id="updated">Waiting for the backend&hellip;</footer>
</div>
<script>
let live = false;

function draw(s) {
  live = s.live;
  document.getElementById('dot').className = live ? 'dot live' : 'dot';
  document.getElementById('toggle').textContent = live ? 'Pause' : 'Live';
  document.getElementById('subtitle').textContent = s.monitoring_started
    ? 'Live monitoring active - tracking customer emotions in real-time'
    : 'Distribution of customer emotions across all interactions';

  const err = document.getElementById('error');
  err.style.display = s.error ? 'block' : 'none';
  err.textContent = s.error || '';

  const chart = document.getElementById('chart');
  const labels = document.getElementById('labels');
  chart.innerHTML = '';
  labels.innerHTML = '';
  if (!s.series.length) {
    chart.innerHTML = '<div class="empty" style="flex:1">No emotion data yet.</div>';
  }
  for (const p of s.series) {
    const col = document.createElement('div');
    col.className = 'col';
    col.title = p.time + ' - positive ' + p.positive + '%, negative ' + p.negative +
      '%, neutral ' + p.neutral + '%, alerts ' + p.alerts;
    const stack = document.createElement('div');
    stack.className = 'stack';
    for (const [cls, v] of [['pos', p.positive], ['neg', p.negative], ['neu', p.neutral]]) {
      const seg = document.createElement('div');
      seg.className = 'seg ' + cls;
      seg.style.height = v + '%';
      stack.appendChild(seg);
    }
    col.appendChild(stack);
    chart.appendChild(col);
    const label = document.createElement('div');
    label.textContent = p.time;
    labels.appendChild(label);
  }

  document.getElementById('updated').textContent = s.updated_at
    ? 'Last update ' + new Date(s.updated_at).toLocaleTimeString()
    : 'No data from the backend yet';
}

async function call(method, path) {
  try {
    const r = await fetch(path, { method });
    const body = await r.json();
    draw(body.snapshot || body);
  } catch (e) {
    console.error(path, e);
  }
}

document.getElementById('toggle').onclick = () =>
  call('POST', live ? '/api/live/stop' : '/api/live/start');
document.getElementById('reset').onclick = () => call('POST', '/api/reset');

call('GET', '/api/snapshot');
setInterval(() => call('GET', '/api/snapshot'), 2000);
</script>
</body>
</html>
"##;
