//! Embedded HTML/CSS/JS frontend for the revlens web dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies. The page only
//! draws what the API hands it; every count, list and chart series is
//! derived server-side.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>revlens Dashboard</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --positive: #10B981;
  --negative: #EF4444;
  --neutral: #6B7280;
  --doubtful: #F59E0B;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 24px; font-weight: 600; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 12px; }

/* Filter bar */
.filter-bar { display: flex; flex-wrap: wrap; gap: 8px; align-items: center; }
.filter-bar input, .filter-bar select, button {
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 6px 10px;
  font-size: 13px;
}
button { cursor: pointer; }
button:hover { border-color: var(--accent); }
button.primary { background: var(--accent); border-color: var(--accent); color: #fff; }
#filterStatus { color: var(--accent); font-size: 13px; margin-top: 8px; }

.banner { padding: 10px 14px; border-radius: 6px; margin-bottom: 16px; display: none; }
.banner.error { background: rgba(239,68,68,0.12); border: 1px solid var(--negative); }
.banner.notice { background: rgba(88,166,255,0.12); border: 1px solid var(--accent); }

/* Sentiment cards */
.sentiment-cards { display: grid; grid-template-columns: repeat(4, 1fr); gap: 12px; margin-bottom: 16px; }
.sentiment-card { cursor: pointer; text-align: center; border-top: 3px solid var(--border); }
.sentiment-card .count { font-size: 28px; font-weight: 700; }
.sentiment-card .pct { color: var(--text-muted); }
.sentiment-card.active { outline: 2px solid var(--accent); }
.sentiment-card.positive { border-top-color: var(--positive); }
.sentiment-card.negative { border-top-color: var(--negative); }
.sentiment-card.neutral { border-top-color: var(--neutral); }
.sentiment-card.doubtful { border-top-color: var(--doubtful); }

.hidden-keep { visibility: hidden; }

.dimension-buttons { display: flex; flex-wrap: wrap; gap: 8px; }
.dimension-buttons button.active { background: var(--accent); color: #fff; }
.dimension-buttons .n { color: var(--text-muted); margin-left: 4px; }
.dimension-buttons button.active .n { color: #fff; }

ul.points { margin-left: 18px; }
.themes span {
  display: inline-block;
  margin: 4px 6px 0 0;
  padding: 2px 8px;
  border-radius: 10px;
  border: 1px solid var(--border);
  font-size: 12px;
}

.charts { display: grid; grid-template-columns: 2fr 1fr; gap: 16px; }
canvas { width: 100%; }

.review { border-bottom: 1px solid var(--border); padding: 12px 0; }
.review:last-child { border-bottom: none; }
.review .meta { color: var(--text-muted); font-size: 12px; }
.review img { max-height: 80px; margin: 6px 6px 0 0; border-radius: 4px; }

#busy {
  position: fixed; inset: 0;
  background: rgba(13,17,23,0.7);
  display: none;
  align-items: center; justify-content: center;
  font-size: 16px;
}
</style>
</head>
<body>
<div id="busy">Applying filter&hellip;</div>
<div class="app">
  <header>
    <div>
      <h1>revlens</h1>
      <div class="subtitle">Total reviews: <span id="totalReviews">&mdash;</span></div>
    </div>
    <button id="clearCache">Clear cache</button>
  </header>

  <div id="errorBanner" class="banner error"></div>
  <div id="noticeBanner" class="banner notice"></div>

  <div class="card">
    <div class="filter-bar">
      <input type="date" id="startDate">
      <input type="date" id="endDate">
      <select id="preset"><option value="">Quick range&hellip;</option></select>
      <button class="primary" id="applyFilter">Apply filter</button>
      <button id="clearFilter">Clear filter</button>
    </div>
    <div id="filterStatus"></div>
  </div>

  <div class="sentiment-cards" id="sentimentCards"></div>

  <div class="card" id="overallSummary">
    <h2>Overall summary</h2>
    <ul class="points" id="overallLines"></ul>
    <div class="themes" id="topThemes"></div>
  </div>

  <div class="card">
    <h2>Dimensions</h2>
    <div class="dimension-buttons" id="dimensionButtons"></div>
  </div>

  <div class="card" id="insights">
    <h2 id="insightsTitle"></h2>
    <p id="insightsSummary"></p>
    <h3>Key insights</h3>
    <ul class="points" id="insightsKey"></ul>
    <h3>Recommendations</h3>
    <ul class="points" id="insightsRecs"></ul>
  </div>

  <div class="charts">
    <div class="card"><h2>Sentiment by dimension</h2><canvas id="barChart" width="640" height="320"></canvas></div>
    <div class="card"><h2>Sentiment distribution</h2><canvas id="pieChart" width="320" height="320"></canvas></div>
  </div>

  <div class="card">
    <h2>Reviews <span class="subtitle" id="reviewTotal"></span></h2>
    <div id="reviewList"></div>
  </div>
</div>

<script>
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body !== undefined) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const data = await res.json();
  if (!res.ok) throw new Error(data.error || res.statusText);
  return data;
}

function esc(s) {
  return String(s == null ? '' : s)
    .replace(/&/g, '&amp;').replace(/</g, '&lt;')
    .replace(/>/g, '&gt;').replace(/"/g, '&quot;');
}

function banner(id, msg) {
  const el = document.getElementById(id);
  el.textContent = msg || '';
  el.style.display = msg ? 'block' : 'none';
}

function list(id, items) {
  document.getElementById(id).innerHTML = (items || []).map(i => `<li>${esc(i)}</li>`).join('');
}

function render(view) {
  document.getElementById('totalReviews').textContent =
    view.total_reviews == null ? '—' : view.total_reviews;
  document.getElementById('filterStatus').textContent = view.status.active ? view.status.text : '';

  document.getElementById('sentimentCards').innerHTML = view.cards.map(c => `
    <div class="card sentiment-card ${c.sentiment} ${c.active ? 'active' : ''}" data-sentiment="${c.sentiment}">
      <div>${esc(c.label)}</div>
      <div class="count">${c.count}</div>
      <div class="pct">${c.percentage}%</div>
    </div>`).join('');

  const overall = document.getElementById('overallSummary');
  overall.classList.toggle('hidden-keep', !view.overall.visible);
  list('overallLines', view.overall.lines);
  document.getElementById('topThemes').innerHTML =
    view.overall.top_themes.map(([t, n]) => `<span>${esc(t)} (${n})</span>`).join('');

  document.getElementById('dimensionButtons').innerHTML = view.dimension_buttons.map(b => `
    <button class="${b.active ? 'active' : ''}" data-dimension="${esc(b.dimension)}">
      ${esc(b.label)}<span class="n">${b.count}</span>
    </button>`).join('');

  const ins = view.insights;
  document.getElementById('insights').classList.toggle('hidden-keep', !ins.visible);
  document.getElementById('insightsTitle').textContent = `${ins.dimension} · ${ins.sentiment}`;
  document.getElementById('insightsSummary').textContent = ins.summary;
  list('insightsKey', ins.key_insights);
  list('insightsRecs', ins.recommendations);

  document.getElementById('reviewTotal').textContent =
    `(${view.reviews.cards.length} of ${view.reviews.total})`;
  document.getElementById('reviewList').innerHTML = view.reviews.cards.map(r => `
    <div class="review">
      <div><strong>${esc(r.author)}</strong>
        <span class="meta">${r.rating == null ? '' : esc(r.rating) + '★ '}${esc(r.date)}</span></div>
      ${r.text ? `<p>${esc(r.text)}</p>` : ''}
      ${r.images.map(src => `<img src="${esc(src)}" alt="">`).join('')}
      ${r.key_insights.length ? `<ul class="points">${r.key_insights.map(k => `<li>${esc(k)}</li>`).join('')}</ul>` : ''}
    </div>`).join('');

  drawBar('barChart', view.bar_chart);
  drawDoughnut('pieChart', view.doughnut);
}

// Replaces whatever the canvas held before.
function resetCanvas(id) {
  const canvas = document.getElementById(id);
  const ctx = canvas.getContext('2d');
  ctx.clearRect(0, 0, canvas.width, canvas.height);
  return [canvas, ctx];
}

function drawBar(id, series) {
  const [canvas, ctx] = resetCanvas(id);
  const groups = series.labels.length;
  if (!groups) return;
  const max = Math.max(1, ...series.datasets.flatMap(d => d.data));
  const pad = 30, h = canvas.height - pad * 2;
  const groupW = (canvas.width - pad) / groups;
  const barW = groupW / (series.datasets.length + 1);
  ctx.font = '11px sans-serif';
  series.labels.forEach((label, i) => {
    series.datasets.forEach((d, j) => {
      const v = d.data[i] || 0;
      const bh = (v / max) * h;
      ctx.fillStyle = d.color;
      ctx.fillRect(pad + i * groupW + j * barW, pad + h - bh, barW - 2, bh);
    });
    ctx.fillStyle = '#8b949e';
    ctx.fillText(label, pad + i * groupW, canvas.height - 8, groupW - 4);
  });
}

function drawDoughnut(id, dist) {
  const [canvas, ctx] = resetCanvas(id);
  const total = dist.slices.reduce((s, x) => s + x.count, 0);
  if (!total) return;
  const cx = canvas.width / 2, cy = canvas.height / 2, r = Math.min(cx, cy) - 10;
  let angle = -Math.PI / 2;
  dist.slices.forEach(s => {
    const sweep = (s.count / total) * Math.PI * 2;
    ctx.beginPath();
    ctx.moveTo(cx, cy);
    ctx.arc(cx, cy, r, angle, angle + sweep);
    ctx.fillStyle = s.color;
    ctx.fill();
    angle += sweep;
  });
  ctx.beginPath();
  ctx.arc(cx, cy, r * 0.55, 0, Math.PI * 2);
  ctx.fillStyle = '#161b22';
  ctx.fill();
}

async function refresh() {
  const data = await api('GET', '/api/view');
  render(data.view);
}

async function select(body) {
  try {
    render((await api('POST', '/api/selection', body)).view);
  } catch (e) {
    banner('errorBanner', e.message);
  }
}

async function applyFilter(body) {
  banner('errorBanner', '');
  banner('noticeBanner', '');
  document.getElementById('busy').style.display = 'flex';
  try {
    const res = await api('POST', '/api/filter', body);
    if (!res.ok) banner('errorBanner', res.error);
    render(res.view);
  } catch (e) {
    banner('errorBanner', e.message);
  } finally {
    document.getElementById('busy').style.display = 'none';
  }
}

async function loadPresets() {
  const presets = await api('GET', '/api/presets');
  const sel = document.getElementById('preset');
  presets.forEach(p => {
    const opt = document.createElement('option');
    opt.value = p.id;
    opt.textContent = p.label;
    opt.dataset.start = p.start;
    opt.dataset.end = p.end;
    sel.appendChild(opt);
  });
}

document.getElementById('sentimentCards').addEventListener('click', e => {
  const card = e.target.closest('[data-sentiment]');
  if (card) select({ sentiment: card.dataset.sentiment });
});

document.getElementById('dimensionButtons').addEventListener('click', e => {
  const btn = e.target.closest('[data-dimension]');
  if (btn) select({ dimension: btn.dataset.dimension });
});

document.getElementById('preset').addEventListener('change', e => {
  const opt = e.target.selectedOptions[0];
  if (!opt || !opt.value) return;
  document.getElementById('startDate').value = opt.dataset.start;
  document.getElementById('endDate').value = opt.dataset.end;
});

document.getElementById('applyFilter').addEventListener('click', () => applyFilter({
  start: document.getElementById('startDate').value,
  end: document.getElementById('endDate').value,
}));

document.getElementById('clearFilter').addEventListener('click', async () => {
  document.getElementById('startDate').value = '';
  document.getElementById('endDate').value = '';
  document.getElementById('preset').value = '';
  banner('errorBanner', '');
  render((await api('POST', '/api/filter/clear')).view);
});

document.getElementById('clearCache').addEventListener('click', async () => {
  const res = await api('POST', '/api/cache/clear');
  banner('noticeBanner', res.notice);
});

loadPresets().then(refresh).catch(e => banner('errorBanner', e.message));
</script>
</body>
</html>
"##;
