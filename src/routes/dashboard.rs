use axum::{
    http::header,
    response::{Html, IntoResponse},
};

/// Single-page dashboard served at `/`. Talks to the JSON API only.
pub async fn dashboard() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "public, max-age=60")],
        Html(DASHBOARD_HTML),
    )
}

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Greenhouse Monitor</title>
    <style>
        :root {
            --bg: #f8fafc;
            --surface: #ffffff;
            --border: #e2e8f0;
            --text: #1e293b;
            --muted: #64748b;
            --accent: #15803d;
            --danger: #b91c1c;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body { font-family: system-ui, -apple-system, sans-serif; background: var(--bg); color: var(--text); min-height: 100vh; }

        .layout { display: flex; min-height: 100vh; }

        aside {
            width: 280px;
            flex-shrink: 0;
            background: var(--surface);
            border-right: 1px solid var(--border);
            padding: 1.5rem 1rem;
            display: flex;
            flex-direction: column;
            gap: 1.25rem;
        }
        aside h2 { font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.05em; color: var(--muted); margin-bottom: 0.5rem; }

        main { flex: 1; padding: 1.5rem; max-width: 1100px; }
        h1 { font-size: 1.25rem; font-weight: 600; margin-bottom: 1rem; }

        label { display: block; font-size: 0.8rem; color: var(--muted); margin-bottom: 0.25rem; }
        input, select {
            width: 100%;
            padding: 0.45rem 0.6rem;
            border: 1px solid var(--border);
            border-radius: 0.375rem;
            font-size: 0.875rem;
            background: var(--surface);
        }
        .row { display: flex; gap: 0.5rem; }
        .row > * { flex: 1; }

        button, .btn {
            padding: 0.45rem 0.9rem;
            border: 1px solid var(--accent);
            border-radius: 0.375rem;
            font-size: 0.875rem;
            background: var(--accent);
            color: white;
            cursor: pointer;
            text-decoration: none;
            display: inline-block;
        }
        button.secondary, .btn.secondary { background: var(--surface); color: var(--accent); }
        button.danger { background: var(--danger); border-color: var(--danger); }

        .tabs { display: flex; gap: 0.25rem; border-bottom: 1px solid var(--border); margin-bottom: 1rem; }
        .tab {
            padding: 0.5rem 1rem;
            border: none;
            border-bottom: 2px solid transparent;
            background: none;
            color: var(--muted);
            border-radius: 0;
        }
        .tab.active { color: var(--accent); border-bottom-color: var(--accent); }
        .panel { display: none; }
        .panel.active { display: block; }

        .card { background: var(--surface); border: 1px solid var(--border); border-radius: 0.5rem; padding: 1.25rem; margin-bottom: 1rem; }
        .form-grid { display: grid; grid-template-columns: repeat(2, 1fr); gap: 0.75rem 1rem; margin-bottom: 1rem; }

        .metrics { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; margin-bottom: 1rem; }
        .metric { background: var(--surface); border: 1px solid var(--border); border-radius: 0.5rem; padding: 1rem; }
        .metric .value { font-size: 1.5rem; font-weight: 600; }
        .metric .name { font-size: 0.8rem; color: var(--muted); }

        .chart { width: 100%; background: var(--surface); border: 1px solid var(--border); border-radius: 0.5rem; margin-bottom: 1rem; }

        table { width: 100%; border-collapse: collapse; font-size: 0.85rem; background: var(--surface); }
        th, td { padding: 0.4rem 0.6rem; border-bottom: 1px solid var(--border); text-align: right; }
        th:first-child, td:first-child, th:nth-child(2), td:nth-child(2) { text-align: left; }
        th { color: var(--muted); font-weight: 500; }

        .toolbar { display: flex; gap: 0.5rem; align-items: end; margin-bottom: 1rem; flex-wrap: wrap; }
        .muted { color: var(--muted); font-size: 0.875rem; }
        #toast {
            position: fixed;
            bottom: 1rem;
            right: 1rem;
            padding: 0.75rem 1rem;
            border-radius: 0.375rem;
            color: white;
            background: var(--accent);
            display: none;
        }
        #toast.error { background: var(--danger); }
    </style>
</head>
<body>
<div class="layout">
    <aside>
        <section>
            <h2>Greenhouse</h2>
            <select id="greenhouse"></select>
        </section>
        <section>
            <h2>Add greenhouse</h2>
            <div class="row">
                <input id="new-name" placeholder="Name">
                <button id="add-btn" style="flex:0">Add</button>
            </div>
        </section>
        <section>
            <h2>Manage</h2>
            <label for="rename">Rename selected</label>
            <div class="row" style="margin-bottom:0.5rem">
                <input id="rename" placeholder="New name">
                <button id="rename-btn" class="secondary" style="flex:0">Save</button>
            </div>
            <button id="delete-btn" class="danger">Delete greenhouse</button>
        </section>
        <section>
            <h2>Period</h2>
            <div class="row">
                <div>
                    <label for="month">Month</label>
                    <select id="month"></select>
                </div>
                <div>
                    <label for="year">Year</label>
                    <input id="year" type="number" min="2000" max="2100">
                </div>
            </div>
        </section>
    </aside>

    <main>
        <h1 id="title">Greenhouse Monitor</h1>
        <div class="tabs">
            <button class="tab active" data-panel="record">Record</button>
            <button class="tab" data-panel="charts">Visualization</button>
            <button class="tab" data-panel="history">History</button>
        </div>

        <section class="panel active" id="record">
            <div class="card">
                <form id="reading-form">
                    <div class="form-grid">
                        <div><label for="f-date">Date</label><input id="f-date" type="date" required></div>
                        <div><label for="f-time">Time</label><input id="f-time" type="time"></div>
                        <div><label for="f-tmax">Max temperature (°C)</label><input id="f-tmax" type="number" step="0.1" value="25.0" required></div>
                        <div><label for="f-tmin">Min temperature (°C)</label><input id="f-tmin" type="number" step="0.1" value="18.0" required></div>
                        <div><label for="f-hmax">Max humidity (%)</label><input id="f-hmax" type="number" step="0.1" min="0" max="100" value="80.0" required></div>
                        <div><label for="f-hmin">Min humidity (%)</label><input id="f-hmin" type="number" step="0.1" min="0" max="100" value="60.0" required></div>
                        <div><label for="f-co2">CO2 (ppm)</label><input id="f-co2" type="number" step="1" min="0" value="600"></div>
                    </div>
                    <button type="submit">Save reading</button>
                </form>
            </div>
        </section>

        <section class="panel" id="charts">
            <div class="metrics">
                <div class="metric"><div class="name">Mean temperature</div><div class="value" id="m-temp">-</div></div>
                <div class="metric"><div class="name">Mean humidity</div><div class="value" id="m-hum">-</div></div>
                <div class="metric"><div class="name">Mean CO2</div><div class="value" id="m-co2">-</div></div>
            </div>
            <p class="muted" id="no-data" style="display:none">No readings for this period.</p>
            <img class="chart" id="climogram" alt="Climogram">
            <img class="chart" id="co2" alt="CO2 chart">
        </section>

        <section class="panel" id="history">
            <div class="toolbar">
                <div>
                    <label for="delete-id">Delete reading by id</label>
                    <input id="delete-id" type="number" min="1" style="width:10rem">
                </div>
                <button id="delete-reading-btn" class="danger">Delete</button>
                <span style="flex:1"></span>
                <a class="btn secondary" id="csv-link">Download CSV</a>
                <a class="btn" id="pdf-link">Download PDF</a>
            </div>
            <table>
                <thead>
                    <tr><th>Id</th><th>Date</th><th>Time</th><th>T max</th><th>T min</th><th>H max</th><th>H min</th><th>CO2</th></tr>
                </thead>
                <tbody id="history-body"></tbody>
            </table>
        </section>
    </main>
</div>
<div id="toast"></div>

<script>
const MONTHS = ['enero', 'febrero', 'marzo', 'abril', 'mayo', 'junio', 'julio',
    'agosto', 'septiembre', 'octubre', 'noviembre', 'diciembre'];

const state = { greenhouses: [], selected: null, tab: 'record' };
const $ = id => document.getElementById(id);

async function api(url, opts = {}) {
    const res = await fetch(url, {
        headers: { 'Content-Type': 'application/json' },
        ...opts,
    });
    if (res.status === 204) return null;
    const body = await res.json().catch(() => ({}));
    if (!res.ok) throw new Error(body.error || `HTTP ${res.status}`);
    return body;
}

function toast(msg, isError = false) {
    const el = $('toast');
    el.textContent = msg;
    el.className = isError ? 'error' : '';
    el.style.display = 'block';
    clearTimeout(el._timer);
    el._timer = setTimeout(() => { el.style.display = 'none'; }, 3000);
}

function fmt(v, digits = 1, unit = '') {
    return v === null || v === undefined ? '-' : `${v.toFixed(digits)}${unit}`;
}

function periodQuery() {
    const params = new URLSearchParams({ month: $('month').value });
    if ($('year').value) params.set('year', $('year').value);
    return params.toString();
}

function ghUrl(suffix = '') {
    return `/api/greenhouses/${state.selected}${suffix}`;
}

async function loadGreenhouses(selectId) {
    state.greenhouses = await api('/api/greenhouses');
    const select = $('greenhouse');
    select.innerHTML = '';
    state.greenhouses.forEach(g => {
        const opt = document.createElement('option');
        opt.value = g.id;
        opt.textContent = g.name;
        select.appendChild(opt);
    });

    const keep = selectId ?? state.selected;
    state.selected = state.greenhouses.some(g => g.id === keep)
        ? keep
        : state.greenhouses[0]?.id ?? null;
    if (state.selected !== null) select.value = state.selected;
    refresh();
}

function refresh() {
    const g = state.greenhouses.find(g => g.id === state.selected);
    $('title').textContent = g ? g.name : 'Add a greenhouse to get started';
    if (!g) return;
    if (state.tab === 'charts') loadCharts();
    if (state.tab === 'history') loadHistory();
}

async function loadCharts() {
    const q = periodQuery();
    try {
        const daily = await api(`${ghUrl('/daily')}?${q}`);
        $('m-temp').textContent = fmt(daily.summary.avg_temp, 1, ' °C');
        $('m-hum').textContent = fmt(daily.summary.avg_humidity, 1, ' %');
        $('m-co2').textContent = fmt(daily.summary.avg_co2, 0, ' ppm');
        const empty = daily.days.length === 0;
        $('no-data').style.display = empty ? 'block' : 'none';
        $('climogram').style.display = empty ? 'none' : 'block';
        $('co2').style.display = empty ? 'none' : 'block';
        if (!empty) {
            $('climogram').src = `${ghUrl('/charts/climogram.svg')}?${q}`;
            $('co2').src = `${ghUrl('/charts/co2.svg')}?${q}`;
        }
    } catch (e) {
        toast(e.message, true);
    }
}

async function loadHistory() {
    const q = periodQuery();
    $('csv-link').href = `${ghUrl('/readings')}?${q}&format=csv`;
    $('pdf-link').href = `${ghUrl('/report.pdf')}?${q}`;
    try {
        const rows = await api(`${ghUrl('/readings')}?${q}`);
        const body = $('history-body');
        body.innerHTML = '';
        if (!rows.length) {
            body.innerHTML = '<tr><td colspan="8" class="muted">No readings for this period.</td></tr>';
            return;
        }
        rows.forEach(r => {
            const tr = document.createElement('tr');
            [r.id, r.date, r.time ?? '', fmt(r.temp_max), fmt(r.temp_min),
             fmt(r.humidity_max), fmt(r.humidity_min), fmt(r.co2, 0)]
                .forEach(v => {
                    const td = document.createElement('td');
                    td.textContent = v;
                    tr.appendChild(td);
                });
            body.appendChild(tr);
        });
    } catch (e) {
        toast(e.message, true);
    }
}

// YYYY-MM-DD in the browser's time zone
function localDate(d) {
    const pad = n => String(n).padStart(2, '0');
    return `${d.getFullYear()}-${pad(d.getMonth() + 1)}-${pad(d.getDate())}`;
}

function initPeriod() {
    const month = $('month');
    month.innerHTML = '<option value="todos">Todos</option>' +
        MONTHS.map((m, i) => `<option value="${i + 1}">${m[0].toUpperCase()}${m.slice(1)}</option>`).join('');
    const now = new Date();
    month.value = 'todos';
    $('year').value = now.getFullYear();
    $('f-date').value = localDate(now);
    month.addEventListener('change', refresh);
    $('year').addEventListener('change', refresh);
}

document.querySelectorAll('.tab').forEach(tab => {
    tab.addEventListener('click', () => {
        document.querySelectorAll('.tab').forEach(t => t.classList.toggle('active', t === tab));
        document.querySelectorAll('.panel').forEach(p => p.classList.toggle('active', p.id === tab.dataset.panel));
        state.tab = tab.dataset.panel;
        refresh();
    });
});

$('greenhouse').addEventListener('change', e => {
    state.selected = Number(e.target.value);
    refresh();
});

$('add-btn').addEventListener('click', async () => {
    const name = $('new-name').value.trim();
    if (!name) return;
    try {
        const g = await api('/api/greenhouses', { method: 'POST', body: JSON.stringify({ name }) });
        $('new-name').value = '';
        toast(`Greenhouse "${g.name}" added`);
        await loadGreenhouses(g.id);
    } catch (e) {
        toast(e.message, true);
    }
});

$('rename-btn').addEventListener('click', async () => {
    const name = $('rename').value.trim();
    if (!name || state.selected === null) return;
    try {
        await api(ghUrl(), { method: 'PATCH', body: JSON.stringify({ name }) });
        $('rename').value = '';
        toast('Greenhouse renamed');
        await loadGreenhouses();
    } catch (e) {
        toast(e.message, true);
    }
});

$('delete-btn').addEventListener('click', async () => {
    const g = state.greenhouses.find(g => g.id === state.selected);
    if (!g || !confirm(`Delete "${g.name}" and all of its readings?`)) return;
    try {
        await api(ghUrl(), { method: 'DELETE' });
        toast('Greenhouse deleted');
        await loadGreenhouses();
    } catch (e) {
        toast(e.message, true);
    }
});

$('reading-form').addEventListener('submit', async e => {
    e.preventDefault();
    if (state.selected === null) return toast('Select a greenhouse first', true);
    const num = id => Number($(id).value);
    const body = {
        date: $('f-date').value,
        time: $('f-time').value || null,
        temp_max: num('f-tmax'),
        temp_min: num('f-tmin'),
        humidity_max: num('f-hmax'),
        humidity_min: num('f-hmin'),
        co2: $('f-co2').value === '' ? null : num('f-co2'),
    };
    try {
        await api(ghUrl('/readings'), { method: 'POST', body: JSON.stringify(body) });
        toast('Reading saved');
    } catch (e) {
        toast(e.message, true);
    }
});

$('delete-reading-btn').addEventListener('click', async () => {
    const id = $('delete-id').value;
    if (!id) return;
    try {
        await api(`/api/readings/${id}`, { method: 'DELETE' });
        $('delete-id').value = '';
        toast(`Reading ${id} deleted`);
        loadHistory();
    } catch (e) {
        toast(e.message, true);
    }
});

initPeriod();
loadGreenhouses().catch(e => toast(e.message, true));
</script>
</body>
</html>
"##;
