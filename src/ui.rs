use crate::state::{LinkView, SelectionView, Snapshot};
use crate::view::View;
use reqwest::Url;

pub fn render_page(snapshot: &Snapshot) -> String {
    let (title, body) = match snapshot.view {
        View::Login => ("Linker", render_login(snapshot)),
        View::Register => ("Join Linker", render_register(snapshot)),
        View::Dashboard => ("Linker Dashboard", render_dashboard(snapshot)),
    };

    PAGE_HTML
        .replace("{{TITLE}}", title)
        .replace("{{VIEW}}", snapshot.view.as_str())
        .replace("{{BODY}}", &body)
}

fn render_login(snapshot: &Snapshot) -> String {
    LOGIN_HTML
        .replace("{{ERROR}}", &error_text(snapshot.errors.login.as_deref()))
        .replace(
            "{{SUBMIT}}",
            &submit_button("Login", "Logging in…", snapshot.loading.login),
        )
}

fn render_register(snapshot: &Snapshot) -> String {
    REGISTER_HTML
        .replace("{{ERROR}}", &error_text(snapshot.errors.register.as_deref()))
        .replace(
            "{{SUBMIT}}",
            &submit_button("Register", "Registering…", snapshot.loading.register),
        )
}

fn render_dashboard(snapshot: &Snapshot) -> String {
    let user = snapshot
        .user
        .as_ref()
        .map(|user| escape(user.display_name()))
        .unwrap_or_default();

    let notice = snapshot
        .notice
        .as_deref()
        .map(|notice| format!(r#"<p class="notice">{}</p>"#, escape(notice)))
        .unwrap_or_default();

    let links = if snapshot.links.is_empty() {
        r#"<li class="empty">No links yet. Create your first shortened link above!</li>"#.to_string()
    } else {
        snapshot.links.iter().map(render_link).collect()
    };

    let more = if snapshot.has_more && !snapshot.links.is_empty() {
        format!(
            r#"<form method="post" action="/links/more"><button class="secondary" type="submit"{}>Load more</button></form>"#,
            disabled(snapshot.loading.link_list)
        )
    } else {
        String::new()
    };

    let stats = snapshot
        .selected
        .as_ref()
        .map(render_stats)
        .unwrap_or_default();

    DASHBOARD_HTML
        .replace("{{USER}}", &user)
        .replace("{{NOTICE}}", &notice)
        .replace("{{DRAFT}}", &escape(&snapshot.draft_url))
        .replace(
            "{{CREATE_ERROR}}",
            &error_text(snapshot.errors.create_link.as_deref()),
        )
        .replace(
            "{{CREATE_SUBMIT}}",
            &submit_button("Shorten", "Shortening…", snapshot.loading.create_link),
        )
        .replace("{{REFRESH_DISABLED}}", disabled(snapshot.loading.link_list))
        .replace("{{LINKS}}", &links)
        .replace("{{MORE}}", &more)
        .replace("{{STATS}}", &stats)
}

fn render_link(link: &LinkView) -> String {
    let follow = escape(&link_path(&link.short, "follow"));
    let target = escape(&link_path(&link.short, "target"));
    let stats = escape(&link_path(&link.short, "stats"));
    format!(
        r#"<li class="link-card">
  <div class="link-main">
    <div class="link-top">
      <a class="short" data-follow href="{follow}" target="_blank" rel="noopener noreferrer">{short_url}</a>
      <span class="clicks" data-clicks="{clicks}">&bull; {clicks} clicks</span>
    </div>
    <a class="target" href="{target}" target="_blank" rel="noopener noreferrer">{url}</a>
  </div>
  <form method="post" action="{stats}"><button class="small" type="submit">Stats</button></form>
</li>"#,
        short_url = escape(&link.short_url),
        clicks = link.displayed_redirects,
        url = escape(&link.url),
    )
}

/// `/links/{short}/{action}` with the short code encoded as one segment.
fn link_path(short: &str, action: &str) -> String {
    let Ok(mut url) = Url::parse("http://linker.local/links") else {
        return String::from("/");
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(short).push(action);
    }
    url.path().to_string()
}

fn render_stats(selected: &SelectionView) -> String {
    let body = if let Some(error) = selected.error.as_deref() {
        error_text(Some(error))
    } else {
        ["minute", "hour", "day"]
            .iter()
            .map(|interval| {
                format!(
                    r#"<div class="chart-block"><h4>Clicks by {interval}</h4><svg id="chart-{interval}" class="chart" viewBox="0 0 600 200" role="img" aria-label="Clicks by {interval}"></svg></div>"#
                )
            })
            .collect()
    };

    format!(
        r#"<section id="stats" class="section" data-loading="{loading}">
  <h2>Click statistics <span class="muted">/{short} &middot; {total} clicks</span></h2>
  {body}
</section>"#,
        loading = selected.loading,
        short = escape(&selected.short),
        total = selected.total,
    )
}

fn submit_button(label: &str, busy_label: &str, loading: bool) -> String {
    format!(
        r#"<button type="submit"{}>{}</button>"#,
        disabled(loading),
        if loading { busy_label } else { label }
    )
}

fn disabled(loading: bool) -> &'static str {
    if loading { " disabled" } else { "" }
}

fn error_text(message: Option<&str>) -> String {
    message
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default()
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    out
}

const LOGIN_HTML: &str = r#"<section class="card">
  <h1>Welcome to Linker</h1>
  {{ERROR}}
  <form class="stack" method="post" action="/login">
    <label>Username<input type="text" name="username" placeholder="Enter your username" required /></label>
    <label>Password<input type="password" name="password" placeholder="Enter your password" required /></label>
    {{SUBMIT}}
  </form>
  <form method="post" action="/view/register">
    <button class="link" type="submit">New to Linker? Register now &rsaquo;</button>
  </form>
</section>"#;

const REGISTER_HTML: &str = r#"<section class="card">
  <h1>Join Linker</h1>
  {{ERROR}}
  <form class="stack" method="post" action="/register">
    <label>Username<input type="text" name="username" placeholder="Enter username" required pattern="^[a-zA-Z0-9_]+$" minlength="3" maxlength="20" /></label>
    <p class="hint">Only letters, numbers, and underscores allowed</p>
    <label>Password<input type="password" name="password" placeholder="Enter password" required minlength="8" /></label>
    <p class="hint">Minimum 8 characters</p>
    <label>Full name <span class="muted">(optional)</span><input type="text" name="full_name" placeholder="Enter your name" /></label>
    {{SUBMIT}}
  </form>
  <form method="post" action="/view/login">
    <button class="link" type="submit">Already a Linker user? Login &rsaquo;</button>
  </form>
</section>"#;

const DASHBOARD_HTML: &str = r#"<section class="card wide">
  <header class="dash-header">
    <div>
      <h1>Linker Dashboard</h1>
      <p class="muted">Signed in as {{USER}}</p>
    </div>
    <form method="post" action="/logout"><button class="danger" type="submit">Logout</button></form>
  </header>
  {{NOTICE}}
  <section class="section">
    <h2>Create new link</h2>
    <form class="row" method="post" action="/links">
      <input type="url" name="url" value="{{DRAFT}}" placeholder="Paste your long URL here" required />
      {{CREATE_SUBMIT}}
    </form>
    {{CREATE_ERROR}}
  </section>
  <section class="section">
    <div class="section-header">
      <h2>Your links</h2>
      <form method="post" action="/links/refresh"><button class="secondary small" type="submit"{{REFRESH_DISABLED}}>Refresh</button></form>
    </div>
    <ul class="links">{{LINKS}}</ul>
    {{MORE}}
  </section>
  {{STATS}}
</section>"#;

const PAGE_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #111111;
      --card: #1a1a1a;
      --panel: #222222;
      --line: #3b3b3b;
      --muted: #8a8a8a;
      --ink: #f2f2f2;
      --accent: #7c7c7c;
      --danger: #d9534f;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 16px;
    }

    .card {
      width: min(420px, 100%);
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 12px;
      padding: 32px;
      display: grid;
      gap: 20px;
    }

    .card.wide {
      width: min(56rem, 100%);
    }

    h1 {
      margin: 0;
      font-size: 1.6rem;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.1rem;
    }

    h4 {
      margin: 0 0 8px;
      color: var(--muted);
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
    }

    input {
      width: 100%;
      padding: 10px 12px;
      border-radius: 8px;
      border: 1px solid var(--line);
      background: var(--panel);
      color: var(--ink);
      font: inherit;
    }

    button {
      padding: 10px 16px;
      border-radius: 8px;
      border: none;
      background: var(--accent);
      color: var(--ink);
      font: inherit;
      cursor: pointer;
    }

    button:disabled {
      opacity: 0.6;
      cursor: progress;
    }

    button.small {
      padding: 4px 10px;
    }

    button.secondary {
      background: var(--panel);
      border: 1px solid var(--line);
    }

    button.danger {
      background: var(--danger);
    }

    button.link {
      background: none;
      color: var(--muted);
      padding: 0;
    }

    .stack {
      display: grid;
      gap: 14px;
    }

    .row {
      display: flex;
      gap: 10px;
    }

    .hint {
      margin: -8px 0 0;
      font-size: 0.8rem;
      color: var(--muted);
    }

    .muted {
      color: var(--muted);
      font-weight: normal;
      font-size: 0.9rem;
    }

    .error {
      margin: 0;
      color: var(--danger);
      font-size: 0.9rem;
    }

    .notice {
      margin: 0;
      padding: 10px 12px;
      border-radius: 8px;
      border: 1px solid var(--danger);
      color: var(--danger);
    }

    .dash-header,
    .section-header {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
    }

    .links {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 10px;
    }

    .link-card {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
      padding: 14px 16px;
      border-radius: 8px;
      background: var(--panel);
      border: 1px solid var(--line);
    }

    .link-main {
      display: grid;
      gap: 6px;
      min-width: 0;
    }

    .link-card a {
      text-decoration: none;
      overflow-wrap: anywhere;
    }

    .link-card a.short {
      color: var(--ink);
      font-weight: 500;
    }

    .link-card a.target,
    .clicks {
      color: var(--muted);
      font-size: 0.875rem;
    }

    .empty {
      text-align: center;
      padding: 2rem 0;
      color: var(--muted);
    }

    .chart-block {
      margin-bottom: 24px;
    }

    .chart {
      width: 100%;
      height: auto;
      background: var(--panel);
      border-radius: 8px;
    }

    .chart-grid {
      stroke: var(--line);
      stroke-dasharray: 3 3;
    }

    .chart-bar {
      fill: var(--accent);
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }
  </style>
</head>
<body data-view="{{VIEW}}">
{{BODY}}
  <script>
    document.querySelectorAll('a[data-follow]').forEach((anchor) => {
      anchor.addEventListener('click', () => {
        const counter = anchor.parentElement.querySelector('.clicks');
        if (!counter) {
          return;
        }
        const next = Number(counter.dataset.clicks || 0) + 1;
        counter.dataset.clicks = String(next);
        counter.textContent = `• ${next} clicks`;
      });
    });

    const renderBars = (svg, points) => {
      if (!points.length) {
        svg.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No clicks yet</text>';
        return;
      }
      const width = 600;
      const height = 200;
      const paddingX = 40;
      const paddingY = 30;
      const top = 16;
      const max = Math.max(1, ...points.map((point) => point.clicks));
      const slot = (width - paddingX * 2) / points.length;
      const barWidth = Math.max(2, slot * 0.7);
      const scaleY = (height - top - paddingY) / max;
      const ticks = Math.min(4, max);
      let grid = '';
      for (let i = 0; i <= ticks; i += 1) {
        const value = Math.round((max * i) / ticks);
        const y = height - paddingY - value * scaleY;
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${y}" x2="${width - paddingX}" y2="${y}" />`;
        grid += `<text class="chart-label" x="${paddingX - 8}" y="${y + 4}" text-anchor="end">${value}</text>`;
      }
      const labelEvery = Math.ceil(points.length / 12);
      const bars = points
        .map((point, index) => {
          const x = paddingX + index * slot + (slot - barWidth) / 2;
          const barHeight = point.clicks * scaleY;
          const y = height - paddingY - barHeight;
          const label = index % labelEvery === 0
            ? `<text class="chart-label" x="${x + barWidth / 2}" y="${height - paddingY + 16}" text-anchor="middle">${point.date}</text>`
            : '';
          return `<rect class="chart-bar" x="${x.toFixed(2)}" y="${y.toFixed(2)}" width="${barWidth.toFixed(2)}" height="${barHeight.toFixed(2)}"><title>${point.bucket}: ${point.clicks}</title></rect>${label}`;
        })
        .join('');
      svg.innerHTML = grid + bars;
    };

    const loadStats = async () => {
      const section = document.getElementById('stats');
      if (!section) {
        return;
      }
      const res = await fetch('/api/stats');
      if (!res.ok) {
        return;
      }
      const stats = await res.json();
      if (stats.loading) {
        setTimeout(loadStats, 500);
        return;
      }
      ['minute', 'hour', 'day'].forEach((interval) => {
        const svg = document.getElementById(`chart-${interval}`);
        if (svg) {
          renderBars(svg, stats[interval].points);
        }
      });
    };

    loadStats().catch((err) => console.error('Failed to load stats', err));
  </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::state::LoadingView;
    use crate::store::FormErrors;

    fn snapshot(view: View) -> Snapshot {
        Snapshot {
            view,
            authenticated: view == View::Dashboard,
            user: None,
            links: Vec::new(),
            has_more: false,
            draft_url: String::new(),
            errors: FormErrors::default(),
            notice: None,
            loading: LoadingView {
                login: false,
                register: false,
                create_link: false,
                link_list: false,
            },
            selected: None,
        }
    }

    #[test]
    fn login_view_shows_escaped_error() {
        let mut snap = snapshot(View::Login);
        snap.errors.login = Some("<b>nope</b>".into());
        let html = render_page(&snap);
        assert!(html.contains(r#"action="/login""#));
        assert!(html.contains("&lt;b&gt;nope&lt;/b&gt;"));
        assert!(!html.contains("<b>nope</b>"));
    }

    #[test]
    fn loading_disables_submit() {
        let mut snap = snapshot(View::Register);
        snap.loading.register = true;
        let html = render_page(&snap);
        assert!(html.contains("<button type=\"submit\" disabled>Registering…</button>"));
    }

    #[test]
    fn dashboard_lists_links_with_displayed_counts() {
        let mut snap = snapshot(View::Dashboard);
        snap.user = Some(User {
            id: Some(1),
            username: "alice".into(),
            full_name: None,
        });
        snap.links.push(LinkView {
            short: "abc".into(),
            url: "https://example.com/?a=1&b=2".into(),
            short_url: "http://localhost:8000/abc".into(),
            redirects: 3,
            pending: 1,
            displayed_redirects: 4,
        });
        let html = render_page(&snap);
        assert!(html.contains("Signed in as alice"));
        assert!(html.contains("&bull; 4 clicks"));
        assert!(html.contains("https://example.com/?a=1&amp;b=2"));
        assert!(html.contains(r#"href="/links/abc/follow""#));
        assert!(html.contains(r#"action="/links/abc/stats""#));
        assert!(!html.contains("No links yet"));
    }

    #[test]
    fn link_paths_encode_the_short_code() {
        assert_eq!(link_path("a/b", "follow"), "/links/a%2Fb/follow");
        assert_eq!(link_path("x?y#z", "stats"), "/links/x%3Fy%23z/stats");
    }

    #[test]
    fn empty_dashboard_has_placeholder_and_no_stats() {
        let html = render_page(&snapshot(View::Dashboard));
        assert!(html.contains("No links yet"));
        assert!(!html.contains(r#"id="stats""#));
    }

    #[test]
    fn stats_section_has_three_charts() {
        let mut snap = snapshot(View::Dashboard);
        snap.selected = Some(SelectionView {
            short: "abc".into(),
            loading: false,
            error: None,
            total: 3,
        });
        let html = render_page(&snap);
        for interval in ["minute", "hour", "day"] {
            assert!(html.contains(&format!(r#"id="chart-{interval}""#)));
        }
    }
}
