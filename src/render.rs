//! HTML rendering for the dashboard.
//!
//! Every piece of server-provided text passes through [`escape_html`] before it
//! is placed in markup.

use crate::models::{IntentTier, ScoredLead, AGE_GROUPS, FAMILY_BACKGROUNDS, LEAD_SOURCES};
use crate::page::{PageSnapshot, SubmitButton};

/// Rows for `leads-table-body` plus the placeholder visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub rows: Vec<String>,
    pub show_no_leads_message: bool,
}

pub fn escape_html(raw: &str) -> String {
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

/// Shortest decimal form: `85`, `85.5`, `NaN`.
pub fn format_score(score: f64) -> String {
    format!("{}", score)
}

pub fn create_score_badge(score: f64) -> String {
    let tier = IntentTier::from_score(score);
    format!(
        r#"<span class="score-badge {}" style="background-color: {};">{}</span>"#,
        tier.class_name(),
        tier.color(),
        format_score(score)
    )
}

pub fn render_lead_row(lead: &ScoredLead) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        escape_html(&lead.email),
        create_score_badge(lead.initial_score),
        create_score_badge(lead.reranked_score),
        escape_html(lead.comments_or_na())
    )
}

/// One row per lead, in the order given.
pub fn render_leads(leads: &[ScoredLead]) -> RenderedTable {
    RenderedTable {
        rows: leads.iter().map(render_lead_row).collect(),
        show_no_leads_message: leads.is_empty(),
    }
}

fn display(visible: bool, shown_as: &str) -> String {
    if visible {
        format!("display: {};", shown_as)
    } else {
        "display: none;".to_string()
    }
}

fn render_submit_button(button: &SubmitButton) -> String {
    format!(
        r#"<button type="submit" id="submit-btn"{}><span class="btn-text" style="{}">Score Lead</span><span class="spinner" style="{}"></span></button>"#,
        if button.disabled { " disabled" } else { "" },
        display(button.label_visible, "inline-block"),
        display(button.spinner_visible, "inline-block"),
    )
}

fn text_input(name: &str, label: &str, kind: &str, value: &str, required: bool) -> String {
    format!(
        r#"<label>{label}<input type="{kind}" name="{name}" value="{value}"{req}></label>"#,
        label = label,
        kind = kind,
        name = name,
        value = escape_html(value),
        req = if required { " required" } else { "" },
    )
}

fn select_input(name: &str, label: &str, options: &[&str], selected: &str) -> String {
    let opts: String = options
        .iter()
        .map(|opt| {
            format!(
                r#"<option value="{v}"{sel}>{v}</option>"#,
                v = escape_html(opt),
                sel = if *opt == selected { " selected" } else { "" },
            )
        })
        .collect();
    format!(
        r#"<label>{label}<select name="{name}" required><option value="">Select...</option>{opts}</select></label>"#,
        label = label,
        name = name,
        opts = opts,
    )
}

fn render_form(snapshot: &PageSnapshot) -> String {
    let value = |name: &str| snapshot.form_value(name).unwrap_or_default().to_string();
    let mut fields = Vec::new();
    fields.push(text_input("Email", "Email", "email", &value("Email"), true));
    fields.push(text_input("CreditScore", "Credit Score", "number", &value("CreditScore"), true));
    fields.push(select_input("AgeGroup", "Age Group", &AGE_GROUPS, &value("AgeGroup")));
    fields.push(select_input(
        "FamilyBackground",
        "Family Background",
        &FAMILY_BACKGROUNDS,
        &value("FamilyBackground"),
    ));
    fields.push(text_input("Income", "Income", "number", &value("Income"), true));
    fields.push(select_input("LeadSource", "Lead Source", &LEAD_SOURCES, &value("LeadSource")));
    fields.push(text_input("TimeOnPage", "Time on Page (s)", "number", &value("TimeOnPage"), true));
    fields.push(text_input("PagesVisited", "Pages Visited", "number", &value("PagesVisited"), true));
    fields.push(format!(
        r#"<label>Comments<textarea name="Comments">{}</textarea></label>"#,
        escape_html(&value("Comments"))
    ));

    format!(
        r#"<form id="lead-form" method="post" action="/leads">{}{}</form>"#,
        fields.join(""),
        render_submit_button(&snapshot.submit_button)
    )
}

/// Full dashboard document with any pending alerts.
pub fn render_page(snapshot: &PageSnapshot, alerts: &[String]) -> String {
    let alert_html: String = alerts
        .iter()
        .map(|a| format!(r#"<div class="alert" role="alert">{}</div>"#, escape_html(a)))
        .collect();
    let refreshed = snapshot
        .last_refreshed
        .map(|t| {
            format!(
                r#"<p class="meta">Last refreshed {}</p>"#,
                t.format("%Y-%m-%d %H:%M:%S UTC")
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Lead Scoring Dashboard</title>
    <style>
        body {{ font-family: system-ui, sans-serif; margin: 2rem; color: #111827; }}
        label {{ display: block; margin-bottom: 0.5rem; }}
        input, select, textarea {{ display: block; margin-top: 0.25rem; }}
        table {{ border-collapse: collapse; width: 100%; margin-top: 1rem; }}
        th, td {{ border-bottom: 1px solid #e5e7eb; padding: 0.5rem; text-align: left; }}
        .score-badge {{ color: #fff; border-radius: 9999px; padding: 0.125rem 0.5rem; font-weight: 600; }}
        .alert {{ background: #fee2e2; border: 1px solid #ef4444; padding: 0.75rem; margin-bottom: 1rem; }}
        .meta {{ color: #6b7280; font-size: 0.875rem; }}
    </style>
</head>
<body>
    <h1>Lead Scoring Dashboard</h1>
    {alerts}
    <section>
        <h2>Score a New Lead</h2>
        {form}
    </section>
    <section>
        <h2>Scored Leads</h2>
        <form method="post" action="/refresh"><button type="submit" id="refresh-leads-btn">Refresh</button></form>
        {refreshed}
        <table>
            <thead><tr><th>Email</th><th>Initial Score</th><th>Reranked Score</th><th>Comments</th></tr></thead>
            <tbody id="leads-table-body">{rows}</tbody>
        </table>
        <p id="no-leads-message" style="{no_leads}">No leads have been scored yet.</p>
    </section>
</body>
</html>
"#,
        alerts = alert_html,
        form = render_form(snapshot),
        refreshed = refreshed,
        rows = snapshot.table_rows.join(""),
        no_leads = display(snapshot.no_leads_visible, "block"),
    )
}
