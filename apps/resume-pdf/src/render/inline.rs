//! Inline template — hand-assembled markup with one embedded stylesheet.
//!
//! `render_html` is total and deterministic: every optional field is either
//! rendered or omitted, and nothing run-dependent (dates, ids) is embedded.
//!
//! Section order is fixed: header → summary → Experience → Education → Skills → Awards.
//! A section with no renderable entries produces no block and no heading.

use async_trait::async_trait;

use crate::errors::RenderError;
use crate::models::resume::{
    non_empty, Award, Basics, EducationEntry, Profile, ResumeDocument, SkillGroup, WorkEntry,
};
use crate::render::escape::escape_html;
use crate::render::ResumeRenderer;

/// Visual separator between contact items, title parts and skill groups.
pub const SEPARATOR: &str = " · ";
/// Label substituted for a missing work end date.
pub const PRESENT: &str = "Present";

const STYLESHEET: &str = r#"
  * { margin: 0; padding: 0; box-sizing: border-box; }
  html { font-size: 11px; }
  body {
    font-family: 'Helvetica Neue', Arial, 'Hiragino Kaku Gothic ProN', 'Hiragino Sans', Meiryo, sans-serif;
    color: #1a1a1a;
    line-height: 1.45;
    padding: 0;
  }
  a { color: #1a1a1a; text-decoration: none; }
  a:hover { text-decoration: underline; }

  .header { text-align: center; margin-bottom: 14px; padding-bottom: 10px; border-bottom: 1.5px solid #1a1a1a; }
  .header h1 { font-size: 22px; font-weight: 700; letter-spacing: 0.5px; margin-bottom: 2px; }
  .header .label { font-size: 12px; color: #555; margin-bottom: 6px; }
  .header .contact { font-size: 10px; color: #444; }
  .header .contact a { color: #444; }

  .section { margin-bottom: 10px; }
  .section-title {
    font-size: 11px;
    font-weight: 700;
    text-transform: uppercase;
    letter-spacing: 1.2px;
    border-bottom: 0.75px solid #ccc;
    padding-bottom: 2px;
    margin-bottom: 6px;
    color: #1a1a1a;
  }

  .entry { margin-bottom: 8px; }
  .entry-header {
    display: flex;
    justify-content: space-between;
    align-items: baseline;
    gap: 8px;
  }
  .entry-header strong { font-size: 11px; }
  .date { font-size: 10px; color: #555; white-space: nowrap; flex-shrink: 0; }
  .muted { color: #555; }
  .summary { font-size: 10.5px; color: #333; margin: 2px 0 3px 0; }
  .lead { font-size: 10.5px; color: #333; }

  ul { margin: 2px 0 0 14px; padding: 0; }
  li { font-size: 10.5px; color: #333; margin-bottom: 1px; padding-left: 2px; }
  li::marker { color: #999; }

  .skills-line { font-size: 10.5px; color: #333; line-height: 1.6; }
  .skills-line strong { color: #1a1a1a; }
"#;

/// The canonical renderer. Never fails.
pub struct InlineRenderer;

#[async_trait]
impl ResumeRenderer for InlineRenderer {
    fn name(&self) -> &'static str {
        "inline"
    }

    async fn render(&self, doc: &ResumeDocument) -> Result<String, RenderError> {
        Ok(render_html(doc))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

/// Renders a complete, self-contained HTML document for the resume.
pub fn render_html(doc: &ResumeDocument) -> String {
    let basics = doc.basics.as_ref();
    let mut body = render_header(basics);

    if let Some(summary) = basics.and_then(|b| non_empty(&b.summary)) {
        body.push_str(&format!(
            "<div class=\"section\">\n<p class=\"summary lead\">{}</p>\n</div>\n",
            escape_html(summary)
        ));
    }

    push_section(&mut body, "Experience", render_entries(&doc.work, render_work));
    push_section(
        &mut body,
        "Education",
        render_entries(&doc.education, render_education),
    );
    push_section(&mut body, "Skills", render_skills(&doc.skills));
    push_section(&mut body, "Awards", render_entries(&doc.awards, render_award));

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>{STYLESHEET}</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

fn push_section(out: &mut String, title: &str, content: String) {
    if content.is_empty() {
        return;
    }
    out.push_str(&format!(
        "<div class=\"section\">\n<div class=\"section-title\">{title}</div>\n{content}</div>\n"
    ));
}

fn render_entries<T>(entries: &[T], render: fn(&T) -> String) -> String {
    entries.iter().map(render).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Header
// ────────────────────────────────────────────────────────────────────────────

fn render_header(basics: Option<&Basics>) -> String {
    let name = basics.and_then(|b| non_empty(&b.name)).unwrap_or_default();
    let mut out = format!(
        "<div class=\"header\">\n<h1>{}</h1>\n",
        escape_html(name)
    );

    if let Some(label) = basics.and_then(|b| non_empty(&b.label)) {
        out.push_str(&format!(
            "<div class=\"label\">{}</div>\n",
            escape_html(label)
        ));
    }

    let contact = basics.map(contact_line).unwrap_or_default();
    if !contact.is_empty() {
        out.push_str(&format!("<div class=\"contact\">{contact}</div>\n"));
    }

    out.push_str("</div>\n");
    out
}

/// Joins the present contact items (location, personal URL, profiles) with
/// [`SEPARATOR`]. Absent items leave no separator behind.
pub fn contact_line(basics: &Basics) -> String {
    let mut items: Vec<String> = Vec::new();

    if let Some(location) = &basics.location {
        if let Some(city) = non_empty(&location.city) {
            let text = match non_empty(&location.country_code) {
                Some(code) => format!("{city}, {code}"),
                None => city.to_string(),
            };
            items.push(escape_html(&text).into_owned());
        }
    }

    if let Some(url) = non_empty(&basics.url) {
        items.push(link(url, display_url(url)));
    }

    items.extend(basics.profiles.iter().filter_map(profile_item));
    items.join(SEPARATOR)
}

fn profile_item(profile: &Profile) -> Option<String> {
    match (non_empty(&profile.network), non_empty(&profile.url)) {
        (Some(network), Some(url)) => Some(link(url, network)),
        (None, Some(url)) => Some(link(url, display_url(url))),
        (Some(network), None) => Some(escape_html(network).into_owned()),
        (None, None) => None,
    }
}

fn link(href: &str, text: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        escape_html(href),
        escape_html(text)
    )
}

/// URL text shown to the reader; the link target keeps the scheme.
pub fn display_url(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

// ────────────────────────────────────────────────────────────────────────────
// Entries
// ────────────────────────────────────────────────────────────────────────────

/// `<strong>primary</strong> · <span class="muted">secondary</span>`, either half optional.
fn title_line(primary: Option<&str>, secondary: Option<&str>) -> String {
    let parts: Vec<String> = [
        primary.map(|p| format!("<strong>{}</strong>", escape_html(p))),
        secondary.map(|s| format!("<span class=\"muted\">{}</span>", escape_html(s))),
    ]
    .into_iter()
    .flatten()
    .collect();
    parts.join(SEPARATOR)
}

fn entry_header(title: &str, date: Option<&str>) -> String {
    let mut out = format!("<div class=\"entry-header\">\n<div>{title}</div>\n");
    if let Some(date) = date {
        out.push_str(&format!("<div class=\"date\">{}</div>\n", escape_html(date)));
    }
    out.push_str("</div>\n");
    out
}

fn summary_paragraph(summary: Option<&str>) -> String {
    summary
        .map(|s| format!("<p class=\"summary\">{}</p>\n", escape_html(s)))
        .unwrap_or_default()
}

/// First seven characters of an ISO date (`YYYY-MM`).
pub fn year_month(date: &str) -> &str {
    match date.char_indices().nth(7) {
        Some((idx, _)) => &date[..idx],
        None => date,
    }
}

/// `YYYY-MM – YYYY-MM`; a missing end date renders as [`PRESENT`].
/// Without a start date only the end label is shown.
pub fn date_range(start: Option<&str>, end: Option<&str>) -> String {
    let end = end.map(year_month).unwrap_or(PRESENT);
    match start {
        Some(start) => format!("{} – {}", year_month(start), end),
        None => end.to_string(),
    }
}

fn render_work(entry: &WorkEntry) -> String {
    let dates = date_range(non_empty(&entry.start_date), non_empty(&entry.end_date));
    let mut out = String::from("<div class=\"entry\">\n");
    out.push_str(&entry_header(
        &title_line(non_empty(&entry.position), non_empty(&entry.name)),
        Some(&dates),
    ));
    out.push_str(&summary_paragraph(non_empty(&entry.summary)));

    if !entry.highlights.is_empty() {
        let items: String = entry
            .highlights
            .iter()
            .map(|h| format!("<li>{}</li>", escape_html(h)))
            .collect();
        out.push_str(&format!("<ul>{items}</ul>\n"));
    }

    out.push_str("</div>\n");
    out
}

fn render_education(entry: &EducationEntry) -> String {
    let mut out = String::from("<div class=\"entry\">\n");
    out.push_str(&entry_header(
        &title_line(non_empty(&entry.institution), None),
        None,
    ));

    let degree = match (non_empty(&entry.study_type), non_empty(&entry.area)) {
        (Some(study_type), Some(area)) => Some(format!("{study_type} in {area}")),
        (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
        (None, None) => None,
    };
    out.push_str(&summary_paragraph(degree.as_deref()));

    out.push_str("</div>\n");
    out
}

fn render_award(award: &Award) -> String {
    let mut out = String::from("<div class=\"entry\">\n");
    out.push_str(&entry_header(
        &title_line(non_empty(&award.title), non_empty(&award.awarder)),
        non_empty(&award.date),
    ));
    out.push_str(&summary_paragraph(non_empty(&award.summary)));
    out.push_str("</div>\n");
    out
}

fn render_skills(groups: &[SkillGroup]) -> String {
    let line: Vec<String> = groups.iter().filter_map(skill_group).collect();
    if line.is_empty() {
        return String::new();
    }
    format!(
        "<div class=\"skills-line\">{}</div>\n",
        line.join(SEPARATOR)
    )
}

fn skill_group(group: &SkillGroup) -> Option<String> {
    let keywords = group
        .keywords
        .iter()
        .map(|k| escape_html(k))
        .collect::<Vec<_>>()
        .join(", ");

    match non_empty(&group.name) {
        Some(name) => Some(format!(
            "<span><strong>{}:</strong> {keywords}</span>",
            escape_html(name)
        )),
        None if !keywords.is_empty() => Some(format!("<span>{keywords}</span>")),
        None => None,
    }
}
