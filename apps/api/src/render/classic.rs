use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::errors::AppError;
use crate::render::TemplateRenderer;

/// Default renderer: walks the structured resume document into a plain-text
/// byte stream, one section per heading. Sections absent from the content are
/// skipped entirely.
pub struct ClassicRenderer;

#[async_trait]
impl TemplateRenderer for ClassicRenderer {
    async fn render(&self, content: &Value) -> Result<Bytes, AppError> {
        Ok(Bytes::from(render_text(content).into_bytes()))
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

fn date_range(entry: &Value) -> String {
    let start = str_field(entry, "start").unwrap_or("");
    let end = str_field(entry, "end").unwrap_or("Present");
    if start.is_empty() {
        String::new()
    } else {
        format!(" ({start} - {end})")
    }
}

fn push_bullets(out: &mut String, entry: &Value) {
    if let Some(bullets) = entry.get("bullets").and_then(|v| v.as_array()) {
        for bullet in bullets.iter().filter_map(|b| b.as_str()) {
            out.push_str(&format!("  - {bullet}\n"));
        }
    }
}

pub fn render_text(content: &Value) -> String {
    let mut out = String::new();

    if let Some(personal) = content.get("personal") {
        if let Some(name) = str_field(personal, "name") {
            out.push_str(&format!("{name}\n"));
            out.push_str(&format!("{}\n\n", "=".repeat(name.len())));
        }
        for key in ["email", "phone", "location"] {
            if let Some(v) = str_field(personal, key) {
                out.push_str(&format!("{v}\n"));
            }
        }
        if let Some(summary) = str_field(personal, "summary") {
            out.push_str(&format!("\n{summary}\n"));
        }
        out.push('\n');
    }

    if let Some(entries) = content.get("experience").and_then(|v| v.as_array()) {
        if !entries.is_empty() {
            out.push_str("EXPERIENCE\n----------\n");
            for entry in entries {
                let role = str_field(entry, "role").unwrap_or("");
                let company = str_field(entry, "company").unwrap_or("");
                out.push_str(&format!("{role} at {company}{}\n", date_range(entry)));
                push_bullets(&mut out, entry);
            }
            out.push('\n');
        }
    }

    if let Some(entries) = content.get("education").and_then(|v| v.as_array()) {
        if !entries.is_empty() {
            out.push_str("EDUCATION\n---------\n");
            for entry in entries {
                let institution = str_field(entry, "institution").unwrap_or("");
                match str_field(entry, "degree") {
                    Some(degree) => out.push_str(&format!(
                        "{degree}, {institution}{}\n",
                        date_range(entry)
                    )),
                    None => out.push_str(&format!("{institution}{}\n", date_range(entry))),
                }
            }
            out.push('\n');
        }
    }

    if let Some(entries) = content.get("projects").and_then(|v| v.as_array()) {
        if !entries.is_empty() {
            out.push_str("PROJECTS\n--------\n");
            for entry in entries {
                let name = str_field(entry, "name").unwrap_or("");
                match str_field(entry, "role") {
                    Some(role) => out.push_str(&format!("{name} ({role})\n")),
                    None => out.push_str(&format!("{name}\n")),
                }
                push_bullets(&mut out, entry);
            }
            out.push('\n');
        }
    }

    if let Some(skills) = content.get("skills").and_then(|v| v.as_array()) {
        let names: Vec<&str> = skills.iter().filter_map(|s| s.as_str()).collect();
        if !names.is_empty() {
            out.push_str("SKILLS\n------\n");
            out.push_str(&names.join(", "));
            out.push('\n');
        }
    }

    out
}
