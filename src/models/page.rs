use super::Locale;
use serde::{Deserialize, Serialize};

/// Where a migrated non-listing page is published
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Page,
    District,
}

/// Markdown page with front-matter
#[derive(Debug, Clone, PartialEq)]
pub struct PageDocument {
    pub kind: DocumentKind,
    pub title: String,
    pub locale: Locale,
    pub slug: String,
    pub images: Vec<String>,
    pub body: String,
}

impl PageDocument {
    pub fn file_name(&self) -> String {
        format!("{}.{}.md", self.slug, self.locale)
    }

    /// Render as `---` delimited front-matter followed by the body.
    /// String values are written double-quoted so titles with colons stay valid.
    pub fn render(&self) -> String {
        let mut out = String::from("---\n");
        out.push_str(&format!("title: {}\n", quoted(&self.title)));
        out.push_str(&format!("locale: {}\n", self.locale));
        out.push_str(&format!("slug: {}\n", quoted(&self.slug)));
        if self.images.is_empty() {
            out.push_str("images: []\n");
        } else {
            out.push_str("images:\n");
            for image in &self.images {
                out.push_str(&format!("  - {}\n", quoted(image)));
            }
        }
        out.push_str("---\n");

        let body = self.body.trim();
        if body.is_empty() {
            out.push_str(&format!("# {}", self.title));
        } else {
            out.push_str(body);
        }
        out.push('\n');
        out
    }
}

// JSON string escaping is a subset of YAML double-quoted scalars
fn quoted(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str, images: Vec<String>) -> PageDocument {
        PageDocument {
            kind: DocumentKind::Page,
            title: "Über uns: Team".to_string(),
            locale: Locale::De,
            slug: "uber-uns-team".to_string(),
            images,
            body: body.to_string(),
        }
    }

    #[test]
    fn renders_front_matter() {
        let rendered = doc("Hallo\n\nWelt\n", vec!["/images/archiv/1-a.jpg".to_string()]).render();
        assert_eq!(
            rendered,
            "---\ntitle: \"Über uns: Team\"\nlocale: de\nslug: \"uber-uns-team\"\nimages:\n  - \"/images/archiv/1-a.jpg\"\n---\nHallo\n\nWelt\n"
        );
    }

    #[test]
    fn empty_body_becomes_heading() {
        let rendered = doc("  \n", vec![]).render();
        assert!(rendered.contains("images: []\n"));
        assert!(rendered.ends_with("---\n# Über uns: Team\n"));
        assert_eq!(doc("", vec![]).file_name(), "uber-uns-team.de.md");
    }
}
