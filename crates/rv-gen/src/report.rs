use rv_macroasm::{Field, InstructionFormat};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub name: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub entries: Vec<EntryReport>,
}

impl Report {
    pub fn ok(&self) -> bool {
        self.entries.iter().all(|e| e.valid)
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| !e.valid).count()
    }

    /// `name<TAB>VALID` / `name<TAB>INVALID<TAB>reason` lines and a verdict.
    pub fn render_text(&self) -> String {
        let mut buf = String::new();
        for e in &self.entries {
            let line = match &e.error {
                None => format!("{}\tVALID\n", e.name),
                Some(msg) => format!("{}\tINVALID\t{}\n", e.name, msg),
            };
            buf.push_str(&line);
        }
        buf.push_str("-------------------------------\n");
        buf.push_str(if self.ok() { "All instructions valid\n" } else { "error\n" });
        buf
    }
}

/// Validate every format; one failure does not stop the rest.
pub fn validate_formats<'a>(
    formats: impl IntoIterator<Item = (&'a str, &'a InstructionFormat)>,
) -> Report {
    let entries = formats
        .into_iter()
        .map(|(name, format)| {
            let error = format.validate().err().map(|e| {
                warn!(format = name, error = %e, "invalid instruction format");
                e.to_string()
            });
            EntryReport {
                name: name.to_string(),
                valid: error.is_none(),
                error,
                fields: format.fields().to_vec(),
            }
        })
        .collect();
    Report { entries }
}
