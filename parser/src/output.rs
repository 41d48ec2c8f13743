//! Output formatting for parsed help documents.

use crate::HelpDocument;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Summary,
}

/// Formats a document in the requested output format.
pub fn format_document(document: &HelpDocument, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(document)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(document).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Summary => Ok(document_to_summary(document)),
    }
}

fn document_to_summary(document: &HelpDocument) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Members: {}  Options: {}  Arguments: {}\n",
        document.members.len(),
        document.options().len(),
        document.positionals().len()
    ));

    if document.members.is_empty() {
        return out;
    }

    let rows: Vec<[String; 5]> = document
        .members
        .iter()
        .map(|member| {
            let source = if member.is_option() {
                member.flags().join(", ")
            } else {
                let indices: Vec<String> = member
                    .arguments
                    .iter()
                    .filter_map(|arg| arg.index.map(|i| format!("#{i}")))
                    .collect();
                indices.join(", ")
            };
            [
                member.name.clone(),
                member.kind.to_string(),
                member.value_type.to_string(),
                member.count.to_string(),
                source,
            ]
        })
        .collect();

    let mut widths = [4, 4, 4, 5, 0];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    out.push('\n');
    out.push_str(&format!(
        "  {:<w0$}  {:<w1$}  {:<w2$}  {:<w3$}  Source\n",
        "Name",
        "Kind",
        "Type",
        "Count",
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
        w3 = widths[3],
    ));
    for [name, kind, value_type, count, source] in &rows {
        let line = format!(
            "  {:<w0$}  {:<w1$}  {:<w2$}  {:<w3$}  {source}",
            name,
            kind,
            value_type,
            count,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}
