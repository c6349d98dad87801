//! Markdown README generated for every uploaded project folder.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use cs_core::classify::UploadFileRole;
use cs_core::ProjectSlot;

use super::UploadedFile;

/// Uploaded files grouped by role. Later screenshots, guides and
/// assemblies replace earlier ones; parts accumulate.
#[derive(Debug, Default)]
struct FilesByRole<'a> {
    assembly: Option<&'a UploadedFile>,
    parts: Vec<&'a UploadedFile>,
    screenshot: Option<&'a UploadedFile>,
    guide: Option<&'a UploadedFile>,
}

impl<'a> FilesByRole<'a> {
    fn organize(files: &'a [UploadedFile]) -> Self {
        let mut organized = FilesByRole::default();
        for file in files {
            match file.role {
                UploadFileRole::Assembly => organized.assembly = Some(file),
                UploadFileRole::Part => organized.parts.push(file),
                UploadFileRole::Screenshot => organized.screenshot = Some(file),
                UploadFileRole::Guide => organized.guide = Some(file),
                UploadFileRole::Drawing | UploadFileRole::Other => {}
            }
        }
        organized
    }

    fn total_size(&self) -> u64 {
        self.assembly
            .iter()
            .chain(self.parts.iter())
            .chain(self.screenshot.iter())
            .chain(self.guide.iter())
            .map(|file| file.size)
            .sum()
    }
}

/// `"CW 01 - Day 06"`
pub fn project_title(slot: &ProjectSlot) -> String {
    format!("{} {:02} - Day {:02}", slot.kind.code(), slot.number, slot.day)
}

pub fn render_readme(slot: &ProjectSlot, files: &[UploadedFile], generated_at: DateTime<Utc>) -> String {
    let title = project_title(slot);
    let by_role = FilesByRole::organize(files);

    let preview = match by_role.screenshot {
        Some(shot) => format!("![{title} Preview]({})", shot.name),
        None => "*Screenshot will be available after upload*".to_string(),
    };
    let assembly_name = by_role.assembly.map(|a| a.name.as_str());

    let mut out = String::new();
    let _ = writeln!(out, "# {title}\n");
    let _ = writeln!(out, "## Project Overview\n{}\n", describe(slot, &by_role));
    let _ = writeln!(out, "## Files Included\n{}\n", file_list(&by_role));
    let _ = writeln!(out, "## Preview\n{preview}\n");
    let _ = writeln!(out, "## Download Instructions");
    let _ = writeln!(out, "1. Click on each file link above to download");
    let _ = writeln!(
        out,
        "2. Open the assembly file ({}) in SOLIDWORKS",
        assembly_name.unwrap_or("*.SLDASM")
    );
    let _ = writeln!(out, "3. Ensure all part files are in the same folder");
    let _ = writeln!(out, "4. Check assembly constraints and relations\n");
    let _ = writeln!(out, "## Project Details");
    let _ = writeln!(out, "- **Day**: {}", slot.day);
    let _ = writeln!(out, "- **Type**: {}", slot.kind.label());
    let _ = writeln!(out, "- **Project Number**: {}", slot.number);
    let _ = writeln!(out, "- **Total Parts**: {}", by_role.parts.len());
    let _ = writeln!(
        out,
        "- **Assembly File**: {}",
        assembly_name.unwrap_or("Not specified")
    );
    let _ = writeln!(out, "- **Upload Date**: {}\n", generated_at.format("%Y-%m-%d"));
    let _ = writeln!(out, "## Technical Specifications\n{}", technical_specs(&by_role));
    let _ = writeln!(out, "---");
    let _ = write!(
        out,
        "*This README was auto-generated by coursework-sync on {}*",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    out
}

fn describe(slot: &ProjectSlot, by_role: &FilesByRole<'_>) -> String {
    let subject = match by_role.parts.len() {
        0 => "a SOLIDWORKS assembly".to_string(),
        1 => "a single-part mechanical assembly".to_string(),
        n => format!("a {n}-part mechanical assembly"),
    };
    let guide = if by_role.guide.is_some() {
        ", along with a guide for better understanding"
    } else {
        ""
    };
    format!(
        "This is a {} project featuring {subject}. The project includes SOLIDWORKS files \
         with constraints, relations and technical specifications{guide}.",
        slot.kind.label()
    )
}

fn file_list(by_role: &FilesByRole<'_>) -> String {
    let mut lines = Vec::new();
    if let Some(assembly) = by_role.assembly {
        lines.push(format!("- **Assembly File**: [{0}]({0})", assembly.name));
    }
    for (index, part) in by_role.parts.iter().enumerate() {
        lines.push(format!("- **Part File {}**: [{1}]({1})", index + 1, part.name));
    }
    if let Some(shot) = by_role.screenshot {
        lines.push(format!("- **Screenshot**: [{0}]({0})", shot.name));
    }
    if let Some(guide) = by_role.guide {
        lines.push(format!("- **Guide**: [{0}]({0})", guide.name));
    }
    lines.join("\n")
}

fn technical_specs(by_role: &FilesByRole<'_>) -> String {
    let mut specs = String::new();
    if by_role.assembly.is_some() {
        specs.push_str("- **Assembly Format**: SOLIDWORKS Assembly (.SLDASM)\n");
    }
    if !by_role.parts.is_empty() {
        specs.push_str("- **Part Format**: SOLIDWORKS Part (.SLDPRT)\n");
        let _ = writeln!(specs, "- **Number of Components**: {} parts", by_role.parts.len());
    }
    if let Some(shot) = by_role.screenshot {
        let extension = shot
            .name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_uppercase())
            .unwrap_or_default();
        let _ = writeln!(specs, "- **Preview Format**: {extension} image");
    }
    specs.push_str("- **Compatibility**: SOLIDWORKS 2020 or later\n");
    let _ = writeln!(specs, "- **File Size**: {} total", format_file_size(by_role.total_size()));
    specs
}

/// Human size with base 1024, at most two decimals: `1536` is `"1.5 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
