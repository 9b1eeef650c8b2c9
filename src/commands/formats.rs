use anyhow::Result;

use crate::symbology::{Family, Format};

pub fn handle() -> Result<()> {
    print!("{}", listing());
    Ok(())
}

/// Symbologies grouped by category, the way the format selector shows them.
pub fn listing() -> String {
    let mut out = String::new();
    for family in [Family::OneD, Family::TwoD] {
        out.push_str(&format!("{family}\n"));
        for format in Format::ALL.iter().filter(|f| f.family() == family) {
            out.push_str(&format!("  {:<12} {}\n", format.name(), format.label()));
        }
    }
    out
}
