//! Summary command - print legend rows and the aggregate area

use anyhow::Result;
use mapsketch_core::{aggregate_area_ha, LayerStore};
use mapsketch_render::legend::legend_entries;
use mapsketch_render::label::format_hectares;
use std::fmt::Write as _;
use std::path::Path;

pub fn execute(layers: &Path) -> Result<()> {
    let store = super::load_layers(layers)?;
    print!("{}", summary_text(&store));
    Ok(())
}

/// One line per visible layer, then the total
pub fn summary_text(store: &LayerStore) -> String {
    let entries = legend_entries(store.iter());
    let width = entries.iter().map(|e| e.name.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for entry in &entries {
        let _ = writeln!(out, "{:<width$}  {}", entry.name, entry.readout(), width = width);
    }
    let _ = writeln!(out, "TOTAL AREA: {}", format_hectares(aggregate_area_ha(store.iter())));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapsketch_core::Layer;

    #[test]
    fn test_summary_lists_visible_layers_and_total() {
        let mut a = Layer::new("a", "Block A");
        a.area_override_ha = Some(1.5);
        let mut b = Layer::new("b", "Buffer");
        b.area_override_ha = Some(2.0);
        b.include_in_total = false;
        let mut c = Layer::new("c", "Hidden");
        c.visible = false;
        c.area_override_ha = Some(9.0);
        let store: LayerStore = vec![a, b, c].into_iter().collect();

        let text = summary_text(&store);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Block A"));
        assert!(lines[0].ends_with("1.50 ha"));
        assert!(lines[1].ends_with("2.00 ha (excl.)"));
        assert_eq!(lines[2], "TOTAL AREA: 1.50 ha");
    }
}
