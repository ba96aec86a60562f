use expoquote_core::config::LoadOptions;
use expoquote_core::documents::format_brl;
use expoquote_core::{ApplicationError, Catalog};

use crate::commands::{load_config, CommandResult};

const COMMAND: &str = "catalog";

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let config = match load_config(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure(COMMAND, &error),
    };
    let catalog = match config.load_catalog() {
        Ok(catalog) => catalog,
        Err(error) => {
            return CommandResult::from_error(COMMAND, ApplicationError::Catalog(error.to_string()))
        }
    };

    if json_output {
        return CommandResult::json(COMMAND, &catalog.categories());
    }
    CommandResult::text(render_human(&catalog))
}

fn render_human(catalog: &Catalog) -> String {
    let mut lines = vec![format!(
        "catalog: {} categories, {} items",
        catalog.categories().len(),
        catalog.len()
    )];

    for category in catalog.categories() {
        lines.push(format!("{} {} ({})", category.icon, category.display_name, category.id));
        for item in &category.items {
            lines.push(format!("  - {} [{}] {}", item.name, item.id, format_brl(item.unit_price)));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use expoquote_core::Catalog;

    use super::render_human;

    #[test]
    fn human_listing_groups_items_under_categories() {
        let catalog = Catalog::from_toml_str(
            r#"
[[categories]]
id = "lighting"
display_name = "Iluminação"
icon = "💡"

[[categories.items]]
id = "spot"
name = "Spot LED"
unit_price = "850.00"
"#,
        )
        .expect("catalog");

        let output = render_human(&catalog);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "catalog: 1 categories, 1 items");
        assert_eq!(lines[1], "💡 Iluminação (lighting)");
        assert_eq!(lines[2], "  - Spot LED [spot] R$ 850,00");
    }
}
