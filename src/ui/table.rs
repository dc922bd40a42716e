use crate::config::WiringConfig;
use crate::graph::GraphStats;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// One line of the `injector order` report
#[derive(Debug, Clone, Tabled, serde::Serialize)]
pub struct BindingRow {
    #[tabled(rename = "#")]
    pub position: usize,
    #[tabled(rename = "Binding")]
    pub name: String,
    #[tabled(rename = "Lifetime")]
    pub lifetime: String,
    #[tabled(rename = "Depends on")]
    pub depends_on: String,
}

impl BindingRow {
    /// Rows for `order`, numbered from 1, as declared in `config`
    pub fn from_order(config: &WiringConfig, order: &[&str]) -> Vec<Self> {
        let graph = config.dependency_graph();
        order
            .iter()
            .enumerate()
            .map(|(i, &name)| BindingRow {
                position: i + 1,
                name: name.to_string(),
                lifetime: config
                    .lifetime(name)
                    .map(|l| l.to_string())
                    .unwrap_or_default(),
                depends_on: graph.dependencies(name).unwrap_or(&[]).join(", "),
            })
            .collect()
    }
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: impl ToString) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &GraphStats) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Bindings", stats.bindings);
    builder.add_row("Roots", stats.roots);
    builder.add_row("Edges", stats.edges);
    builder.add_row(
        "Depth",
        stats.depth.map(|d| d.to_string()).unwrap_or_else(|| "n/a".to_string()),
    );
    builder.add_row("Missing references", stats.missing);
    builder.add_row("Cyclic bindings", stats.cyclic);
    builder.build()
}

pub fn bindings_table(rows: &[BindingRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}
