use azrm::ParsedId;
use azrm::resource::ResourceDefinition;
use azrm::terraform::state::IdAudit;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use termtree::Tree;

#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "Segment")]
    label: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct AuditRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Detail")]
    detail: String,
}

/// One row per user-specified segment, headed by the ID type.
pub fn segments_table(resource_type: &str, parsed: &ParsedId) -> String {
    let rows = parsed.segments.iter().map(|(label, value)| SegmentRow {
        label: label.to_string(),
        value: value.clone(),
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{} ({})\n{}", parsed.id_type, resource_type, table)
}

pub fn audit_table(audits: &[IdAudit]) -> String {
    let rows = audits.iter().map(|audit| match &audit.outcome {
        Ok(parsed) => AuditRow {
            address: audit.address.clone(),
            status: "ok",
            detail: parsed.id_type.to_string(),
        },
        Err(err) => AuditRow {
            address: audit.address.clone(),
            status: "invalid",
            detail: err.reason().to_string(),
        },
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn registry_tree(defs: &[ResourceDefinition]) -> Tree<String> {
    let mut root = Tree::new("azrm".to_string());
    for def in defs {
        let timeouts = &def.timeouts;
        let mut node = Tree::new(def.name.to_string());
        node.push(format!("id: {}", def.template()));
        node.push(format!("api-version: {}", def.api_version));
        node.push(format!(
            "timeouts: create {}m, read {}m, update {}m, delete {}m",
            timeouts.create.as_secs() / 60,
            timeouts.read.as_secs() / 60,
            timeouts.update.as_secs() / 60,
            timeouts.delete.as_secs() / 60,
        ));
        if let Some(pointer) = def.subnet_property {
            node.push(format!("locks subnet from {}", pointer));
        }
        root.push(node);
    }
    root
}
