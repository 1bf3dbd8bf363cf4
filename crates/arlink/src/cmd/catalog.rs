use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use arlink_catalog::{builtin, AckClass, EventContent, MessageKind, MessageSchema};

use crate::cmd::CatalogArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct CatalogRow<'a> {
    path: &'a str,
    feature_id: u8,
    class_id: u8,
    message_id: u16,
    kind: &'static str,
    disposition: String,
    args: Vec<&'static str>,
}

fn kind_name(schema: &MessageSchema) -> &'static str {
    match schema.kind {
        MessageKind::Command { .. } => "command",
        MessageKind::Event { .. } => "event",
    }
}

fn disposition(schema: &MessageSchema) -> String {
    match &schema.kind {
        MessageKind::Command { ack, expects } => {
            let channel = match ack {
                AckClass::NoAck => "no-ack",
                AckClass::WithAck => "with-ack",
                AckClass::HighPrio => "high-prio",
            };
            match expects {
                Some(e) => format!(
                    "{channel}, expects {}.{}.{}",
                    e.feature_id, e.class_id, e.message_id
                ),
                None => channel.to_string(),
            }
        }
        MessageKind::Event { content } => match content {
            EventContent::Plain => "plain".to_string(),
            EventContent::ListItem => "list item".to_string(),
            EventContent::MapItem(key) => format!("map item by {key}"),
        },
    }
}

pub fn run(args: CatalogArgs, format: OutputFormat) -> CliResult<i32> {
    let catalog = builtin::builtin();
    let mut schemas: Vec<_> = catalog
        .iter()
        .filter(|s| args.feature.as_deref().is_none_or(|f| s.feature == f))
        .filter(|s| match args.kind.as_deref() {
            Some("commands") => s.is_command(),
            Some("events") => !s.is_command(),
            _ => true,
        })
        .collect();
    schemas.sort_by(|a, b| a.path.cmp(&b.path));

    match format {
        OutputFormat::Json => {
            for schema in &schemas {
                let row = CatalogRow {
                    path: &schema.path,
                    feature_id: schema.feature_id,
                    class_id: schema.class_id,
                    message_id: schema.message_id,
                    kind: kind_name(schema),
                    disposition: disposition(schema),
                    args: schema.args.iter().map(|a| a.name).collect(),
                };
                println!(
                    "{}",
                    serde_json::to_string(&row).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PATH", "IDENTITY", "KIND", "DISPOSITION", "ARGS"]);
            for schema in &schemas {
                table.add_row(vec![
                    schema.path.clone(),
                    format!(
                        "{}.{}.{}",
                        schema.feature_id, schema.class_id, schema.message_id
                    ),
                    kind_name(schema).to_string(),
                    disposition(schema),
                    schema
                        .args
                        .iter()
                        .map(|a| a.name)
                        .collect::<Vec<_>>()
                        .join(", "),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for schema in &schemas {
                println!("{}  [{}]", schema.path, disposition(schema));
            }
        }
    }
    Ok(SUCCESS)
}
