use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use arlink_client::{PropertyChange, PropertyValue};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PropertyOutput<'a> {
    feature: &'a str,
    property: &'a str,
    value: serde_json::Value,
}

fn params_json(params: &arlink_catalog::Params) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = params
        .iter()
        .map(|(name, value)| (name.clone(), serde_json::Value::String(value.to_string())))
        .collect();
    serde_json::Value::Object(map)
}

fn value_json(value: &PropertyValue) -> serde_json::Value {
    match value {
        PropertyValue::Scalar(params) => params_json(params),
        PropertyValue::List(items) => items.iter().map(params_json).collect(),
        PropertyValue::Map(entries) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(key, params)| (key.clone(), params_json(params)))
                .collect(),
        ),
    }
}

fn value_preview(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Scalar(params) => params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(" "),
        PropertyValue::List(items) => format!("<list of {}>", items.len()),
        PropertyValue::Map(entries) => format!("<map of {}>", entries.len()),
    }
}

pub fn print_property(change: &PropertyChange, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = PropertyOutput {
                feature: change.feature,
                property: &change.property,
                value: value_json(&change.value),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FEATURE", "PROPERTY", "VALUE"])
                .add_row(vec![
                    change.feature.to_string(),
                    change.property.clone(),
                    value_preview(&change.value),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{}.{} = {}",
                change.feature,
                change.property,
                value_preview(&change.value)
            );
        }
    }
}
