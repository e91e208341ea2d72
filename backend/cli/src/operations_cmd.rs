//! `forumlink operations`: list the operation table.

use anyhow::Result;
use forumlink_agent::{OperationSpec, operations};
use serde_json::Value;

use crate::terminal_output::{Column, render_table};

pub fn run(json: bool) -> Result<()> {
    if json {
        let descriptors: Vec<Value> = operations().iter().map(OperationSpec::descriptor).collect();
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    let columns = [
        Column::left("Operation"),
        Column::left("Parameters"),
        Column::left("Description").max_width(60),
    ];
    let rows: Vec<Vec<String>> = operations()
        .iter()
        .map(|op| vec![op.name.to_string(), param_summary(op), op.description.to_string()])
        .collect();
    print!("{}", render_table(&columns, &rows));
    Ok(())
}

/// `per_page=10, use_cache=true, order?` style summary; required params are
/// marked with `*`.
fn param_summary(op: &OperationSpec) -> String {
    let schema = op.input_schema();
    op.params
        .iter()
        .map(|p| {
            if p.required {
                format!("{}*", p.name)
            } else if p.default.is_some() {
                let default = &schema["properties"][p.name]["default"];
                format!("{}={}", p.name, default)
            } else {
                format!("{}?", p.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
