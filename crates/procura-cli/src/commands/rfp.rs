use std::path::PathBuf;

use procura_core::error::ProcuraError;
use procura_core::rfp::{compose_rfps, RfpSelection};

use crate::output;

pub fn run(
    selections_file: PathBuf,
    project_name: &str,
    output_format: &str,
) -> Result<(), ProcuraError> {
    let content =
        std::fs::read_to_string(&selections_file).map_err(|e| ProcuraError::ItemsLoad {
            path: selections_file.clone(),
            reason: e.to_string(),
        })?;
    let selections: Vec<RfpSelection> =
        serde_json::from_str(&content).map_err(|e| ProcuraError::ItemsLoad {
            path: selections_file.clone(),
            reason: e.to_string(),
        })?;

    if selections.is_empty() {
        return Err(ProcuraError::Parse("no selections to compose".into()));
    }

    let rfps = compose_rfps(&selections, project_name);

    match output_format {
        "json" => output::json::print(&rfps)?,
        _ => {
            for (i, rfp) in rfps.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("To: {}", rfp.supplier_name);
                println!("Subject: {}", rfp.message.subject);
                println!();
                println!("{}", rfp.message.body);
            }
        }
    }

    Ok(())
}
