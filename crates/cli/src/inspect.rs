use jarweave_core::MergeInput;
use std::path::PathBuf;
use tracing::info;

pub fn run(paths: Vec<PathBuf>, config: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config.as_ref())?;
    let merger = jarweave_runtime::build_default_merger(config)?;

    let inputs: Vec<MergeInput> = paths.into_iter().map(classify_input).collect();
    info!("Inspecting {} input(s)...", inputs.len());

    let inspection = merger.inspect(&inputs)?;
    println!("{}", serde_json::to_string_pretty(&inspection)?);
    Ok(())
}

fn classify_input(path: PathBuf) -> MergeInput {
    if path.is_dir() {
        MergeInput::Directory(path)
    } else {
        MergeInput::Archive(path)
    }
}
