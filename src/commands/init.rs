use crate::config::Config;
use crate::error::Result;
use crate::output::Format;
use crate::store::{ChatStore, DocumentKind};

pub fn run(config: &Config, format: Format) -> Result<()> {
    let store = ChatStore::open(config)?;
    match format {
        Format::Json => {
            let documents: serde_json::Map<String, serde_json::Value> = DocumentKind::ALL
                .iter()
                .map(|&kind| {
                    (
                        kind.to_string(),
                        store.document_path(kind).display().to_string().into(),
                    )
                })
                .collect();
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": store.data_dir().display().to_string(),
                    "documents": documents,
                })
            );
        }
        _ => eprintln!("Initialized chat data in {}", store.data_dir().display()),
    }
    Ok(())
}
