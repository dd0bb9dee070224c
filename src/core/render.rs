//! Transfer file rendering
//!
//! The artifact delivered to the payroll server is the RPN response as XML
//! under a `<root>` element, with the wire (camelCase) names as element names.

use crate::domain::errors::RenderError;
use crate::domain::notification::RpnResponse;
use quick_xml::se::Serializer;
use serde::Serialize;
use std::path::{Path, PathBuf};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const ROOT_ELEMENT: &str = "root";

/// Renders a response to the transfer format
pub fn render_batch(response: &RpnResponse) -> Result<String, RenderError> {
    let mut body = String::new();
    let mut serializer = Serializer::with_root(&mut body, Some(ROOT_ELEMENT))
        .map_err(|e| RenderError::Serialize(e.to_string()))?;
    serializer.indent(' ', 2);
    response
        .serialize(serializer)
        .map_err(|e| RenderError::Serialize(e.to_string()))?;

    Ok(format!("{XML_DECLARATION}{body}"))
}

/// Parses a rendered artifact back into a response
pub fn parse_rendered(xml: &str) -> Result<RpnResponse, RenderError> {
    quick_xml::de::from_str(xml).map_err(|e| RenderError::Parse(e.to_string()))
}

/// Writes a rendered artifact into `dir`, creating the directory if needed
///
/// Returns the exact path written.
pub async fn write_artifact(
    dir: &Path,
    file_name: &str,
    contents: &str,
) -> Result<PathBuf, RenderError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        RenderError::Io(format!("Failed to create {}: {}", dir.display(), e))
    })?;

    let path = dir.join(file_name);
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| RenderError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

    Ok(path)
}
