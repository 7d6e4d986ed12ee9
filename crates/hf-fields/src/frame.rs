//! Field Frames
//!
//! Frame URL composition and iframe injection into merchant containers.

use hf_dom::{Document, DomResult, NodeId};
use url::Url;

use crate::constants::{CLEAR_BOTH_STYLE, FRAME_STYLE, VERSION};
use crate::{FieldKey, HostedFieldsError};

/// URL a field frame loads: `<assets>/web/<version>/html/<page>#<channel>`
pub fn compose_url(assets_url: &str, frame_path: &str, channel_id: &str) -> Result<Url, HostedFieldsError> {
    let invalid = |source: url::ParseError| HostedFieldsError::InvalidAssetsUrl {
        url: assets_url.to_string(),
        source,
    };

    let mut base = Url::parse(assets_url).map_err(invalid)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let mut url = base
        .join(&format!("web/{}/html/{}", VERSION, frame_path))
        .map_err(invalid)?;
    url.set_fragment(Some(channel_id));
    Ok(url)
}

/// Create the (detached, source-less) iframe for `field`
pub fn create_frame(document: &mut Document, field: FieldKey) -> DomResult<NodeId> {
    let frame = document.create_element("iframe");
    let name = field.frame_name();
    for (attr, value) in [
        ("name", name.as_str()),
        ("id", name.as_str()),
        ("type", field.as_str()),
        ("title", field.label()),
        ("frameborder", "0"),
        ("allowtransparency", "true"),
        ("scrolling", "no"),
        ("style", FRAME_STYLE),
    ] {
        document.set_attribute(frame, attr, value)?;
    }
    Ok(frame)
}

/// Append `frame` and a clearing element to `container`. Returns the
/// injected nodes in insertion order.
pub fn inject_frame(document: &mut Document, frame: NodeId, container: NodeId) -> DomResult<Vec<NodeId>> {
    let clear = document.create_element("div");
    document.set_attribute(clear, "style", CLEAR_BOTH_STYLE)?;
    document.append_child(container, frame)?;
    document.append_child(container, clear)?;
    Ok(vec![frame, clear])
}
