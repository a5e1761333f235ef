use tracing::debug;

use crate::dom::Dom;
use crate::error::DomError;
use crate::result::{AssetSlot, RenderingResult};

use super::create_node;

/// Appends the queued assets of `result` to the document head and body.
///
/// Entries whose id is already present in the document are skipped; the
/// queues themselves are left as they are. Returns the number of injected
/// elements.
pub fn inject<D: Dom + ?Sized>(dom: &mut D, result: &RenderingResult) -> Result<usize, DomError> {
    let mut injected = 0;

    for slot in AssetSlot::ALL {
        let parent = if slot.in_head() { dom.head() } else { dom.body() };
        for asset in result.assets(slot) {
            if !asset.id.is_empty() && dom.get_element_by_id(&asset.id).is_some() {
                debug!(id = %asset.id, ?slot, "asset already in document");
                continue;
            }
            let node = create_node(dom, &slot.to_vnode(asset))?;
            dom.append_child(parent, node)?;
            injected += 1;
        }
    }

    Ok(injected)
}
