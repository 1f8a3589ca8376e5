use bevy::prelude::*;

use crate::engine::viewer::asset_source::LocalAssetHandle;

/// The object URL currently owned by the viewer. At most one is held.
#[derive(Resource, Default, Debug)]
pub struct LocalHandleRegistry {
    current: Option<LocalAssetHandle>,
}

impl LocalHandleRegistry {
    /// Take ownership of `handle`, revoking the one it replaces.
    pub fn replace(&mut self, handle: LocalAssetHandle) -> Option<LocalAssetHandle> {
        if self.current.as_ref() == Some(&handle) {
            return None;
        }
        let previous = self.current.replace(handle);
        if let Some(previous) = &previous {
            revoke_object_url(&previous.object_url);
        }
        previous
    }

    /// Revoke and forget the current handle.
    pub fn release(&mut self) -> Option<LocalAssetHandle> {
        let released = self.current.take();
        if let Some(handle) = &released {
            revoke_object_url(&handle.object_url);
        }
        released
    }

    pub fn current(&self) -> Option<&LocalAssetHandle> {
        self.current.as_ref()
    }
}

#[cfg(target_arch = "wasm32")]
fn revoke_object_url(object_url: &str) {
    match web_sys::Url::revoke_object_url(object_url) {
        Ok(()) => debug!("Revoked object URL {}", object_url),
        Err(e) => warn!("Failed to revoke object URL {}: {:?}", object_url, e),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn revoke_object_url(object_url: &str) {
    debug!("Released object URL {}", object_url);
}
