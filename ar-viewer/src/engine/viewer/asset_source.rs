use bevy::asset::AssetPath;
use constants::path::SUPPORTED_ASSET_EXTENSIONS;

/// Asset source name registered for `https://` URIs on the web build.
pub const HTTPS_SOURCE: &str = "https";
/// Asset source name registered for `http://` URIs on the web build.
pub const HTTP_SOURCE: &str = "http";
/// Asset source name registered for host-created object URLs on the web build.
pub const BLOB_SOURCE: &str = "blob";

/// An object URL created by the host for a user-selected file.
///
/// The URL must be revoked when replaced or on teardown, see
/// [`crate::engine::loading::local_handles::LocalHandleRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAssetHandle {
    pub object_url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssetSource {
    #[default]
    None,
    Remote(String),
    Local(LocalAssetHandle),
}

impl AssetSource {
    /// Blank URIs mean "no asset": the viewer shows the placeholder.
    pub fn from_uri(uri: &str) -> Self {
        let uri = uri.trim();
        if uri.is_empty() {
            AssetSource::None
        } else {
            AssetSource::Remote(uri.to_string())
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, AssetSource::None)
    }

    /// URI reported to the host and used in error messages.
    pub fn display_uri(&self) -> &str {
        match self {
            AssetSource::None => "",
            AssetSource::Remote(uri) => uri,
            AssetSource::Local(handle) => &handle.file_name,
        }
    }

    /// Map the source onto an asset server path, rejecting what this build can't load.
    pub fn resolve(&self) -> Result<AssetPath<'static>, String> {
        match self {
            AssetSource::None => Err("no asset source".to_string()),
            AssetSource::Remote(uri) => {
                // Asset paths read '#' as a sub-asset label and keep '?' in the file name.
                if uri.contains(['?', '#']) {
                    return Err(format!(
                        "'{uri}' has a query string or fragment, which asset paths cannot carry"
                    ));
                }
                check_extension(uri)?;
                if is_absolute_url(uri) {
                    resolve_absolute_url(uri)
                } else {
                    Ok(AssetPath::from(uri.clone()))
                }
            }
            AssetSource::Local(handle) => {
                check_extension(&handle.file_name)?;
                resolve_object_url(&handle.object_url)
            }
        }
    }
}

fn is_absolute_url(uri: &str) -> bool {
    uri.starts_with("https://") || uri.starts_with("http://")
}

#[cfg(target_arch = "wasm32")]
fn resolve_absolute_url(uri: &str) -> Result<AssetPath<'static>, String> {
    // "https://host/model.glb" parses as source "https", path "host/model.glb".
    Ok(AssetPath::from(uri.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
fn resolve_absolute_url(_uri: &str) -> Result<AssetPath<'static>, String> {
    Err("remote URLs are only supported in the web build".to_string())
}

#[cfg(target_arch = "wasm32")]
fn resolve_object_url(object_url: &str) -> Result<AssetPath<'static>, String> {
    if !object_url.starts_with("blob:") {
        return Err(format!("'{object_url}' is not an object URL"));
    }
    Ok(AssetPath::from(std::path::PathBuf::from(object_url)).with_source(BLOB_SOURCE))
}

#[cfg(not(target_arch = "wasm32"))]
fn resolve_object_url(_object_url: &str) -> Result<AssetPath<'static>, String> {
    Err("local object URLs are only supported in the web build".to_string())
}

/// Lower-cased extension of the last path segment, ignoring query and fragment.
pub fn asset_extension(name: &str) -> Option<String> {
    let name = name.split(['?', '#']).next().unwrap_or_default();
    let file = name.rsplit('/').next().unwrap_or_default();
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn check_extension(name: &str) -> Result<(), String> {
    match asset_extension(name) {
        Some(ext) if SUPPORTED_ASSET_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(format!("unsupported asset format '.{ext}'")),
        None => Err(format!("'{name}' has no file extension")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_uri_is_no_source() {
        assert_eq!(AssetSource::from_uri("   "), AssetSource::None);
        assert_eq!(
            AssetSource::from_uri(" models/duck.glb "),
            AssetSource::Remote("models/duck.glb".into())
        );
    }

    #[test]
    fn test_extension_ignores_query_and_case() {
        assert_eq!(
            asset_extension("https://cdn.example/Duck.GLTF?v=3#top"),
            Some("gltf".into())
        );
        assert_eq!(asset_extension("models/.hidden"), None);
        assert_eq!(asset_extension("https://cdn.example/model"), None);
    }

    #[test]
    fn test_query_and_fragment_are_rejected() {
        for uri in [
            "models/duck.glb#Scene0",
            "models/duck.glb?v=3",
            "https://cdn.example/duck.glb?sig=1",
        ] {
            let err = AssetSource::Remote(uri.into()).resolve().unwrap_err();
            assert!(err.contains("query string or fragment"), "{uri}: {err}");
        }
    }

    #[test]
    fn test_relative_path_resolves_on_default_source() {
        let path = AssetSource::Remote("models/duck.glb".into())
            .resolve()
            .expect("relative glb path");
        assert_eq!(path.path(), std::path::Path::new("models/duck.glb"));
    }

    #[test]
    fn test_unsupported_format_is_rejected() {
        let err = AssetSource::Remote("models/duck.fbx".into())
            .resolve()
            .unwrap_err();
        assert_eq!(err, "unsupported asset format '.fbx'");

        let local = AssetSource::Local(LocalAssetHandle {
            object_url: "blob:https://host/1234".into(),
            file_name: "scan.obj".into(),
        });
        assert!(local.resolve().is_err());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_native_rejects_remote_urls() {
        let err = AssetSource::Remote("https://cdn.example/duck.glb".into())
            .resolve()
            .unwrap_err();
        assert!(err.contains("web build"));
    }

    #[test]
    fn test_display_uri_for_local_uses_file_name() {
        let local = AssetSource::Local(LocalAssetHandle {
            object_url: "blob:https://host/1234".into(),
            file_name: "chair.glb".into(),
        });
        assert_eq!(local.display_uri(), "chair.glb");
    }
}
