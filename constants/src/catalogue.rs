pub struct CatalogueEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub url: &'static str,
    pub thumbnail: &'static str,
}

/// Built-in catalogue used when the settings file does not provide one.
pub const DEFAULT_CATALOGUE: &[CatalogueEntry] = &[
    CatalogueEntry {
        id: "cube",
        name: "Cube",
        url: "https://cdn.jsdelivr.net/gh/mrdoob/three.js@dev/examples/models/gltf/Cube/Cube.gltf",
        thumbnail: "https://via.placeholder.com/100?text=Cube",
    },
    CatalogueEntry {
        id: "duck",
        name: "Duck",
        url: "https://cdn.jsdelivr.net/gh/mrdoob/three.js@dev/examples/models/gltf/Duck/Duck.gltf",
        thumbnail: "https://via.placeholder.com/100?text=Duck",
    },
    CatalogueEntry {
        id: "flamingo",
        name: "Flamingo",
        url: "https://cdn.jsdelivr.net/gh/mrdoob/three.js@dev/examples/models/gltf/Flamingo/Flamingo.gltf",
        thumbnail: "https://via.placeholder.com/100?text=Flamingo",
    },
];

pub const DEFAULT_MODEL_URL: &str =
    "https://market-assets.fra1.cdn.digitaloceanspaces.com/market-assets/models/dog/model.gltf";
