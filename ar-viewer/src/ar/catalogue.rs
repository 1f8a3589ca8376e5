use bevy::prelude::*;

use crate::engine::config::viewer_settings::{CatalogueModel, ViewerSettings};

/// Models the host can offer for placement.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct ModelCatalogue {
    models: Vec<CatalogueModel>,
}

impl ModelCatalogue {
    pub fn new(models: Vec<CatalogueModel>) -> Self {
        Self { models }
    }

    pub fn from_settings(settings: &ViewerSettings) -> Self {
        Self::new(settings.catalogue.clone())
    }

    pub fn find(&self, id: &str) -> Option<&CatalogueModel> {
        self.models.iter().find(|model| model.id == id)
    }

    pub fn models(&self) -> &[CatalogueModel] {
        &self.models
    }
}

pub fn load_catalogue(settings: Res<ViewerSettings>, mut commands: Commands) {
    let catalogue = ModelCatalogue::from_settings(&settings);
    info!("Model catalogue ready with {} entries", catalogue.models().len());
    commands.insert_resource(catalogue);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalogue_lists_builtin_models() {
        let catalogue = ModelCatalogue::from_settings(&ViewerSettings::default());
        let ids: Vec<_> = catalogue.models().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["cube", "duck", "flamingo"]);
        assert_eq!(catalogue.find("duck").map(|m| m.name.as_str()), Some("Duck"));
        assert!(catalogue.find("teapot").is_none());
    }
}
