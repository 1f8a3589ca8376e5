use bevy::prelude::*;

use super::asset_source::AssetSource;
use super::config::{SurfaceSize, ViewerConfiguration};
use super::errors::ViewerError;
use super::status::LoadStatus;

/// Identifies one load request. Only the ticket of the latest request can complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    source: AssetSource,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> &AssetSource {
        &self.source
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    Mounted,
    AlreadyMounted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    Started(LoadTicket),
    /// Empty source: the placeholder is shown and status returns to Idle.
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied(LoadStatus),
    /// Superseded by a newer request, or already completed.
    Stale,
    AfterUnmount,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeOutcome {
    Resized(SurfaceSize),
    Unchanged,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmountOutcome {
    Disposed,
    AlreadyUnmounted,
}

/// Ordering and cancellation rules for one viewer instance.
///
/// Owns no scene data. Systems consult it before touching the scene so that
/// stale or post-unmount completions never mutate it.
#[derive(Resource, Debug, Default)]
pub struct ViewerLifecycle {
    config: Option<ViewerConfiguration>,
    mounted: bool,
    status: LoadStatus,
    generation: u64,
    desired: Option<AssetSource>,
    surface: Option<SurfaceSize>,
}

impl ViewerLifecycle {
    pub fn mount(&mut self, config: ViewerConfiguration) -> Result<MountOutcome, ViewerError> {
        if self.mounted {
            return Ok(MountOutcome::AlreadyMounted);
        }
        if !config.container.size.is_renderable() {
            return Err(ViewerError::Initialization(format!(
                "display surface '{}' is not sized ({}x{})",
                config.container.selector, config.container.size.width, config.container.size.height
            )));
        }

        self.mounted = true;
        self.generation += 1;
        self.status = LoadStatus::Idle;
        self.desired = None;
        self.surface = Some(config.container.size);
        self.config = Some(config);
        Ok(MountOutcome::Mounted)
    }

    pub fn request_load(&mut self, source: AssetSource) -> Result<LoadRequest, ViewerError> {
        if !self.mounted {
            return Err(ViewerError::NotMounted);
        }

        self.generation += 1;
        if source.is_none() {
            self.status = LoadStatus::Idle;
            self.desired = None;
            return Ok(LoadRequest::Cleared);
        }

        self.status = LoadStatus::Loading;
        self.desired = Some(source.clone());
        Ok(LoadRequest::Started(LoadTicket {
            generation: self.generation,
            source,
        }))
    }

    pub fn complete(&mut self, ticket: &LoadTicket, outcome: Result<(), String>) -> Completion {
        if !self.mounted {
            return Completion::AfterUnmount;
        }
        if !self.is_current(ticket) || self.status != LoadStatus::Loading {
            return Completion::Stale;
        }

        self.status = match outcome {
            Ok(()) => LoadStatus::Loaded,
            Err(reason) => LoadStatus::Failed(reason),
        };
        Completion::Applied(self.status.clone())
    }

    pub fn resize(&mut self, size: SurfaceSize) -> ResizeOutcome {
        if !self.mounted || !size.is_renderable() {
            return ResizeOutcome::Ignored;
        }
        if self.surface == Some(size) {
            return ResizeOutcome::Unchanged;
        }
        self.surface = Some(size);
        ResizeOutcome::Resized(size)
    }

    pub fn unmount(&mut self) -> UnmountOutcome {
        if !self.mounted {
            return UnmountOutcome::AlreadyUnmounted;
        }

        self.mounted = false;
        // Invalidates every outstanding ticket, including ones a later remount would otherwise accept.
        self.generation += 1;
        self.status = LoadStatus::Idle;
        self.desired = None;
        self.surface = None;
        self.config = None;
        UnmountOutcome::Disposed
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.mounted && ticket.generation == self.generation
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn desired_source(&self) -> Option<&AssetSource> {
        self.desired.as_ref()
    }

    pub fn surface(&self) -> Option<SurfaceSize> {
        self.surface
    }

    pub fn config(&self) -> Option<&ViewerConfiguration> {
        self.config.as_ref()
    }
}

/// Broadcast after the scene is built or released, for listeners outside the scene.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerLifecycleEvent {
    Mounted,
    Unmounted,
}

/// Run condition for per-frame viewer systems.
pub fn viewer_mounted(lifecycle: Res<ViewerLifecycle>) -> bool {
    lifecycle.is_mounted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::viewer::config::SurfaceTarget;

    fn config(asset: &str) -> ViewerConfiguration {
        ViewerConfiguration {
            asset_source: AssetSource::from_uri(asset),
            container: SurfaceTarget::new(SurfaceSize::new(800.0, 600.0)),
        }
    }

    fn mounted() -> ViewerLifecycle {
        let mut lifecycle = ViewerLifecycle::default();
        lifecycle.mount(config("")).unwrap();
        lifecycle
    }

    fn started(request: LoadRequest) -> LoadTicket {
        match request {
            LoadRequest::Started(ticket) => ticket,
            LoadRequest::Cleared => panic!("expected a started load"),
        }
    }

    #[test]
    fn test_mount_with_empty_asset_stays_idle() {
        let lifecycle = mounted();
        assert!(lifecycle.is_mounted());
        assert_eq!(lifecycle.status(), &LoadStatus::Idle);
        assert!(lifecycle.desired_source().is_none());
    }

    #[test]
    fn test_mount_twice_does_not_remount() {
        let mut lifecycle = mounted();
        let before = lifecycle.generation;
        assert_eq!(
            lifecycle.mount(config("models/duck.glb")).unwrap(),
            MountOutcome::AlreadyMounted
        );
        assert_eq!(lifecycle.generation, before);
        assert_eq!(lifecycle.config().unwrap().asset_source, AssetSource::None);
    }

    #[test]
    fn test_mount_rejects_unsized_surface() {
        let mut lifecycle = ViewerLifecycle::default();
        let mut cfg = config("");
        cfg.container.size = SurfaceSize::new(0.0, 600.0);
        let err = lifecycle.mount(cfg).unwrap_err();
        assert!(matches!(err, ViewerError::Initialization(_)));
        assert!(!lifecycle.is_mounted());
    }

    #[test]
    fn test_load_goes_idle_loading_loaded() {
        let mut lifecycle = mounted();
        let ticket = started(lifecycle.request_load(AssetSource::from_uri("valid.glb")).unwrap());
        assert_eq!(lifecycle.status(), &LoadStatus::Loading);

        assert_eq!(
            lifecycle.complete(&ticket, Ok(())),
            Completion::Applied(LoadStatus::Loaded)
        );
        assert_eq!(lifecycle.status(), &LoadStatus::Loaded);
        // A duplicate completion doesn't re-apply.
        assert_eq!(lifecycle.complete(&ticket, Ok(())), Completion::Stale);
    }

    #[test]
    fn test_failed_load_surfaces_reason() {
        let mut lifecycle = mounted();
        let ticket = started(lifecycle.request_load(AssetSource::from_uri("missing.glb")).unwrap());
        let completion = lifecycle.complete(&ticket, Err("404 Not Found".into()));
        assert_eq!(
            completion,
            Completion::Applied(LoadStatus::Failed("404 Not Found".into()))
        );
        assert!(lifecycle.status().is_terminal());
    }

    #[test]
    fn test_last_requested_wins_when_older_finishes_last() {
        let mut lifecycle = mounted();
        let a = started(lifecycle.request_load(AssetSource::from_uri("a.glb")).unwrap());
        let b = started(lifecycle.request_load(AssetSource::from_uri("b.glb")).unwrap());

        assert_eq!(
            lifecycle.complete(&b, Ok(())),
            Completion::Applied(LoadStatus::Loaded)
        );
        assert_eq!(lifecycle.complete(&a, Err("slow failure".into())), Completion::Stale);
        assert_eq!(lifecycle.status(), &LoadStatus::Loaded);
        assert_eq!(
            lifecycle.desired_source(),
            Some(&AssetSource::from_uri("b.glb"))
        );
    }

    #[test]
    fn test_last_requested_wins_when_older_finishes_first() {
        let mut lifecycle = mounted();
        let a = started(lifecycle.request_load(AssetSource::from_uri("a.glb")).unwrap());
        let b = started(lifecycle.request_load(AssetSource::from_uri("b.glb")).unwrap());

        assert_eq!(lifecycle.complete(&a, Ok(())), Completion::Stale);
        assert_eq!(lifecycle.status(), &LoadStatus::Loading);
        assert_eq!(
            lifecycle.complete(&b, Err("parse error".into())),
            Completion::Applied(LoadStatus::Failed("parse error".into()))
        );
    }

    #[test]
    fn test_empty_request_clears_to_idle() {
        let mut lifecycle = mounted();
        let a = started(lifecycle.request_load(AssetSource::from_uri("a.glb")).unwrap());
        assert_eq!(
            lifecycle.request_load(AssetSource::None).unwrap(),
            LoadRequest::Cleared
        );
        assert_eq!(lifecycle.status(), &LoadStatus::Idle);
        assert_eq!(lifecycle.complete(&a, Ok(())), Completion::Stale);
        assert_eq!(lifecycle.status(), &LoadStatus::Idle);
    }

    #[test]
    fn test_completion_after_unmount_is_discarded() {
        let mut lifecycle = mounted();
        let ticket = started(lifecycle.request_load(AssetSource::from_uri("a.glb")).unwrap());
        assert_eq!(lifecycle.unmount(), UnmountOutcome::Disposed);
        assert_eq!(lifecycle.complete(&ticket, Ok(())), Completion::AfterUnmount);

        // A remount must not resurrect the old ticket either.
        lifecycle.mount(config("")).unwrap();
        assert_eq!(lifecycle.complete(&ticket, Ok(())), Completion::Stale);
        assert_eq!(lifecycle.status(), &LoadStatus::Idle);
    }

    #[test]
    fn test_unmount_is_idempotent() {
        let mut lifecycle = mounted();
        assert_eq!(lifecycle.unmount(), UnmountOutcome::Disposed);
        let generation = lifecycle.generation;
        assert_eq!(lifecycle.unmount(), UnmountOutcome::AlreadyUnmounted);
        assert_eq!(lifecycle.unmount(), UnmountOutcome::AlreadyUnmounted);
        assert_eq!(lifecycle.generation, generation);
    }

    #[test]
    fn test_operations_before_mount_are_rejected() {
        let mut lifecycle = ViewerLifecycle::default();
        assert_eq!(
            lifecycle.request_load(AssetSource::from_uri("a.glb")),
            Err(ViewerError::NotMounted)
        );
        assert_eq!(
            lifecycle.resize(SurfaceSize::new(640.0, 480.0)),
            ResizeOutcome::Ignored
        );
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut lifecycle = mounted();
        let size = SurfaceSize::new(1024.0, 768.0);
        assert_eq!(lifecycle.resize(size), ResizeOutcome::Resized(size));
        assert_eq!(lifecycle.resize(size), ResizeOutcome::Unchanged);
        assert_eq!(lifecycle.surface(), Some(size));
        assert_eq!(
            lifecycle.resize(SurfaceSize::new(f32::NAN, 768.0)),
            ResizeOutcome::Ignored
        );
        assert_eq!(lifecycle.surface(), Some(size));
    }
}
