// Copyright 2026 the atrium project authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Plugin registry and manager.
//!
//! Plugins are compiled in and announce themselves with a
//! [`PluginRegistration`] collected by `inventory`; the manager resolves a
//! preference path to a registration, constructs the instance (which
//! subscribes itself to the bus), and tracks its metadata until uninstall.

use crate::context::RuntimeContext;
use atrium_core::EventHandler;
use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use uuid::Uuid;

/// A plugin instance: an event handler with a name.
///
/// Instances subscribe themselves to the context bus during construction and
/// rely on listener drop for teardown, so uninstalling is just dropping.
pub trait Plugin: EventHandler {
    fn name(&self) -> &str;
}

/// Compile-time registration of one plugin, collected by `inventory`.
pub struct PluginRegistration {
    /// The path preferences refer to this plugin by.
    pub path: &'static str,
    pub name: &'static str,
    pub construct: fn(&RuntimeContext) -> Rc<RefCell<dyn Plugin>>,
}

inventory::collect!(PluginRegistration);

/// Opaque identity of one installed plugin instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId(Uuid);

/// Metadata the manager keeps per installed plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub id: PluginId,
    pub name: String,
    pub path: PathBuf,
    pub fingerprint: u64,
}

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("no registered plugin matches {path}")]
    NotFound { path: PathBuf },
    #[error("plugin {path} is already installed")]
    AlreadyInstalled { path: PathBuf },
    #[error("no installed plugin with id {0:?}")]
    NotInstalled(PluginId),
}

/// Installs and uninstalls registered plugins for one runtime context.
pub struct PluginManager {
    ctx: RuntimeContext,
    installed: Vec<(PluginInfo, Rc<RefCell<dyn Plugin>>)>,
}

impl PluginManager {
    pub fn new(ctx: &RuntimeContext) -> Self {
        Self {
            ctx: ctx.clone(),
            installed: Vec::new(),
        }
    }

    /// Resolves `path` against the registry and installs the plugin. Fails
    /// without side effects when the path is unknown or already installed.
    pub fn install(&mut self, path: &Path) -> Result<PluginId, PluginError> {
        if self
            .installed
            .iter()
            .any(|(info, _)| info.path == path)
        {
            return Err(PluginError::AlreadyInstalled {
                path: path.to_path_buf(),
            });
        }
        let registration = inventory::iter::<PluginRegistration>
            .into_iter()
            .find(|reg| Path::new(reg.path) == path)
            .ok_or_else(|| PluginError::NotFound {
                path: path.to_path_buf(),
            })?;

        let instance = (registration.construct)(&self.ctx);
        let info = PluginInfo {
            id: PluginId(Uuid::new_v4()),
            name: registration.name.to_string(),
            path: path.to_path_buf(),
            fingerprint: fingerprint(path),
        };
        log::info!("installed plugin {} from {}", info.name, path.display());
        let id = info.id;
        self.installed.push((info, instance));
        Ok(id)
    }

    /// Installs every plugin listed, logging and skipping failures. Returns
    /// the ids of the plugins that installed.
    pub fn install_all(&mut self, paths: &[PathBuf]) -> Vec<PluginId> {
        let mut ids = Vec::new();
        for path in paths {
            match self.install(path) {
                Ok(id) => ids.push(id),
                Err(err) => log::warn!("plugin skipped: {err}"),
            }
        }
        ids
    }

    /// Drops the instance (its listener unsubscribes on drop) and removes
    /// the metadata.
    pub fn uninstall(&mut self, id: PluginId) -> Result<(), PluginError> {
        let position = self
            .installed
            .iter()
            .position(|(info, _)| info.id == id)
            .ok_or(PluginError::NotInstalled(id))?;
        let (info, _instance) = self.installed.remove(position);
        log::info!("uninstalled plugin {}", info.name);
        Ok(())
    }

    /// Metadata of the installed plugins, in install order.
    pub fn plugins(&self) -> Vec<PluginInfo> {
        self.installed.iter().map(|(info, _)| info.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.installed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }
}

impl Drop for PluginManager {
    fn drop(&mut self) {
        if !self.installed.is_empty() {
            log::debug!("plugin manager dropping {} plugin(s)", self.installed.len());
        }
    }
}

fn fingerprint(path: &Path) -> u64 {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preferences;
    use crate::events::RenderEvent;
    use atrium_core::platform::WindowSettings;
    use atrium_core::render::RenderDevice;
    use atrium_core::{EventKind, EventListener, FiredEvent};
    use atrium_infra::{EchoInterpreter, HeadlessBackend, HeadlessWindow};
    use std::cell::Cell;

    thread_local! {
        static RENDERS_SEEN: Cell<u32> = const { Cell::new(0) };
        static DROPS: Cell<u32> = const { Cell::new(0) };
    }

    struct ProbePlugin {
        _listener: Option<EventListener>,
    }

    impl EventHandler for ProbePlugin {
        fn on_event(&mut self, event: &FiredEvent<'_>) {
            if event.kind() == EventKind::of::<RenderEvent>() {
                RENDERS_SEEN.with(|count| count.set(count.get() + 1));
            }
        }
    }

    impl Plugin for ProbePlugin {
        fn name(&self) -> &str {
            "probe"
        }
    }

    impl Drop for ProbePlugin {
        fn drop(&mut self) {
            DROPS.with(|count| count.set(count.get() + 1));
        }
    }

    fn construct_probe(ctx: &RuntimeContext) -> Rc<RefCell<dyn Plugin>> {
        let plugin = Rc::new(RefCell::new(ProbePlugin { _listener: None }));
        let handler: Rc<RefCell<dyn EventHandler>> = plugin.clone();
        let listener = EventListener::new(ctx.bus(), &handler, true);
        listener.subscribe::<RenderEvent>();
        plugin.borrow_mut()._listener = Some(listener);
        plugin
    }

    inventory::submit! {
        PluginRegistration {
            path: "probe",
            name: "Probe",
            construct: construct_probe,
        }
    }

    fn context() -> RuntimeContext {
        RuntimeContext::new(
            Preferences::default(),
            Rc::new(RefCell::new(HeadlessWindow::open(&WindowSettings::default()))),
            Rc::new(RefCell::new(RenderDevice::new(Box::new(
                HeadlessBackend::new(),
            )))),
            Rc::new(RefCell::new(EchoInterpreter::new())),
        )
    }

    #[test]
    fn install_records_metadata_and_subscribes_the_plugin() {
        let ctx = context();
        let mut manager = PluginManager::new(&ctx);
        let id = manager.install(Path::new("probe")).unwrap();

        let infos = manager.plugins();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].id, id);
        assert_eq!(infos[0].name, "Probe");
        assert_eq!(infos[0].path, Path::new("probe"));

        let before = RENDERS_SEEN.with(|count| count.get());
        ctx.bus().fire(&RenderEvent { frame: 0 });
        assert_eq!(RENDERS_SEEN.with(|count| count.get()), before + 1);
    }

    #[test]
    fn duplicate_install_fails_without_side_effects() {
        let ctx = context();
        let mut manager = PluginManager::new(&ctx);
        manager.install(Path::new("probe")).unwrap();
        assert!(matches!(
            manager.install(Path::new("probe")),
            Err(PluginError::AlreadyInstalled { .. })
        ));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn unknown_path_leaves_the_manager_untouched() {
        let ctx = context();
        let mut manager = PluginManager::new(&ctx);
        assert!(matches!(
            manager.install(Path::new("no-such-plugin")),
            Err(PluginError::NotFound { .. })
        ));
        assert!(manager.is_empty());
    }

    #[test]
    fn uninstall_drops_the_instance_exactly_once_and_unsubscribes() {
        let ctx = context();
        let mut manager = PluginManager::new(&ctx);
        let id = manager.install(Path::new("probe")).unwrap();

        let drops_before = DROPS.with(|count| count.get());
        manager.uninstall(id).unwrap();
        assert_eq!(DROPS.with(|count| count.get()), drops_before + 1);
        assert!(manager.is_empty());

        // The listener went with the instance.
        let before = RENDERS_SEEN.with(|count| count.get());
        ctx.bus().fire(&RenderEvent { frame: 1 });
        assert_eq!(RENDERS_SEEN.with(|count| count.get()), before);

        assert!(matches!(
            manager.uninstall(id),
            Err(PluginError::NotInstalled(_))
        ));
    }

    #[test]
    fn manager_drop_uninstalls_everything() {
        let ctx = context();
        let drops_before = DROPS.with(|count| count.get());
        {
            let mut manager = PluginManager::new(&ctx);
            manager.install(Path::new("probe")).unwrap();
        }
        assert_eq!(DROPS.with(|count| count.get()), drops_before + 1);
    }

    #[test]
    fn install_all_skips_failures_and_keeps_going() {
        let ctx = context();
        let mut manager = PluginManager::new(&ctx);
        let ids = manager.install_all(&[
            PathBuf::from("no-such-plugin"),
            PathBuf::from("probe"),
        ]);
        assert_eq!(ids.len(), 1);
        assert_eq!(manager.len(), 1);
    }
}
