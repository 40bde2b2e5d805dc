//! Replace-all template reload
//!
//! A [`ReloadSession`] collects every instance of one template in the scene
//! and reconciles them one per [`ReloadSession::reload_template`] call, so
//! a large scene can be updated across frames.

use std::collections::VecDeque;

use void_ir::Definition;

use crate::node::NodeHandle;
use crate::scene::Scene;
use crate::serializer::attr;
use crate::template::TemplateSync;

/// Phase of a [`ReloadSession`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReloadState {
    /// Nothing started
    #[default]
    Idle,
    /// Collecting matching instances
    Scanning,
    /// Reconciling instances one per call
    ReplayingOne,
    /// Worklist exhausted
    Done,
}

/// Stepwise reconciliation of every instance of a template
#[derive(Debug, Default)]
pub struct ReloadSession {
    state: ReloadState,
    definition: Option<Definition>,
    worklist: VecDeque<NodeHandle>,
    total: usize,
    processed: usize,
}

impl ReloadSession {
    /// Create an idle session
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every template root with `template_id` and queue it for reconciliation
    ///
    /// Returns the number of instances found.
    pub fn begin_replace_template(&mut self, scene: &Scene, template_id: &str, definition: Definition) -> usize {
        self.state = ReloadState::Scanning;
        self.worklist.clear();
        self.processed = 0;

        if !template_id.is_empty() {
            for &zone in scene.zones() {
                for node in scene.descendants(zone, true) {
                    let matches = scene
                        .node(node)
                        .map_or(false, |n| n.is_template_asset() && n.template_id() == template_id);
                    if matches {
                        self.worklist.push_back(node);
                    }
                }
            }
        }

        self.total = self.worklist.len();
        self.definition = Some(definition);
        self.state = if self.total == 0 {
            ReloadState::Done
        } else {
            ReloadState::ReplayingOne
        };
        log::debug!("Template '{}': {} instances to reload", template_id, self.total);
        self.total
    }

    /// [`ReloadSession::begin_replace_template`] for the template named in the definition
    pub fn begin_reload_template(&mut self, scene: &Scene, definition: Definition) -> usize {
        let template_id = definition
            .get_str(attr::TEMPLATE_ID)
            .unwrap_or_default()
            .to_string();
        self.begin_replace_template(scene, &template_id, definition)
    }

    /// Reconcile the next queued instance
    ///
    /// Returns true once the worklist is exhausted. Instances removed from the
    /// scene since the scan are skipped.
    pub fn reload_template(&mut self, scene: &mut Scene) -> bool {
        if self.state != ReloadState::ReplayingOne {
            return true;
        }

        if let (Some(node), Some(definition)) = (self.worklist.pop_front(), self.definition.as_ref()) {
            if scene.contains(node) {
                TemplateSync::new(scene).reload_template(node, definition);
            } else {
                log::debug!("Template instance {:?} vanished before reload", node);
            }
            self.processed += 1;
        }

        if self.worklist.is_empty() {
            self.state = ReloadState::Done;
            scene.update_index_search_object();
            log::info!("Reloaded {} template instances", self.processed);
            return true;
        }
        false
    }

    /// Current phase
    pub fn state(&self) -> ReloadState {
        self.state
    }

    /// Instances found by the scan
    pub fn total(&self) -> usize {
        self.total
    }

    /// Instances handled so far
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Progress in percent
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        self.processed as f32 * 100.0 / self.total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::component::ComponentRegistry;

    #[test]
    fn test_empty_worklist_finishes_at_once() {
        let mut scene = Scene::new("Test", Arc::new(ComponentRegistry::with_builtin()));
        scene.create_zone();

        let mut session = ReloadSession::new();
        assert_eq!(session.begin_replace_template(&scene, "none", Definition::new("GameObject")), 0);
        assert_eq!(session.state(), ReloadState::Done);
        assert!(session.reload_template(&mut scene));
        assert_eq!(session.percent(), 100.0);
    }

    #[test]
    fn test_stale_instance_is_skipped() {
        let mut scene = Scene::new("Test", Arc::new(ComponentRegistry::with_builtin()));
        let zone = scene.create_zone();
        let obj = scene.create_empty_object(zone).unwrap();
        scene.update_add_remove_object(zone, false);
        scene.set_template_id(obj, "T");
        scene.set_template_asset(obj, "a.json");
        let definition = scene.export_object(obj).unwrap();

        let mut session = ReloadSession::new();
        assert_eq!(session.begin_reload_template(&scene, definition), 1);
        scene.remove(obj);
        scene.update_add_remove_object(zone, false);

        assert!(session.reload_template(&mut scene));
        assert_eq!(session.processed(), 1);
    }
}
