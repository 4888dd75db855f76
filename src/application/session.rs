//! Input-event dispatch onto the cluster store.
//!
//! Front-ends speak in [`ClusterEvent`]s that name clusters by id, id prefix
//! or label. The session resolves those references, applies creation
//! defaults and forwards to [`ClusterTreeStore`].

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{ClusterTreeStore, Color, DragSession, NodeId, Position};

/// Minimum id-prefix length accepted as a node reference.
pub const MIN_ID_PREFIX: usize = 4;

/// One user action, as delivered by a presentation collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterEvent {
    Create {
        label: String,
        color: Option<Color>,
        size: Option<f64>,
        parent: Option<String>,
    },
    Delete(String),
    UpdateColor(String, Color),
    UpdateLabel(String, String),
    UpdatePosition(String, Position),
    ToggleExpand(String),
    Undo,
    Redo,
}

/// What an event did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created(NodeId),
    Applied,
    /// Valid request that changed nothing (empty label, history boundary, ...)
    Ignored,
}

impl From<bool> for Outcome {
    fn from(changed: bool) -> Self {
        if changed {
            Outcome::Applied
        } else {
            Outcome::Ignored
        }
    }
}

/// Color and size used for root clusters when the event leaves them out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreationDefaults {
    pub color: Color,
    pub size: f64,
}

impl Default for CreationDefaults {
    fn default() -> Self {
        Self {
            color: Color::rgb(255, 0, 0),
            size: 100.0,
        }
    }
}

pub struct Session {
    store: ClusterTreeStore,
    defaults: CreationDefaults,
    drag: Option<DragSession>,
}

impl Session {
    pub fn new(store: ClusterTreeStore, defaults: CreationDefaults) -> Self {
        Self {
            store,
            defaults,
            drag: None,
        }
    }

    pub fn store(&self) -> &ClusterTreeStore {
        &self.store
    }

    pub fn defaults(&self) -> CreationDefaults {
        self.defaults
    }

    #[instrument(level = "debug", skip(self))]
    pub fn apply(&mut self, event: ClusterEvent) -> ApplicationResult<Outcome> {
        let outcome = match event {
            ClusterEvent::Create {
                label,
                color,
                size,
                parent,
            } => {
                let parent = parent.as_deref().map(|r| self.resolve(r)).transpose()?;
                let color = color.unwrap_or(self.defaults.color);
                let size = size.unwrap_or(self.defaults.size);
                match self.store.create(&label, color, size, parent) {
                    Some(node) => {
                        info!(id = %node.id, label = %node.label, "cluster created");
                        Outcome::Created(node.id)
                    }
                    None => Outcome::Ignored,
                }
            }
            ClusterEvent::Delete(reference) => {
                let id = self.resolve(&reference)?;
                self.store.delete(id).into()
            }
            ClusterEvent::UpdateColor(reference, color) => {
                let id = self.resolve(&reference)?;
                self.store.update_color(id, color).into()
            }
            ClusterEvent::UpdateLabel(reference, label) => {
                let id = self.resolve(&reference)?;
                self.store.update_label(id, &label).into()
            }
            ClusterEvent::UpdatePosition(reference, position) => {
                let id = self.resolve(&reference)?;
                self.store.update_position(id, position.x, position.y).into()
            }
            ClusterEvent::ToggleExpand(reference) => {
                let id = self.resolve(&reference)?;
                self.store.toggle_expand(id).into()
            }
            ClusterEvent::Undo => self.store.undo().into(),
            ClusterEvent::Redo => self.store.redo().into(),
        };
        debug!(?outcome, "apply");
        Ok(outcome)
    }

    /// Start dragging a cluster, replacing any unfinished drag.
    pub fn begin_drag(&mut self, reference: &str) -> ApplicationResult<Position> {
        let id = self.resolve(reference)?;
        let node = self
            .store
            .get(id)
            .ok_or_else(|| ApplicationError::NodeNotFound(reference.to_string()))?;
        let drag = DragSession::begin(node);
        let start = drag.live_position();
        self.drag = Some(drag);
        Ok(start)
    }

    /// Live position for the active drag, `None` without one.
    pub fn drag_to(&mut self, dx: f64, dy: f64) -> Option<Position> {
        self.drag.as_mut().map(|drag| drag.update(dx, dy))
    }

    pub fn end_drag(&mut self) -> Outcome {
        match self.drag.take() {
            Some(drag) => drag.commit(&mut self.store).into(),
            None => Outcome::Ignored,
        }
    }

    /// Resolve a reference: full id, unique label, or unique id prefix.
    pub fn resolve(&self, reference: &str) -> ApplicationResult<NodeId> {
        let reference = reference.trim();

        if let Ok(id) = reference.parse::<NodeId>() {
            if self.store.get(id).is_some() {
                return Ok(id);
            }
        }

        let by_label: Vec<NodeId> = self
            .store
            .nodes()
            .iter()
            .filter(|n| n.label == reference)
            .map(|n| n.id)
            .collect();
        match by_label.as_slice() {
            [id] => return Ok(*id),
            [] => {}
            many => {
                return Err(ApplicationError::AmbiguousNode {
                    reference: reference.to_string(),
                    count: many.len(),
                })
            }
        }

        if reference.len() >= MIN_ID_PREFIX {
            let prefix = reference.to_ascii_lowercase();
            let by_prefix: Vec<NodeId> = self
                .store
                .nodes()
                .iter()
                .filter(|n| n.id.to_string().starts_with(&prefix))
                .map(|n| n.id)
                .collect();
            match by_prefix.as_slice() {
                [id] => return Ok(*id),
                [] => {}
                many => {
                    return Err(ApplicationError::AmbiguousNode {
                        reference: reference.to_string(),
                        count: many.len(),
                    })
                }
            }
        }

        Err(ApplicationError::NodeNotFound(reference.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(ClusterTreeStore::new(), CreationDefaults::default())
    }

    fn create(session: &mut Session, label: &str, parent: Option<&str>) -> NodeId {
        match session
            .apply(ClusterEvent::Create {
                label: label.to_string(),
                color: None,
                size: None,
                parent: parent.map(str::to_string),
            })
            .unwrap()
        {
            Outcome::Created(id) => id,
            other => panic!("expected creation, got {other:?}"),
        }
    }

    #[test]
    fn given_defaults_when_creating_root_then_uses_default_color_and_size() {
        let mut session = session();
        let id = create(&mut session, "A", None);
        let node = session.store().get(id).unwrap();
        assert_eq!(node.color, Color::rgb(255, 0, 0));
        assert_eq!(node.size, 100.0);
    }

    #[test]
    fn given_label_reference_when_creating_child_then_resolves_parent() {
        let mut session = session();
        let a = create(&mut session, "A", None);
        let b = create(&mut session, "B", Some("A"));
        assert_eq!(session.store().get(b).unwrap().parent_id, Some(a));
    }

    #[test]
    fn given_id_prefix_when_resolving_then_finds_node() {
        let mut session = session();
        let a = create(&mut session, "A", None);
        assert_eq!(session.resolve(&a.short()).unwrap(), a);
        assert_eq!(session.resolve(&a.to_string()).unwrap(), a);
    }

    #[test]
    fn given_duplicate_labels_when_resolving_then_ambiguous() {
        let mut session = session();
        create(&mut session, "twin", None);
        create(&mut session, "twin", None);
        let err = session.resolve("twin").unwrap_err();
        assert!(matches!(err, ApplicationError::AmbiguousNode { count: 2, .. }));
    }

    #[test]
    fn given_unknown_reference_when_deleting_then_not_found() {
        let mut session = session();
        let err = session.apply(ClusterEvent::Delete("ghost".into())).unwrap_err();
        assert!(matches!(err, ApplicationError::NodeNotFound(_)));
    }

    #[test]
    fn given_empty_label_when_creating_or_renaming_then_ignored() {
        let mut session = session();
        let outcome = session
            .apply(ClusterEvent::Create {
                label: "   ".into(),
                color: None,
                size: None,
                parent: None,
            })
            .unwrap();
        assert_eq!(outcome, Outcome::Ignored);

        create(&mut session, "A", None);
        let outcome = session
            .apply(ClusterEvent::UpdateLabel("A".into(), " ".into()))
            .unwrap();
        assert_eq!(outcome, Outcome::Ignored);
        assert_eq!(session.store().nodes()[0].label, "A");
    }

    #[test]
    fn given_history_boundary_when_undoing_then_ignored() {
        let mut session = session();
        assert_eq!(session.apply(ClusterEvent::Undo).unwrap(), Outcome::Ignored);
        assert_eq!(session.apply(ClusterEvent::Redo).unwrap(), Outcome::Ignored);
    }

    #[test]
    fn given_drag_when_ending_then_position_committed() {
        let mut session = session();
        let a = create(&mut session, "A", None);
        let start = session.begin_drag("A").unwrap();
        let live = session.drag_to(15.0, 25.0).unwrap();
        assert_eq!(live, start + Position::new(15.0, 25.0));
        assert_eq!(session.store().get(a).unwrap().position, start);

        assert_eq!(session.end_drag(), Outcome::Applied);
        assert_eq!(session.store().get(a).unwrap().position, live);
        assert_eq!(session.end_drag(), Outcome::Ignored);
        assert!(session.drag_to(1.0, 1.0).is_none());
    }
}
