//! The canonical, dialect-independent pathway model.
//!
//! [`PathwayModel`] owns an ordered collection of
//! [`PathwayElement`](crate::element::PathwayElement)s together with the
//! graph-link registry that keeps cross-references between them consistent:
//! every declared graph id maps to the element, anchor or point that
//! declares it, and back to the set of sites currently referring to it.
//!
//! Elements live in an arena and are addressed by opaque [`ElementId`]
//! handles. All mutation goes through the model ([`add`], [`remove`],
//! [`modify`]), so identifiers are registered and unregistered in lock-step
//! with the elements that declare them and no reference is ever left
//! dangling.
//!
//! [`add`]: PathwayModel::add
//! [`remove`]: PathwayModel::remove
//! [`modify`]: PathwayModel::modify

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use log::warn;
use rand::RngExt;
use thiserror::Error;

use crate::connector::{ConnectorRestrictions, ConnectorShape, Side};
use crate::element::{ConnectorType, ObjectKind, PathwayElement};
use crate::event::{EventBus, ModelEvent, SubscriptionId};
use crate::geometry::Point;

/// Errors raised by model mutations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Two live elements in the same model may never share a graph id,
    /// because downstream reference resolution would silently mis-link.
    #[error("graph id `{id}` is not unique")]
    DuplicateGraphId { id: String },

    #[error("group id `{id}` is not unique")]
    DuplicateGroupId { id: String },

    /// The handle does not address a live element of this model.
    #[error("stale element handle")]
    StaleHandle,

    /// The pathway information element exists exactly once and cannot be
    /// removed, only mutated.
    #[error("the pathway information element cannot be removed")]
    PermanentElement,

    /// A link was requested against a graph id nothing currently declares.
    #[error("no element declares graph id `{id}`")]
    UnresolvedReference { id: String },
}

/// Opaque, stable handle to an element in a [`PathwayModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    #[cfg(test)]
    pub(crate) fn for_tests(raw: u32) -> Self {
        Self(raw)
    }
}

/// What a graph id resolves to: the declaring element, one of a line's
/// anchors, or one of a line's points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefTarget {
    Element(ElementId),
    Anchor(ElementId, usize),
    Point(ElementId, usize),
}

impl RefTarget {
    /// The element owning the target.
    pub fn element(self) -> ElementId {
        match self {
            RefTarget::Element(id) | RefTarget::Anchor(id, _) | RefTarget::Point(id, _) => id,
        }
    }
}

/// A site holding a `graphRef`: a line point, or an element-level reference
/// (states attach to their parent node this way).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefSite {
    Point(ElementId, usize),
    Element(ElementId),
}

impl RefSite {
    pub fn element(self) -> ElementId {
        match self {
            RefSite::Point(id, _) | RefSite::Element(id) => id,
        }
    }
}

/// Margin kept between the outermost element and the board edge.
const BOARD_BORDER: f64 = 30.0;

/// The model for pathway data.
///
/// A fresh model always contains exactly one
/// [`MappInfo`](ObjectKind::MappInfo) element holding the document-level
/// metadata.
///
/// # Examples
///
/// ```
/// use gpml_core::element::{ObjectKind, PathwayElement};
/// use gpml_core::model::PathwayModel;
///
/// let mut model = PathwayModel::new();
/// let mut shape = PathwayElement::new(ObjectKind::Shape);
/// shape.graph_id = Some("s1".to_owned());
/// let id = model.add(shape).unwrap();
/// assert_eq!(model.element_by_graph_id("s1"), Some(id));
/// ```
#[derive(Debug)]
pub struct PathwayModel {
    slots: Vec<Option<PathwayElement>>,
    /// Insertion order of live elements; the base display z-order.
    order: Vec<ElementId>,
    mappinfo: ElementId,
    graph_ids: HashMap<String, RefTarget>,
    graph_refs: HashMap<String, IndexSet<RefSite>>,
    group_ids: HashMap<String, ElementId>,
    group_refs: HashMap<String, IndexSet<ElementId>>,
    board_width: f64,
    board_height: f64,
    events: EventBus,
}

impl PathwayModel {
    pub fn new() -> Self {
        let mut model = Self {
            slots: Vec::new(),
            order: Vec::new(),
            mappinfo: ElementId(0),
            graph_ids: HashMap::new(),
            graph_refs: HashMap::new(),
            group_ids: HashMap::new(),
            group_refs: HashMap::new(),
            board_width: 0.0,
            board_height: 0.0,
            events: EventBus::default(),
        };
        let mappinfo = model
            .insert(PathwayElement::new(ObjectKind::MappInfo))
            .expect("a fresh model cannot have id conflicts");
        model.mappinfo = mappinfo;
        model
    }

    /// Number of live elements, including the mapinfo element.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over live elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &PathwayElement)> {
        self.order
            .iter()
            .filter_map(|id| self.slots[id.0 as usize].as_ref().map(|el| (*id, el)))
    }

    pub fn element(&self, id: ElementId) -> Option<&PathwayElement> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Handle of the one and only mapinfo element.
    pub fn mappinfo(&self) -> ElementId {
        self.mappinfo
    }

    /// Adds an element, registering every graph id it declares and linking
    /// every reference it holds.
    ///
    /// Adding a second mapinfo element replaces the existing one. Group
    /// elements without a `group_id` get a generated one, since members
    /// reference their group by that id.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateGraphId`] / [`ModelError::DuplicateGroupId`]
    /// when an id the element declares is already taken; the model is left
    /// unchanged.
    pub fn add(&mut self, element: PathwayElement) -> Result<ElementId, ModelError> {
        if element.kind() == ObjectKind::MappInfo {
            let new_id = self.insert(element)?;
            let old = std::mem::replace(&mut self.mappinfo, new_id);
            self.force_remove(old);
            return Ok(new_id);
        }
        self.insert(element)
    }

    fn insert(&mut self, mut element: PathwayElement) -> Result<ElementId, ModelError> {
        if element.kind() == ObjectKind::Group && element.group_id.is_none() {
            element.group_id = Some(self.unique_group_id());
        }

        // Uniqueness is checked up-front so a failed add leaves no partial
        // registrations behind.
        let declared = element.declared_graph_ids();
        let mut seen = HashSet::new();
        for id in &declared {
            if self.graph_ids.contains_key(id) || !seen.insert(id.clone()) {
                return Err(ModelError::DuplicateGraphId { id: id.clone() });
            }
        }
        if let Some(group_id) = &element.group_id {
            if self.group_ids.contains_key(group_id) {
                return Err(ModelError::DuplicateGroupId {
                    id: group_id.clone(),
                });
            }
        }

        let id = ElementId(self.slots.len() as u32);
        self.register_declarations(id, &element);
        self.register_references(id, &element);
        self.slots.push(Some(element));
        self.order.push(id);

        self.check_board_size(id);
        self.events.emit(ModelEvent::Added(id));
        Ok(id)
    }

    fn register_declarations(&mut self, id: ElementId, element: &PathwayElement) {
        if let Some(graph_id) = &element.graph_id {
            self.graph_ids
                .insert(graph_id.clone(), RefTarget::Element(id));
        }
        for (i, anchor) in element.anchors.iter().enumerate() {
            if let Some(graph_id) = &anchor.graph_id {
                self.graph_ids
                    .insert(graph_id.clone(), RefTarget::Anchor(id, i));
            }
        }
        for (i, point) in element.points.iter().enumerate() {
            if let Some(graph_id) = &point.graph_id {
                self.graph_ids
                    .insert(graph_id.clone(), RefTarget::Point(id, i));
            }
        }
        if let Some(group_id) = &element.group_id {
            self.group_ids.insert(group_id.clone(), id);
        }
    }

    fn register_references(&mut self, id: ElementId, element: &PathwayElement) {
        for (i, point) in element.points.iter().enumerate() {
            if let Some(graph_ref) = &point.graph_ref {
                self.graph_refs
                    .entry(graph_ref.clone())
                    .or_default()
                    .insert(RefSite::Point(id, i));
            }
        }
        if let Some(graph_ref) = &element.graph_ref {
            self.graph_refs
                .entry(graph_ref.clone())
                .or_default()
                .insert(RefSite::Element(id));
        }
        if let Some(group_ref) = &element.group_ref {
            self.group_refs
                .entry(group_ref.clone())
                .or_default()
                .insert(id);
        }
    }

    /// Removes an element, detaching all inbound references first and
    /// unregistering every id it declared.
    ///
    /// Removing the last member of a group removes the group element as
    /// well; removing a group clears the membership of its members without
    /// deleting them.
    pub fn remove(&mut self, id: ElementId) -> Result<PathwayElement, ModelError> {
        if self.element(id).is_none() {
            return Err(ModelError::StaleHandle);
        }
        if id == self.mappinfo {
            return Err(ModelError::PermanentElement);
        }
        Ok(self.force_remove(id))
    }

    fn force_remove(&mut self, id: ElementId) -> PathwayElement {
        let element = self.slots[id.0 as usize]
            .take()
            .expect("force_remove on a vacant slot");
        self.order.retain(|other| *other != id);

        // Inbound references: detach every site still pointing at an id this
        // element declared, so nothing dangles.
        for declared in element.declared_graph_ids() {
            if let Some(sites) = self.graph_refs.remove(&declared) {
                for site in sites {
                    self.clear_site(site);
                    self.events.emit(ModelEvent::Modified(site.element()));
                }
            }
            self.graph_ids.remove(&declared);
        }

        // Outbound references held by the removed element itself.
        for (i, point) in element.points.iter().enumerate() {
            if let Some(graph_ref) = &point.graph_ref {
                self.drop_ref_site(graph_ref, RefSite::Point(id, i));
            }
        }
        if let Some(graph_ref) = &element.graph_ref {
            self.drop_ref_site(graph_ref, RefSite::Element(id));
        }

        if let Some(group_id) = &element.group_id {
            self.group_ids.remove(group_id);
            if let Some(members) = self.group_refs.remove(group_id) {
                for member in members {
                    if let Some(el) = self.slots[member.0 as usize].as_mut() {
                        el.group_ref = None;
                    }
                    self.events.emit(ModelEvent::Modified(member));
                }
            }
        }
        if let Some(group_ref) = element.group_ref.clone() {
            self.leave_group(&group_ref, id);
        }

        self.events.emit(ModelEvent::Removed(id));
        element
    }

    /// Clears the `graphRef` held at a site, leaving its absolute position
    /// in place.
    fn clear_site(&mut self, site: RefSite) {
        match site {
            RefSite::Point(el, index) => {
                if let Some(element) = self.slots[el.0 as usize].as_mut() {
                    if let Some(point) = element.points.get_mut(index) {
                        point.graph_ref = None;
                        point.relative_set = false;
                    }
                }
            }
            RefSite::Element(el) => {
                if let Some(element) = self.slots[el.0 as usize].as_mut() {
                    element.graph_ref = None;
                }
            }
        }
    }

    fn drop_ref_site(&mut self, graph_ref: &str, site: RefSite) {
        if let Some(sites) = self.graph_refs.get_mut(graph_ref) {
            sites.shift_remove(&site);
            if sites.is_empty() {
                self.graph_refs.remove(graph_ref);
            }
        }
    }

    /// Drops `member` from a group, removing the group element itself when
    /// it was the last member.
    fn leave_group(&mut self, group_ref: &str, member: ElementId) {
        let Some(members) = self.group_refs.get_mut(group_ref) else {
            return;
        };
        members.shift_remove(&member);
        if members.is_empty() {
            self.group_refs.remove(group_ref);
            if let Some(group) = self.group_ids.get(group_ref).copied() {
                if self.element(group).is_some() {
                    self.force_remove(group);
                }
            }
        } else if let Some(group) = self.group_ids.get(group_ref).copied() {
            self.events.emit(ModelEvent::Modified(group));
        }
    }

    /// Mutates an element in place through a closure, then re-syncs the
    /// registry with whatever changed: re-registered ids, re-linked
    /// references, group membership, board size, and the positions of every
    /// referrer that sticks to this element.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateGraphId`] / [`ModelError::DuplicateGroupId`]
    /// when the closure assigned an id that is already taken; the element is
    /// rolled back to its previous state.
    pub fn modify<F>(&mut self, id: ElementId, f: F) -> Result<(), ModelError>
    where
        F: FnOnce(&mut PathwayElement),
    {
        let mut element = self
            .slots
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(ModelError::StaleHandle)?;
        let backup = element.clone();
        f(&mut element);

        if let Err(err) = self.check_modified_ids(id, &backup, &element) {
            self.slots[id.0 as usize] = Some(backup);
            return Err(err);
        }

        self.unregister_for_modify(id, &backup);
        self.register_declarations(id, &element);
        self.register_references(id, &element);
        let old_group = backup.group_ref.clone();
        let new_group = element.group_ref.clone();
        self.slots[id.0 as usize] = Some(element);

        if old_group != new_group {
            if let Some(group_ref) = &old_group {
                self.leave_group(group_ref, id);
            }
        }

        self.check_board_size(id);
        self.refresh_dependents(id, &mut HashSet::new());
        self.events.emit(ModelEvent::Modified(id));
        Ok(())
    }

    fn check_modified_ids(
        &self,
        id: ElementId,
        before: &PathwayElement,
        after: &PathwayElement,
    ) -> Result<(), ModelError> {
        let previous: HashSet<String> = before.declared_graph_ids().into_iter().collect();
        let mut seen = HashSet::new();
        for graph_id in after.declared_graph_ids() {
            if !seen.insert(graph_id.clone()) {
                return Err(ModelError::DuplicateGraphId { id: graph_id });
            }
            if previous.contains(&graph_id) {
                continue;
            }
            if self.graph_ids.contains_key(&graph_id) {
                return Err(ModelError::DuplicateGraphId { id: graph_id });
            }
        }
        if let Some(group_id) = &after.group_id {
            if before.group_id.as_ref() != Some(group_id)
                && self.group_ids.get(group_id).is_some_and(|g| *g != id)
            {
                return Err(ModelError::DuplicateGroupId {
                    id: group_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Removes the registrations a previous version of the element held.
    /// Inbound referrer sets survive: unregistering an id leaves referrers
    /// with an unresolved reference, it does not auto-null them, because the
    /// document may be re-parented later.
    fn unregister_for_modify(&mut self, id: ElementId, before: &PathwayElement) {
        for declared in before.declared_graph_ids() {
            self.graph_ids.remove(&declared);
        }
        if let Some(group_id) = &before.group_id {
            self.group_ids.remove(group_id);
        }
        for (i, point) in before.points.iter().enumerate() {
            if let Some(graph_ref) = &point.graph_ref {
                self.drop_ref_site(graph_ref, RefSite::Point(id, i));
            }
        }
        if let Some(graph_ref) = &before.graph_ref {
            self.drop_ref_site(graph_ref, RefSite::Element(id));
        }
        if let Some(group_ref) = &before.group_ref {
            if let Some(members) = self.group_refs.get_mut(group_ref) {
                members.shift_remove(&id);
            }
        }
    }

    // ---- graph-link registry ----

    /// Resolves a graph id to its declaring target.
    pub fn resolve(&self, graph_id: &str) -> Option<RefTarget> {
        self.graph_ids.get(graph_id).copied()
    }

    /// Handle of the element declaring `graph_id` (directly, or through one
    /// of its anchors or points).
    pub fn element_by_graph_id(&self, graph_id: &str) -> Option<ElementId> {
        self.resolve(graph_id).map(RefTarget::element)
    }

    /// All graph ids currently declared in the model.
    pub fn graph_ids(&self) -> impl Iterator<Item = &str> {
        self.graph_ids.keys().map(String::as_str)
    }

    /// Defensive copy of the sites currently referring to `graph_id`.
    pub fn referrers(&self, graph_id: &str) -> Vec<RefSite> {
        self.graph_refs
            .get(graph_id)
            .map(|sites| sites.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Handle of the group declaring `group_id`.
    pub fn group_by_id(&self, group_id: &str) -> Option<ElementId> {
        self.group_ids.get(group_id).copied()
    }

    /// The members of a group, by reference: elements whose `group_ref`
    /// names this group.
    pub fn group_elements(&self, group_id: &str) -> Vec<ElementId> {
        self.group_refs
            .get(group_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Links a line point to the element declaring `target_id`, deriving the
    /// relative offset from the point's current absolute position.
    pub fn link_point(
        &mut self,
        line: ElementId,
        index: usize,
        target_id: &str,
    ) -> Result<(), ModelError> {
        let target = self
            .resolve(target_id)
            .ok_or_else(|| ModelError::UnresolvedReference {
                id: target_id.to_owned(),
            })?;
        let position = {
            let element = self.element(line).ok_or(ModelError::StaleHandle)?;
            element
                .points
                .get(index)
                .ok_or(ModelError::StaleHandle)?
                .position()
        };
        let (rel_x, rel_y) = self
            .to_relative(target, position)
            .ok_or(ModelError::StaleHandle)?;

        let element = self.slots[line.0 as usize]
            .as_mut()
            .ok_or(ModelError::StaleHandle)?;
        let point = &mut element.points[index];
        if let Some(old_ref) = point.graph_ref.take() {
            self.drop_ref_site(&old_ref, RefSite::Point(line, index));
        }
        let element = self.slots[line.0 as usize]
            .as_mut()
            .expect("element checked above");
        let point = &mut element.points[index];
        point.graph_ref = Some(target_id.to_owned());
        point.set_relative(rel_x, rel_y);
        self.graph_refs
            .entry(target_id.to_owned())
            .or_default()
            .insert(RefSite::Point(line, index));
        self.events.emit(ModelEvent::Modified(line));
        Ok(())
    }

    /// Severs a point's link. The point keeps its current absolute position.
    pub fn unlink_point(&mut self, line: ElementId, index: usize) -> Result<(), ModelError> {
        let element = self
            .slots
            .get_mut(line.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(ModelError::StaleHandle)?;
        let point = element.points.get_mut(index).ok_or(ModelError::StaleHandle)?;
        let Some(graph_ref) = point.graph_ref.take() else {
            return Ok(());
        };
        point.relative_set = false;
        self.drop_ref_site(&graph_ref, RefSite::Point(line, index));
        self.events.emit(ModelEvent::Modified(line));
        Ok(())
    }

    /// Translates a relative offset in the target's local frame into an
    /// absolute point.
    ///
    /// For element targets the frame has its origin at the element center
    /// and is scaled by half-width/half-height, so `(±1, ±1)` lands on the
    /// boundary. Anchor and point targets translate by their own absolute
    /// position.
    pub fn to_absolute(&self, target: RefTarget, rel_x: f64, rel_y: f64) -> Option<Point> {
        match target {
            RefTarget::Element(id) => {
                let bounds = self.element(id)?.bounds();
                let mut x = rel_x;
                let mut y = rel_y;
                if bounds.width() != 0.0 {
                    x *= bounds.width() / 2.0;
                }
                if bounds.height() != 0.0 {
                    y *= bounds.height() / 2.0;
                }
                Some(Point::new(
                    x + bounds.center().x(),
                    y + bounds.center().y(),
                ))
            }
            RefTarget::Anchor(line, index) => {
                let element = self.element(line)?;
                let anchor = element.anchors.get(index)?;
                let shape = self.connector_shape(line)?;
                let base = shape.point_at_line_coordinate(anchor.position);
                Some(Point::new(base.x() + rel_x, base.y() + rel_y))
            }
            RefTarget::Point(line, index) => {
                let point = self.element(line)?.points.get(index)?.position();
                Some(Point::new(point.x() + rel_x, point.y() + rel_y))
            }
        }
    }

    /// Inverse of [`to_absolute`](Self::to_absolute): expresses an absolute
    /// point in the target's local frame, producing components in `[-1,1]`
    /// for points on an element target's boundary.
    pub fn to_relative(&self, target: RefTarget, point: Point) -> Option<(f64, f64)> {
        match target {
            RefTarget::Element(id) => {
                let bounds = self.element(id)?.bounds();
                let mut rel_x = point.x() - bounds.center().x();
                let mut rel_y = point.y() - bounds.center().y();
                if rel_x != 0.0 && bounds.width() != 0.0 {
                    rel_x /= bounds.width() / 2.0;
                }
                if rel_y != 0.0 && bounds.height() != 0.0 {
                    rel_y /= bounds.height() / 2.0;
                }
                Some((rel_x, rel_y))
            }
            RefTarget::Anchor(line, index) => {
                let element = self.element(line)?;
                let anchor = element.anchors.get(index)?;
                let shape = self.connector_shape(line)?;
                let base = shape.point_at_line_coordinate(anchor.position);
                Some((point.x() - base.x(), point.y() - base.y()))
            }
            RefTarget::Point(line, index) => {
                let base = self.element(line)?.points.get(index)?.position();
                Some((point.x() - base.x(), point.y() - base.y()))
            }
        }
    }

    /// Call after changing an element's geometry outside [`modify`]: every
    /// referrer linked to it recomputes its absolute position from its
    /// stored relative offset, so sticky connections survive moves and
    /// resizes.
    ///
    /// [`modify`]: Self::modify
    pub fn notify_moved(&mut self, id: ElementId) {
        self.refresh_dependents(id, &mut HashSet::new());
        self.check_board_size(id);
    }

    /// Call immediately after changing any of a line's point positions so
    /// that anchors along its routed path, and everything attached to them,
    /// stay valid.
    pub fn recalculate_shape(&mut self, line: ElementId) {
        self.refresh_dependents(line, &mut HashSet::new());
    }

    fn refresh_dependents(&mut self, id: ElementId, visited: &mut HashSet<ElementId>) {
        if !visited.insert(id) {
            return;
        }
        let Some(element) = self.element(id) else {
            return;
        };
        for declared in element.declared_graph_ids() {
            let Some(target) = self.resolve(&declared) else {
                continue;
            };
            let sites = self.referrers(&declared);
            for site in sites {
                match site {
                    RefSite::Point(line, index) => {
                        let Some((rel_x, rel_y)) = self
                            .element(line)
                            .and_then(|el| el.points.get(index))
                            .filter(|p| p.relative_set)
                            .map(|p| (p.rel_x, p.rel_y))
                        else {
                            continue;
                        };
                        let Some(abs) = self.to_absolute(target, rel_x, rel_y) else {
                            continue;
                        };
                        if let Some(el) = self.slots[line.0 as usize].as_mut() {
                            el.points[index].x = abs.x();
                            el.points[index].y = abs.y();
                        }
                        self.events.emit(ModelEvent::Modified(line));
                        self.refresh_dependents(line, visited);
                    }
                    RefSite::Element(state) => {
                        let Some((rel_x, rel_y)) =
                            self.element(state).map(|el| (el.rel_x, el.rel_y))
                        else {
                            continue;
                        };
                        let Some(abs) = self.to_absolute(target, rel_x, rel_y) else {
                            continue;
                        };
                        if let Some(el) = self.slots[state.0 as usize].as_mut() {
                            el.center_x = abs.x();
                            el.center_y = abs.y();
                        }
                        self.events.emit(ModelEvent::Modified(state));
                        self.refresh_dependents(state, visited);
                    }
                }
            }
        }
    }

    /// The routed path of a line element, or `None` for other kinds.
    ///
    /// Attachment sides come from the endpoints' relative offsets when
    /// linked, defaulting to west/east otherwise. Elbow lines synthesize
    /// their bends; every other connector type routes straight through the
    /// line's points.
    pub fn connector_shape(&self, id: ElementId) -> Option<ConnectorShape> {
        let element = self.element(id)?;
        if !element.kind().is_line() {
            return None;
        }
        if element.connector_type == ConnectorType::Elbow {
            let mut restrictions =
                ConnectorRestrictions::new(element.start_point(), element.end_point());
            if let Some(point) = element.points.first().filter(|p| p.relative_set) {
                restrictions.start_side = Side::from_relative_offset(point.rel_x, point.rel_y);
            }
            if let Some(point) = element.points.last().filter(|p| p.relative_set) {
                restrictions.end_side = Side::from_relative_offset(point.rel_x, point.rel_y);
            }
            if element.points.len() > 2 {
                restrictions.waypoints = element.points[1..element.points.len() - 1]
                    .iter()
                    .map(|p| p.position())
                    .collect();
            }
            Some(ConnectorShape::elbow(&restrictions))
        } else {
            let points: Vec<Point> = element.points.iter().map(|p| p.position()).collect();
            Some(ConnectorShape::from_waypoints(&points))
        }
    }

    // ---- ids ----

    /// Generates a random graph id not yet in use, unique across graph and
    /// group ids: hex digits with a letter prefix, widening once the id
    /// space gets crowded.
    pub fn unique_graph_id(&self) -> String {
        self.random_unique_id(self.graph_ids.len())
    }

    /// Generates a random group id not yet in use.
    pub fn unique_group_id(&self) -> String {
        self.random_unique_id(self.group_ids.len())
    }

    fn random_unique_id(&self, population: usize) -> String {
        let mut rng = rand::rng();
        let (modulus, min): (u64, u64) = if population > 0x10000 {
            (0x6000_0000, 0xa000_0000)
        } else {
            (0x60000, 0xa0000)
        };
        loop {
            let id = format!("{:x}", rng.random_range(0..modulus) + min);
            if !self.graph_ids.contains_key(&id) && !self.group_ids.contains_key(&id) {
                return id;
            }
        }
    }

    // ---- board size ----

    /// Current drawing board size, grown to fit the elements.
    pub fn board_size(&self) -> (f64, f64) {
        (self.board_width, self.board_height)
    }

    fn check_board_size(&mut self, id: ElementId) {
        let Some(element) = self.element(id) else {
            return;
        };
        let bounds = element.bounds();
        let needed_width = BOARD_BORDER + bounds.max_x();
        let needed_height = BOARD_BORDER + bounds.max_y();
        let width = self.board_width.max(needed_width);
        let height = self.board_height.max(needed_height);
        if (self.board_width - width).abs() + (self.board_height - height).abs() > 0.01 {
            self.board_width = width;
            self.board_height = height;
            self.events.emit(ModelEvent::BoardResized);
        }
    }

    // ---- maintenance ----

    /// Clears `graphRef`s pointing at ids nothing declares, returning the
    /// number of repairs. A fallback called before writing; under normal
    /// circumstances it finds nothing.
    pub fn fix_references(&mut self) -> usize {
        let mut stale: Vec<(RefSite, String)> = Vec::new();
        for (id, element) in self.elements() {
            for (i, point) in element.points.iter().enumerate() {
                if let Some(graph_ref) = &point.graph_ref {
                    if !self.graph_ids.contains_key(graph_ref) {
                        stale.push((RefSite::Point(id, i), graph_ref.clone()));
                    }
                }
            }
            if let Some(graph_ref) = &element.graph_ref {
                if !self.graph_ids.contains_key(graph_ref) {
                    stale.push((RefSite::Element(id), graph_ref.clone()));
                }
            }
        }
        for (site, graph_ref) in &stale {
            self.clear_site(*site);
            self.drop_ref_site(graph_ref, *site);
        }
        if !stale.is_empty() {
            warn!(count = stale.len(); "repaired dangling references");
        }
        stale.len()
    }

    // ---- events ----

    /// Registers a change listener. Listeners receive events only and must
    /// not re-enter the model.
    pub fn subscribe(&mut self, listener: impl Fn(&ModelEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.events.unsubscribe(id)
    }

    /// Runs a batch of mutations, delivering a single consolidated
    /// notification when the outermost scope exits.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.events.begin_batch();
        let result = f(self);
        self.events.end_batch();
        result
    }
}

impl Default for PathwayModel {
    fn default() -> Self {
        Self::new()
    }
}
