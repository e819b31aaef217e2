//! Per-table entity definitions: protected fields, relations and lifecycle
//! hooks.
//!
//! Tables need no definition at all to be used; an [`EntityDef`] only adds
//! behavior on top of what introspection discovers.

use std::fmt;

use sqlrecord_core::{BelongsTo, Result};

use crate::record::Record;

/// Named extension points in the persistence lifecycle.
///
/// Insert fires `BeforeValidate, BeforeInsert, BeforeSaveAfterValidate,
/// AfterInsert, AfterSave`; update fires the `Update` counterparts. The
/// validity check sits between `BeforeInsert`/`BeforeUpdate` and
/// `BeforeSaveAfterValidate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    BeforeValidate,
    BeforeInsert,
    BeforeUpdate,
    BeforeSaveAfterValidate,
    AfterInsert,
    AfterUpdate,
    AfterSave,
}

impl HookPoint {
    /// Every point, in firing order.
    pub const ALL: [HookPoint; 7] = [
        HookPoint::BeforeValidate,
        HookPoint::BeforeInsert,
        HookPoint::BeforeUpdate,
        HookPoint::BeforeSaveAfterValidate,
        HookPoint::AfterInsert,
        HookPoint::AfterUpdate,
        HookPoint::AfterSave,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// A lifecycle callback.
///
/// Returning an error aborts the save and propagates; recording a
/// validation error with [`Record::add_error`] in a `Before*` hook makes the
/// save report not-saved instead.
pub type Hook<G> = Box<dyn for<'db> Fn(&mut Record<'db, G>) -> Result<()> + Send + Sync>;

/// Ordered callbacks per [`HookPoint`].
pub struct Hooks<G> {
    slots: [Vec<Hook<G>>; 7],
}

impl<G> Default for Hooks<G> {
    fn default() -> Self {
        Self {
            slots: Default::default(),
        }
    }
}

impl<G> Hooks<G> {
    /// No callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback at `point`; callbacks run in registration order.
    pub fn register<F>(&mut self, point: HookPoint, hook: F)
    where
        F: for<'db> Fn(&mut Record<'db, G>) -> Result<()> + Send + Sync + 'static,
    {
        self.slots[point.index()].push(Box::new(hook));
    }

    /// Callbacks registered at `point`.
    pub fn at(&self, point: HookPoint) -> &[Hook<G>] {
        &self.slots[point.index()]
    }

    /// Total number of callbacks.
    pub fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    /// Whether no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<G> fmt::Debug for Hooks<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for point in HookPoint::ALL {
            let n = self.at(point).len();
            if n > 0 {
                map.entry(&point, &n);
            }
        }
        map.finish()
    }
}

/// Behavior attached to one entity.
///
/// ```ignore
/// let orders = EntityDef::new("orders")
///     .protect(["total"])
///     .belongs_to(BelongsTo::new("customer", "customer_id"))
///     .hook(HookPoint::BeforeValidate, |r| {
///         r.validates_presence_of("status", None)?;
///         Ok(())
///     });
/// ```
pub struct EntityDef<G> {
    name: String,
    protected: Vec<String>,
    relations: Vec<BelongsTo>,
    hooks: Hooks<G>,
}

impl<G> EntityDef<G> {
    /// Definition for the entity `name` (the table name without prefix).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            protected: Vec::new(),
            relations: Vec::new(),
            hooks: Hooks::new(),
        }
    }

    /// Entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Protect columns from form assignment, in addition to the defaults.
    pub fn protect<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Declare a many-to-one relation.
    pub fn belongs_to(mut self, relation: BelongsTo) -> Self {
        self.relations.push(relation);
        self
    }

    /// Register a lifecycle callback.
    pub fn hook<F>(mut self, point: HookPoint, hook: F) -> Self
    where
        F: for<'db> Fn(&mut Record<'db, G>) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.register(point, hook);
        self
    }

    /// Extra protected fields.
    pub fn protected_fields(&self) -> &[String] {
        &self.protected
    }

    /// Declared relations.
    pub fn relations(&self) -> &[BelongsTo] {
        &self.relations
    }

    /// Declared relation by name.
    pub fn relation(&self, name: &str) -> Option<&BelongsTo> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Registered hooks.
    pub fn hooks(&self) -> &Hooks<G> {
        &self.hooks
    }
}

impl<G> fmt::Debug for EntityDef<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDef")
            .field("name", &self.name)
            .field("protected", &self.protected)
            .field("relations", &self.relations)
            .field("hooks", &self.hooks)
            .finish()
    }
}
