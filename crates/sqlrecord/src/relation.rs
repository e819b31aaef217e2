//! Lazy traversal of foreign keys.
//!
//! A relation is reached by name. Declared [`BelongsTo`] relations win;
//! otherwise `name` resolves through the column `name_id` when that column
//! is an introspected foreign key. Resolved records are cached on the
//! owning record by referenced table until it is reloaded, reset, or the
//! foreign-key column is reassigned.

use sqlrecord_core::{
    BelongsTo, ForeignKeyRef, Gateway, Result, SchemaError, conventional_fk_column,
};
use sqlrecord_query::Filter;

use crate::record::Record;

/// Materializes the record a foreign-key column points at.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeignKeyResolver;

impl ForeignKeyResolver {
    /// Look up the row `fk_column` of `owning` refers to, using the
    /// column's introspected foreign key.
    ///
    /// `Ok(None)` when the column is unset or nothing matches.
    pub fn resolve<'db, G: Gateway>(
        owning: &Record<'db, G>,
        fk_column: &str,
    ) -> Result<Option<Record<'db, G>>> {
        let target = owning
            .column_state(fk_column)?
            .metadata
            .foreign_key
            .clone()
            .ok_or_else(|| SchemaError::NotAForeignKey {
                table: owning.table().to_string(),
                column: fk_column.to_string(),
            })?;
        Self::resolve_target(owning, fk_column, &target)
    }

    /// Look up the row of `target` matching the value of `via` on `owning`.
    pub fn resolve_target<'db, G: Gateway>(
        owning: &Record<'db, G>,
        via: &str,
        target: &ForeignKeyRef,
    ) -> Result<Option<Record<'db, G>>> {
        let key = owning.get(via)?;
        if key.is_null() {
            return Ok(None);
        }
        let mut related = owning.database().record_for_table(&target.table)?;
        let filter = Filter::new().eq(target.column.clone(), key.clone());
        if related.find_by_columns(&filter)? {
            Ok(Some(related))
        } else {
            tracing::debug!(
                table = owning.table(),
                column = via,
                references = %target.table,
                "foreign key points at no row"
            );
            Ok(None)
        }
    }
}

impl<'db, G: Gateway> Record<'db, G> {
    /// Owning column and target of the relation `name`, if it is one.
    pub fn relation_target(&self, name: &str) -> Result<Option<(String, ForeignKeyRef)>> {
        if let Some(relation) = self.entity.and_then(|e| e.relation(name)) {
            let target = relation.target_in(&self.schema)?;
            return Ok(Some((relation.via.clone(), target)));
        }
        let via = conventional_fk_column(name);
        Ok(self
            .schema
            .column(&via)
            .and_then(|c| c.foreign_key.clone())
            .map(|target| (via, target)))
    }

    /// Whether `name` resolves to a relation rather than a column.
    pub fn is_relation(&self, name: &str) -> bool {
        self.entity.and_then(|e| e.relation(name)).is_some()
            || self
                .schema
                .column(&conventional_fk_column(name))
                .is_some_and(|c| c.is_foreign_key())
    }

    /// Related record for relation `name`, loading it on first access.
    ///
    /// `Ok(None)` when the foreign key is unset or points at no row; a miss
    /// is not cached. Fails with `SchemaError::UnknownRelation` when `name`
    /// is not a relation.
    pub fn related(&mut self, name: &str) -> Result<Option<&Record<'db, G>>> {
        let (via, target) =
            self.relation_target(name)?
                .ok_or_else(|| SchemaError::UnknownRelation {
                    table: self.table().to_string(),
                    relation: name.to_string(),
                })?;

        if !self.related.contains_key(&target.table) {
            match ForeignKeyResolver::resolve_target(self, &via, &target)? {
                Some(record) => {
                    self.related.insert(target.table.clone(), record);
                }
                None => return Ok(None),
            }
        }
        Ok(self.related.get(&target.table))
    }

    /// Mutable access to a related record, loading it on first access.
    pub fn related_mut(&mut self, name: &str) -> Result<Option<&mut Record<'db, G>>> {
        let table = match self.related(name)? {
            Some(record) => record.table().to_string(),
            None => return Ok(None),
        };
        Ok(self.related.get_mut(&table))
    }

    /// Whether the related record of `table` is cached.
    pub fn is_related_cached(&self, table: &str) -> bool {
        self.related.contains_key(table)
    }

    /// Referenced tables reached through `column`, for cache invalidation.
    pub(crate) fn relation_tables_via(&self, column: &str) -> Vec<String> {
        let mut tables: Vec<String> = self
            .schema
            .column(column)
            .and_then(|c| c.foreign_key.as_ref())
            .map(|fk| fk.table.clone())
            .into_iter()
            .collect();
        if let Some(entity) = self.entity {
            tables.extend(
                entity
                    .relations()
                    .iter()
                    .filter(|r| r.via == column)
                    .filter_map(|r: &BelongsTo| r.target.as_ref().map(|t| t.table.clone())),
            );
        }
        tables
    }
}
