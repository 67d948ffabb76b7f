//! Composite field kinds
//!
//! Nested models, collections of nested models and choice collections.
//! Errors of nested values carry a path relative to the field
//! (`street`, `[2].street`), prefixed further by the owning model.

use super::{Field, FieldKind};
use crate::converters::Context;
use crate::error::{join_path, ConversionError};
use crate::error_map::ErrorMap;
use crate::models::{Instance, Model};
use crate::validators::IdentityStore;
use crate::values::{ChoiceItem, Native, Value};
use log::{debug, trace};
use std::sync::Arc;

type Result<T> = std::result::Result<T, ConversionError>;

fn index(i: usize) -> String {
    format!("[{}]", i)
}

/// A sequence, or a single value promoted to a one-element sequence
fn as_sequence(value: &Value) -> &[Value] {
    match value {
        Value::Seq(items) => items,
        other => std::slice::from_ref(other),
    }
}

pub(super) fn to_instance(model: &Arc<Model>, value: &Value, ctx: &Context) -> Result<Instance> {
    Instance::from_value(model, value, ctx)
}

pub(super) fn to_instances(
    model: &Arc<Model>,
    value: &Value,
    ctx: &Context,
) -> Result<Vec<Instance>> {
    let strict = ctx.mode().is_strict();
    as_sequence(value)
        .iter()
        .enumerate()
        .map(|(i, item)| match Instance::from_value(model, item, ctx) {
            Ok(instance) => Ok(instance),
            Err(e) if strict => Err(e.prefixed(&index(i))),
            // keeps the position of later elements
            Err(e) => {
                debug!("Element [{}] of {} collection rejected: {}", i, model.name(), e);
                Ok(Instance::rejected(model, e))
            }
        })
        .collect()
}

pub(super) fn to_items(
    members: &[(String, Field)],
    value: &Value,
    ctx: &Context,
) -> Result<Vec<ChoiceItem>> {
    as_sequence(value)
        .iter()
        .enumerate()
        .map(|(i, item)| to_item(members, i, item, ctx))
        .collect()
}

/// Convert every element of a choice collection, collecting each failure
/// under its own `[i]` path
pub(super) fn to_items_lax(
    members: &[(String, Field)],
    value: &Value,
    ctx: &Context,
) -> std::result::Result<Vec<ChoiceItem>, Vec<ConversionError>> {
    let mut items = Vec::new();
    let mut failures = Vec::new();
    for (i, item) in as_sequence(value).iter().enumerate() {
        match to_item(members, i, item, ctx) {
            Ok(choice) => items.push(choice),
            Err(e) => failures.push(e),
        }
    }
    if failures.is_empty() {
        Ok(items)
    } else {
        Err(failures)
    }
}

fn to_item(members: &[(String, Field)], i: usize, item: &Value, ctx: &Context) -> Result<ChoiceItem> {
    let strict = ctx.as_strict();
    for (name, member) in members {
        match member.to_native(Some(item), &strict) {
            Ok(Some(native)) => {
                debug!("Choice element [{}] resolved to member '{}'", i, name);
                return Ok(ChoiceItem::new(name.as_str(), native));
            }
            Ok(None) => {}
            Err(e) => trace!("Member '{}' rejected element [{}]: {}", name, i, e),
        }
    }

    let names: Vec<&str> = members.iter().map(|(name, _)| name.as_str()).collect();
    Err(ConversionError::new(format!(
        "no choice member accepts the value (members: {})",
        names.join(", ")
    ))
    .with_value(item.to_string())
    .with_path(index(i)))
}

/// Render a nested instance; a mapping holding only text becomes a scalar
pub(super) fn from_instance(instance: &Instance, ctx: &Context) -> Result<Value> {
    let mut map = instance.to_primitive_with(ctx)?;
    if map.len() == 1 {
        if let Some(text) = map.shift_remove(ctx.config().text_key()) {
            return Ok(text);
        }
    }
    Ok(Value::Map(map))
}

pub(super) fn from_instances(instances: &[Instance], ctx: &Context) -> Result<Value> {
    instances
        .iter()
        .enumerate()
        .map(|(i, instance)| from_instance(instance, ctx).map_err(|e| e.prefixed(&index(i))))
        .collect::<Result<Vec<_>>>()
        .map(Value::Seq)
}

pub(super) fn from_items(
    members: &[(String, Field)],
    items: &[ChoiceItem],
    ctx: &Context,
) -> Result<Value> {
    let mut values = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let member = members
            .iter()
            .find(|(name, _)| *name == item.member)
            .map(|(_, field)| field)
            .ok_or_else(|| {
                ConversionError::new(format!("unknown choice member '{}'", item.member))
                    .with_path(index(i))
            })?;
        values.push(
            member
                .to_primitive(&item.value, ctx)
                .map_err(|e| e.prefixed(&index(i)))?,
        );
    }
    Ok(Value::Seq(values))
}

/// Validate the nested values of a composite field at `path`
pub(super) fn collect_nested(
    kind: &FieldKind,
    path: &str,
    value: &Native,
    errors: &mut ErrorMap,
    ids: &mut IdentityStore,
) {
    match (kind, value) {
        (FieldKind::Model(_), Native::Instance(instance)) => {
            instance.collect_into(path, errors, ids);
        }
        (FieldKind::Models(_), Native::Instances(instances)) => {
            for (i, instance) in instances.iter().enumerate() {
                instance.collect_into(&join_path(path, &index(i)), errors, ids);
            }
        }
        (FieldKind::Choice(members), Native::Items(items)) => {
            for (i, item) in items.iter().enumerate() {
                if let Some((_, member)) = members.iter().find(|(name, _)| *name == item.member) {
                    member.collect(&join_path(path, &index(i)), Some(&item.value), errors, ids);
                }
            }
        }
        _ => {}
    }
}
