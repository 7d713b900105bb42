use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::errors::{aggregate, concat_non_empty, property_value_string, sort_errors, PropertyError};
use crate::plan::{PlanBuilder, PlanSink};
use crate::property::{conditions, for_field, get_self, matches, CascadeMode, Predicate, PropertyRules, PropertyValue};
use crate::rule::Rule;
use crate::validator::{PropertyValidator, Validator};

/// Key and value of one map entry, for rules that need both.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapItem<K, V> {
    pub key: K,
    pub value: V,
}

type MapGetter<K, V, S> = Arc<dyn Fn(&S) -> BTreeMap<K, V> + Send + Sync>;

/// Rules for a map property: whole-map rules plus key, value and item rules.
pub struct PropertyRulesForMap<K, V, S> {
    map_rules: PropertyRules<BTreeMap<K, V>, BTreeMap<K, V>>,
    key_rules: PropertyRules<K, K>,
    value_rules: PropertyRules<V, V>,
    item_rules: PropertyRules<MapItem<K, V>, MapItem<K, V>>,
    getter: MapGetter<K, V, S>,
    mode: CascadeMode,
    predicates: Vec<Predicate<S>>,
}

pub fn for_map<K, V, S, F>(getter: F) -> PropertyRulesForMap<K, V, S>
where
    K: PropertyValue + Ord + Clone + fmt::Display,
    V: PropertyValue + Clone,
    S: 'static,
    F: Fn(&S) -> BTreeMap<K, V> + Send + Sync + 'static,
{
    PropertyRulesForMap {
        map_rules: for_field(get_self()),
        key_rules: for_field(get_self()),
        value_rules: for_field(get_self()),
        item_rules: for_field(get_self()),
        getter: Arc::new(getter),
        mode: CascadeMode::Continue,
        predicates: Vec::new(),
    }
}

impl<K, V, S> PropertyRulesForMap<K, V, S>
where
    K: PropertyValue + Ord + Clone + fmt::Display,
    V: PropertyValue + Clone,
    S: 'static,
{
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.map_rules = self.map_rules.with_name(name);
        self
    }

    pub fn rules<R: Rule<BTreeMap<K, V>> + 'static>(mut self, rule: R) -> Self {
        self.map_rules = self.map_rules.rule(rule);
        self
    }

    pub fn rules_for_keys<R: Rule<K> + 'static>(mut self, rule: R) -> Self {
        self.key_rules = self.key_rules.rule(rule);
        self
    }

    pub fn rules_for_values<R: Rule<V> + 'static>(mut self, rule: R) -> Self {
        self.value_rules = self.value_rules.rule(rule);
        self
    }

    pub fn rules_for_items<R: Rule<MapItem<K, V>> + 'static>(mut self, rule: R) -> Self {
        self.item_rules = self.item_rules.rule(rule);
        self
    }

    pub fn include_for_keys(mut self, validator: Validator<K>) -> Self {
        self.key_rules = self.key_rules.include(validator);
        self
    }

    pub fn include_for_values(mut self, validator: Validator<V>) -> Self {
        self.value_rules = self.value_rules.include(validator);
        self
    }

    pub fn include_for_items(mut self, validator: Validator<MapItem<K, V>>) -> Self {
        self.item_rules = self.item_rules.include(validator);
        self
    }

    pub fn when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Predicate::new(predicate, ""));
        self
    }

    pub fn cascade(mut self, mode: CascadeMode) -> Self {
        self.mode = mode;
        self.map_rules = self.map_rules.cascade(mode);
        self.key_rules = self.key_rules.cascade(mode);
        self.value_rules = self.value_rules.cascade(mode);
        self.item_rules = self.item_rules.cascade(mode);
        self
    }

    pub fn stop_on_error(self) -> Self {
        self.cascade(CascadeMode::Stop)
    }
}

impl<K, V, S> PropertyValidator<S> for PropertyRulesForMap<K, V, S>
where
    K: PropertyValue + Ord + Clone + fmt::Display,
    V: PropertyValue + Clone,
    S: 'static,
{
    fn validate(&self, st: &S) -> Vec<PropertyError> {
        if !matches(&self.predicates, st) {
            return Vec::new();
        }
        let map = (self.getter)(st);
        let mut errs = self.map_rules.validate(&map);
        if !errs.is_empty() && self.mode == CascadeMode::Stop {
            return errs;
        }
        for (key, value) in &map {
            let entry_name = concat_non_empty(&self.map_rules.name, &key.to_string(), ".");
            for mut err in self.key_rules.validate(key) {
                err.is_key_error = true;
                errs.push(err.prepend_property_name(&entry_name));
            }
            for err in self.value_rules.validate(value) {
                errs.push(err.prepend_property_name(&entry_name));
            }
            let item = MapItem { key: key.clone(), value: value.clone() };
            for mut err in self.item_rules.validate(&item) {
                if err.property_name.is_empty() {
                    err.property_value = property_value_string(value);
                }
                errs.push(err.prepend_property_name(&entry_name));
            }
        }
        let mut errs = aggregate(errs);
        sort_errors(&mut errs);
        errs
    }

    fn plan(&self, builder: &PlanBuilder, sink: &mut PlanSink) {
        let b = builder.clone().with_conditions(conditions(&self.predicates));
        self.map_rules.plan(&b, sink);
        let name = &self.map_rules.name;
        self.key_rules.plan(&b.child(&concat_non_empty(name, "~", ".")), sink);
        self.value_rules.plan(&b.child(&concat_non_empty(name, "*", ".")), sink);
        self.item_rules.plan(&b.child(&concat_non_empty(name, "*", ".")), sink);
    }
}
