//! Action descriptors and composition of their schemas into one output schema

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::ComposeError;

/// Default property name used when the sequence is wrapped in an object
pub const DEFAULT_ENVELOPE_FIELD: &str = "actions";

/// A named kind of structured output the model may emit.
///
/// Descriptors without a schema are accepted but contribute nothing to the
/// composed output schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl ActionDescriptor {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema),
        }
    }

    pub fn without_schema(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
        }
    }
}

/// Output schema for a sequence of actions
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    members: Vec<Value>,
    schema: Value,
}

impl UnionSchema {
    /// Array schema; items are the single member or an `anyOf` of all members
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn into_schema(self) -> Value {
        self.schema
    }

    pub fn members(&self) -> &[Value] {
        &self.members
    }

    /// Object schema with the sequence under a single required property.
    ///
    /// Some providers only accept an object at the top level of a
    /// structured-output schema.
    pub fn enveloped(&self, field: &str) -> Value {
        self.enveloped_with(field, &Map::new())
    }

    /// Envelope that also accepts `optional` properties next to the sequence
    pub fn enveloped_with(&self, field: &str, optional: &Map<String, Value>) -> Value {
        let mut properties = optional.clone();
        properties.insert(field.to_string(), self.schema.clone());

        json!({
            "type": "object",
            "properties": properties,
            "required": [field]
        })
    }
}

/// Compose the schemas of `actions` in registration order
pub fn compose(actions: &[ActionDescriptor]) -> Result<UnionSchema, ComposeError> {
    let members: Vec<Value> = actions.iter().filter_map(|a| a.schema.clone()).collect();

    let items = match members.as_slice() {
        [] => return Err(ComposeError::EmptySet),
        [single] => single.clone(),
        _ => json!({ "anyOf": members.clone() }),
    };

    Ok(UnionSchema {
        schema: json!({ "type": "array", "items": items }),
        members,
    })
}

/// Ordered set of actions an extraction task accepts
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: Vec<ActionDescriptor>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action(mut self, action: ActionDescriptor) -> Self {
        self.register(action);
        self
    }

    pub fn register(&mut self, action: ActionDescriptor) {
        self.actions.push(action);
    }

    pub fn extend(&mut self, actions: impl IntoIterator<Item = ActionDescriptor>) {
        self.actions.extend(actions);
    }

    pub fn actions(&self) -> &[ActionDescriptor] {
        &self.actions
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|a| a.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn compose(&self) -> Result<UnionSchema, ComposeError> {
        compose(&self.actions)
    }
}

impl FromIterator<ActionDescriptor> for ActionRegistry {
    fn from_iter<I: IntoIterator<Item = ActionDescriptor>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_with_tag(tag: &str) -> Value {
        json!({
            "type": "object",
            "properties": {"tag": {"const": tag}},
            "required": ["tag"]
        })
    }

    #[test]
    fn test_empty_set_is_rejected() {
        assert_eq!(compose(&[]), Err(ComposeError::EmptySet));
        assert_eq!(
            compose(&[ActionDescriptor::without_schema("noop")]),
            Err(ComposeError::EmptySet)
        );
    }

    #[test]
    fn test_single_schema_is_used_directly() {
        let schema = schema_with_tag("a");
        let union = compose(&[ActionDescriptor::new("a", schema.clone())]).unwrap();

        assert_eq!(union.schema(), &json!({"type": "array", "items": schema}));
        assert_eq!(union.members().len(), 1);
    }

    #[test]
    fn test_multiple_schemas_form_any_of_in_order() {
        let a = schema_with_tag("a");
        let b = schema_with_tag("b");
        let c = schema_with_tag("c");

        let union = compose(&[
            ActionDescriptor::new("a", a.clone()),
            ActionDescriptor::without_schema("skipped"),
            ActionDescriptor::new("b", b.clone()),
            ActionDescriptor::new("c", c.clone()),
        ])
        .unwrap();

        assert_eq!(
            union.schema(),
            &json!({"type": "array", "items": {"anyOf": [a, b, c]}})
        );
    }

    #[test]
    fn test_composition_is_deterministic() {
        let actions = vec![
            ActionDescriptor::new("a", schema_with_tag("a")),
            ActionDescriptor::new("b", schema_with_tag("b")),
        ];
        assert_eq!(compose(&actions).unwrap(), compose(&actions).unwrap());
    }

    #[test]
    fn test_enveloped_schema() {
        let union = compose(&[ActionDescriptor::new("a", schema_with_tag("a"))]).unwrap();
        let wrapped = union.enveloped(DEFAULT_ENVELOPE_FIELD);

        assert_eq!(wrapped["type"], "object");
        assert_eq!(wrapped["required"], json!(["actions"]));
        assert_eq!(&wrapped["properties"]["actions"], union.schema());
    }

    #[test]
    fn test_enveloped_with_optional_properties() {
        let union = compose(&[ActionDescriptor::new("a", schema_with_tag("a"))]).unwrap();
        let mut optional = Map::new();
        optional.insert("title".into(), json!({"type": "string"}));

        let wrapped = union.enveloped_with("items", &optional);

        assert_eq!(wrapped["required"], json!(["items"]));
        assert_eq!(wrapped["properties"]["title"]["type"], "string");
        assert_eq!(&wrapped["properties"]["items"], union.schema());
    }

    #[test]
    fn test_registry_preserves_registration_order() {
        let mut registry = ActionRegistry::new()
            .with_action(ActionDescriptor::new("first", schema_with_tag("first")));
        registry.register(ActionDescriptor::new("second", schema_with_tag("second")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["first", "second"]);

        let union = registry.compose().unwrap();
        assert_eq!(union.schema()["items"]["anyOf"][0]["properties"]["tag"]["const"], "first");
    }

    #[test]
    fn test_descriptor_deserializes_without_schema() {
        let descriptor: ActionDescriptor = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert_eq!(descriptor, ActionDescriptor::without_schema("x"));
    }
}
