use std::collections::HashMap;
use std::fmt;

use crate::{
    error::{NodeError, Result},
    sequence::{Frame, FrameSequence, MaskSequence},
};

/// Category every built-in node is listed under
pub const NODE_CATEGORY: &str = "Vace/VFX";

/// Core trait that all graph nodes must implement
///
/// A node declares its input and output ports and turns a set of named input
/// values into named output values. Hosts use the port declarations to build
/// their widgets; [`NodeRegistry::invoke`](super::NodeRegistry::invoke) uses
/// them to fill defaults and type-check before [`SequenceNode::call`] runs.
pub trait SequenceNode: Send + Sync {
    /// Returns the unique name of this node
    fn name(&self) -> &str;

    /// Returns the name shown in the host UI
    fn display_name(&self) -> &str;

    /// Returns a human-readable description of this node
    fn description(&self) -> &str;

    /// Menu category in the host UI
    fn category(&self) -> &str {
        NODE_CATEGORY
    }

    /// Input ports, in display order
    fn inputs(&self) -> Vec<PortSpec>;

    /// Output ports, in return order
    fn outputs(&self) -> Vec<PortSpec>;

    /// Run the node
    ///
    /// `inputs` has already been checked against [`SequenceNode::inputs`],
    /// with widget defaults filled in for absent optional values.
    fn call(&self, inputs: &NodeInputs) -> Result<NodeOutputs>;
}

/// Value type carried by a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortType {
    Images,
    Masks,
    Image,
    Text,
    Float,
    Int,
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PortType::Images => "IMAGE",
            PortType::Masks => "MASK",
            PortType::Image => "IMAGE (single frame)",
            PortType::Text => "STRING",
            PortType::Float => "FLOAT",
            PortType::Int => "INT",
        };
        f.write_str(name)
    }
}

/// UI widget declaration with its default value
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Text {
        default: String,
        placeholder: Option<String>,
    },
    Float {
        default: f32,
        min: f32,
        max: f32,
        step: f32,
    },
    Int {
        default: i64,
        min: i64,
        max: i64,
    },
}

impl Widget {
    /// Single-line text field
    pub fn text<S: Into<String>>(default: S) -> Self {
        Widget::Text {
            default: default.into(),
            placeholder: None,
        }
    }

    pub fn placeholder<S: Into<String>>(self, hint: S) -> Self {
        match self {
            Widget::Text { default, .. } => Widget::Text {
                default,
                placeholder: Some(hint.into()),
            },
            other => other,
        }
    }

    pub fn default_value(&self) -> NodeValue {
        match self {
            Widget::Text { default, .. } => NodeValue::Text(default.clone()),
            Widget::Float { default, .. } => NodeValue::Float(*default),
            Widget::Int { default, .. } => NodeValue::Int(*default),
        }
    }
}

/// Declaration of one input or output port
#[derive(Debug, Clone, PartialEq)]
pub struct PortSpec {
    pub name: String,
    pub port_type: PortType,
    pub required: bool,
    pub widget: Option<Widget>,
}

impl PortSpec {
    pub fn required<S: Into<String>>(name: S, port_type: PortType) -> Self {
        Self {
            name: name.into(),
            port_type,
            required: true,
            widget: None,
        }
    }

    pub fn optional<S: Into<String>>(name: S, port_type: PortType) -> Self {
        Self {
            required: false,
            ..Self::required(name, port_type)
        }
    }

    pub fn with_widget(mut self, widget: Widget) -> Self {
        self.widget = Some(widget);
        self
    }
}

/// A value flowing through a port
#[derive(Debug, Clone)]
pub enum NodeValue {
    Images(FrameSequence),
    Masks(MaskSequence),
    Image(Frame),
    Text(String),
    Float(f32),
    Int(i64),
}

impl NodeValue {
    pub fn port_type(&self) -> PortType {
        match self {
            NodeValue::Images(_) => PortType::Images,
            NodeValue::Masks(_) => PortType::Masks,
            NodeValue::Image(_) => PortType::Image,
            NodeValue::Text(_) => PortType::Text,
            NodeValue::Float(_) => PortType::Float,
            NodeValue::Int(_) => PortType::Int,
        }
    }
}

impl From<FrameSequence> for NodeValue {
    fn from(value: FrameSequence) -> Self {
        NodeValue::Images(value)
    }
}

impl From<MaskSequence> for NodeValue {
    fn from(value: MaskSequence) -> Self {
        NodeValue::Masks(value)
    }
}

impl From<Frame> for NodeValue {
    fn from(value: Frame) -> Self {
        NodeValue::Image(value)
    }
}

impl From<&str> for NodeValue {
    fn from(value: &str) -> Self {
        NodeValue::Text(value.to_string())
    }
}

impl From<String> for NodeValue {
    fn from(value: String) -> Self {
        NodeValue::Text(value)
    }
}

impl From<f32> for NodeValue {
    fn from(value: f32) -> Self {
        NodeValue::Float(value)
    }
}

impl From<i64> for NodeValue {
    fn from(value: i64) -> Self {
        NodeValue::Int(value)
    }
}

/// Named input values for one node call
#[derive(Debug, Clone, Default)]
pub struct NodeInputs {
    node: String,
    values: HashMap<String, NodeValue>,
}

impl NodeInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an input value
    pub fn set<K: Into<String>, V: Into<NodeValue>>(mut self, key: K, value: V) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert<K: Into<String>, V: Into<NodeValue>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&NodeValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub(crate) fn bind(&mut self, node: &str) {
        self.node = node.to_string();
    }

    fn missing(&self, key: &str) -> NodeError {
        NodeError::MissingInput {
            node: self.node.clone(),
            input: key.to_string(),
        }
    }

    fn mismatch(&self, key: &str, expected: PortType, found: &NodeValue) -> NodeError {
        NodeError::TypeMismatch {
            node: self.node.clone(),
            input: key.to_string(),
            expected: expected.to_string(),
            found: found.port_type().to_string(),
        }
    }

    pub fn images(&self, key: &str) -> Result<&FrameSequence> {
        match self.values.get(key) {
            Some(NodeValue::Images(images)) => Ok(images),
            Some(other) => Err(self.mismatch(key, PortType::Images, other).into()),
            None => Err(self.missing(key).into()),
        }
    }

    pub fn masks_opt(&self, key: &str) -> Result<Option<&MaskSequence>> {
        match self.values.get(key) {
            Some(NodeValue::Masks(masks)) => Ok(Some(masks)),
            Some(other) => Err(self.mismatch(key, PortType::Masks, other).into()),
            None => Ok(None),
        }
    }

    pub fn masks(&self, key: &str) -> Result<&MaskSequence> {
        self.masks_opt(key)?.ok_or_else(|| self.missing(key).into())
    }

    pub fn image_opt(&self, key: &str) -> Result<Option<&Frame>> {
        match self.values.get(key) {
            Some(NodeValue::Image(frame)) => Ok(Some(frame)),
            Some(other) => Err(self.mismatch(key, PortType::Image, other).into()),
            None => Ok(None),
        }
    }

    pub fn text(&self, key: &str) -> Result<&str> {
        match self.values.get(key) {
            Some(NodeValue::Text(text)) => Ok(text),
            Some(other) => Err(self.mismatch(key, PortType::Text, other).into()),
            None => Err(self.missing(key).into()),
        }
    }

    pub fn float(&self, key: &str) -> Result<f32> {
        match self.values.get(key) {
            Some(NodeValue::Float(value)) => Ok(*value),
            Some(NodeValue::Int(value)) => Ok(*value as f32),
            Some(other) => Err(self.mismatch(key, PortType::Float, other).into()),
            None => Err(self.missing(key).into()),
        }
    }

    pub fn int(&self, key: &str) -> Result<i64> {
        match self.values.get(key) {
            Some(NodeValue::Int(value)) => Ok(*value),
            Some(other) => Err(self.mismatch(key, PortType::Int, other).into()),
            None => Err(self.missing(key).into()),
        }
    }
}

/// Named output values of one node call, in declaration order
#[derive(Debug, Clone, Default)]
pub struct NodeOutputs {
    values: Vec<(String, NodeValue)>,
}

impl NodeOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K: Into<String>, V: Into<NodeValue>>(mut self, key: K, value: V) -> Self {
        self.values.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&NodeValue> {
        self.values.iter().find(|(name, _)| name == key).map(|(_, value)| value)
    }

    pub fn images(&self, key: &str) -> Option<&FrameSequence> {
        match self.get(key) {
            Some(NodeValue::Images(images)) => Some(images),
            _ => None,
        }
    }

    pub fn masks(&self, key: &str) -> Option<&MaskSequence> {
        match self.get(key) {
            Some(NodeValue::Masks(masks)) => Some(masks),
            _ => None,
        }
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(NodeValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Whether a value may be bound to a port; float ports also take ints
pub(crate) fn accepts(port: PortType, value: &NodeValue) -> bool {
    matches!(
        (port, value.port_type()),
        (PortType::Float, PortType::Int)
    ) || port == value.port_type()
}
