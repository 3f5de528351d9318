use std::collections::HashMap;

use tracing::debug;

use crate::{
    config::Config,
    error::{NodeError, Result},
    nodes::{
        builtin::{ClipDoctorNode, KeyframeInsertNode, MaskRangeNode, VideoSpliceNode},
        traits::{accepts, NodeInputs, NodeOutputs, SequenceNode},
    },
};

/// Registry for managing available graph nodes
///
/// The registry is what a node-graph host sees: it lists nodes by name,
/// exposes their port declarations and runs them with checked inputs.
pub struct NodeRegistry {
    nodes: HashMap<String, Box<dyn Fn() -> Box<dyn SequenceNode>>>,
}

impl NodeRegistry {
    /// Create a registry with all built-in nodes and default settings
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create a registry whose built-in nodes use the given settings
    pub fn with_config(config: &Config) -> Self {
        let mut registry = Self {
            nodes: HashMap::new(),
        };
        registry.register_builtin_nodes(config);
        registry
    }

    fn register_builtin_nodes(&mut self, config: &Config) {
        let keyframe = config.keyframe.clone();
        self.register(KeyframeInsertNode::NAME.to_string(), move || {
            Box::new(KeyframeInsertNode::new(keyframe.clone()))
        });

        self.register(MaskRangeNode::NAME.to_string(), || Box::new(MaskRangeNode::new()));

        let grey_level = config.fill.grey_level;
        self.register(ClipDoctorNode::NAME.to_string(), move || {
            Box::new(ClipDoctorNode::new(grey_level))
        });

        let config = config.clone();
        self.register(VideoSpliceNode::NAME.to_string(), move || {
            Box::new(VideoSpliceNode::new(&config))
        });
    }

    /// Register a custom node
    ///
    /// # Arguments
    ///
    /// * `name` - Unique name for the node
    /// * `factory` - Function that creates new instances of the node
    pub fn register<F>(&mut self, name: String, factory: F)
    where
        F: Fn() -> Box<dyn SequenceNode> + 'static,
    {
        self.nodes.insert(name, Box::new(factory));
    }

    /// Get a new instance of a node by name
    pub fn get_node(&self, name: &str) -> Option<Box<dyn SequenceNode>> {
        self.nodes.get(name).map(|factory| factory())
    }

    /// Get all available node names, sorted
    pub fn available_nodes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Run a node by name
    ///
    /// Inputs not declared by the node are rejected, absent inputs with a
    /// widget take the widget default, and every bound value must match its
    /// port type.
    pub fn invoke(&self, name: &str, mut inputs: NodeInputs) -> Result<NodeOutputs> {
        let node = self.get_node(name).ok_or_else(|| NodeError::NotFound {
            name: name.to_string(),
        })?;
        let ports = node.inputs();

        if let Some(unknown) = inputs
            .keys()
            .find(|key| !ports.iter().any(|port| &port.name == *key))
        {
            return Err(NodeError::UnknownInput {
                node: name.to_string(),
                input: unknown.clone(),
            }
            .into());
        }

        for port in &ports {
            match inputs.get(&port.name) {
                Some(value) if !accepts(port.port_type, value) => {
                    return Err(NodeError::TypeMismatch {
                        node: name.to_string(),
                        input: port.name.clone(),
                        expected: port.port_type.to_string(),
                        found: value.port_type().to_string(),
                    }
                    .into());
                }
                Some(_) => {}
                None => match &port.widget {
                    Some(widget) => inputs.insert(port.name.clone(), widget.default_value()),
                    None if port.required => {
                        return Err(NodeError::MissingInput {
                            node: name.to_string(),
                            input: port.name.clone(),
                        }
                        .into());
                    }
                    None => {}
                },
            }
        }

        inputs.bind(name);
        debug!("Invoking node {}", name);
        node.call(&inputs)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
