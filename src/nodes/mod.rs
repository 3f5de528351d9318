//! # Graph Nodes
//!
//! Adapters that expose the sequence operations to a node-graph host. Each
//! node declares typed input and output ports; [`NodeRegistry`] looks nodes up
//! by name and runs them after checking their inputs.

pub mod builtin;
pub mod registry;
pub mod traits;

pub use builtin::{ClipDoctorNode, KeyframeInsertNode, MaskRangeNode, VideoSpliceNode};
pub use registry::NodeRegistry;
pub use traits::{
    NodeInputs, NodeOutputs, NodeValue, PortSpec, PortType, SequenceNode, Widget, NODE_CATEGORY,
};
