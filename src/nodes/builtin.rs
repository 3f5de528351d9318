use tracing::debug;

use crate::{
    config::{Config, KeyframeConfig},
    error::Result,
    nodes::traits::{NodeInputs, NodeOutputs, PortSpec, PortType, SequenceNode, Widget},
    ops::{ClipDoctor, KeyframeInserter, MaskRangeEditor, SequenceSplicer},
    sequence::{Frame, SequencePair},
};

fn pair_outputs(pair: SequencePair) -> NodeOutputs {
    NodeOutputs::new().with("images", pair.images).with("masks", pair.masks)
}

fn range_input(name: &str, hint: &str) -> PortSpec {
    PortSpec::optional(name, PortType::Text).with_widget(Widget::text("").placeholder(hint))
}

/// Keyframe insertion node with numbered keyframe slots
pub struct KeyframeInsertNode {
    inserter: KeyframeInserter,
    mask_value: f32,
}

impl KeyframeInsertNode {
    pub const NAME: &'static str = "VACEInpaintKeyframeInsert";

    pub fn new(config: KeyframeConfig) -> Self {
        Self {
            mask_value: config.mask_value,
            inserter: KeyframeInserter::new(config),
        }
    }

    fn slot_name(slot: usize) -> String {
        format!("keyframe_{}", slot + 1)
    }
}

impl SequenceNode for KeyframeInsertNode {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "VACE Inpaint Keyframe Insert"
    }

    fn description(&self) -> &str {
        "Overwrite frames at listed positions with keyframes and set their masks"
    }

    fn inputs(&self) -> Vec<PortSpec> {
        let mut ports = vec![
            PortSpec::required("images", PortType::Images),
            PortSpec::required("keyframe_positions", PortType::Text)
                .with_widget(Widget::text("0").placeholder("e.g. 0,15,30")),
            PortSpec::optional("masks", PortType::Masks),
        ];
        ports.extend(
            (0..self.inserter.max_slots())
                .map(|slot| PortSpec::optional(Self::slot_name(slot), PortType::Image)),
        );
        ports.push(
            PortSpec::optional("keyframe_mask_value", PortType::Float).with_widget(Widget::Float {
                default: self.mask_value,
                min: 0.0,
                max: 1.0,
                step: 0.01,
            }),
        );
        ports
    }

    fn outputs(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::required("images", PortType::Images),
            PortSpec::required("masks", PortType::Masks),
        ]
    }

    fn call(&self, inputs: &NodeInputs) -> Result<NodeOutputs> {
        let images = inputs.images("images")?;
        let masks = inputs.masks_opt("masks")?;
        let positions = inputs.text("keyframe_positions")?;
        let slots = (0..self.inserter.max_slots())
            .map(|slot| Ok(inputs.image_opt(&Self::slot_name(slot))?.cloned()))
            .collect::<Result<Vec<Option<Frame>>>>()?;
        let mask_value = inputs.float("keyframe_mask_value")?;

        let pair = self
            .inserter
            .insert(images, masks, positions, &slots, Some(mask_value))?;
        debug!("Inserted keyframes at [{}] into {} frames", positions.trim(), pair.len());
        Ok(pair_outputs(pair))
    }
}

/// Mask-only white/black range node
pub struct MaskRangeNode {
    editor: MaskRangeEditor,
}

impl MaskRangeNode {
    pub const NAME: &'static str = "MaskRangeDoctor";

    pub fn new() -> Self {
        Self {
            editor: MaskRangeEditor::new(),
        }
    }
}

impl Default for MaskRangeNode {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceNode for MaskRangeNode {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Mask Range Doctor"
    }

    fn description(&self) -> &str {
        "Set whole mask frames to white or black by frame range"
    }

    fn inputs(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::required("masks", PortType::Masks),
            range_input("white_range", "e.g. 0-10,15"),
            range_input("black_range", "e.g. 20-25"),
        ]
    }

    fn outputs(&self) -> Vec<PortSpec> {
        vec![PortSpec::required("masks", PortType::Masks)]
    }

    fn call(&self, inputs: &NodeInputs) -> Result<NodeOutputs> {
        let masks = inputs.masks("masks")?;
        let edited = self.editor.edit(
            masks,
            inputs.text("white_range")?,
            inputs.text("black_range")?,
        )?;
        Ok(NodeOutputs::new().with("masks", edited))
    }
}

/// Combined grey-fill and mask range node
pub struct ClipDoctorNode {
    doctor: ClipDoctor,
}

impl ClipDoctorNode {
    pub const NAME: &'static str = "VACEClipDoctor";

    pub fn new(grey_level: f32) -> Self {
        Self {
            doctor: ClipDoctor::new(grey_level),
        }
    }
}

impl SequenceNode for ClipDoctorNode {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "VACE Clip Doctor"
    }

    fn description(&self) -> &str {
        "Grey out image frames and paint mask frames white or black by range"
    }

    fn inputs(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::required("images", PortType::Images),
            PortSpec::required("masks", PortType::Masks),
            range_input("grey_range", "e.g. 5-8"),
            range_input("white_range", "e.g. 0-10,15"),
            range_input("black_range", "e.g. 20-25"),
        ]
    }

    fn outputs(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::required("images", PortType::Images),
            PortSpec::required("masks", PortType::Masks),
        ]
    }

    fn call(&self, inputs: &NodeInputs) -> Result<NodeOutputs> {
        let pair = self.doctor.doctor(
            inputs.images("images")?,
            inputs.masks("masks")?,
            inputs.text("grey_range")?,
            inputs.text("white_range")?,
            inputs.text("black_range")?,
        )?;
        Ok(pair_outputs(pair))
    }
}

/// Overlay splice node; also reports the output frame count
pub struct VideoSpliceNode {
    splicer: SequenceSplicer,
    max_offset: u32,
}

impl VideoSpliceNode {
    pub const NAME: &'static str = "VACEVideoSplice";

    pub fn new(config: &Config) -> Self {
        Self {
            splicer: SequenceSplicer::new(config.splice.clone(), config.fill.grey_level),
            max_offset: config.splice.max_offset,
        }
    }
}

impl SequenceNode for VideoSpliceNode {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "VACE Video Splice"
    }

    fn description(&self) -> &str {
        "Overlay a second image sequence onto the first at a frame offset"
    }

    fn inputs(&self) -> Vec<PortSpec> {
        let max = i64::from(self.max_offset);
        vec![
            PortSpec::required("imagesequence1", PortType::Images),
            PortSpec::required("imagesequence2", PortType::Images),
            PortSpec::required("frame_offset", PortType::Int).with_widget(Widget::Int {
                default: 0,
                min: -max,
                max,
            }),
            PortSpec::optional("mask1", PortType::Masks),
            PortSpec::optional("mask2", PortType::Masks),
        ]
    }

    fn outputs(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::required("images", PortType::Images),
            PortSpec::required("masks", PortType::Masks),
            PortSpec::required("frame_count", PortType::Int),
        ]
    }

    fn call(&self, inputs: &NodeInputs) -> Result<NodeOutputs> {
        let offset = inputs.int("frame_offset")?;
        let pair = self.splicer.splice(
            inputs.images("imagesequence1")?,
            inputs.masks_opt("mask1")?,
            inputs.images("imagesequence2")?,
            inputs.masks_opt("mask2")?,
            offset,
        )?;
        let frame_count = pair.len() as i64;
        debug!("Spliced at offset {} into {} frames", offset, frame_count);
        Ok(pair_outputs(pair).with("frame_count", frame_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sequence::{FrameSequence, MaskSequence, Resolution};

    const RES: Resolution = Resolution { width: 2, height: 2 };

    fn images(len: usize) -> FrameSequence {
        FrameSequence::repeat(Frame::uniform(RES, 0.2), len).unwrap()
    }

    #[test]
    fn test_keyframe_node_ports() {
        let node = KeyframeInsertNode::new(KeyframeConfig::default());
        let names: Vec<String> = node.inputs().into_iter().map(|p| p.name).collect();
        assert!(names.contains(&"keyframe_1".to_string()));
        assert!(names.contains(&"keyframe_5".to_string()));
        assert!(!names.contains(&"keyframe_6".to_string()));
        assert_eq!(node.category(), "Vace/VFX");
    }

    #[test]
    fn test_keyframe_node_call() {
        let node = KeyframeInsertNode::new(KeyframeConfig::default());
        let inputs = NodeInputs::new()
            .set("images", images(4))
            .set("keyframe_positions", "2")
            .set("keyframe_2", Frame::uniform(RES, 0.9))
            .set("keyframe_mask_value", 0.0f32);

        let out = node.call(&inputs).unwrap();
        let result = out.images("images").unwrap();
        assert!(result[2].is_uniform(0.9));
        assert!(out.masks("masks").unwrap()[2].is_uniform(0.0));
        assert!(out.masks("masks").unwrap()[1].is_uniform(1.0));
    }

    #[test]
    fn test_mask_range_node_call() {
        let node = MaskRangeNode::new();
        let inputs = NodeInputs::new()
            .set("masks", MaskSequence::filled(3, RES, 0.5).unwrap())
            .set("white_range", "0")
            .set("black_range", "2");
        let out = node.call(&inputs).unwrap();
        let masks = out.masks("masks").unwrap();
        assert!(masks[0].is_uniform(1.0));
        assert!(masks[1].is_uniform(0.5));
        assert!(masks[2].is_uniform(0.0));
    }

    #[test]
    fn test_splice_node_reports_frame_count() {
        let node = VideoSpliceNode::new(&Config::default());
        let inputs = NodeInputs::new()
            .set("imagesequence1", images(5))
            .set("imagesequence2", images(3))
            .set("frame_offset", 4i64);
        let out = node.call(&inputs).unwrap();
        assert_eq!(out.int("frame_count"), Some(7));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_clip_doctor_node_errors_pass_through() {
        let node = ClipDoctorNode::new(0.5);
        let inputs = NodeInputs::new()
            .set("images", images(3))
            .set("masks", MaskSequence::filled(3, RES, 0.5).unwrap())
            .set("grey_range", "7")
            .set("white_range", "")
            .set("black_range", "");
        let err = node.call(&inputs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
    }
}
