//! Blend slider: a 1-D slider picks a pose between two sources and the target
//! is blended toward it.

use serde::{Deserialize, Serialize};

use super::{normalize_slider, require_references, RigConstraint};
use crate::error::RigError;
use crate::handle::{
    NodeId, PoseStream, ReadOnlyTransformHandle, ReadWriteTransformHandle, TransformResolver,
};

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BlendSliderData {
    pub target: String,
    pub source_a: String,
    pub source_b: String,
    pub slider: String,
    /// Blend world position.
    #[serde(default = "default_true")]
    pub position: bool,
    /// Blend world rotation.
    #[serde(default = "default_true")]
    pub rotation: bool,
}

impl BlendSliderData {
    pub fn new(
        target: impl Into<String>,
        source_a: impl Into<String>,
        source_b: impl Into<String>,
        slider: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            source_a: source_a.into(),
            source_b: source_b.into(),
            slider: slider.into(),
            position: true,
            rotation: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlendSliderJob {
    pub target: ReadWriteTransformHandle,
    pub source_a: ReadOnlyTransformHandle,
    pub source_b: ReadOnlyTransformHandle,
    pub slider: ReadWriteTransformHandle,
    pub position: bool,
    pub rotation: bool,
}

impl RigConstraint for BlendSliderJob {
    type Data = BlendSliderData;

    const KIND: &'static str = "blend_slider";

    fn validate(data: &BlendSliderData) -> Result<(), RigError> {
        require_references(
            Self::KIND,
            &[
                ("target", data.target.as_str()),
                ("source_a", data.source_a.as_str()),
                ("source_b", data.source_b.as_str()),
                ("slider", data.slider.as_str()),
            ],
        )
    }

    fn bind<R: TransformResolver + ?Sized>(
        data: &BlendSliderData,
        resolver: &mut R,
    ) -> Result<Self, RigError> {
        Self::validate(data)?;
        Ok(Self {
            target: ReadWriteTransformHandle::bind(resolver, Self::KIND, "target", &data.target)?,
            source_a: ReadOnlyTransformHandle::bind(
                resolver,
                Self::KIND,
                "source_a",
                &data.source_a,
            )?,
            source_b: ReadOnlyTransformHandle::bind(
                resolver,
                Self::KIND,
                "source_b",
                &data.source_b,
            )?,
            slider: ReadWriteTransformHandle::bind(resolver, Self::KIND, "slider", &data.slider)?,
            position: data.position,
            rotation: data.rotation,
        })
    }

    fn evaluate<S: PoseStream + ?Sized>(&self, stream: &mut S, weight: f32) {
        if weight <= 0.0 {
            return;
        }

        let t = normalize_slider(&self.slider, stream);

        if self.rotation {
            let blended = self
                .source_a
                .rotation(stream)
                .slerp(self.source_b.rotation(stream), t);
            let current = self.target.rotation(stream);
            self.target
                .set_rotation(stream, current.slerp(blended, weight));
        }

        if self.position {
            let blended = self
                .source_a
                .position(stream)
                .lerp(self.source_b.position(stream), t);
            let current = self.target.position(stream);
            self.target
                .set_position(stream, current.lerp(blended, weight));
        }
    }

    fn write_targets(&self) -> Vec<NodeId> {
        vec![self.target.node(), self.slider.node()]
    }
}
