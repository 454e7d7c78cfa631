//! Scripted shape-key drivers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transform::{Axis, TransformChannel};

/// Name of the single variable every widget driver reads
pub const DRIVER_VARIABLE_NAME: &str = "bone_transform";

/// Linear mapping of an input range onto an output range, clamped
///
/// `clamp((x - start) / (end - start), 0, 1) * (max - min) + min`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeMapping {
    pub start: f32,
    pub end: f32,
    pub min: f32,
    pub max: f32,
}

impl RangeMapping {
    /// Build a mapping, rejecting input ranges narrower than `epsilon`
    pub fn new(start: f32, end: f32, min: f32, max: f32, epsilon: f32) -> Option<Self> {
        ((end - start).abs() >= epsilon).then_some(Self {
            start,
            end,
            min,
            max,
        })
    }

    pub fn evaluate(&self, input: f32) -> f32 {
        let normalized = ((input - self.start) / (self.end - self.start)).clamp(0.0, 1.0);
        normalized * (self.max - self.min) + self.min
    }

    /// Scripted expression equivalent to [`RangeMapping::evaluate`]
    pub fn expression(&self, variable: &str) -> String {
        let normalized = format!(
            "({variable} - ({})) / ({})",
            self.start,
            self.end - self.start
        );
        let clamped = format!("max(0, min(1, {normalized}))");
        format!("{clamped} * ({}) + ({})", self.max - self.min, self.min)
    }
}

/// Driver variable reading one local transform channel of a joint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverVariable {
    pub name: String,
    /// Skeleton object owning the joint
    pub object: Uuid,
    pub joint: Uuid,
    pub channel: TransformChannel,
    pub axis: Axis,
}

impl DriverVariable {
    /// Host transform type identifier, e.g. `LOC_X`
    pub fn transform_type(&self) -> String {
        format!("{}_{}", self.channel.driver_prefix(), self.axis.label())
    }
}

/// A scripted driver on a shape key's value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeKeyDriver {
    pub variable: DriverVariable,
    pub mapping: RangeMapping,
    pub expression: String,
}

impl ShapeKeyDriver {
    pub fn new(variable: DriverVariable, mapping: RangeMapping) -> Self {
        let expression = mapping.expression(&variable.name);
        Self {
            variable,
            mapping,
            expression,
        }
    }

    pub fn evaluate(&self, input: f32) -> f32 {
        self.mapping.evaluate(input)
    }
}
