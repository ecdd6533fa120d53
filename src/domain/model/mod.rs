//! Model Context - 模型目录与能力描述

mod catalog;

pub use catalog::{Capabilities, ModelCatalog, ModelSpec, DEFAULT_MODEL_ID};
