//! Speaker Queries

/// 列出所有音色（内置在前）
#[derive(Debug, Clone)]
pub struct ListSpeakers;
