//! Attribute visibility.
//!
//! Each resource declares which external attribute codes it exposes and which
//! it accepts, optionally with codes that may only be written on create. An
//! [`AttributeFilter`] is the per-request view of those rules for one
//! [`PipelineContext`].

use std::collections::BTreeSet;

use cart_api_core::Attributes;

use super::{Operation, PipelineContext};

/// Static visibility rules for a resource, in external attribute codes.
#[derive(Debug, Clone, Copy)]
pub struct FilterRules {
    /// Codes rendered on output.
    pub readable: &'static [&'static str],
    /// Codes accepted on create and update.
    pub writable: &'static [&'static str],
    /// Codes accepted on create only.
    pub create_only: &'static [&'static str],
}

impl FilterRules {
    pub const EMPTY: Self = Self {
        readable: &[],
        writable: &[],
        create_only: &[],
    };
}

/// Per-request attribute filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFilter {
    include: BTreeSet<String>,
    accept: BTreeSet<String>,
}

impl AttributeFilter {
    /// Derive the filter for a pipeline context.
    #[must_use]
    pub fn new(rules: &FilterRules, context: &PipelineContext) -> Self {
        let include = rules.readable.iter().map(|code| (*code).to_string()).collect();
        let accept = match context.operation {
            Operation::Create => rules
                .writable
                .iter()
                .chain(rules.create_only)
                .map(|code| (*code).to_string())
                .collect(),
            Operation::Update => rules.writable.iter().map(|code| (*code).to_string()).collect(),
            Operation::Retrieve | Operation::Delete => BTreeSet::new(),
        };

        Self { include, accept }
    }

    /// Codes every prepared resource must contain.
    #[must_use]
    pub const fn include_set(&self) -> &BTreeSet<String> {
        &self.include
    }

    /// Drop inbound codes the current operation may not write.
    #[must_use]
    pub fn filter_inbound(&self, mut data: Attributes) -> Attributes {
        data.retain(|code, _| self.accept.contains(code));
        data
    }

    /// Drop outbound codes outside the include set.
    #[must_use]
    pub fn filter_outbound(&self, mut data: Attributes) -> Attributes {
        data.retain(|code, _| self.include.contains(code));
        data
    }
}
