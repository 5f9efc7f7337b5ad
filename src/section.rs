//! Ordered page sections.
//!
//! A section's id doubles as the anchor of its element in the layout and as
//! the join key for navigation links.

use crate::geometry::ElementId;
use anyhow::{Result, bail};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Layout anchor of the section element.
    pub fn anchor(&self) -> ElementId {
        ElementId::new(self.0.clone())
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SectionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: SectionId,
    pub order_index: usize,
    /// Overrides the tracker threshold (px from the viewport top) for this section.
    pub trigger_offset: Option<f32>,
}

impl Section {
    pub fn new(id: impl Into<SectionId>, order_index: usize) -> Self {
        Self {
            id: id.into(),
            order_index,
            trigger_offset: None,
        }
    }

    pub fn with_trigger_offset(mut self, offset_px: f32) -> Self {
        self.trigger_offset = offset_px.is_finite().then_some(offset_px);
        self
    }
}

/// Immutable, scan-ordered list of sections.
#[derive(Debug, Clone, Default)]
pub struct SectionList {
    sections: Vec<Section>,
}

impl SectionList {
    /// Build from sections in any order; they are sorted by `order_index`.
    pub fn new(mut sections: Vec<Section>) -> Result<Self> {
        sections.sort_by_key(|section| section.order_index);

        let mut ids = HashSet::new();
        let mut previous_index = None;
        for section in &sections {
            if section.id.as_str().trim().is_empty() {
                bail!("section at order index {} has an empty id", section.order_index);
            }
            if !ids.insert(section.id.clone()) {
                bail!("duplicate section id `{}`", section.id);
            }
            if previous_index == Some(section.order_index) {
                bail!(
                    "sections share order index {} (`{}`)",
                    section.order_index,
                    section.id
                );
            }
            previous_index = Some(section.order_index);
        }

        Ok(Self { sections })
    }

    /// Sections in page order, `order_index` assigned from position.
    pub fn from_ids<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SectionId>,
    {
        Self::new(
            ids.into_iter()
                .enumerate()
                .map(|(idx, id)| Section::new(id, idx))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    pub fn get(&self, position: usize) -> Option<&Section> {
        self.sections.get(position)
    }

    /// Position of `id` in scan order.
    pub fn position(&self, id: &SectionId) -> Option<usize> {
        self.sections.iter().position(|section| &section.id == id)
    }

    pub fn contains(&self, id: &SectionId) -> bool {
        self.position(id).is_some()
    }
}

impl<'a> IntoIterator for &'a SectionList {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
