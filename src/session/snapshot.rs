//! Measurement pass.
//!
//! Everything the mutation pass needs from the live layout is copied here
//! first, so a frame never interleaves geometry reads with state writes.

use crate::geometry::{ElementId, LayoutSource};
use crate::section::SectionList;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct FrameSnapshot {
    section_tops: Vec<Option<f32>>,
    element_tops: HashMap<ElementId, f32>,
}

impl FrameSnapshot {
    pub(crate) fn measure<'a>(
        layout: &impl LayoutSource,
        sections: &SectionList,
        elements: impl IntoIterator<Item = &'a ElementId>,
    ) -> Self {
        let section_tops = sections
            .iter()
            .map(|section| layout.element_top(&section.id.anchor()))
            .collect();

        let mut element_tops = HashMap::new();
        for element in elements {
            if element_tops.contains_key(element) {
                continue;
            }
            if let Some(top) = layout.element_top(element) {
                element_tops.insert(element.clone(), top);
            }
        }

        Self {
            section_tops,
            element_tops,
        }
    }

    pub(crate) fn section_tops(&self) -> &[Option<f32>] {
        &self.section_tops
    }
}

impl LayoutSource for FrameSnapshot {
    fn element_top(&self, id: &ElementId) -> Option<f32> {
        self.element_tops.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::StaticLayout;

    #[test]
    fn copies_only_requested_geometry() {
        let layout = StaticLayout::new()
            .with("hero", 0.0)
            .with("about", 800.0)
            .with("cards", 1200.0)
            .with("unwatched", 50.0);
        let sections = SectionList::from_ids(["hero", "about", "contact"]).unwrap();
        let watched = [ElementId::from("cards"), ElementId::from("ghost")];

        let snapshot = FrameSnapshot::measure(&layout, &sections, watched.iter());

        assert_eq!(snapshot.section_tops(), &[Some(0.0), Some(800.0), None]);
        assert_eq!(snapshot.element_top(&"cards".into()), Some(1200.0));
        assert_eq!(snapshot.element_top(&"ghost".into()), None);
        assert_eq!(snapshot.element_top(&"unwatched".into()), None);
    }
}
