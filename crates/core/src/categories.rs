// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// src/categories.rs
//
// The 26 EMOTIC emotion categories, the 6 coarse groups they collapse into,
// and the lookup tables derived from that partition.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use thiserror::Error;

/// Fine-grained EMOTIC category. Discriminants are the column indices used in
/// the 26-way label arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Emotion {
    Affection,
    Anger,
    Annoyance,
    Anticipation,
    Aversion,
    Confidence,
    Disapproval,
    Disconnection,
    Disquietment,
    DoubtConfusion,
    Embarrassment,
    Engagement,
    Esteem,
    Excitement,
    Fatigue,
    Fear,
    Happiness,
    Pain,
    Peace,
    Pleasure,
    Sadness,
    Sensitivity,
    Suffering,
    Surprise,
    Sympathy,
    Yearning,
}

/// Coarse group. Discriminants are the column indices of the 6-way arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EmotionGroup {
    Happiness,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disconnection,
}

impl Emotion {
    pub const COUNT: usize = 26;

    pub const ALL: [Emotion; Emotion::COUNT] = [
        Emotion::Affection,
        Emotion::Anger,
        Emotion::Annoyance,
        Emotion::Anticipation,
        Emotion::Aversion,
        Emotion::Confidence,
        Emotion::Disapproval,
        Emotion::Disconnection,
        Emotion::Disquietment,
        Emotion::DoubtConfusion,
        Emotion::Embarrassment,
        Emotion::Engagement,
        Emotion::Esteem,
        Emotion::Excitement,
        Emotion::Fatigue,
        Emotion::Fear,
        Emotion::Happiness,
        Emotion::Pain,
        Emotion::Peace,
        Emotion::Pleasure,
        Emotion::Sadness,
        Emotion::Sensitivity,
        Emotion::Suffering,
        Emotion::Surprise,
        Emotion::Sympathy,
        Emotion::Yearning,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name as it appears in the annotation files.
    pub const fn name(self) -> &'static str {
        match self {
            Emotion::Affection => "Affection",
            Emotion::Anger => "Anger",
            Emotion::Annoyance => "Annoyance",
            Emotion::Anticipation => "Anticipation",
            Emotion::Aversion => "Aversion",
            Emotion::Confidence => "Confidence",
            Emotion::Disapproval => "Disapproval",
            Emotion::Disconnection => "Disconnection",
            Emotion::Disquietment => "Disquietment",
            Emotion::DoubtConfusion => "Doubt/Confusion",
            Emotion::Embarrassment => "Embarrassment",
            Emotion::Engagement => "Engagement",
            Emotion::Esteem => "Esteem",
            Emotion::Excitement => "Excitement",
            Emotion::Fatigue => "Fatigue",
            Emotion::Fear => "Fear",
            Emotion::Happiness => "Happiness",
            Emotion::Pain => "Pain",
            Emotion::Peace => "Peace",
            Emotion::Pleasure => "Pleasure",
            Emotion::Sadness => "Sadness",
            Emotion::Sensitivity => "Sensitivity",
            Emotion::Suffering => "Suffering",
            Emotion::Surprise => "Surprise",
            Emotion::Sympathy => "Sympathy",
            Emotion::Yearning => "Yearning",
        }
    }

    /// The coarse group this category collapses into.
    pub const fn group(self) -> EmotionGroup {
        match self {
            Emotion::Affection
            | Emotion::Confidence
            | Emotion::Engagement
            | Emotion::Esteem
            | Emotion::Excitement
            | Emotion::Happiness
            | Emotion::Peace
            | Emotion::Pleasure => EmotionGroup::Happiness,

            Emotion::Embarrassment
            | Emotion::Fatigue
            | Emotion::Sadness
            | Emotion::Suffering
            | Emotion::Yearning => EmotionGroup::Sadness,

            Emotion::Anger | Emotion::Annoyance | Emotion::Disapproval | Emotion::Disquietment => {
                EmotionGroup::Anger
            }

            Emotion::Aversion | Emotion::DoubtConfusion | Emotion::Fear | Emotion::Sensitivity => {
                EmotionGroup::Fear
            }

            Emotion::Anticipation | Emotion::Surprise => EmotionGroup::Surprise,

            Emotion::Disconnection | Emotion::Pain | Emotion::Sympathy => {
                EmotionGroup::Disconnection
            }
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.name() == name)
    }
}

impl EmotionGroup {
    pub const COUNT: usize = 6;

    pub const ALL: [EmotionGroup; EmotionGroup::COUNT] = [
        EmotionGroup::Happiness,
        EmotionGroup::Sadness,
        EmotionGroup::Anger,
        EmotionGroup::Fear,
        EmotionGroup::Surprise,
        EmotionGroup::Disconnection,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            EmotionGroup::Happiness => "Happiness",
            EmotionGroup::Sadness => "Sadness",
            EmotionGroup::Anger => "Anger",
            EmotionGroup::Fear => "Fear",
            EmotionGroup::Surprise => "Surprise",
            EmotionGroup::Disconnection => "Disconnection",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|g| g.name() == name)
    }

    /// Fine categories of the standard partition that fall in this group.
    pub fn members(self) -> impl Iterator<Item = Emotion> {
        Emotion::ALL.into_iter().filter(move |e| e.group() == self)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for EmotionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A mapping table that cannot describe a total, onto 26 → 6 function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("unknown emotion category {0:?}")]
    UnknownCategory(String),
    #[error("category {category:?} maps to unknown group {group:?}")]
    UnknownGroup { category: String, group: String },
    #[error("category {0:?} is mapped more than once")]
    DuplicateCategory(String),
    #[error("category {0:?} has no group assigned")]
    MissingCategory(&'static str),
    #[error("group {0:?} has no member categories")]
    EmptyGroup(&'static str),
}

/// Lookup tables between the two category systems.
///
/// Holds name→index and index→name for both the 26-way and the 6-way system,
/// plus the 26→6 index mapping. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMapping {
    fine_index: HashMap<&'static str, usize>,
    fine_names: [&'static str; Emotion::COUNT],
    coarse_index: HashMap<&'static str, usize>,
    coarse_names: [&'static str; EmotionGroup::COUNT],
    pub(crate) fine_to_coarse: [usize; Emotion::COUNT],
}

impl CategoryMapping {
    /// Tables for the standard partition.
    pub fn standard() -> Self {
        Self::with_assignment(Emotion::ALL.map(|e| e.group().index()))
    }

    /// Build from a category-name → group-name table. Every one of the 26
    /// categories must appear exactly once and every group must receive at
    /// least one category.
    pub fn from_table<I, C, G>(table: I) -> Result<Self, MappingError>
    where
        I: IntoIterator<Item = (C, G)>,
        C: AsRef<str>,
        G: AsRef<str>,
    {
        let mut assignment: [Option<usize>; Emotion::COUNT] = [None; Emotion::COUNT];

        for (category, group) in table {
            let (category, group) = (category.as_ref(), group.as_ref());
            let emotion = Emotion::from_name(category)
                .ok_or_else(|| MappingError::UnknownCategory(category.to_string()))?;
            let target = EmotionGroup::from_name(group).ok_or_else(|| MappingError::UnknownGroup {
                category: category.to_string(),
                group: group.to_string(),
            })?;
            let slot = &mut assignment[emotion.index()];
            if slot.is_some() {
                return Err(MappingError::DuplicateCategory(category.to_string()));
            }
            *slot = Some(target.index());
        }

        let mut fine_to_coarse = [0usize; Emotion::COUNT];
        for (emotion, slot) in Emotion::ALL.iter().zip(assignment) {
            fine_to_coarse[emotion.index()] =
                slot.ok_or(MappingError::MissingCategory(emotion.name()))?;
        }

        if let Some(empty) = EmotionGroup::ALL
            .iter()
            .find(|g| !fine_to_coarse.contains(&g.index()))
        {
            return Err(MappingError::EmptyGroup(empty.name()));
        }

        Ok(Self::with_assignment(fine_to_coarse))
    }

    fn with_assignment(fine_to_coarse: [usize; Emotion::COUNT]) -> Self {
        let fine_names = Emotion::ALL.map(Emotion::name);
        let coarse_names = EmotionGroup::ALL.map(EmotionGroup::name);
        Self {
            fine_index: fine_names.iter().enumerate().map(|(i, n)| (*n, i)).collect(),
            fine_names,
            coarse_index: coarse_names.iter().enumerate().map(|(i, n)| (*n, i)).collect(),
            coarse_names,
            fine_to_coarse,
        }
    }

    pub fn fine_index(&self, name: &str) -> Option<usize> {
        self.fine_index.get(name).copied()
    }

    pub fn fine_name(&self, index: usize) -> Option<&'static str> {
        self.fine_names.get(index).copied()
    }

    pub fn coarse_index(&self, name: &str) -> Option<usize> {
        self.coarse_index.get(name).copied()
    }

    pub fn coarse_name(&self, index: usize) -> Option<&'static str> {
        self.coarse_names.get(index).copied()
    }

    /// Group index of a fine category index.
    pub fn coarse_of(&self, fine_index: usize) -> Option<usize> {
        self.fine_to_coarse.get(fine_index).copied()
    }

    pub fn fine_to_coarse(&self) -> &[usize; Emotion::COUNT] {
        &self.fine_to_coarse
    }

    /// Fine category indices belonging to a group, ascending.
    pub fn members(&self, coarse_index: usize) -> Vec<usize> {
        self.fine_to_coarse
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == coarse_index)
            .map(|(f, _)| f)
            .collect()
    }

    /// `(fine index, fine name, coarse index, coarse name)` for every category.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &'static str, usize, &'static str)> + '_ {
        self.fine_to_coarse
            .iter()
            .enumerate()
            .map(|(f, &c)| (f, self.fine_names[f], c, self.coarse_names[c]))
    }
}

impl Default for CategoryMapping {
    fn default() -> Self {
        Self::standard()
    }
}

/// Shared instance of [`CategoryMapping::standard`].
pub fn standard_mapping() -> &'static CategoryMapping {
    static STANDARD: OnceLock<CategoryMapping> = OnceLock::new();
    STANDARD.get_or_init(CategoryMapping::standard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_table() -> Vec<(&'static str, &'static str)> {
        Emotion::ALL
            .iter()
            .map(|e| (e.name(), e.group().name()))
            .collect()
    }

    #[test]
    fn category_order_matches_label_columns() {
        assert_eq!(Emotion::ALL.len(), 26);
        for (i, e) in Emotion::ALL.iter().enumerate() {
            assert_eq!(e.index(), i);
            assert_eq!(Emotion::from_index(i), Some(*e));
            assert_eq!(Emotion::from_name(e.name()), Some(*e));
        }
        assert_eq!(Emotion::DoubtConfusion.name(), "Doubt/Confusion");
        assert_eq!(Emotion::Happiness.index(), 16);
        assert_eq!(EmotionGroup::Happiness.index(), 0);
        assert_eq!(EmotionGroup::Disconnection.index(), 5);
    }

    #[test]
    fn partition_sizes() {
        let sizes: Vec<usize> = EmotionGroup::ALL.iter().map(|g| g.members().count()).collect();
        assert_eq!(sizes, vec![8, 5, 4, 4, 2, 3]);
        assert_eq!(sizes.iter().sum::<usize>(), Emotion::COUNT);
    }

    #[test]
    fn standard_lookup_tables() {
        let m = CategoryMapping::standard();
        assert_eq!(m.fine_index("Anger"), Some(1));
        assert_eq!(m.fine_name(9), Some("Doubt/Confusion"));
        assert_eq!(m.coarse_index("Fear"), Some(3));
        assert_eq!(m.coarse_name(4), Some("Surprise"));
        assert_eq!(m.coarse_of(Emotion::Confidence.index()), Some(0));
        assert_eq!(m.coarse_of(Emotion::Pain.index()), Some(5));
        assert_eq!(m.coarse_of(26), None);
        assert_eq!(m.fine_index("happy"), None);
        assert_eq!(
            m.members(EmotionGroup::Surprise.index()),
            vec![Emotion::Anticipation.index(), Emotion::Surprise.index()]
        );
        assert_eq!(m.rows().count(), 26);
    }

    #[test]
    fn table_builder_agrees_with_enum_partition() {
        let built = CategoryMapping::from_table(standard_table()).unwrap();
        assert_eq!(&built, standard_mapping());
    }

    #[test]
    fn table_builder_rejects_omitted_category() {
        let table: Vec<_> = standard_table()
            .into_iter()
            .filter(|(c, _)| *c != "Yearning")
            .collect();
        assert_eq!(
            CategoryMapping::from_table(table),
            Err(MappingError::MissingCategory("Yearning"))
        );
    }

    #[test]
    fn table_builder_rejects_bad_names() {
        let mut table = standard_table();
        table.push(("Boredom", "Sadness"));
        assert_eq!(
            CategoryMapping::from_table(table),
            Err(MappingError::UnknownCategory("Boredom".to_string()))
        );

        let mut table = standard_table();
        table[0].1 = "Joy";
        assert!(matches!(
            CategoryMapping::from_table(table),
            Err(MappingError::UnknownGroup { .. })
        ));

        let mut table = standard_table();
        table.push(("Anger", "Anger"));
        assert_eq!(
            CategoryMapping::from_table(table),
            Err(MappingError::DuplicateCategory("Anger".to_string()))
        );
    }

    #[test]
    fn table_builder_requires_onto_mapping() {
        let table: Vec<_> = standard_table()
            .into_iter()
            .map(|(c, g)| if g == "Surprise" { (c, "Fear") } else { (c, g) })
            .collect();
        assert_eq!(
            CategoryMapping::from_table(table),
            Err(MappingError::EmptyGroup("Surprise"))
        );
    }

    #[test]
    fn custom_table_moves_category() {
        let table: Vec<_> = standard_table()
            .into_iter()
            .map(|(c, g)| if c == "Pain" { (c, "Sadness") } else { (c, g) })
            .collect();
        let m = CategoryMapping::from_table(table).unwrap();
        assert_eq!(m.coarse_of(Emotion::Pain.index()), Some(1));
    }
}
