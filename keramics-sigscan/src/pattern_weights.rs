/* Copyright 2024-2025 Joachim Metz <joachim.metz@gmail.com>
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may
 * obtain a copy of the License at https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
 * WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the
 * License for the specific language governing permissions and limitations
 * under the License.
 */

use std::collections::{BTreeMap, HashMap};

use super::groups::OffsetGroup;

/// Pattern weights for one weight space (byte value, occurrence or similarity).
///
/// Keeps two views of the same data consistent: `offset_groups` groups pattern
/// offsets by their current weight, ordered by weight, so the offsets at the
/// largest weight can be found without scanning every offset; `weight_by_offset`
/// is the inverse lookup, used to find an offset's current weight so it can be
/// moved when its weight changes.
#[derive(Debug)]
pub(super) struct PatternWeights {
    /// Offsets grouped by weight, ascending.
    pub offset_groups: BTreeMap<isize, OffsetGroup>,

    /// Current weight of the largest weighted offset, 0 if no offset has weight.
    pub largest_weight: isize,

    /// Current weight per offset.
    weight_by_offset: HashMap<usize, isize>,
}

impl PatternWeights {
    /// Creates a new, empty pattern weights index.
    pub fn new() -> Self {
        Self {
            offset_groups: BTreeMap::new(),
            largest_weight: 0,
            weight_by_offset: HashMap::new(),
        }
    }

    /// Adds weight to a pattern offset, moving it between weight groups as needed.
    pub fn append_weight(&mut self, pattern_offset: usize, weight: isize) {
        let previous_weight: isize = *self.weight_by_offset.get(&pattern_offset).unwrap_or(&0);
        let new_weight: isize = previous_weight + weight;

        if previous_weight != 0 {
            let mut remove_group: bool = false;
            if let Some(offset_group) = self.offset_groups.get_mut(&previous_weight) {
                offset_group.offsets.retain(|offset| *offset != pattern_offset);
                remove_group = offset_group.offsets.is_empty();
            }
            if remove_group {
                self.offset_groups.remove(&previous_weight);
            }
        }
        self.offset_groups
            .entry(new_weight)
            .or_insert_with(OffsetGroup::new)
            .append_offset(pattern_offset);

        self.weight_by_offset.insert(pattern_offset, new_weight);

        self.largest_weight = *self.offset_groups.keys().next_back().unwrap_or(&0);
    }

    /// Retrieves the current weight of a pattern offset.
    pub fn get_weight(&self, pattern_offset: &usize) -> isize {
        *self.weight_by_offset.get(pattern_offset).unwrap_or(&0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_weight_accumulates() {
        let mut pattern_weights: PatternWeights = PatternWeights::new();

        pattern_weights.append_weight(4, 2);
        assert_eq!(pattern_weights.get_weight(&4), 2);
        assert_eq!(pattern_weights.largest_weight, 2);

        pattern_weights.append_weight(4, 3);
        assert_eq!(pattern_weights.get_weight(&4), 5);
        assert_eq!(pattern_weights.largest_weight, 5);

        // The offset must have moved out of the weight-2 group.
        assert!(!pattern_weights.offset_groups.contains_key(&2));
        assert_eq!(
            pattern_weights.offset_groups.get(&5).unwrap().offsets,
            vec![4]
        );
    }

    #[test]
    fn test_append_weight_tracks_largest_across_offsets() {
        let mut pattern_weights: PatternWeights = PatternWeights::new();

        pattern_weights.append_weight(0, 1);
        pattern_weights.append_weight(1, 4);
        pattern_weights.append_weight(2, 2);

        assert_eq!(pattern_weights.largest_weight, 4);
        assert_eq!(
            pattern_weights.offset_groups.get(&4).unwrap().offsets,
            vec![1]
        );
    }

    #[test]
    fn test_get_weight_unknown_offset_is_zero() {
        let pattern_weights: PatternWeights = PatternWeights::new();
        assert_eq!(pattern_weights.get_weight(&7), 0);
    }
}
